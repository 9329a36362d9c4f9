#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::io::Write;
use std::path::Path;

use api_gateway::AuthorizerErrorPolicy;
use appsync_auth_server::config::{AppConfig, LogFormat, VerifierConfig};
use jwt_verifier_plugin::TokenUse;
use tempfile::NamedTempFile;

const BIND_ADDR_VAR: &str = "APPSYNC_AUTH__GATEWAY__BIND_ADDR";

fn yaml(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

/// Load with no override variables set. temp-env serializes environment
/// access across tests.
fn load(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    temp_env::with_vars_unset(
        [
            BIND_ADDR_VAR,
            "APPSYNC_AUTH__VERIFIER__KIND",
            "APPSYNC_AUTH__VERIFIER__ISSUER",
        ],
        || AppConfig::load(path),
    )
}

#[test]
fn defaults_without_file() {
    let cfg = load(None).unwrap();

    assert_eq!(cfg.gateway.bind_addr, "127.0.0.1:8080");
    assert_eq!(cfg.gateway.graphql_path, "/graphql");
    assert_eq!(cfg.logging.format, LogFormat::Pretty);
    assert_eq!(cfg.authorizer.ttl_override_secs, None);
    assert!(matches!(cfg.verifier, VerifierConfig::SchemePrefix(_)));
}

#[test]
fn full_file_is_loaded() {
    let file = yaml(
        r#"
logging:
  level: debug
  format: json
authorizer:
  ttl_override_secs: 60
  log_requests: false
gateway:
  bind_addr: "0.0.0.0:9000"
  authorizer_result_ttl_secs: 30
  on_authorizer_error: server_error
  public_routes: ["/status"]
verifier:
  kind: signed_jwt
  region: us-east-1
  user_pool_id: us-east-1_Example
  audience: example-client
  token_use: access
  algorithms: [RS256, ES256]
  claims:
    target_scope_claim: "custom:orgs"
"#,
    );

    let cfg = load(Some(file.path())).unwrap();

    assert_eq!(cfg.logging.level, "debug");
    assert_eq!(cfg.logging.format, LogFormat::Json);
    assert_eq!(cfg.authorizer.ttl_override_secs, Some(60));
    assert!(!cfg.authorizer.log_requests);
    assert_eq!(cfg.gateway.bind_addr, "0.0.0.0:9000");
    assert_eq!(cfg.gateway.authorizer_result_ttl_secs, 30);
    assert_eq!(cfg.gateway.on_authorizer_error, AuthorizerErrorPolicy::ServerError);
    assert_eq!(cfg.gateway.public_routes, ["/status"]);

    let VerifierConfig::SignedJwt(jwt) = cfg.verifier else {
        panic!("expected signed_jwt verifier");
    };
    assert_eq!(jwt.user_pool_id.as_deref(), Some("us-east-1_Example"));
    assert_eq!(jwt.audience.as_deref(), Some("example-client"));
    assert_eq!(jwt.token_use, TokenUse::Access);
    assert_eq!(jwt.algorithms.len(), 2);
    assert_eq!(jwt.claims.target_scope_claim, "custom:orgs");
    assert_eq!(jwt.claims.entities_claim, "sub");
}

#[test]
fn scheme_prefix_identity_is_configurable() {
    let file = yaml(
        r"
verifier:
  kind: scheme_prefix
  identity:
    entities_with_access: [e1, e2]
    access_info: evr
    target_organization_ids: [o1]
",
    );

    let cfg = load(Some(file.path())).unwrap();

    let VerifierConfig::SchemePrefix(fixture) = cfg.verifier else {
        panic!("expected scheme_prefix verifier");
    };
    assert_eq!(fixture.identity.entities_with_access, ["e1", "e2"]);
    assert_eq!(fixture.identity.access_info, "evr");
}

#[test]
fn environment_overrides_file() {
    let file = yaml("gateway:\n  bind_addr: \"127.0.0.1:7000\"\n");

    let cfg = temp_env::with_var(BIND_ADDR_VAR, Some("127.0.0.1:7500"), || {
        AppConfig::load(Some(file.path()))
    })
    .unwrap();

    assert_eq!(cfg.gateway.bind_addr, "127.0.0.1:7500");
}

#[test]
fn verifier_can_be_selected_from_environment() {
    let cfg = temp_env::with_vars(
        [
            ("APPSYNC_AUTH__VERIFIER__KIND", Some("signed_jwt")),
            (
                "APPSYNC_AUTH__VERIFIER__ISSUER",
                Some("https://issuer.example.com"),
            ),
        ],
        || AppConfig::load(None),
    )
    .unwrap();

    let VerifierConfig::SignedJwt(jwt) = cfg.verifier else {
        panic!("expected signed_jwt verifier");
    };
    assert_eq!(jwt.issuer.as_deref(), Some("https://issuer.example.com"));
}

#[test]
fn unknown_keys_are_rejected() {
    let file = yaml("gateway:\n  bind_address: \"127.0.0.1:7000\"\n");
    assert!(load(Some(file.path())).is_err());
}

#[test]
fn unknown_verifier_kind_is_rejected() {
    let file = yaml("verifier:\n  kind: trust_everyone\n");
    assert!(load(Some(file.path())).is_err());
}

#[test]
fn missing_file_is_an_error() {
    let err = load(Some(Path::new("/definitely/not/here.yaml"))).unwrap_err();
    assert!(err.to_string().contains("does not exist"));
}

#[test]
fn shipped_configurations_load() {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config");

    let local = load(Some(&dir.join("local.yaml"))).unwrap();
    assert!(matches!(local.verifier, VerifierConfig::SchemePrefix(_)));

    let cognito = load(Some(&dir.join("cognito.yaml"))).unwrap();
    assert!(matches!(cognito.verifier, VerifierConfig::SignedJwt(_)));
    assert_eq!(cognito.logging.format, LogFormat::Json);
}
