#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Checks against a deployed stack.
//!
//! Requires `API_URL`, `USER_POOL_ID`, `USER_POOL_CLIENT_ID`,
//! `TEST_USER_EMAIL` and `TEST_USER_PASSWORD`. Run with
//! `cargo test -p appsync-auth-issuer-client -- --ignored`.

use std::time::Duration;

use issuer_client::{CognitoIdentityClient, E2eConfig, GraphqlClient, Tokens};

const QUERY: &str = "query TestQuery { testQuery }";
const GREETING: &str = "Hello from AppSync!";

fn setup() -> (E2eConfig, GraphqlClient) {
    let cfg = E2eConfig::from_env().expect("end-to-end environment");
    let graphql = GraphqlClient::new(cfg.api_url.parse().expect("API_URL is a URL"));
    (cfg, graphql)
}

async fn sign_in(cfg: &E2eConfig) -> Tokens {
    use secrecy::ExposeSecret;

    CognitoIdentityClient::for_user_pool(&cfg.user_pool_id, cfg.user_pool_client_id.clone())
        .unwrap()
        .authenticate(&cfg.test_user_email, cfg.test_user_password.expose_secret())
        .await
        .expect("test user signs in")
}

#[tokio::test]
#[ignore = "requires a deployed stack"]
async fn signed_in_user_gets_constant_payload() {
    let (cfg, graphql) = setup();
    let tokens = sign_in(&cfg).await;

    let response = graphql.execute(Some(&tokens.id_token), QUERY).await.unwrap();

    assert_eq!(
        response.body,
        serde_json::json!({ "data": { "testQuery": GREETING } })
    );
}

#[tokio::test]
#[ignore = "requires a deployed stack"]
async fn anonymous_call_is_denied() {
    let (_, graphql) = setup();

    let response = graphql.execute(None, QUERY).await.unwrap();

    assert_ne!(response.status, 200);
    assert_ne!(response.data_str("testQuery"), Some(GREETING));
}

#[tokio::test]
#[ignore = "requires a deployed stack"]
async fn repeated_calls_return_identical_payload() {
    let (cfg, graphql) = setup();
    let tokens = sign_in(&cfg).await;

    let first = graphql.execute(Some(&tokens.id_token), QUERY).await.unwrap();
    tokio::time::sleep(Duration::from_secs(2)).await;
    let second = graphql.execute(Some(&tokens.id_token), QUERY).await.unwrap();

    assert_eq!(first.data_str("testQuery"), Some(GREETING));
    assert_eq!(first, second);
}
