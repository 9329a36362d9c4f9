#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Randomized credential strings against the scheme-prefix verifier: every
//! `"Bearer "`-prefixed string is allowed with the fixed context, everything
//! else is denied without one, and repeated decisions agree.

use std::sync::Arc;

use authorizer::{AuthorizerConfig, AuthorizerModule};
use authorizer_sdk::{
    AuthorizationDecision, AuthorizationOutcome, AuthorizationRequest, AuthorizerClient,
};
use proptest::prelude::*;
use scheme_prefix_plugin::{SchemePrefixConfig, SchemePrefixOnly};

const EXPECTED_ACCESS_INFO: &str =
    "evr,evw,evs,dvr,dvw,dte,dsw,dvo,dvc,ota,otd,oto,msr,sts,usr,uss,usw,orr,oru,ord,ctr,ctw,pg,pp";

fn client() -> Arc<dyn AuthorizerClient> {
    let verifier = SchemePrefixOnly::from_config(&SchemePrefixConfig::default()).unwrap();
    let cfg = AuthorizerConfig {
        log_requests: false,
        ..AuthorizerConfig::default()
    };
    AuthorizerModule::init(&cfg, Arc::new(verifier)).client()
}

fn decide(request: &AuthorizationRequest) -> AuthorizationOutcome {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
        .block_on(client().decide(request))
}

/// Arbitrary strings plus near misses of the scheme marker.
fn non_bearer() -> impl Strategy<Value = String> {
    prop_oneof![
        any::<String>(),
        "[bB][eE][aA][rR][eE][rR][ \t]?.{0,16}",
        "(Basic|Digest|Token) .{0,16}",
        " +Bearer .{0,16}",
    ]
    .prop_filter("must not carry the scheme marker", |s| !s.starts_with("Bearer "))
}

proptest! {
    #[test]
    fn bearer_prefixed_credentials_get_the_fixed_context(rest in any::<String>()) {
        let outcome = decide(&AuthorizationRequest::with_token(format!("Bearer {rest}")));

        let AuthorizationOutcome::Allowed { context, ttl } = outcome else {
            return Err(TestCaseError::fail(format!("expected allow, got {outcome:?}")));
        };
        prop_assert_eq!(context.entities_with_access(), &["a".to_owned()]);
        prop_assert_eq!(context.capabilities().to_wire(), EXPECTED_ACCESS_INFO);
        prop_assert_eq!(context.target_organization_ids(), &["a".to_owned()]);
        prop_assert!(ttl.is_none());
    }

    #[test]
    fn other_credentials_are_denied_without_context(credential in non_bearer()) {
        let outcome = decide(&AuthorizationRequest::with_token(credential));

        prop_assert!(
            matches!(outcome, AuthorizationOutcome::Denied(_)),
            "expected deny, got {:?}",
            outcome
        );
        prop_assert_eq!(outcome.into_decision(), AuthorizationDecision::Deny);
    }

    #[test]
    fn repeated_decisions_agree(credential in proptest::option::of(any::<String>())) {
        let request = credential.map_or_else(
            AuthorizationRequest::anonymous,
            AuthorizationRequest::with_token,
        );

        let first = decide(&request).into_decision();
        let second = decide(&request).into_decision();

        prop_assert_eq!(first, second);
    }
}
