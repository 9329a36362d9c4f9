//! Authorization callback handler.
//!
//! Adapts the wire protocol to [`AuthorizerClient`]: event in, response out.
//! The handler itself cannot fail; an undecidable request is answered with
//! `isAuthorized: false`.

use authorizer_sdk::{
    AuthorizationOutcome, AuthorizationRequest, AuthorizerClient, AuthorizerEvent,
    AuthorizerResponse,
};
use tracing::warn;

/// Handle one callback event.
pub async fn handle_event(client: &dyn AuthorizerClient, event: AuthorizerEvent) -> AuthorizerResponse {
    let request = AuthorizationRequest::from(event);
    let outcome = client.decide(&request).await;

    if let AuthorizationOutcome::Error(reason) = &outcome {
        warn!(%reason, "Answering undecidable request with deny");
    }

    AuthorizerResponse::from(&outcome.into_decision())
}
