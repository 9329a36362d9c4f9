//! Runs the callback handler under the AWS Lambda runtime.

use std::sync::Arc;

use authorizer_sdk::{AuthorizerClient, AuthorizerEvent};
use lambda_runtime::{LambdaEvent, service_fn};

use crate::handler::handle_event;

/// Serve authorization callbacks until the runtime shuts down.
///
/// # Errors
///
/// Returns the runtime error if the Lambda runtime API cannot be reached.
pub async fn run(client: Arc<dyn AuthorizerClient>) -> Result<(), lambda_runtime::Error> {
    tracing::info!("Starting authorizer on the Lambda runtime");
    lambda_runtime::run(service_fn(move |event: LambdaEvent<AuthorizerEvent>| {
        let client = Arc::clone(&client);
        async move {
            tracing::debug!(request_id = %event.context.request_id, "Lambda invocation");
            Ok::<_, lambda_runtime::Error>(handle_event(client.as_ref(), event.payload).await)
        }
    }))
    .await
}
