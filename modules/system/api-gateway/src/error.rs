//! Gateway error responses.
//!
//! Bodies follow the GraphQL error shape (`{"errors": [...]}`) so clients see
//! the same envelope for authorization failures and query errors.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

pub const UNAUTHORIZED_ERROR_TYPE: &str = "UnauthorizedException";
pub const UNAUTHORIZED_MESSAGE: &str = "You are not authorized to make this call.";

/// One entry of a GraphQL `errors` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphqlError {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    pub message: String,
}

impl GraphqlError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error_type: None,
            message: message.into(),
        }
    }

    pub fn typed(error_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_type: Some(error_type.into()),
            message: message.into(),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    errors: Vec<GraphqlError>,
}

/// Request rejected by the gateway.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("unauthorized")]
    Unauthorized,

    #[error("authorization could not be completed: {0}")]
    AuthorizerFailure(String),
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                GraphqlError::typed(UNAUTHORIZED_ERROR_TYPE, UNAUTHORIZED_MESSAGE),
            ),
            Self::AuthorizerFailure(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                GraphqlError::typed(
                    "InternalFailure",
                    "Authorization could not be completed.",
                ),
            ),
        };
        (status, Json(ErrorBody { errors: vec![error] })).into_response()
    }
}
