//! Minimal GraphQL-over-HTTP client.

use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};
use url::Url;

use crate::error::IssuerError;

/// Status and decoded body of one GraphQL call.
///
/// Non-success statuses are returned as data: an authorization denial is an
/// expected answer for callers probing access.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphqlResponse {
    pub status: u16,
    pub body: Value,
}

impl GraphqlResponse {
    /// `data.<field>` as a string, if present.
    #[must_use]
    pub fn data_str(&self, field: &str) -> Option<&str> {
        self.body.get("data")?.get(field)?.as_str()
    }

    /// First `errors[].errorType`, if present.
    #[must_use]
    pub fn error_type(&self) -> Option<&str> {
        self.body
            .get("errors")?
            .as_array()?
            .first()?
            .get("errorType")?
            .as_str()
    }
}

#[derive(Debug, Clone)]
pub struct GraphqlClient {
    http: reqwest::Client,
    url: Url,
}

impl GraphqlClient {
    #[must_use]
    pub fn new(url: Url) -> Self {
        Self {
            http: reqwest::Client::new(),
            url,
        }
    }

    /// POST `{ "query": query }`, with `Authorization: Bearer <token>` only
    /// when a token is given.
    ///
    /// # Errors
    ///
    /// Returns [`IssuerError::Transport`] if the request fails and
    /// [`IssuerError::MalformedResponse`] if the body is not JSON.
    #[tracing::instrument(skip_all, fields(url = %self.url, authenticated = token.is_some()))]
    pub async fn execute(
        &self,
        token: Option<&SecretString>,
        query: &str,
    ) -> Result<GraphqlResponse, IssuerError> {
        let mut request = self.http.post(self.url.clone()).json(&json!({ "query": query }));
        if let Some(token) = token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await?;
        let body = serde_json::from_slice(&bytes)
            .map_err(|e| IssuerError::MalformedResponse(format!("status {status}: {e}")))?;

        Ok(GraphqlResponse { status, body })
    }
}
