//! Username/password sign-in against a Cognito user pool.

use std::collections::BTreeMap;
use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::error::IssuerError;

const INITIATE_AUTH_TARGET: &str = "AWSCognitoIdentityProviderService.InitiateAuth";
const AMZ_JSON: &str = "application/x-amz-json-1.1";

/// Tokens issued after a successful sign-in.
#[derive(Debug, Clone)]
pub struct Tokens {
    pub id_token: SecretString,
    pub access_token: SecretString,
    pub refresh_token: Option<SecretString>,
    pub expires_in: Duration,
}

/// Client for the user pool's `InitiateAuth` API.
///
/// Uses the `USER_PASSWORD_AUTH` flow, which must be enabled on the app
/// client.
#[derive(Debug, Clone)]
pub struct CognitoIdentityClient {
    http: reqwest::Client,
    endpoint: Url,
    client_id: String,
}

impl CognitoIdentityClient {
    /// Client for the pool's regional endpoint. The region is the prefix of
    /// the pool id (`us-east-1_AbCdEf` -> `us-east-1`).
    ///
    /// # Errors
    ///
    /// Returns [`IssuerError::InvalidEndpoint`] if the pool id has no region
    /// prefix.
    pub fn for_user_pool(
        user_pool_id: &str,
        client_id: impl Into<String>,
    ) -> Result<Self, IssuerError> {
        let region = user_pool_id
            .split_once('_')
            .map(|(region, _)| region)
            .filter(|region| !region.is_empty())
            .ok_or_else(|| {
                IssuerError::InvalidEndpoint(format!("user pool id '{user_pool_id}' has no region"))
            })?;
        let endpoint = Url::parse(&format!("https://cognito-idp.{region}.amazonaws.com/"))
            .map_err(|e| IssuerError::InvalidEndpoint(e.to_string()))?;
        Ok(Self::with_endpoint(endpoint, client_id))
    }

    #[must_use]
    pub fn with_endpoint(endpoint: Url, client_id: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint,
            client_id: client_id.into(),
        }
    }

    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Sign in and return the issued tokens.
    ///
    /// # Errors
    ///
    /// Returns [`IssuerError::Rejected`] if the issuer refuses the credentials,
    /// [`IssuerError::ChallengeRequired`] if a further step is needed, and a
    /// transport or decoding error otherwise.
    #[tracing::instrument(skip_all, fields(endpoint = %self.endpoint))]
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Tokens, IssuerError> {
        let request = InitiateAuthRequest {
            auth_flow: "USER_PASSWORD_AUTH",
            client_id: &self.client_id,
            auth_parameters: BTreeMap::from([("USERNAME", username), ("PASSWORD", password)]),
        };

        let response = self
            .http
            .post(self.endpoint.clone())
            .header(reqwest::header::CONTENT_TYPE, AMZ_JSON)
            .header("X-Amz-Target", INITIATE_AUTH_TARGET)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let error: ServiceError = serde_json::from_slice(&body).map_err(|e| {
                IssuerError::MalformedResponse(format!("status {status}, body not an error: {e}"))
            })?;
            return Err(IssuerError::Rejected {
                kind: error.kind().to_owned(),
                message: error.message.unwrap_or_default(),
            });
        }

        let parsed: InitiateAuthResponse = serde_json::from_slice(&body)
            .map_err(|e| IssuerError::MalformedResponse(e.to_string()))?;

        if let Some(challenge) = parsed.challenge_name {
            return Err(IssuerError::ChallengeRequired(challenge));
        }
        let result = parsed.authentication_result.ok_or_else(|| {
            IssuerError::MalformedResponse("neither tokens nor challenge in response".to_owned())
        })?;

        debug!(expires_in = result.expires_in, "Signed in");
        Ok(Tokens {
            id_token: SecretString::from(result.id_token),
            access_token: SecretString::from(result.access_token),
            refresh_token: result.refresh_token.map(SecretString::from),
            expires_in: Duration::from_secs(result.expires_in),
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct InitiateAuthRequest<'a> {
    auth_flow: &'static str,
    client_id: &'a str,
    auth_parameters: BTreeMap<&'static str, &'a str>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InitiateAuthResponse {
    authentication_result: Option<AuthenticationResult>,
    challenge_name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AuthenticationResult {
    id_token: String,
    access_token: String,
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: u64,
}

#[derive(Deserialize)]
struct ServiceError {
    #[serde(rename = "__type")]
    kind: String,
    message: Option<String>,
}

impl ServiceError {
    /// `com.amazonaws...#NotAuthorizedException` -> `NotAuthorizedException`
    fn kind(&self) -> &str {
        self.kind.rsplit('#').next().unwrap_or(&self.kind)
    }
}
