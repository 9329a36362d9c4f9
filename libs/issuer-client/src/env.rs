//! End-to-end settings for a deployed stack.

use secrecy::SecretString;

use crate::error::EnvError;

pub const API_URL: &str = "API_URL";
pub const USER_POOL_ID: &str = "USER_POOL_ID";
pub const USER_POOL_CLIENT_ID: &str = "USER_POOL_CLIENT_ID";
pub const TEST_USER_EMAIL: &str = "TEST_USER_EMAIL";
pub const TEST_USER_PASSWORD: &str = "TEST_USER_PASSWORD";

/// Deployed stack outputs plus a known-good test user.
#[derive(Debug, Clone)]
pub struct E2eConfig {
    pub api_url: String,
    pub user_pool_id: String,
    pub user_pool_client_id: String,
    pub test_user_email: String,
    pub test_user_password: SecretString,
}

impl E2eConfig {
    /// Read every variable from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError`] naming every variable that is unset or empty.
    pub fn from_env() -> Result<Self, EnvError> {
        let mut missing = Vec::new();
        let mut read = |name: &'static str| match std::env::var(name) {
            Ok(value) if !value.is_empty() => value,
            _ => {
                missing.push(name);
                String::new()
            }
        };

        let api_url = read(API_URL);
        let user_pool_id = read(USER_POOL_ID);
        let user_pool_client_id = read(USER_POOL_CLIENT_ID);
        let test_user_email = read(TEST_USER_EMAIL);
        let test_user_password = read(TEST_USER_PASSWORD);

        if !missing.is_empty() {
            return Err(EnvError { missing });
        }

        Ok(Self {
            api_url,
            user_pool_id,
            user_pool_client_id,
            test_user_email,
            test_user_password: SecretString::from(test_user_password),
        })
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn reads_all_variables() {
        temp_env::with_vars(
            [
                (API_URL, Some("https://api.example/graphql")),
                (USER_POOL_ID, Some("us-east-1_Pool")),
                (USER_POOL_CLIENT_ID, Some("client")),
                (TEST_USER_EMAIL, Some("user@example.com")),
                (TEST_USER_PASSWORD, Some("hunter2")),
            ],
            || {
                let cfg = E2eConfig::from_env().unwrap();
                assert_eq!(cfg.api_url, "https://api.example/graphql");
                assert_eq!(cfg.user_pool_id, "us-east-1_Pool");
                assert_eq!(cfg.test_user_password.expose_secret(), "hunter2");
            },
        );
    }

    #[test]
    fn names_every_missing_variable() {
        temp_env::with_vars(
            [
                (API_URL, Some("https://api.example/graphql")),
                (USER_POOL_ID, None),
                (USER_POOL_CLIENT_ID, Some("")),
                (TEST_USER_EMAIL, Some("user@example.com")),
                (TEST_USER_PASSWORD, None),
            ],
            || {
                let err = E2eConfig::from_env().unwrap_err();
                assert_eq!(
                    err.missing,
                    vec![USER_POOL_ID, USER_POOL_CLIENT_ID, TEST_USER_PASSWORD]
                );
                assert_eq!(
                    err.to_string(),
                    "required environment variables are not set: \
                     USER_POOL_ID, USER_POOL_CLIENT_ID, TEST_USER_PASSWORD"
                );
            },
        );
    }
}
