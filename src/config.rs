//! Client configuration.
//!
//! Connection settings for a Cloud Foundry foundation: the API endpoint,
//! the token endpoint (optional, discovered from the API root when absent),
//! and the OAuth2 grant to authenticate with.

use std::env;

use crate::error::{CfError, Result};

/// How the client authenticates against UAA.
#[derive(Clone)]
pub enum CfGrant {
    /// `client_credentials` grant with a registered UAA client.
    ClientCredentials { client_id: String, client_secret: String },
    /// `password` grant using the public `cf` CLI client.
    Password { username: String, password: String },
    /// A pre-acquired access token; no grant is performed and the token is
    /// never refreshed.
    StaticToken { access_token: String },
}

impl std::fmt::Debug for CfGrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CfGrant::ClientCredentials { client_id, .. } => f
                .debug_struct("ClientCredentials")
                .field("client_id", client_id)
                .finish_non_exhaustive(),
            CfGrant::Password { username, .. } => f
                .debug_struct("Password")
                .field("username", username)
                .finish_non_exhaustive(),
            CfGrant::StaticToken { .. } => f.debug_struct("StaticToken").finish_non_exhaustive(),
        }
    }
}

/// Configuration for a [`CfClient`](crate::CfClient).
///
/// # Example
///
/// ```no_run
/// use cfapi::CfConfig;
///
/// # fn example() -> cfapi::Result<()> {
/// // From environment variables
/// let config = CfConfig::from_env()?;
///
/// // Or explicitly
/// let config = CfConfig::client_credentials(
///     "https://api.sys.example.com",
///     "my-client",
///     "my-secret",
/// );
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CfConfig {
    /// Base URL of the V3 API (e.g. `https://api.sys.example.com`).
    pub api_url: String,
    /// UAA token endpoint. When `None`, discovered from the API root
    /// document's `links.login` entry.
    pub token_url: Option<String>,
    /// Grant used to obtain access tokens.
    pub grant: CfGrant,
}

impl CfConfig {
    /// Create a configuration from environment variables.
    ///
    /// Uses `CF_API_URL` for the API endpoint and either
    /// `CF_CLIENT_ID`/`CF_CLIENT_SECRET` or `CF_USERNAME`/`CF_PASSWORD`
    /// for credentials (client credentials take precedence when both are
    /// set). `CF_TOKEN_URL` optionally overrides token-endpoint discovery.
    ///
    /// # Errors
    ///
    /// Returns an error if `CF_API_URL` is not set or no credential pair
    /// is present.
    pub fn from_env() -> Result<Self> {
        let api_url = env::var("CF_API_URL").map_err(|_| {
            CfError::ConfigMissing("CF_API_URL environment variable not set".to_string())
        })?;

        let token_url = env::var("CF_TOKEN_URL").ok();

        let grant = match (env::var("CF_CLIENT_ID"), env::var("CF_CLIENT_SECRET")) {
            (Ok(client_id), Ok(client_secret)) => CfGrant::ClientCredentials {
                client_id,
                client_secret,
            },
            _ => match (env::var("CF_USERNAME"), env::var("CF_PASSWORD")) {
                (Ok(username), Ok(password)) => CfGrant::Password { username, password },
                _ => {
                    return Err(CfError::ConfigMissing(
                        "set CF_CLIENT_ID/CF_CLIENT_SECRET or CF_USERNAME/CF_PASSWORD"
                            .to_string(),
                    ))
                }
            },
        };

        Ok(Self {
            api_url,
            token_url,
            grant,
        })
    }

    /// Configuration using the `client_credentials` grant.
    pub fn client_credentials(api_url: &str, client_id: &str, client_secret: &str) -> Self {
        Self {
            api_url: api_url.to_string(),
            token_url: None,
            grant: CfGrant::ClientCredentials {
                client_id: client_id.to_string(),
                client_secret: client_secret.to_string(),
            },
        }
    }

    /// Configuration using the `password` grant with the public `cf` client.
    pub fn password(api_url: &str, username: &str, password: &str) -> Self {
        Self {
            api_url: api_url.to_string(),
            token_url: None,
            grant: CfGrant::Password {
                username: username.to_string(),
                password: password.to_string(),
            },
        }
    }

    /// Configuration using a pre-acquired access token.
    pub fn with_token(api_url: &str, access_token: &str) -> Self {
        Self {
            api_url: api_url.to_string(),
            token_url: None,
            grant: CfGrant::StaticToken {
                access_token: access_token.to_string(),
            },
        }
    }

    /// Set the token endpoint explicitly, bypassing discovery.
    #[must_use]
    pub fn token_url(mut self, token_url: &str) -> Self {
        self.token_url = Some(token_url.to_string());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grant_debug_redacts_secrets() {
        let config = CfConfig::client_credentials("https://api.example.com", "cid", "hunter2");
        let debug = format!("{:?}", config);
        assert!(debug.contains("cid"));
        assert!(!debug.contains("hunter2"));

        let config = CfConfig::password("https://api.example.com", "admin", "s3cret");
        let debug = format!("{:?}", config);
        assert!(debug.contains("admin"));
        assert!(!debug.contains("s3cret"));
    }

    #[test]
    fn test_token_url_override() {
        let config = CfConfig::with_token("https://api.example.com", "tok")
            .token_url("https://uaa.example.com/oauth/token");
        assert_eq!(
            config.token_url.as_deref(),
            Some("https://uaa.example.com/oauth/token")
        );
    }
}
