//! OAuth2 token management against UAA.
//!
//! Every outbound API request borrows a bearer token from [`TokenManager`],
//! which caches the current token and re-runs the configured grant shortly
//! before expiry. A stored refresh token is used when UAA handed one out;
//! if the refresh grant is rejected the manager falls back to the primary
//! grant.

use std::time::{Duration, Instant};

use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::config::CfGrant;
use crate::error::{CfError, Result};

/// Refresh this long before the token actually expires.
const EXPIRY_MARGIN: Duration = Duration::from_secs(30);

/// Default UAA client used for the `password` grant, matching the cf CLI.
const DEFAULT_CLI_CLIENT_ID: &str = "cf";
const DEFAULT_CLI_CLIENT_SECRET: &str = "";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
}

struct CachedToken {
    access_token: String,
    refresh_token: Option<String>,
    expires_at: Option<Instant>,
}

impl CachedToken {
    fn is_fresh(&self) -> bool {
        match self.expires_at {
            Some(at) => Instant::now() + EXPIRY_MARGIN < at,
            None => true,
        }
    }
}

/// Acquires and caches UAA access tokens for a single foundation.
///
/// Shared behind the client's `Arc`; concurrent requests serialize on the
/// cache mutex so only one grant is in flight at a time.
pub(crate) struct TokenManager {
    http: Client,
    token_url: String,
    grant: CfGrant,
    cache: Mutex<Option<CachedToken>>,
}

impl TokenManager {
    pub(crate) fn new(http: Client, token_url: String, grant: CfGrant) -> Self {
        Self {
            http,
            token_url,
            grant,
            cache: Mutex::new(None),
        }
    }

    /// Return a bearer token, running a grant if the cached one is stale.
    pub(crate) async fn access_token(&self) -> Result<String> {
        if let CfGrant::StaticToken { access_token } = &self.grant {
            return Ok(access_token.clone());
        }

        let mut cache = self.cache.lock().await;

        if let Some(token) = cache.as_ref() {
            if token.is_fresh() {
                return Ok(token.access_token.clone());
            }
        }

        // Stale token with a refresh_token: try the refresh grant first.
        if let Some(refresh_token) = cache.as_ref().and_then(|t| t.refresh_token.clone()) {
            match self.refresh_grant(&refresh_token).await {
                Ok(token) => {
                    let access = token.access_token.clone();
                    *cache = Some(token);
                    return Ok(access);
                }
                Err(e) => {
                    tracing::debug!(error = %e, "refresh grant rejected, re-running primary grant");
                }
            }
        }

        let token = self.primary_grant().await?;
        let access = token.access_token.clone();
        *cache = Some(token);
        Ok(access)
    }

    #[tracing::instrument(skip(self))]
    async fn primary_grant(&self) -> Result<CachedToken> {
        match &self.grant {
            CfGrant::ClientCredentials {
                client_id,
                client_secret,
            } => {
                let form = [("grant_type", "client_credentials")];
                self.request_token(client_id, client_secret, &form).await
            }
            CfGrant::Password { username, password } => {
                let form = [
                    ("grant_type", "password"),
                    ("username", username.as_str()),
                    ("password", password.as_str()),
                ];
                self.request_token(DEFAULT_CLI_CLIENT_ID, DEFAULT_CLI_CLIENT_SECRET, &form)
                    .await
            }
            CfGrant::StaticToken { .. } => unreachable!("static tokens bypass grants"),
        }
    }

    async fn refresh_grant(&self, refresh_token: &str) -> Result<CachedToken> {
        let (client_id, client_secret) = match &self.grant {
            CfGrant::ClientCredentials {
                client_id,
                client_secret,
            } => (client_id.as_str(), client_secret.as_str()),
            _ => (DEFAULT_CLI_CLIENT_ID, DEFAULT_CLI_CLIENT_SECRET),
        };
        let form = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ];
        self.request_token(client_id, client_secret, &form).await
    }

    async fn request_token(
        &self,
        client_id: &str,
        client_secret: &str,
        form: &[(&str, &str)],
    ) -> Result<CachedToken> {
        let response = self
            .http
            .post(&self.token_url)
            .basic_auth(client_id, Some(client_secret))
            .form(form)
            .send()
            .await
            .map_err(CfError::HttpError)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CfError::TokenGrant(format!("UAA returned {status}: {body}")));
        }

        let token: TokenResponse = response.json().await.map_err(CfError::HttpError)?;
        Ok(CachedToken {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_at: token
                .expires_in
                .map(|secs| Instant::now() + Duration::from_secs(secs)),
        })
    }
}

impl std::fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenManager")
            .field("token_url", &self.token_url)
            .finish_non_exhaustive()
    }
}
