//! Cloud Foundry API client.
//!
//! Low-level HTTP client that handles authentication and raw requests.
//! Higher-level operations are implemented via traits on resource types.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::auth::TokenManager;
use crate::config::{CfConfig, CfGrant};
use crate::error::{CfError, Result};

const USER_AGENT: &str = concat!("cfapi/", env!("CARGO_PKG_VERSION"));

/// Low-level Cloud Foundry V3 API client.
///
/// Handles OAuth2 authentication and HTTP requests. Resource-specific
/// operations are implemented via the `Get`, `List`, `Create`, `Update`,
/// and `Delete` traits on model types.
///
/// This struct is cheaply cloneable; clones reference the same underlying
/// connection pool and token cache.
///
/// # Example
///
/// ```no_run
/// use cfapi::{CfClient, CfConfig};
///
/// # async fn example() -> cfapi::Result<()> {
/// // Create from environment variables
/// let client = CfClient::from_env().await?;
///
/// // Or configure manually
/// let config = CfConfig::password("https://api.sys.example.com", "admin", "pw");
/// let client = CfClient::connect(config).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct CfClient {
    http: Client,
    base_url: Arc<Url>,
    tokens: Arc<TokenManager>,
}

impl std::fmt::Debug for CfClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CfClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

/// Root document returned by `GET /`, used for token-endpoint discovery.
#[derive(Debug, Deserialize)]
struct RootDocument {
    links: RootLinks,
}

#[derive(Debug, Deserialize)]
struct RootLinks {
    login: Option<RootLink>,
}

#[derive(Debug, Deserialize)]
struct RootLink {
    href: String,
}

impl CfClient {
    /// Create a client from environment variables.
    ///
    /// See [`CfConfig::from_env`] for the variables consumed.
    ///
    /// # Errors
    ///
    /// Returns an error if required variables are missing or the token
    /// endpoint cannot be discovered.
    pub async fn from_env() -> Result<Self> {
        Self::connect(CfConfig::from_env()?).await
    }

    /// Create a client for the given configuration.
    ///
    /// When the configuration carries no explicit token endpoint and the
    /// grant requires one, it is discovered from the API root document's
    /// `links.login` entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the API URL is invalid or discovery fails.
    pub async fn connect(config: CfConfig) -> Result<Self> {
        // Ensure base URL ends with /
        let base_url_str = if config.api_url.ends_with('/') {
            config.api_url.clone()
        } else {
            format!("{}/", config.api_url)
        };
        let base_url = Url::parse(&base_url_str)?;

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .brotli(true)
            .gzip(true)
            .deflate(true)
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(CfError::HttpError)?;

        let token_url = match (&config.token_url, &config.grant) {
            // Static tokens never hit UAA; any placeholder works.
            (None, CfGrant::StaticToken { .. }) => String::new(),
            (Some(url), _) => url.clone(),
            (None, _) => Self::discover_token_url(&http, &base_url).await?,
        };

        let tokens = TokenManager::new(http.clone(), token_url, config.grant);

        Ok(Self {
            http,
            base_url: Arc::new(base_url),
            tokens: Arc::new(tokens),
        })
    }

    /// Fetch `GET /` and derive the UAA token endpoint from `links.login`.
    async fn discover_token_url(http: &Client, base_url: &Url) -> Result<String> {
        let response = http
            .get(base_url.clone())
            .send()
            .await
            .map_err(CfError::HttpError)?;
        let root: RootDocument = response.json().await.map_err(CfError::HttpError)?;

        let login = root.links.login.ok_or_else(|| {
            CfError::ConfigMissing(
                "API root document has no login link; set CF_TOKEN_URL".to_string(),
            )
        })?;
        Ok(format!("{}/oauth/token", login.href.trim_end_matches('/')))
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Make a GET request.
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, path: &str) -> Result<Response> {
        let url = self.base_url.join(path)?;
        let token = self.tokens.access_token().await?;

        let response = self
            .http
            .get(url)
            .bearer_auth(&token)
            .send()
            .await
            .map_err(CfError::HttpError)?;

        Self::check_response(response).await
    }

    /// Make a GET request with query parameters.
    #[tracing::instrument(skip(self, query))]
    pub async fn get_with_query<Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<Response> {
        let url = self.base_url.join(path)?;
        let token = self.tokens.access_token().await?;

        let response = self
            .http
            .get(url)
            .bearer_auth(&token)
            .query(query)
            .send()
            .await
            .map_err(CfError::HttpError)?;

        Self::check_response(response).await
    }

    /// Make a POST request with JSON body.
    #[tracing::instrument(skip(self, body))]
    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Response> {
        let url = self.base_url.join(path)?;
        let token = self.tokens.access_token().await?;

        let response = self
            .http
            .post(url)
            .bearer_auth(&token)
            .json(body)
            .send()
            .await
            .map_err(CfError::HttpError)?;

        Self::check_response(response).await
    }

    /// Make a PATCH request with JSON body.
    #[tracing::instrument(skip(self, body))]
    pub async fn patch<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Response> {
        let url = self.base_url.join(path)?;
        let token = self.tokens.access_token().await?;

        let response = self
            .http
            .patch(url)
            .bearer_auth(&token)
            .json(body)
            .send()
            .await
            .map_err(CfError::HttpError)?;

        Self::check_response(response).await
    }

    /// Make a DELETE request.
    ///
    /// Most V3 deletes are asynchronous: the platform answers `202 Accepted`
    /// with a `Location` header pointing at the job tracking the delete.
    /// Use [`job_guid_from_response`](Self::job_guid_from_response) to
    /// extract it.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, path: &str) -> Result<Response> {
        let url = self.base_url.join(path)?;
        let token = self.tokens.access_token().await?;

        let response = self
            .http
            .delete(url)
            .bearer_auth(&token)
            .send()
            .await
            .map_err(CfError::HttpError)?;

        Self::check_response(response).await
    }

    /// Extract a job GUID from a `202 Accepted` response's `Location`
    /// header (`.../v3/jobs/{guid}`). Returns `None` for synchronous
    /// responses.
    pub fn job_guid_from_response(response: &Response) -> Option<String> {
        if response.status().as_u16() != 202 {
            return None;
        }
        response
            .headers()
            .get("location")
            .and_then(|v| v.to_str().ok())
            .and_then(|loc| loc.rsplit('/').next())
            .map(str::to_string)
    }

    /// Check response status and convert errors.
    async fn check_response(response: Response) -> Result<Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        // Handle rate limiting
        if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(CfError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        Err(Self::extract_api_error(response, status).await)
    }

    /// Map a failed response's V3 error body to [`CfError::ApiError`].
    ///
    /// V3 errors look like
    /// `{"errors": [{"code": 10010, "title": "CF-ResourceNotFound", "detail": "..."}]}`;
    /// only the first entry is surfaced.
    async fn extract_api_error(response: Response, status: reqwest::StatusCode) -> CfError {
        #[derive(Deserialize)]
        struct ErrorBody {
            errors: Vec<ErrorEntry>,
        }
        #[derive(Deserialize)]
        struct ErrorEntry {
            #[serde(default)]
            code: Option<u64>,
            #[serde(default)]
            title: String,
            #[serde(default)]
            detail: String,
        }

        let body = match response.text().await {
            Ok(b) => b,
            Err(_) => {
                return CfError::ApiError {
                    title: format!("HTTP {status}"),
                    detail: String::new(),
                    code: None,
                    status_code: Some(status.as_u16()),
                }
            }
        };

        if let Ok(parsed) = serde_json::from_str::<ErrorBody>(&body) {
            if let Some(first) = parsed.errors.into_iter().next() {
                return CfError::ApiError {
                    title: first.title,
                    detail: first.detail,
                    code: first.code,
                    status_code: Some(status.as_u16()),
                };
            }
        }

        CfError::ApiError {
            title: format!("HTTP {status}"),
            detail: body,
            code: None,
            status_code: Some(status.as_u16()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_client_debug_redacts_credentials() {
        let config = CfConfig::with_token("https://api.sys.example.com", "secret-token");
        let client = CfClient::connect(config).await.unwrap();
        let debug = format!("{:?}", client);
        assert!(debug.contains("CfClient"));
        assert!(debug.contains("base_url"));
        assert!(!debug.contains("secret-token"));
    }

    #[tokio::test]
    async fn test_base_url_trailing_slash() {
        let c1 = CfClient::connect(CfConfig::with_token("https://api.example.com", "t"))
            .await
            .unwrap();
        let c2 = CfClient::connect(CfConfig::with_token("https://api.example.com/", "t"))
            .await
            .unwrap();
        assert_eq!(c1.base_url().as_str(), c2.base_url().as_str());
    }
}
