//! The request engine
//!
//! Every network call in the crate goes through [`ApiClient::request`]. It
//! resolves and attaches the bearer token, classifies the response and, on a
//! 401, runs one coordinated refresh followed by exactly one retry.

use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::header::{HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use super::coordinator::RefreshCoordinator;
use super::error::ApiError;
use super::request::RequestOptions;
use super::response::{self, RawResponse};
use crate::auth::{NoSession, TokenHooks};
use crate::config::ClientConfig;
use crate::security::{Sanitizer, SecureString};

/// Path of the token refresh endpoint
pub const REFRESH_PATH: &str = "/auth/refresh";

const JSON: &str = "application/json";

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Deserialize, Zeroize, ZeroizeOnDrop)]
struct RefreshResponse {
    #[serde(default)]
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// Authenticated JSON client for the platform API
///
/// Construct one per process and share it behind an `Arc`. Token hooks are
/// fixed at construction via [`with_hooks`](Self::with_hooks); a fresh client
/// starts with [`NoSession`].
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use campus_client::auth::{MemoryStore, StoreTokenHooks};
/// use campus_client::config::ClientConfig;
/// use campus_client::http::ApiClient;
///
/// # async fn demo() -> Result<(), campus_client::http::ApiError> {
/// let store = Arc::new(MemoryStore::new());
/// let client = ApiClient::new(&ClientConfig::with_base_url("https://api.example.edu"))?
///     .with_hooks(Arc::new(StoreTokenHooks::new(store)));
///
/// let profile: serde_json::Value = client.get("/auth/me").await?;
/// # Ok(())
/// # }
/// ```
pub struct ApiClient {
    http: Client,
    base_url: String,
    default_timeout: Duration,
    hooks: Arc<dyn TokenHooks>,
    coordinator: RefreshCoordinator,
}

impl ApiClient {
    /// Creates a client without a session
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let base = Url::parse(&config.base_url)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;
        if base.scheme() != "https" && base.scheme() != "http" {
            return Err(ApiError::InvalidUrl(format!(
                "Unsupported scheme in base URL: {}",
                base.scheme()
            )));
        }

        let http = Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| ApiError::unknown(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            default_timeout: config.timeout(),
            hooks: Arc::new(NoSession),
            coordinator: RefreshCoordinator::new(),
        })
    }

    /// Replaces the token hooks
    ///
    /// Consumes the client, so the swap necessarily happens before it is
    /// shared and before any request is issued.
    pub fn with_hooks(mut self, hooks: Arc<dyn TokenHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Token hooks in use
    pub fn hooks(&self) -> &Arc<dyn TokenHooks> {
        &self.hooks
    }

    /// Refresh coordinator guarding this client's session
    pub fn coordinator(&self) -> &RefreshCoordinator {
        &self.coordinator
    }

    /// Base URL without trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// True if an access token is currently stored
    pub fn has_session(&self) -> bool {
        self.hooks.access_token().is_some()
    }

    /// Builds the absolute URL for `path` (which must start with `/`)
    pub fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        if !path.starts_with('/') {
            return Err(ApiError::InvalidUrl(format!(
                "Path must start with '/': {}",
                Sanitizer::sanitize_url(path)
            )));
        }
        let raw = format!("{}{}", self.base_url, path);
        Url::parse(&raw)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", Sanitizer::sanitize_url(&raw), e)))
    }

    /// Performs a request and decodes the JSON response into `T`
    ///
    /// Use [`Empty`](super::Empty) as `T` for endpoints without a body.
    pub async fn request<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        options: RequestOptions,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned + 'static,
        B: Serialize + ?Sized,
    {
        let token = match options.access_token.and_then(SecureString::non_empty) {
            Some(explicit) => Some(explicit),
            None if options.requires_auth => self.hooks.access_token(),
            None => None,
        };

        if options.requires_auth && token.is_none() {
            tracing::debug!(
                "No access token for {} {}, not sending",
                method,
                Sanitizer::sanitize_url(path)
            );
            return Err(ApiError::Unauthenticated);
        }

        let url = self.endpoint(path)?;
        let payload = body
            .map(|b| serde_json::to_vec(b))
            .transpose()
            .map_err(|e| ApiError::unknown(format!("Failed to encode request body: {}", e)))?;
        let timeout = options.timeout.unwrap_or(self.default_timeout);

        let first = self
            .send_once(&method, &url, payload.as_deref(), token.as_ref(), timeout)
            .await?;

        if first.status.is_success() {
            return response::decode_body(&first, token.as_deref());
        }
        if first.status != StatusCode::UNAUTHORIZED || !options.requires_auth {
            return Err(first.into_http_error(token.as_deref()));
        }

        tracing::info!(
            "{} {} was rejected with 401, refreshing session",
            method,
            Sanitizer::sanitize_url(path)
        );
        self.recover_from_unauthorized(token.as_ref()).await?;

        let fresh = self
            .hooks
            .access_token()
            .ok_or(ApiError::Unauthenticated)?;
        let retry = self
            .send_once(&method, &url, payload.as_deref(), Some(&fresh), timeout)
            .await?;

        if retry.status.is_success() {
            return response::decode_body(&retry, Some(fresh.as_str()));
        }
        if retry.status == StatusCode::UNAUTHORIZED {
            tracing::warn!(
                "{} {} still unauthorized after refresh",
                method,
                Sanitizer::sanitize_url(path)
            );
            return Err(ApiError::Unauthenticated);
        }
        Err(retry.into_http_error(Some(fresh.as_str())))
    }

    /// `GET path`
    pub async fn get<T>(&self, path: &str) -> Result<T, ApiError>
    where
        T: DeserializeOwned + 'static,
    {
        self.request::<T, ()>(Method::GET, path, None, RequestOptions::default())
            .await
    }

    /// `POST path` with a JSON body
    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned + 'static,
        B: Serialize + ?Sized,
    {
        self.request(Method::POST, path, Some(body), RequestOptions::default())
            .await
    }

    /// `PUT path` with a JSON body
    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned + 'static,
        B: Serialize + ?Sized,
    {
        self.request(Method::PUT, path, Some(body), RequestOptions::default())
            .await
    }

    /// `PATCH path` with a JSON body
    pub async fn patch<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned + 'static,
        B: Serialize + ?Sized,
    {
        self.request(Method::PATCH, path, Some(body), RequestOptions::default())
            .await
    }

    /// `DELETE path`
    pub async fn delete<T>(&self, path: &str) -> Result<T, ApiError>
    where
        T: DeserializeOwned + 'static,
    {
        self.request::<T, ()>(Method::DELETE, path, None, RequestOptions::default())
            .await
    }

    /// Refreshes the session now, under the same coordinator as 401 recovery
    ///
    /// Unlike the 401 path this always calls the refresh endpoint.
    pub async fn refresh_session(&self) -> Result<(), ApiError> {
        self.coordinator.run(|| self.perform_refresh()).await
    }

    /// Sends one attempt and buffers the response
    async fn send_once(
        &self,
        method: &Method,
        url: &Url,
        payload: Option<&[u8]>,
        token: Option<&SecureString>,
        timeout: Duration,
    ) -> Result<RawResponse, ApiError> {
        let started = Instant::now();

        let mut builder = self
            .http
            .request(method.clone(), url.clone())
            .timeout(timeout)
            .header(ACCEPT, JSON);
        if let Some(bytes) = payload {
            builder = builder.header(CONTENT_TYPE, JSON).body(bytes.to_vec());
        }
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, bearer_header(token)?);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::warn!(
                "{} {} failed: {}",
                method,
                Sanitizer::sanitize_url(url.as_str()),
                e
            );
            ApiError::Transport(e)
        })?;

        let status = response.status();
        let request_id = response::request_id(response.headers());
        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Transport(e)
            } else {
                ApiError::NotHttpResponse(format!("Failed to read response body: {}", e))
            }
        })?;

        tracing::debug!(
            "{} {} -> {} ({} bytes, {} ms, request id {})",
            method,
            Sanitizer::sanitize_url(url.as_str()),
            status.as_u16(),
            body.len(),
            started.elapsed().as_millis(),
            request_id.as_deref().unwrap_or("-")
        );

        Ok(RawResponse {
            status,
            body: body.to_vec(),
            request_id,
        })
    }

    /// Critical section entered after a 401
    ///
    /// If the stored token no longer matches the one that was rejected, some
    /// other caller refreshed while this one waited and no network call is
    /// made. The new token is not guaranteed to be accepted; the single retry
    /// decides.
    async fn recover_from_unauthorized(
        &self,
        rejected: Option<&SecureString>,
    ) -> Result<(), ApiError> {
        self.coordinator
            .run(|| async {
                if let Some(current) = self.hooks.access_token() {
                    if !current.is_empty() && rejected != Some(&current) {
                        tracing::debug!("Access token was replaced while waiting, skipping refresh");
                        return Ok(());
                    }
                }
                self.perform_refresh().await
            })
            .await
    }

    /// Calls the refresh endpoint and stores the result; caller holds the lock
    async fn perform_refresh(&self) -> Result<(), ApiError> {
        let Some(refresh_token) = self
            .hooks
            .refresh_token()
            .and_then(SecureString::non_empty)
        else {
            tracing::warn!("No refresh token stored, session cannot be renewed");
            return Err(ApiError::Unauthenticated);
        };

        match self.exchange_refresh_token(&refresh_token).await {
            Ok((access, rotated)) => {
                let rotated_refresh = rotated.is_some();
                let refresh = rotated.unwrap_or(refresh_token);
                self.hooks.set_tokens(access, refresh);
                tracing::info!(
                    "Session refreshed (refresh token {})",
                    if rotated_refresh { "rotated" } else { "kept" }
                );
                Ok(())
            }
            Err(reason) => {
                tracing::warn!("Token refresh failed, clearing session: {}", reason);
                self.hooks.clear_tokens();
                Err(ApiError::RefreshFailed { reason })
            }
        }
    }

    /// `POST /auth/refresh` without a bearer; returns the new access token and
    /// the rotated refresh token, if the server sent one
    async fn exchange_refresh_token(
        &self,
        refresh_token: &SecureString,
    ) -> Result<(SecureString, Option<SecureString>), String> {
        let url = self.endpoint(REFRESH_PATH).map_err(|e| e.to_string())?;
        let payload = Zeroizing::new(
            serde_json::to_vec(&RefreshRequest {
                refresh_token: refresh_token.as_str(),
            })
            .map_err(|e| format!("Failed to encode refresh request: {}", e))?,
        );

        let response = self
            .send_once(&Method::POST, &url, Some(payload.as_slice()), None, self.default_timeout)
            .await
            .map_err(|e| e.to_string())?;

        if !response.status.is_success() {
            return Err(response
                .into_http_error(Some(refresh_token.as_str()))
                .to_string());
        }

        let mut tokens: RefreshResponse =
            response::decode_body(&response, Some(refresh_token.as_str()))
                .map_err(|e| e.to_string())?;

        let access = SecureString::new(std::mem::take(&mut tokens.access_token))
            .non_empty()
            .ok_or_else(|| "Refresh response contained an empty access token".to_string())?;
        let rotated = tokens
            .refresh_token
            .take()
            .map(SecureString::new)
            .and_then(SecureString::non_empty);

        Ok((access, rotated))
    }
}

/// `Authorization` header value, marked sensitive so it is hidden from `Debug`
fn bearer_header(token: &SecureString) -> Result<HeaderValue, ApiError> {
    let mut raw = format!("Bearer {}", token.as_str());
    let parsed = HeaderValue::from_str(&raw);
    raw.zeroize();

    let mut value = parsed
        .map_err(|_| ApiError::unknown("Access token contains characters not valid in a header"))?;
    value.set_sensitive(true);
    Ok(value)
}
