//! Sign-in, sign-out and the current session

use std::sync::Arc;

use chrono::Utc;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::models::Profile;
use crate::auth::{CredentialStore, Credentials, SessionIdentity, TokenClaims};
use crate::http::{ApiClient, ApiError, Empty, RequestOptions};
use crate::security::{Sanitizer, SecureString};

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize, Zeroize, ZeroizeOnDrop)]
struct LoginResponse {
    #[serde(default)]
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Serialize)]
struct LogoutRequest<'a> {
    refresh_token: &'a str,
}

/// Session lifecycle
///
/// The store given here must be the same one behind the client's token
/// hooks, otherwise a login would not be visible to later requests.
#[derive(Clone)]
pub struct AuthService {
    client: Arc<ApiClient>,
    store: Arc<dyn CredentialStore>,
}

impl AuthService {
    pub fn new(client: Arc<ApiClient>, store: Arc<dyn CredentialStore>) -> Self {
        Self { client, store }
    }

    /// Signs in with email and password and persists the session
    ///
    /// User id and role missing from the response are read from the access
    /// token's claims when it is a JWT.
    pub async fn login(&self, email: &str, password: &str) -> Result<Credentials, ApiError> {
        tracing::info!("Signing in as {}", email);

        let mut response: LoginResponse = self
            .client
            .request(
                Method::POST,
                "/auth/login",
                Some(&LoginRequest { email, password }),
                RequestOptions::anonymous(),
            )
            .await?;

        let access = SecureString::new(std::mem::take(&mut response.access_token))
            .non_empty()
            .ok_or_else(|| ApiError::unknown("Login response did not contain an access token"))?;
        let refresh = response
            .refresh_token
            .take()
            .map(SecureString::new)
            .and_then(SecureString::non_empty);

        let claims = TokenClaims::decode(access.as_str()).unwrap_or_default();
        if claims.is_expired_at(Utc::now()) {
            tracing::warn!("Login returned an access token that has already expired");
        }
        let identity = SessionIdentity {
            role: response.role.take().or(claims.role),
            user_id: response.user_id.take().or(claims.sub),
            email: response
                .email
                .take()
                .or(claims.email)
                .or_else(|| Some(email.to_string())),
        };

        let credentials = Credentials {
            access_token: Some(access),
            refresh_token: refresh,
            identity,
        };
        credentials.save(self.store.as_ref())?;

        tracing::info!(
            "Signed in (user {}, access token {})",
            credentials.identity.user_id.as_deref().unwrap_or("unknown"),
            credentials
                .access_token
                .as_ref()
                .map(|t| Sanitizer::sanitize_token(t))
                .unwrap_or_default()
        );
        Ok(credentials)
    }

    /// Signs out
    ///
    /// The server-side revoke is best effort; local credentials are cleared
    /// regardless of its outcome. If the revoke itself triggers a session
    /// refresh, the refresh token is rotated under it, so the rotated one is
    /// revoked as well.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let mut sent: Option<SecureString> = None;
        for _ in 0..2 {
            let Some(refresh) = self.stored_refresh_token() else {
                break;
            };
            if sent.as_ref() == Some(&refresh) {
                break;
            }
            if let Err(e) = self.revoke(&refresh).await {
                tracing::warn!("Server-side logout failed, clearing locally: {}", e);
            }
            sent = Some(refresh);
        }

        Credentials::clear(self.store.as_ref())?;
        tracing::info!("Signed out");
        Ok(())
    }

    fn stored_refresh_token(&self) -> Option<SecureString> {
        match Credentials::load(self.store.as_ref()) {
            Ok(session) => session.refresh_token,
            Err(e) => {
                tracing::warn!("Could not read session before logout: {}", e);
                None
            }
        }
    }

    /// `POST /auth/logout` for one refresh token
    async fn revoke(&self, refresh: &SecureString) -> Result<Empty, ApiError> {
        self.client
            .request::<Empty, _>(
                Method::POST,
                "/auth/logout",
                Some(&LogoutRequest {
                    refresh_token: refresh.as_str(),
                }),
                RequestOptions::default(),
            )
            .await
    }

    /// Profile of the signed-in user
    pub async fn me(&self) -> Result<Profile, ApiError> {
        self.client.get("/auth/me").await
    }

    /// Session as currently stored
    pub fn session(&self) -> Result<Credentials, ApiError> {
        Ok(Credentials::load(self.store.as_ref())?)
    }

    /// True if an access token is stored
    pub fn is_signed_in(&self) -> bool {
        self.client.has_session()
    }
}
