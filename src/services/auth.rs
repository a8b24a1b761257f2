//! Auth service client — password login, refresh, identity fetch, sign-out.
//!
//! ARCHITECTURE
//! ============
//! The remote auth service owns sessions; this module only caches them. The
//! serialized session lives under `auth-storage` in the [`SessionStore`], so
//! every persist also fires the adapter's marker-cookie side effect.

use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::store::SessionStore;

/// Storage key the serialized session is persisted under.
pub const SESSION_STORAGE_KEY: &str = "auth-storage";

/// Sessions within this margin of expiry are refreshed eagerly.
const REFRESH_MARGIN_SECS: i64 = 60;

/// Remote auth service configuration loaded from environment.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub base_url: String,
    pub api_key: String,
}

impl AuthConfig {
    /// Load from `AUTH_SERVICE_URL` and `AUTH_SERVICE_KEY`.
    /// Returns `None` if either is missing.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let base_url = std::env::var("AUTH_SERVICE_URL").ok()?;
        let api_key = std::env::var("AUTH_SERVICE_KEY").ok()?;
        Some(Self { base_url, api_key })
    }
}

/// Identity as reported by the auth service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    /// Free-form claims (role, school id, office id) set at provisioning time.
    #[serde(default)]
    pub user_metadata: serde_json::Value,
}

/// Bearer credential plus expiry, cached locally between requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    /// Unix timestamp after which the access token is no longer valid.
    pub expires_at: i64,
    pub user: AuthUser,
}

impl Session {
    #[must_use]
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        self.expires_at <= now.unix_timestamp()
    }

    #[must_use]
    pub fn needs_refresh(&self, now: OffsetDateTime) -> bool {
        self.expires_at - now.unix_timestamp() <= REFRESH_MARGIN_SECS
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Login rejected; carries the service's own message verbatim.
    #[error("{0}")]
    Credentials(String),
    #[error("auth service error: {0}")]
    Service(String),
    #[error("no session found")]
    NoSession,
}

/// Wire shape of the token endpoint response. `expires_at` is optional on the
/// wire; when absent it is derived from `expires_in`.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: AuthUser,
}

impl TokenResponse {
    pub(crate) fn into_session(self, now: OffsetDateTime) -> Session {
        let expires_at = self
            .expires_at
            .unwrap_or_else(|| now.unix_timestamp() + self.expires_in.unwrap_or(0));
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            user: self.user,
        }
    }
}

/// Pull the human-readable message out of an auth service error body, falling
/// back to the raw body when it is not the JSON shape we expect.
pub(crate) fn service_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            ["error_description", "msg", "message", "error"]
                .iter()
                .find_map(|key| v.get(key).and_then(|m| m.as_str()).map(str::to_owned))
        })
        .unwrap_or_else(|| body.to_owned())
}

/// Exchange credentials for a session. On failure the service's error message
/// is surfaced and no session is left behind.
pub async fn login(config: &AuthConfig, email: &str, password: &str) -> Result<Session, AuthError> {
    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{}/auth/v1/token?grant_type=password", config.base_url))
        .header("apikey", &config.api_key)
        .json(&serde_json::json!({ "email": email, "password": password }))
        .send()
        .await
        .map_err(|e| AuthError::Service(e.to_string()))?;

    if !resp.status().is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(AuthError::Credentials(service_message(&body)));
    }

    let body = resp
        .text()
        .await
        .map_err(|e| AuthError::Service(e.to_string()))?;
    let token: TokenResponse = serde_json::from_str(&body)
        .map_err(|_| AuthError::Service(format!("unexpected response: {body}")))?;
    Ok(token.into_session(OffsetDateTime::now_utc()))
}

/// Trade a refresh token for a fresh session.
pub async fn refresh(config: &AuthConfig, refresh_token: &str) -> Result<Session, AuthError> {
    let client = reqwest::Client::new();
    let resp = client
        .post(format!(
            "{}/auth/v1/token?grant_type=refresh_token",
            config.base_url
        ))
        .header("apikey", &config.api_key)
        .json(&serde_json::json!({ "refresh_token": refresh_token }))
        .send()
        .await
        .map_err(|e| AuthError::Service(e.to_string()))?;

    if !resp.status().is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(AuthError::Service(service_message(&body)));
    }

    let body = resp
        .text()
        .await
        .map_err(|e| AuthError::Service(e.to_string()))?;
    let token: TokenResponse = serde_json::from_str(&body)
        .map_err(|_| AuthError::Service(format!("unexpected response: {body}")))?;
    Ok(token.into_session(OffsetDateTime::now_utc()))
}

/// Fetch the identity behind an access token. Read-only, idempotent.
pub async fn fetch_user(config: &AuthConfig, access_token: &str) -> Result<AuthUser, AuthError> {
    let client = reqwest::Client::new();
    let resp = client
        .get(format!("{}/auth/v1/user", config.base_url))
        .header("apikey", &config.api_key)
        .header("Authorization", format!("Bearer {access_token}"))
        .send()
        .await
        .map_err(|e| AuthError::Service(e.to_string()))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(AuthError::Service(format!("{status}: {}", service_message(&body))));
    }

    resp.json::<AuthUser>()
        .await
        .map_err(|e| AuthError::Service(e.to_string()))
}

/// Invalidate the session on the auth service side.
pub async fn sign_out(config: &AuthConfig, access_token: &str) -> Result<(), AuthError> {
    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{}/auth/v1/logout", config.base_url))
        .header("apikey", &config.api_key)
        .header("Authorization", format!("Bearer {access_token}"))
        .send()
        .await
        .map_err(|e| AuthError::Service(e.to_string()))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(AuthError::Service(format!("{status}: {}", service_message(&body))));
    }
    Ok(())
}

// =============================================================================
// SESSION PERSISTENCE
// =============================================================================

/// Serialize the session through the store adapter. The adapter's `set` stamps
/// the marker cookie as a side effect.
#[must_use]
pub fn persist_session(store: &SessionStore, jar: CookieJar, session: &Session) -> CookieJar {
    match serde_json::to_string(session) {
        Ok(payload) => store.set(jar, SESSION_STORAGE_KEY, &payload),
        Err(e) => {
            tracing::error!(error = %e, "session serialization failed, nothing cached");
            jar
        }
    }
}

/// Read the cached session, if any. Unparseable cache entries are treated as
/// absent.
#[must_use]
pub fn cached_session(store: &SessionStore, jar: &CookieJar) -> Option<Session> {
    let raw = store.get(jar, SESSION_STORAGE_KEY)?;
    match serde_json::from_str(&raw) {
        Ok(session) => Some(session),
        Err(e) => {
            tracing::warn!(error = %e, "cached session is unparseable, treating as absent");
            None
        }
    }
}

/// Drop the cached session and expire its cookies.
#[must_use]
pub fn clear_session(store: &SessionStore, jar: CookieJar) -> CookieJar {
    store.remove(jar, SESSION_STORAGE_KEY)
}

/// Current session with automatic refresh: sessions close to expiry are traded
/// for a fresh one and re-persisted; a failed refresh drops the cached session.
pub async fn current_session(
    config: &AuthConfig,
    store: &SessionStore,
    jar: CookieJar,
) -> (Option<Session>, CookieJar) {
    let Some(session) = cached_session(store, &jar) else {
        return (None, jar);
    };

    if !session.needs_refresh(OffsetDateTime::now_utc()) {
        return (Some(session), jar);
    }

    match refresh(config, &session.refresh_token).await {
        Ok(fresh) => {
            let jar = persist_session(store, jar, &fresh);
            (Some(fresh), jar)
        }
        Err(e) => {
            tracing::error!(error = %e, "session refresh failed, dropping cached session");
            let jar = clear_session(store, jar);
            (None, jar)
        }
    }
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
