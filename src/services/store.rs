//! Session storage adapter — primary store mirrored into cookies.
//!
//! ARCHITECTURE
//! ============
//! The auth client persists its session through this adapter. Reads prefer the
//! primary in-process store and fall back to the request cookies, so a session
//! written by an earlier response is still visible after a process restart as
//! long as the browser keeps sending the mirror cookie.
//!
//! TRADE-OFFS
//! ==========
//! Every `set` also stamps the `auth_initialized` marker cookie that the route
//! guard reads. The marker is written alongside, not derived from, the stored
//! value, so it can outlive the session it was supposed to signal.

use std::collections::HashMap;
use std::sync::Mutex;

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

/// Flag cookie the route guard treats as "a session exists".
pub const AUTH_MARKER_COOKIE: &str = "auth_initialized";

/// Lifetime of the mirror cookies and the marker written by `set`.
pub const MIRROR_TTL: Duration = Duration::days(30);

pub(crate) fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .and_then(|raw| match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
}

/// Whether cookies should carry the `Secure` flag. Explicit `COOKIE_SECURE`
/// wins; otherwise inferred from the auth service URL scheme.
pub(crate) fn cookie_secure() -> bool {
    if let Some(value) = env_bool("COOKIE_SECURE") {
        return value;
    }

    std::env::var("AUTH_SERVICE_URL")
        .map(|url| url.starts_with("https://"))
        .unwrap_or(false)
}

fn persistent_cookie(name: &str, value: &str) -> Cookie<'static> {
    Cookie::build((name.to_owned(), value.to_owned()))
        .path("/")
        .same_site(SameSite::Lax)
        .secure(cookie_secure())
        .max_age(MIRROR_TTL)
        .build()
}

/// A removal cookie: empty value, immediate expiry.
pub(crate) fn expired_cookie(name: &str) -> Cookie<'static> {
    Cookie::build((name.to_owned(), ""))
        .path("/")
        .same_site(SameSite::Lax)
        .secure(cookie_secure())
        .max_age(Duration::ZERO)
        .build()
}

/// Key/value store with a cookie mirror. Last writer wins; the interior mutex
/// only guards the map itself.
#[derive(Debug, Default)]
pub struct SessionStore {
    primary: Mutex<HashMap<String, String>>,
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self { primary: Mutex::new(HashMap::new()) }
    }

    /// Look up a key: primary store first, then the request cookie of the
    /// same name.
    #[must_use]
    pub fn get(&self, jar: &CookieJar, key: &str) -> Option<String> {
        let primary = self
            .primary
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(value) = primary.get(key) {
            return Some(value.clone());
        }
        drop(primary);

        jar.get(key).map(|c| c.value().to_owned())
    }

    /// Write a key to the primary store and mirror it into a 30-day cookie.
    /// Unconditionally stamps the `auth_initialized` marker as well, whatever
    /// the key was.
    #[must_use]
    pub fn set(&self, jar: CookieJar, key: &str, value: &str) -> CookieJar {
        self.primary
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(key.to_owned(), value.to_owned());

        jar.add(persistent_cookie(key, value))
            .add(persistent_cookie(AUTH_MARKER_COOKIE, "true"))
    }

    /// Delete a key from the primary store and expire its mirror cookie.
    /// Unconditionally expires the marker too. Idempotent.
    #[must_use]
    pub fn remove(&self, jar: CookieJar, key: &str) -> CookieJar {
        self.primary
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .remove(key);

        jar.add(expired_cookie(key))
            .add(expired_cookie(AUTH_MARKER_COOKIE))
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
