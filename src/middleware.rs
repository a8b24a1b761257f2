//! Request-time route guard.
//!
//! DESIGN
//! ======
//! A pure decision over two booleans: is the `auth_initialized` marker cookie
//! present with value `"true"`, and is the requested path on the public
//! allow-list. The guard never contacts the auth service, so it trusts the
//! marker as a proxy for a live session; a stale `"true"` marker passes even
//! when the cached session has expired.

use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;

use crate::services::store::AUTH_MARKER_COOKIE;

/// Pages reachable without authentication.
pub const PUBLIC_PAGES: [&str; 4] = ["/", "/login", "/register", "/forgot-password"];

/// Header annotated onto every pass-through response.
pub const AUTH_STATUS_HEADER: &str = "x-auth-status";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardOutcome {
    RedirectToLogin,
    RedirectToDashboard,
    Allow { authenticated: bool },
}

#[must_use]
pub fn is_public_page(path: &str) -> bool {
    PUBLIC_PAGES.contains(&path)
}

/// Paths outside the guard's matcher: the API surface and static assets.
#[must_use]
pub fn is_exempt(path: &str) -> bool {
    path.starts_with("/api") || path == "/healthz" || path == "/favicon.ico"
}

#[must_use]
pub fn marker_present(jar: &CookieJar) -> bool {
    jar.get(AUTH_MARKER_COOKIE).is_some_and(|c| c.value() == "true")
}

/// The guard decision table. Stateless, one evaluation per request.
#[must_use]
pub fn evaluate(has_marker: bool, is_public: bool) -> GuardOutcome {
    match (has_marker, is_public) {
        (false, false) => GuardOutcome::RedirectToLogin,
        (true, true) => GuardOutcome::RedirectToDashboard,
        (authenticated, _) => GuardOutcome::Allow { authenticated },
    }
}

/// Axum middleware wrapping [`evaluate`] around page rendering.
pub async fn route_guard(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();
    if is_exempt(&path) {
        return next.run(request).await;
    }

    let jar = CookieJar::from_headers(request.headers());
    let has_marker = marker_present(&jar);
    tracing::debug!(%path, has_marker, "route guard evaluated");

    match evaluate(has_marker, is_public_page(&path)) {
        GuardOutcome::RedirectToLogin => {
            tracing::debug!(%path, "redirecting unauthenticated request to login");
            Redirect::temporary("/login").into_response()
        }
        GuardOutcome::RedirectToDashboard => {
            tracing::debug!(%path, "redirecting authenticated request to dashboard");
            Redirect::temporary("/dashboard").into_response()
        }
        GuardOutcome::Allow { authenticated } => {
            let mut response = next.run(request).await;
            let status = if authenticated { "authenticated" } else { "unauthenticated" };
            response
                .headers_mut()
                .insert(AUTH_STATUS_HEADER, HeaderValue::from_static(status));
            response
        }
    }
}

#[cfg(test)]
#[path = "middleware_test.rs"]
mod tests;
