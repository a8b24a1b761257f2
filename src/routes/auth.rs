//! Auth routes — login, logout, session diagnostics.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use time::{Duration, OffsetDateTime};

use crate::services::{auth, data, store};
use crate::state::AppState;

/// Lifetime of the marker written eagerly by the login handler, before the
/// credential call resolves. The marker therefore exists even when the login
/// ultimately fails; only the session cache reflects the real outcome.
const EAGER_MARKER_TTL: Duration = Duration::hours(1);

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub(crate) fn eager_marker_cookie() -> Cookie<'static> {
    Cookie::build((store::AUTH_MARKER_COOKIE, "true"))
        .path("/")
        .same_site(SameSite::Lax)
        .secure(store::cookie_secure())
        .max_age(EAGER_MARKER_TTL)
        .build()
}

/// Expire every cookie the request presented, then the marker explicitly.
pub(crate) fn sweep_cookies(jar: CookieJar) -> CookieJar {
    let names: Vec<String> = jar.iter().map(|c| c.name().to_owned()).collect();
    let jar = names
        .into_iter()
        .fold(jar, |jar, name| jar.add(store::expired_cookie(&name)));
    jar.add(store::expired_cookie(store::AUTH_MARKER_COOKIE))
}

fn error_body(message: &str) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "error": message }))
}

/// `POST /api/auth/login` — exchange credentials, cache the session, redirect
/// to the dashboard.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Response {
    tracing::info!(email = %body.email, "login attempt");

    // Written before the credential call resolves.
    let jar = jar.add(eager_marker_cookie());

    let session = match auth::login(&state.auth, &body.email, &body.password).await {
        Ok(session) => session,
        Err(e) => {
            tracing::error!(error = %e, "login failed");
            return (StatusCode::UNAUTHORIZED, jar, error_body(&e.to_string())).into_response();
        }
    };

    let jar = auth::persist_session(&state.store, jar, &session);

    // Opportunistic profile lookup, diagnostics only.
    let query = data::SelectQuery::new("utilisateur").eq("email", &body.email).limit(1);
    match data::fetch_single(&state.data, &query).await {
        Ok(row) => tracing::debug!(role = ?row.get("role"), "utilisateur row found"),
        Err(e) => tracing::error!(error = %e, "utilisateur lookup failed"),
    }

    tracing::info!(email = %body.email, "login succeeded");
    (jar, Redirect::to("/dashboard")).into_response()
}

/// `POST /api/auth/logout` — remote sign-out, full cookie sweep, redirect to
/// the login page. Sign-out failures are logged; teardown proceeds anyway.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> Response {
    if let Some(session) = auth::cached_session(&state.store, &jar) {
        if let Err(e) = auth::sign_out(&state.auth, &session.access_token).await {
            tracing::error!(error = %e, "remote sign-out failed");
        }
    }

    let jar = auth::clear_session(&state.store, jar);
    let jar = sweep_cookies(jar);

    tracing::info!("logout complete, all cookies swept");
    (jar, Redirect::to("/login")).into_response()
}

/// `GET /api/auth/session` — diagnostics behind the dashboard-test page:
/// cached session, auth identity, and the `utilisateur` row. A missing session
/// is reported as a terminal error here even though the guard should already
/// have redirected.
pub async fn session_debug(State(state): State<AppState>, jar: CookieJar) -> Response {
    let (session, jar) = auth::current_session(&state.auth, &state.store, jar).await;
    let Some(session) = session else {
        return (StatusCode::UNAUTHORIZED, jar, error_body(&auth::AuthError::NoSession.to_string()))
            .into_response();
    };

    let user = match auth::fetch_user(&state.auth, &session.access_token).await {
        Ok(user) => user,
        Err(e) => {
            tracing::error!(error = %e, "identity fetch failed");
            return (StatusCode::BAD_GATEWAY, jar, error_body(&e.to_string())).into_response();
        }
    };

    let query = data::SelectQuery::new("utilisateur").eq("email", &user.email).limit(1);
    let row = match data::fetch_single(&state.data, &query).await {
        Ok(row) => Some(row),
        Err(e) => {
            tracing::error!(error = %e, "utilisateur lookup failed");
            None
        }
    };

    let body = serde_json::json!({
        "session": {
            "expires_at": session.expires_at,
            "expired": session.is_expired(OffsetDateTime::now_utc()),
        },
        "user": user,
        "utilisateur": row,
    });
    (jar, Json(body)).into_response()
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
