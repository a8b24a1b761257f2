//! Dashboard routes — aggregate statistics and the user profile view.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;
use serde_json::Value;
use time::OffsetDateTime;

use crate::services::{auth, data, stats};
use crate::state::AppState;

/// Read-only view joining the auth identity with the `utilisateur` row.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub email: String,
    pub role: String,
    pub id_ecole: Option<i64>,
    pub id_bureau: Option<i64>,
}

/// Metadata claims win over the table row, which wins over defaults.
#[must_use]
pub(crate) fn build_profile(user: &auth::AuthUser, row: Option<&Value>) -> UserProfile {
    let meta = &user.user_metadata;
    let row_field = |key: &str| row.and_then(|r| r.get(key).cloned());

    let role = meta
        .get("role")
        .and_then(|v| v.as_str().map(str::to_owned))
        .or_else(|| row_field("role").and_then(|v| v.as_str().map(str::to_owned)))
        .unwrap_or_else(|| "utilisateur".to_owned());
    let id_ecole = meta
        .get("id_ecole")
        .and_then(Value::as_i64)
        .or_else(|| row_field("id_ecole").and_then(|v| v.as_i64()));
    let id_bureau = meta
        .get("id_bureau")
        .and_then(Value::as_i64)
        .or_else(|| row_field("id_bureau").and_then(|v| v.as_i64()));

    UserProfile { email: user.email.clone(), role, id_ecole, id_bureau }
}

/// `GET /api/dashboard/stats` — aggregates for the current month. Per-section
/// fetch failures are logged inside the stats service and show up as zeros.
pub async fn dashboard_stats(State(state): State<AppState>) -> Json<stats::DashboardStats> {
    let today = OffsetDateTime::now_utc().date();
    Json(stats::fetch_dashboard_stats(&state.data, today).await)
}

/// `GET /api/dashboard/profile` — identity joined with the `utilisateur` row,
/// fetched by email equality on every load. No caching.
pub async fn profile(State(state): State<AppState>, jar: CookieJar) -> Response {
    let (session, jar) = auth::current_session(&state.auth, &state.store, jar).await;
    let Some(session) = session else {
        let body = serde_json::json!({ "error": auth::AuthError::NoSession.to_string() });
        return (StatusCode::UNAUTHORIZED, jar, Json(body)).into_response();
    };

    let user = match auth::fetch_user(&state.auth, &session.access_token).await {
        Ok(user) => user,
        Err(e) => {
            tracing::error!(error = %e, "identity fetch failed");
            let body = serde_json::json!({ "error": e.to_string() });
            return (StatusCode::BAD_GATEWAY, jar, Json(body)).into_response();
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

    (jar, Json(build_profile(&user, row.as_ref()))).into_response()
}

#[cfg(test)]
#[path = "dashboard_test.rs"]
mod tests;
