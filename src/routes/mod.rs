//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Page routes sit behind the route-guard middleware; the `/api` surface and
//! the health check are exempt. Page markup is deliberately minimal: the
//! interesting behavior lives in the guard and the API handlers.

pub mod auth;
pub mod dashboard;
pub mod notes;

use axum::Router;
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::{delete, get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::middleware::route_guard;
use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(home_page))
        .route("/login", get(login_page))
        .route("/register", get(register_page))
        .route("/forgot-password", get(forgot_password_page))
        .route("/dashboard", get(dashboard_page))
        .route("/dashboard-test", get(dashboard_test_page))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/session", get(auth::session_debug))
        .route("/api/dashboard/stats", get(dashboard::dashboard_stats))
        .route("/api/dashboard/profile", get(dashboard::profile))
        .route("/api/notes", get(notes::list_notes).post(notes::create_note))
        .route("/api/notes/{id}", delete(notes::delete_note))
        .route("/healthz", get(healthz))
        .layer(axum::middleware::from_fn(route_guard))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn home_page() -> Html<&'static str> {
    Html("<h1>AutoSoft</h1><p>Gestion d'auto-école</p><a href=\"/login\">Connexion</a>")
}

async fn login_page() -> Html<&'static str> {
    Html("<h1>AutoSoft — Connexion</h1>")
}

async fn register_page() -> Html<&'static str> {
    Html("<h1>AutoSoft — Inscription</h1>")
}

async fn forgot_password_page() -> Html<&'static str> {
    Html("<h1>AutoSoft — Mot de passe oublié</h1>")
}

async fn dashboard_page() -> Html<&'static str> {
    Html("<h1>AutoSoft — Tableau de bord</h1>")
}

async fn dashboard_test_page() -> Html<&'static str> {
    Html("<h1>AutoSoft — Diagnostic de session</h1>")
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
