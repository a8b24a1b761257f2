mod middleware;
mod routes;
mod services;
mod state;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()
        .expect("invalid PORT");

    let auth = services::auth::AuthConfig::from_env()
        .expect("AUTH_SERVICE_URL and AUTH_SERVICE_KEY required");
    let data = services::data::DataConfig::from_env()
        .expect("DATA_SERVICE_URL and DATA_SERVICE_KEY required");

    let state = state::AppState::new(auth, data);

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "autosoft listening");
    axum::serve(listener, app).await.expect("server failed");
}
