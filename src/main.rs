mod app_state;
mod auth;
mod config;
mod crypto;
mod db;
mod error;
mod handlers;
mod store;
mod transfer;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use clap::Parser;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use app_state::AppState;
use config::Config;
use db::init_pool;
use handlers::{api, login, transaction};
use store::sql::SqlStore;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api", get(api::health))
        .route("/api/auth", get(api::list_users))
        .route("/api/login", post(login::login))
        .route(
            "/api/transaction",
            post(transaction::transaction).route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth::require_auth,
            )),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nfcpay_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse configuration; a missing required env var aborts here
    let config = Arc::new(Config::parse());

    // Initialize database
    let pool = init_pool(&config.database_url()).await?;
    tracing::info!("connected to the MySQL database");

    // Create shared state
    let sql = Arc::new(SqlStore::new(pool));
    let state = AppState {
        users: sql.clone(),
        accounts: sql.clone(),
        audit: sql,
        config: config.clone(),
    };

    // Build router
    let app = router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.socket_addr()).await?;
    tracing::info!("server running on port {}", config.port());

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
