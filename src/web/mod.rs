use crate::config::ServerConfig;
use crate::db::Database;
use crate::error::Result;
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::{Arc, Mutex};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared application state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Mutex<Database>>,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        AppState {
            db: Arc::new(Mutex::new(db)),
        }
    }
}

mod errors;
mod handlers;

pub use errors::AppError;

/// Build the axum router with all routes. Every flow route answers with and
/// without the trailing slash.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/flows",
            get(handlers::list_flows).post(handlers::create_flow),
        )
        .route(
            "/flows/",
            get(handlers::list_flows).post(handlers::create_flow),
        )
        .route("/flows/batch", post(handlers::create_flows))
        .route("/flows/batch/", post(handlers::create_flows))
        .route("/flows/upload", post(handlers::upload_file))
        .route("/flows/upload/", post(handlers::upload_file))
        .route("/flows/download", get(handlers::download_file))
        .route("/flows/download/", get(handlers::download_file))
        .route(
            "/flows/{flow_id}",
            get(handlers::get_flow)
                .put(handlers::update_flow)
                .delete(handlers::delete_flow),
        )
        .route(
            "/flows/{flow_id}/",
            get(handlers::get_flow)
                .put(handlers::update_flow)
                .delete(handlers::delete_flow),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Open and migrate the database, then serve until Ctrl-C.
pub async fn serve(config: &ServerConfig) -> Result<()> {
    let db = Database::open(&config.db_path)?;
    db.migrate()?;
    let app = create_router(AppState::new(db));

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, db = %config.db_path.display(), "flows API listening");
    println!("Flows API: http://{addr}/flows/");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
    }
}
