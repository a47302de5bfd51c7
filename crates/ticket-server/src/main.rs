//! Ticket Desk Server
//!
//! REST backend for support tickets: create, list, claim, update and filter
//! by owner. Tickets live in a single SQLite table.

mod config;
mod error;
mod extractors;
mod handlers;
mod services;
mod storage;

use anyhow::{Context, Result};
use axum::{
    http::HeaderValue,
    routing::{get, put},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use config::Config;
use services::TicketService;
use storage::Database;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub tickets: Arc<TicketService>,
}

impl AppState {
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            tickets: Arc::new(TicketService::new(db)),
        }
    }
}

#[tokio::main]
async fn main() {
    install_panic_hook();

    if let Err(e) = init_tracing() {
        eprintln!("[FATAL] Failed to initialize logging: {:#}", e);
        std::process::exit(1);
    }

    info!(
        "Starting Ticket Desk Server v{} (pid {})",
        env!("CARGO_PKG_VERSION"),
        std::process::id()
    );

    if let Err(e) = run_server().await {
        error!("Server failed: {:#}", e);
        std::process::exit(1);
    }
}

/// Route panics through tracing as well as stderr
fn install_panic_hook() {
    std::panic::set_hook(Box::new(|panic| {
        let location = panic
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()))
            .unwrap_or_else(|| "unknown location".to_string());
        let message = panic
            .payload()
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| panic.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "Unknown panic".to_string());

        eprintln!("[PANIC] {}: {}", location, message);
        error!(%location, "panic: {}", message);
    }));
}

fn init_tracing() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install tracing subscriber")
}

async fn run_server() -> Result<()> {
    let config = Config::default();
    info!(
        "Config: bind={}, db={}, allowed_origin={}",
        config.bind_address, config.database_path, config.allowed_origin
    );

    let db = Arc::new(
        Database::open(&config.database_path)
            .await
            .context("Failed to open database")?,
    );

    // Schema must exist before the first request is accepted
    db.init_schema()
        .await
        .context("Failed to initialize database schema")?;
    info!("Database ready at: {}", config.database_path);

    let app = router(AppState::new(db.clone()), &config.allowed_origin)?;

    let addr: SocketAddr = config
        .bind_address
        .parse()
        .context("Failed to parse bind address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!("Server listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    db.close().await;
    info!("Server stopped");
    Ok(())
}

/// Build the full application: routes, CORS policy and request tracing.
pub fn router(state: AppState, allowed_origin: &str) -> Result<Router> {
    let origin = HeaderValue::from_str(allowed_origin)
        .with_context(|| format!("Invalid CORS origin: {}", allowed_origin))?;

    Ok(Router::new()
        .route("/health", get(handlers::health))
        .merge(ticket_routes())
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list([origin]))
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

fn ticket_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/tickets",
            get(handlers::tickets::list).post(handlers::tickets::create),
        )
        .route("/tickets/:id", put(handlers::tickets::update))
        .route("/tickets/:id/claim", put(handlers::tickets::claim))
        .route(
            "/tickets/owner/:owner",
            get(handlers::tickets::list_by_owner).put(handlers::tickets::unknown_ticket),
        )
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
