//! Sushi API Server
//!
//! HTTP front end for the sushi catalog. The storage backend (in-memory,
//! CockroachDB, MySQL, SQLite or Redis) is chosen from configuration at
//! startup and shared by every request.

mod config;
mod extractors;
mod handlers;
mod sample;
mod services;
mod storage;

use anyhow::{Context, Result};
use axum::{
    body::Body,
    extract::ConnectInfo,
    http::Request,
    routing::get,
    Router,
};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use sushi_core::SushiRepository;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn, Span};
use tracing_subscriber::EnvFilter;

use crate::config::{Cli, Config, LogFormat};
use crate::services::{AddingService, GettingService, ModifyingService, RemovingService};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub getting: Arc<GettingService>,
    pub adding: Arc<AddingService>,
    pub modifying: Arc<ModifyingService>,
    pub removing: Arc<RemovingService>,
    pub server_id: Arc<str>,
}

impl AppState {
    pub fn new(repository: Arc<dyn SushiRepository>, server_id: impl Into<Arc<str>>) -> Self {
        Self {
            getting: Arc::new(GettingService::new(repository.clone())),
            adding: Arc::new(AddingService::new(repository.clone())),
            modifying: Arc::new(ModifyingService::new(repository.clone())),
            removing: Arc::new(RemovingService::new(repository)),
            server_id: server_id.into(),
        }
    }
}

#[tokio::main]
async fn main() {
    // Set up panic hook to log crashes
    std::panic::set_hook(Box::new(|info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()));
        let payload = if let Some(s) = info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        eprintln!("[PANIC] at {:?}: {}", location, payload);
        tracing::error!("PANIC at {:?}: {}", location, payload);
    }));

    let cli = Cli::parse();

    let config = match Config::load(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("[FATAL] Failed to load configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = init_tracing(config.log_format, cli.verbose) {
        eprintln!("[FATAL] Failed to initialize logging: {:#}", e);
        std::process::exit(1);
    }

    info!("Starting Sushi API v{}", env!("CARGO_PKG_VERSION"));
    info!("PID: {}", std::process::id());

    if let Err(e) = run_server(config).await {
        error!("Server failed: {:#}", e);
        std::process::exit(1);
    }
}

fn init_tracing(format: LogFormat, verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.try_init(),
    }
    .map_err(|e| anyhow::anyhow!("{}", e))
}

async fn run_server(config: Config) -> Result<()> {
    let server_id = config.server_id();
    info!(
        "Config loaded: bind={}, database={}, server_id={}",
        config.bind_address(),
        config.database,
        server_id
    );

    info!("Initializing {} storage...", config.database);
    let repository = storage::connect(&config)
        .await
        .context("Failed to initialize storage")?;
    info!("Storage initialized");

    if config.seed {
        sample::seed(repository.as_ref())
            .await
            .context("Failed to seed sample data")?;
    }

    let app = build_router(AppState::new(repository, server_id));

    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .context("Failed to parse bind address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!("The sushi server is on tap now: {}", addr);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    let server_id = state.server_id.clone();

    Router::new()
        .merge(api_routes())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http().make_span_with(move |request: &Request<Body>| {
            request_span(&server_id, request)
        }))
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/sushi",
            get(handlers::sushi::list).post(handlers::sushi::create),
        )
        .route(
            "/sushi/:id",
            get(handlers::sushi::get)
                .put(handlers::sushi::modify)
                .delete(handlers::sushi::remove),
        )
}

/// Per-request span carrying the fields every log line of the request needs
fn request_span(server_id: &str, request: &Request<Body>) -> Span {
    let client_ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_default();

    tracing::info_span!(
        "request",
        server_id = %server_id,
        method = %request.method(),
        endpoint = %request.uri().path(),
        client_ip = %client_ip,
        x_forwarded_for = header_value(request, "x-forwarded-for"),
        x_forwarded_proto = header_value(request, "x-forwarded-proto"),
    )
}

fn header_value<'a>(request: &'a Request<Body>, name: &str) -> Option<&'a str> {
    request.headers().get(name).and_then(|v| v.to_str().ok())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    warn!("Received Ctrl+C, initiating graceful shutdown...");
}
