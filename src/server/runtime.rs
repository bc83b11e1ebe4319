use std::future::{Future, IntoFuture};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::{Router, middleware, routing::get};
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::health::{HealthManager, liveness_handler, readiness_handler};
use crate::middleware::telemetry_middleware;
use crate::observability::metrics_endpoint;
use crate::observability::metrics::MetricsRegistry;
use crate::routes::{self, items, users};
use crate::schema::{Item, User};
use crate::services::storage::{MemoryStore, Store};

/// Application state injected into handlers and middleware.
#[derive(Clone)]
pub struct AppState {
    pub items: Arc<dyn Store<Item>>,
    pub users: Arc<dyn Store<User>>,
    pub metrics: Arc<MetricsRegistry>,
    pub health: HealthManager,
}

impl AppState {
    pub fn new() -> Self {
        Self::with_metrics(MetricsRegistry::new())
    }

    pub fn with_metrics(metrics: MetricsRegistry) -> Self {
        Self {
            items: Arc::new(MemoryStore::new()),
            users: Arc::new(MemoryStore::new()),
            metrics: Arc::new(metrics),
            health: HealthManager::new(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

/// Start the Axum HTTP server with graceful shutdown.
pub async fn start_server(config: AppConfig) -> Result<()> {
    serve_until(config, shutdown_signal()).await
}

/// Serve until `shutdown` resolves, then drain in-flight requests for
/// at most `server.shutdown_timeout` seconds before giving up.
pub async fn serve_until(
    config: AppConfig,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    info!(
        "Starting catalog API server on {}:{}",
        config.server.bind, config.server.port
    );

    let registry = match &config.metrics.namespace {
        Some(namespace) => MetricsRegistry::with_namespace(namespace.clone()),
        None => MetricsRegistry::new(),
    };
    let state = AppState::with_metrics(registry);
    let health = state.health.clone();

    let app = create_router(state);

    let bind_addr = format!("{}:{}", config.server.bind, config.server.port);
    let listener = TcpListener::bind(&bind_addr).await.map_err(|e| {
        anyhow::anyhow!(
            "Failed to bind to {}: {}. Is another process using this port?",
            bind_addr,
            e
        )
    })?;
    info!("Server bound to {}", bind_addr);

    health.mark_ready().await;

    // The drain clock starts when the shutdown trigger fires, not when
    // the server starts.
    let drain_timeout = Duration::from_secs(config.server.shutdown_timeout);
    let (drain_tx, drain_rx) = tokio::sync::oneshot::channel();
    let graceful = async move {
        shutdown.await;
        let _ = drain_tx.send(());
    };

    let server = axum::serve(listener, app)
        .with_graceful_shutdown(graceful)
        .into_future();

    tokio::select! {
        result = server => {
            result?;
            info!("Server shutdown complete");
        }
        _ = async {
            let _ = drain_rx.await;
            tokio::time::sleep(drain_timeout).await;
        } => {
            warn!(
                "In-flight requests did not drain within {}s, aborting",
                config.server.shutdown_timeout
            );
        }
    }

    Ok(())
}

/// Create the Axum router with all routes and middleware.
///
/// Every route here has a registered operation name in
/// [`routes::operation_name`]; the telemetry middleware wraps the whole
/// table, including the probe and exposition endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::root))
        .route("/items", get(items::list_items).post(items::create_item))
        .route(
            "/items/{id}",
            get(items::get_item)
                .put(items::update_item)
                .delete(items::delete_item),
        )
        .route("/users", get(users::list_users).post(users::create_user))
        .route("/metrics", get(metrics_endpoint))
        .route("/health", get(liveness_handler))
        .route("/health/ready", get(readiness_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            telemetry_middleware,
        ))
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        .with_state(state)
}

/// Wait for shutdown signal (SIGTERM or SIGINT).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C), starting graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
