pub mod config;
pub mod error;
pub mod health;
pub mod middleware;
pub mod observability;
pub mod routes;
pub mod schema;
pub mod server;
pub mod services;

pub use config::*;
pub use error::*;
pub use server::*;

use std::panic;

use anyhow::Result;

/// Main server entry point for library usage.
pub async fn run_server() -> Result<()> {
    let app_config = config::load_config()?;

    // The worker guard flushes the file sink; hold it for the process
    // lifetime.
    let _log_guard = observability::init_observability(&app_config.logging)?;

    panic::set_hook(Box::new(|panic_info| {
        ::tracing::error!(?panic_info, "FATAL: Panic occurred");
        std::process::exit(1);
    }));

    ::tracing::info!("Catalog API starting up");

    server::start_server(app_config).await
}
