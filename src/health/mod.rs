pub mod handlers;
pub mod state;

pub use handlers::{liveness_handler, readiness_handler};
pub use state::{HealthManager, HealthResponse, HealthStatus};
