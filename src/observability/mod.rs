//! Observability: correlation identifiers, status classification,
//! request counters, and logging setup.

pub mod correlation;
pub mod endpoint;
pub mod init;
pub mod metrics;
pub mod status;

pub use correlation::CorrelationContext;
pub use endpoint::metrics_endpoint;
pub use init::init_observability;
pub use metrics::{HTTP_REQUESTS_TOTAL, CounterSample, MetricsRegistry, record_request};
pub use status::{Outcome, StatusLabel, classify};
