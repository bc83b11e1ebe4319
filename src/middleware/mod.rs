pub mod telemetry;

pub use telemetry::{CORRELATION_HEADER, telemetry_middleware};
