pub mod runtime;

pub use runtime::{AppState, create_router, serve_until, start_server};
