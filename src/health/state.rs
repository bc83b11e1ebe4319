//! Readiness state shared with the probe handlers.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Starting,
    Healthy,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub uptime_seconds: u64,
}

/// Tracks whether the server has finished binding and is ready for
/// traffic.
#[derive(Clone)]
pub struct HealthManager {
    inner: Arc<Inner>,
}

struct Inner {
    ready: RwLock<bool>,
    started_at: Instant,
}

impl HealthManager {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                ready: RwLock::new(false),
                started_at: Instant::now(),
            }),
        }
    }

    /// Called once the listener is bound.
    pub async fn mark_ready(&self) {
        *self.inner.ready.write().await = true;
    }

    pub async fn get_health(&self) -> HealthResponse {
        let ready = *self.inner.ready.read().await;
        HealthResponse {
            status: if ready {
                HealthStatus::Healthy
            } else {
                HealthStatus::Starting
            },
            uptime_seconds: self.inner.started_at.elapsed().as_secs(),
        }
    }
}

impl Default for HealthManager {
    fn default() -> Self {
        Self::new()
    }
}
