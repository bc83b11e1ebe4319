//! Request telemetry middleware.
//!
//! Wraps every inbound request: opens a correlation context, logs an
//! entry record, invokes the handler, classifies the terminal outcome,
//! and emits exactly one terminal log record and one counter increment
//! whichever way the request ends. The emission is owned by a guard so
//! the guarantee also holds when the request future is dropped
//! mid-flight (client disconnect), which is counted with status
//! `cancelled`.

use std::sync::Arc;

use axum::extract::{MatchedPath, Request, State};
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use tracing::{Instrument, info_span};

use crate::error::Fault;
use crate::observability::correlation::CorrelationContext;
use crate::observability::metrics::{MetricsRegistry, record_request};
use crate::observability::status::{Outcome, StatusLabel, classify};
use crate::routes;
use crate::server::AppState;

/// Response header echoing the request's correlation identifier.
pub const CORRELATION_HEADER: &str = "x-correlation-id";

pub async fn telemetry_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let operation = req
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| routes::operation_name(req.method().as_str(), matched.as_str()))
        .unwrap_or("other");

    let ctx = CorrelationContext::open();
    let span = info_span!(
        "request",
        correlation = %ctx.id(),
        method = %method,
        path = %path,
    );

    let mut guard = TelemetryGuard::new(ctx, state.metrics.clone(), operation, method, path);

    async move {
        tracing::info!(
            correlation = %guard.ctx.id(),
            "Request to access {} {}",
            guard.method,
            guard.path,
        );

        let mut response = next.run(req).await;

        let outcome = Outcome::from_response(&response);
        if let Ok(value) = HeaderValue::from_str(&guard.ctx.id().to_string()) {
            response.headers_mut().insert(CORRELATION_HEADER, value);
        }

        guard.finish(classify(&outcome), outcome.fault.as_ref());
        response
    }
    .instrument(span)
    .await
}

/// Owns the one-shot terminal emission for a single request.
///
/// Normal paths go through [`TelemetryGuard::finish`]; if the future
/// holding the guard is dropped before that, `Drop` emits with the
/// `cancelled` status. Either way the log record and the counter
/// increment happen exactly once.
struct TelemetryGuard {
    ctx: CorrelationContext,
    metrics: Arc<MetricsRegistry>,
    operation: &'static str,
    method: String,
    path: String,
    emitted: bool,
}

impl TelemetryGuard {
    fn new(
        ctx: CorrelationContext,
        metrics: Arc<MetricsRegistry>,
        operation: &'static str,
        method: String,
        path: String,
    ) -> Self {
        Self {
            ctx,
            metrics,
            operation,
            method,
            path,
            emitted: false,
        }
    }

    fn finish(&mut self, label: StatusLabel, fault: Option<&Fault>) {
        self.emit(label, fault);
    }

    fn emit(&mut self, label: StatusLabel, fault: Option<&Fault>) {
        if self.emitted {
            return;
        }
        self.emitted = true;

        let status = label.as_label();
        match (&label, fault) {
            (StatusLabel::Cancelled, _) => {
                tracing::warn!(
                    correlation = %self.ctx.id(),
                    status = %status,
                    "Request to {} {} cancelled",
                    self.method,
                    self.path,
                );
            }
            (label, Some(fault)) if label.is_error() => {
                tracing::error!(
                    correlation = %self.ctx.id(),
                    status = %status,
                    "Request to {} {} failed: {}",
                    self.method,
                    self.path,
                    fault.message,
                );
            }
            (label, None) if label.is_error() => {
                tracing::error!(
                    correlation = %self.ctx.id(),
                    status = %status,
                    "Request to {} {} failed",
                    self.method,
                    self.path,
                );
            }
            _ => {
                tracing::info!(
                    correlation = %self.ctx.id(),
                    status = %status,
                    "Request to {} {} successful",
                    self.method,
                    self.path,
                );
            }
        }

        record_request(&self.metrics, self.operation, &self.method, &status);
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        // Reached only when the request future was dropped mid-flight.
        self.emit(StatusLabel::Cancelled, None);
    }
}
