//! Per-request correlation identifiers.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Identifier carried by every log record emitted while one request is
/// in flight.
///
/// Opened once at request entry and owned exclusively by that request's
/// telemetry guard; it is never shared across requests and goes out of
/// scope when the request finishes.
#[derive(Debug, Clone)]
pub struct CorrelationContext {
    id: Uuid,
    opened_at: DateTime<Utc>,
}

impl CorrelationContext {
    /// Open a fresh context with a random 128-bit identifier.
    pub fn open() -> Self {
        Self {
            id: Uuid::new_v4(),
            opened_at: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contexts_are_unique() {
        let a = CorrelationContext::open();
        let b = CorrelationContext::open();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_id_is_canonical_uuid() {
        let ctx = CorrelationContext::open();
        let rendered = ctx.id().to_string();
        assert_eq!(rendered.len(), 36);
        assert!(rendered.contains('-'));
    }

    #[test]
    fn test_opened_at_is_recent() {
        let before = Utc::now();
        let ctx = CorrelationContext::open();
        let after = Utc::now();
        assert!(ctx.opened_at() >= before);
        assert!(ctx.opened_at() <= after);
    }
}
