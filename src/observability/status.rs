//! Terminal status classification.
//!
//! Every request ends in exactly one [`StatusLabel`] drawn from a
//! closed set, used for both the metric `status` label and the level
//! of the terminal log line. Faults recorded while producing the
//! response take precedence over the literal response code; a 422
//! reached either way lands in the same `"422"` bucket, so the two
//! policies cannot disagree.

use std::borrow::Cow;

use axum::http::StatusCode;

use crate::error::{Fault, FaultKind};

/// How a request ended: the terminal response code plus any fault
/// recorded while producing it.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub code: StatusCode,
    pub fault: Option<Fault>,
}

impl Outcome {
    /// Read the outcome off a finished response. Faults are carried in
    /// response extensions by `AppError::into_response`.
    pub fn from_response(response: &axum::response::Response) -> Self {
        Self {
            code: response.status(),
            fault: response.extensions().get::<Fault>().cloned(),
        }
    }
}

/// Closed set of status labels for metric bucketing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusLabel {
    /// Validation fault or literal 422 response.
    Unprocessable,
    /// A referenced entity does not exist (storage-level, not a raw
    /// unmatched-route 404).
    NotFound,
    /// Any non-validation fault.
    Internal,
    /// Request future dropped before completing (client disconnect).
    Cancelled,
    /// Decimal bucket for every other completion.
    Code(u16),
}

impl StatusLabel {
    pub fn as_label(&self) -> Cow<'static, str> {
        match self {
            StatusLabel::Unprocessable => Cow::Borrowed("422"),
            StatusLabel::NotFound => Cow::Borrowed("not_found"),
            StatusLabel::Internal => Cow::Borrowed("500"),
            StatusLabel::Cancelled => Cow::Borrowed("cancelled"),
            StatusLabel::Code(code) => Cow::Owned(code.to_string()),
        }
    }

    /// Whether the terminal log line is error-level.
    pub fn is_error(&self) -> bool {
        match self {
            StatusLabel::Unprocessable
            | StatusLabel::NotFound
            | StatusLabel::Internal
            | StatusLabel::Cancelled => true,
            StatusLabel::Code(code) => *code >= 400,
        }
    }
}

/// Map an outcome to its status label.
pub fn classify(outcome: &Outcome) -> StatusLabel {
    if let Some(fault) = &outcome.fault {
        return match fault.kind {
            FaultKind::Validation => StatusLabel::Unprocessable,
            FaultKind::NotFound => StatusLabel::NotFound,
            FaultKind::Internal => StatusLabel::Internal,
        };
    }

    match outcome.code.as_u16() {
        422 => StatusLabel::Unprocessable,
        code => StatusLabel::Code(code),
    }
}
