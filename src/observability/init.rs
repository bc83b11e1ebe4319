//! Observability initialization.
//!
//! Sets up the tracing subscriber once at startup: a console layer
//! (json for production, pretty for development) plus an optional file
//! layer behind a non-blocking appender so a slow sink never stalls a
//! request. File lines use the pipe-delimited format
//! `TIMESTAMP | LEVEL | SOURCE - MESSAGE [correlation=ID]`.

use std::fmt;
use std::path::Path;

use anyhow::{Result, anyhow};
use tracing::{Event, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter,
    fmt::{
        FmtContext, FormatEvent, FormatFields, FormattedFields,
        format::Writer,
    },
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
};

use crate::config::LoggingConfig;

/// Initialize the tracing subscriber from configuration.
///
/// Returns the worker guard for the file sink, if one is configured;
/// the caller must hold it for the process lifetime or buffered lines
/// are lost on shutdown.
pub fn init_observability(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let (file_layer, guard) = match &config.file {
        Some(path) => {
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
            let file_name = path
                .file_name()
                .map(|name| name.to_os_string())
                .unwrap_or_else(|| "app.log".into());
            let appender = tracing_appender::rolling::never(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .event_format(LogLineFormatter)
                .with_writer(writer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer);

    match config.format.as_str() {
        "json" => {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_current_span(true),
                )
                .try_init()?;
        }
        "pretty" => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty())
                .try_init()?;
        }
        other => {
            return Err(anyhow!(
                "Unsupported log format: {}. Use 'json' or 'pretty'",
                other
            ));
        }
    }

    Ok(guard)
}

/// Event formatter for the file sink.
///
/// The correlation identifier is taken from the event's `correlation`
/// field when present, else from the innermost enclosing span that
/// recorded one; `-` is the sentinel when no context is scoped.
pub struct LogLineFormatter;

impl<S, N> FormatEvent<S, N> for LogLineFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let mut visitor = LineVisitor::default();
        event.record(&mut visitor);

        let correlation = visitor
            .correlation
            .or_else(|| span_correlation(ctx))
            .unwrap_or_else(|| "-".to_string());

        let meta = event.metadata();
        let source = match meta.line() {
            Some(line) => format!("{}:{}", meta.target(), line),
            None => meta.target().to_string(),
        };

        writeln!(
            writer,
            "{} | {} | {} - {} [correlation={}]",
            chrono::Utc::now().format("%Y-%m-%d %H:%M:%S"),
            meta.level(),
            source,
            visitor.message,
            correlation,
        )
    }
}

/// Scan enclosing spans, innermost first, for a recorded `correlation`
/// field.
fn span_correlation<S, N>(ctx: &FmtContext<'_, S, N>) -> Option<String>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    let scope = ctx.event_scope()?;
    for span in scope {
        let extensions = span.extensions();
        if let Some(fields) = extensions.get::<FormattedFields<N>>() {
            for part in fields.fields.split(' ') {
                if let Some(value) = part.strip_prefix("correlation=") {
                    return Some(value.trim_matches('"').to_string());
                }
            }
        }
    }
    None
}

#[derive(Default)]
struct LineVisitor {
    message: String,
    correlation: Option<String>,
}

impl tracing::field::Visit for LineVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn fmt::Debug) {
        match field.name() {
            "message" => self.message = format!("{value:?}"),
            "correlation" => self.correlation = Some(format!("{value:?}")),
            _ => {}
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        match field.name() {
            "message" => self.message = value.to_string(),
            "correlation" => self.correlation = Some(value.to_string()),
            _ => {}
        }
    }
}
