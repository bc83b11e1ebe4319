//! Labeled counter registry with Prometheus-style exposition.
//!
//! Counters are keyed by (metric name, sorted label set). A series is
//! created lazily on its first increment and lives for the process
//! lifetime; values only ever go up. Label cardinality stays bounded
//! because operation names come from the registered route table and
//! status labels are a closed set, never raw request paths.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// Counter incremented once per handled HTTP request.
pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";

/// Key identifying one counter series.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SeriesKey {
    name: String,
    labels: Vec<(String, String)>,
}

impl SeriesKey {
    fn new(name: &str, labels: &[(&str, &str)]) -> Self {
        let mut labels: Vec<(String, String)> = labels
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        labels.sort();
        Self {
            name: name.to_string(),
            labels,
        }
    }
}

/// One series value as read at snapshot time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterSample {
    pub name: String,
    pub labels: Vec<(String, String)>,
    pub value: u64,
}

/// Process-wide set of named, labeled counters.
///
/// All mutation goes through [`MetricsRegistry::increment`]; there is
/// no way for external code to read-modify-write a counter directly.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    namespace: Option<String>,
    series: RwLock<HashMap<SeriesKey, Arc<AtomicU64>>>,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry whose metric names are prefixed with `namespace_`.
    pub fn with_namespace(namespace: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            series: RwLock::new(HashMap::new()),
        }
    }

    fn full_name(&self, name: &str) -> String {
        match &self.namespace {
            Some(ns) => format!("{ns}_{name}"),
            None => name.to_string(),
        }
    }

    /// Atomically add one to the counter identified by `(name,
    /// labels)`, creating the series with initial value 1 if absent.
    /// Safe under arbitrary concurrent callers.
    pub fn increment(&self, name: &str, labels: &[(&str, &str)]) {
        let key = SeriesKey::new(&self.full_name(name), labels);

        // Fast path: the series already exists.
        {
            let series = self.series.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(counter) = series.get(&key) {
                counter.fetch_add(1, Ordering::Relaxed);
                return;
            }
        }

        let mut series = self.series.write().unwrap_or_else(PoisonError::into_inner);
        series
            .entry(key)
            .or_insert_with(|| Arc::new(AtomicU64::new(0)))
            .fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time read of every series, sorted by name then labels.
    /// Each value is a single atomic load and never torn; no
    /// cross-series consistency is promised.
    pub fn snapshot(&self) -> Vec<CounterSample> {
        let series = self.series.read().unwrap_or_else(PoisonError::into_inner);
        let mut samples: Vec<CounterSample> = series
            .iter()
            .map(|(key, counter)| CounterSample {
                name: key.name.clone(),
                labels: key.labels.clone(),
                value: counter.load(Ordering::Relaxed),
            })
            .collect();
        drop(series);
        samples.sort_by(|a, b| (&a.name, &a.labels).cmp(&(&b.name, &b.labels)));
        samples
    }

    /// Render the exposition payload: one `name{k="v",...} count` line
    /// per series, newline-terminated.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for sample in self.snapshot() {
            out.push_str(&sample.name);
            if !sample.labels.is_empty() {
                out.push('{');
                for (i, (key, value)) in sample.labels.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    let _ = write!(out, "{key}=\"{value}\"");
                }
                out.push('}');
            }
            let _ = writeln!(out, " {}", sample.value);
        }
        out
    }

    /// Read one series value, mainly for assertions in tests.
    pub fn value(&self, name: &str, labels: &[(&str, &str)]) -> u64 {
        let key = SeriesKey::new(&self.full_name(name), labels);
        let series = self.series.read().unwrap_or_else(PoisonError::into_inner);
        series
            .get(&key)
            .map(|counter| counter.load(Ordering::Relaxed))
            .unwrap_or(0)
    }
}

/// Record the terminal counter for one HTTP request.
pub fn record_request(registry: &MetricsRegistry, operation: &str, method: &str, status: &str) {
    registry.increment(
        HTTP_REQUESTS_TOTAL,
        &[
            ("operation", operation),
            ("method", method),
            ("status", status),
        ],
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_series_created_on_first_increment() {
        let registry = MetricsRegistry::new();
        assert_eq!(registry.value("requests", &[("status", "200")]), 0);

        registry.increment("requests", &[("status", "200")]);
        assert_eq!(registry.value("requests", &[("status", "200")]), 1);

        registry.increment("requests", &[("status", "200")]);
        assert_eq!(registry.value("requests", &[("status", "200")]), 2);
    }

    #[test]
    fn test_label_order_does_not_split_series() {
        let registry = MetricsRegistry::new();
        registry.increment("requests", &[("a", "1"), ("b", "2")]);
        registry.increment("requests", &[("b", "2"), ("a", "1")]);
        assert_eq!(registry.value("requests", &[("a", "1"), ("b", "2")]), 2);
        assert_eq!(registry.snapshot().len(), 1);
    }

    #[test]
    fn test_distinct_label_values_are_distinct_series() {
        let registry = MetricsRegistry::new();
        registry.increment("requests", &[("status", "200")]);
        registry.increment("requests", &[("status", "500")]);
        assert_eq!(registry.value("requests", &[("status", "200")]), 1);
        assert_eq!(registry.value("requests", &[("status", "500")]), 1);
    }

    #[test]
    fn test_namespace_prefixes_metric_names() {
        let registry = MetricsRegistry::with_namespace("catalog");
        registry.increment("requests", &[]);
        let rendered = registry.render();
        assert_eq!(rendered, "catalog_requests 1\n");
    }

    #[test]
    fn test_render_format() {
        let registry = MetricsRegistry::new();
        registry.increment(
            HTTP_REQUESTS_TOTAL,
            &[
                ("operation", "item_detail"),
                ("method", "GET"),
                ("status", "200"),
            ],
        );

        let rendered = registry.render();
        assert_eq!(
            rendered,
            "http_requests_total{method=\"GET\",operation=\"item_detail\",status=\"200\"} 1\n"
        );
        assert!(rendered.ends_with('\n'));
    }

    #[test]
    fn test_snapshot_is_sorted_and_stable() {
        let registry = MetricsRegistry::new();
        registry.increment("zeta", &[]);
        registry.increment("alpha", &[("x", "2")]);
        registry.increment("alpha", &[("x", "1")]);

        let names: Vec<(String, Vec<(String, String)>)> = registry
            .snapshot()
            .into_iter()
            .map(|s| (s.name, s.labels))
            .collect();
        assert_eq!(names[0].0, "alpha");
        assert_eq!(names[0].1, vec![("x".to_string(), "1".to_string())]);
        assert_eq!(names[1].0, "alpha");
        assert_eq!(names[2].0, "zeta");
    }

    #[tokio::test]
    async fn test_no_lost_updates_under_concurrency() {
        let registry = Arc::new(MetricsRegistry::new());
        let tasks: u64 = 8;
        let per_task: u64 = 250;

        let handles: Vec<_> = (0..tasks)
            .map(|_| {
                let registry = registry.clone();
                tokio::spawn(async move {
                    for _ in 0..per_task {
                        record_request(&registry, "item_detail", "GET", "200");
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(
            registry.value(
                HTTP_REQUESTS_TOTAL,
                &[
                    ("operation", "item_detail"),
                    ("method", "GET"),
                    ("status", "200"),
                ],
            ),
            tasks * per_task
        );
    }

    #[test]
    fn test_concurrent_lazy_creation_of_many_series() {
        let registry = Arc::new(MetricsRegistry::new());
        let mut handles = Vec::new();
        for i in 0..4 {
            let registry = registry.clone();
            handles.push(std::thread::spawn(move || {
                for j in 0..50 {
                    let status = format!("{}", 200 + (j % 5));
                    registry.increment("requests", &[("status", &status), ("worker", &i.to_string())]);
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let total: u64 = registry.snapshot().iter().map(|s| s.value).sum();
        assert_eq!(total, 4 * 50);
    }
}
