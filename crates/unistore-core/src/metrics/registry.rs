//! Prometheus metrics registry for operators.

use parking_lot::RwLock;
use prometheus_client::encoding::text::encode;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::histogram::Histogram;
use prometheus_client::registry::Registry;
use std::time::Instant;

use super::labels::{BytesLabels, ErrorLabels, OperationKind, OperationLabels};
use crate::ErrorKind;

/// Operation latency histogram buckets (in seconds).
/// Covers local calls (1ms) up to slow cloud requests with retries (30s).
const LATENCY_BUCKETS: [f64; 11] = [
    0.001, 0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 10.0, 30.0,
];

/// Prometheus metrics for operator calls.
pub struct OperatorMetrics {
    registry: RwLock<Registry>,

    /// Call latency by backend and operation, retries included.
    pub operation_latency_seconds: Family<OperationLabels, Histogram>,

    /// Completed calls by backend and operation.
    pub operations_total: Family<OperationLabels, Counter>,

    /// Cumulative bytes returned by reads.
    pub read_bytes_total: Family<BytesLabels, Counter>,

    /// Cumulative bytes accepted by writes.
    pub write_bytes_total: Family<BytesLabels, Counter>,

    /// Failed calls by classified error kind.
    pub errors_total: Family<ErrorLabels, Counter>,
}

impl Default for OperatorMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl OperatorMetrics {
    pub fn new() -> Self {
        let mut registry = Registry::default();

        let operation_latency_seconds =
            Family::<OperationLabels, Histogram>::new_with_constructor(|| {
                Histogram::new(LATENCY_BUCKETS.iter().cloned())
            });
        let operations_total = Family::<OperationLabels, Counter>::default();
        let read_bytes_total = Family::<BytesLabels, Counter>::default();
        let write_bytes_total = Family::<BytesLabels, Counter>::default();
        let errors_total = Family::<ErrorLabels, Counter>::default();

        registry.register(
            "unistore_operation_latency_seconds",
            "Operator call latency in seconds",
            operation_latency_seconds.clone(),
        );
        registry.register(
            "unistore_operations",
            "Operator calls completed",
            operations_total.clone(),
        );
        registry.register(
            "unistore_read_bytes",
            "Bytes read through operators",
            read_bytes_total.clone(),
        );
        registry.register(
            "unistore_write_bytes",
            "Bytes written through operators",
            write_bytes_total.clone(),
        );
        registry.register(
            "unistore_errors",
            "Operator calls that failed, by error kind",
            errors_total.clone(),
        );

        Self {
            registry: RwLock::new(registry),
            operation_latency_seconds,
            operations_total,
            read_bytes_total,
            write_bytes_total,
            errors_total,
        }
    }

    /// Record one completed call.
    pub fn record_operation(&self, backend: &str, operation: OperationKind, latency_secs: f64) {
        let labels = OperationLabels::new(backend, operation);
        self.operation_latency_seconds
            .get_or_create(&labels)
            .observe(latency_secs);
        self.operations_total.get_or_create(&labels).inc();
    }

    pub fn inc_read_bytes(&self, backend: &str, bytes: u64) {
        self.read_bytes_total
            .get_or_create(&BytesLabels::new(backend))
            .inc_by(bytes);
    }

    pub fn inc_write_bytes(&self, backend: &str, bytes: u64) {
        self.write_bytes_total
            .get_or_create(&BytesLabels::new(backend))
            .inc_by(bytes);
    }

    pub fn inc_error(&self, backend: &str, operation: OperationKind, kind: ErrorKind) {
        let labels = ErrorLabels::new(backend, operation, kind);
        self.errors_total.get_or_create(&labels).inc();
    }

    /// Encode all metrics to Prometheus text format.
    pub fn encode(&self) -> String {
        let registry = self.registry.read();
        let mut buffer = String::new();
        if encode(&mut buffer, &registry).is_err() {
            return String::new();
        }
        buffer
    }
}

/// Records the latency of one call when dropped.
pub struct TimerGuard<'a> {
    metrics: &'a OperatorMetrics,
    backend: &'a str,
    operation: OperationKind,
    start: Instant,
}

impl<'a> TimerGuard<'a> {
    pub fn start(metrics: &'a OperatorMetrics, backend: &'a str, operation: OperationKind) -> Self {
        Self {
            metrics,
            backend,
            operation,
            start: Instant::now(),
        }
    }
}

impl Drop for TimerGuard<'_> {
    fn drop(&mut self) {
        let latency = self.start.elapsed().as_secs_f64();
        self.metrics
            .record_operation(self.backend, self.operation, latency);
    }
}
