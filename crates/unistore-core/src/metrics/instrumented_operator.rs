//! Instrumented operator decorator.
//!
//! Wraps any [`Operator`] and records latency, bytes transferred, and
//! classified errors for every call.

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use std::time::Duration;

use super::labels::OperationKind;
use super::registry::{OperatorMetrics, TimerGuard};
use crate::config::Configuration;
use crate::operator::{create_operator, Operator};
use crate::options::{ListOptions, ReadOptions, StatOptions, WriteOptions};
use crate::types::{Capability, Entry, Metadata, OperatorInfo, PresignedRequest};
use crate::Result;

/// An operator wrapper that records metrics for all operations.
///
/// ```rust,ignore
/// use unistore_core::{create_operator, Configuration};
/// use unistore_core::metrics::{InstrumentedOperator, OperatorMetrics};
///
/// let metrics = Arc::new(OperatorMetrics::new());
/// let op = InstrumentedOperator::new(create_operator(&Configuration::memory())?, metrics);
/// ```
pub struct InstrumentedOperator {
    inner: Arc<dyn Operator>,

    /// Backend name for metric labels, taken from the inner scheme.
    backend: String,

    metrics: Arc<OperatorMetrics>,
}

impl InstrumentedOperator {
    pub fn new(inner: Arc<dyn Operator>, metrics: Arc<OperatorMetrics>) -> Self {
        let backend = inner.info().scheme.as_str().to_string();
        Self {
            inner,
            backend,
            metrics,
        }
    }

    pub fn backend_name(&self) -> &str {
        &self.backend
    }

    pub fn inner(&self) -> &Arc<dyn Operator> {
        &self.inner
    }

    fn timer(&self, operation: OperationKind) -> TimerGuard<'_> {
        TimerGuard::start(&self.metrics, &self.backend, operation)
    }

    fn record<T>(&self, operation: OperationKind, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            self.metrics.inc_error(&self.backend, operation, e.kind());
        }
        result
    }
}

#[async_trait]
impl Operator for InstrumentedOperator {
    fn info(&self) -> OperatorInfo {
        self.inner.info()
    }

    fn capabilities(&self) -> Capability {
        self.inner.capabilities()
    }

    async fn read_with(&self, path: &str, opts: ReadOptions) -> Result<Bytes> {
        let _timer = self.timer(OperationKind::Read);
        let result = self.inner.read_with(path, opts).await;
        if let Ok(data) = &result {
            self.metrics.inc_read_bytes(&self.backend, data.len() as u64);
        }
        self.record(OperationKind::Read, result)
    }

    async fn write_with(&self, path: &str, data: Bytes, opts: WriteOptions) -> Result<()> {
        let _timer = self.timer(OperationKind::Write);
        let len = data.len() as u64;
        let result = self.inner.write_with(path, data, opts).await;
        if result.is_ok() {
            self.metrics.inc_write_bytes(&self.backend, len);
        }
        self.record(OperationKind::Write, result)
    }

    async fn stat_with(&self, path: &str, opts: StatOptions) -> Result<Metadata> {
        let _timer = self.timer(OperationKind::Stat);
        let result = self.inner.stat_with(path, opts).await;
        self.record(OperationKind::Stat, result)
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        let _timer = self.timer(OperationKind::Exists);
        let result = self.inner.exists(path).await;
        self.record(OperationKind::Exists, result)
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let _timer = self.timer(OperationKind::Delete);
        let result = self.inner.delete(path).await;
        self.record(OperationKind::Delete, result)
    }

    async fn copy(&self, from: &str, to: &str) -> Result<()> {
        let _timer = self.timer(OperationKind::Copy);
        let result = self.inner.copy(from, to).await;
        self.record(OperationKind::Copy, result)
    }

    async fn rename(&self, from: &str, to: &str) -> Result<()> {
        let _timer = self.timer(OperationKind::Rename);
        let result = self.inner.rename(from, to).await;
        self.record(OperationKind::Rename, result)
    }

    async fn create_dir(&self, path: &str) -> Result<()> {
        let _timer = self.timer(OperationKind::CreateDir);
        let result = self.inner.create_dir(path).await;
        self.record(OperationKind::CreateDir, result)
    }

    async fn list_with(&self, path: &str, opts: ListOptions) -> Result<Vec<Entry>> {
        let _timer = self.timer(OperationKind::List);
        let result = self.inner.list_with(path, opts).await;
        self.record(OperationKind::List, result)
    }

    async fn remove_all(&self, path: &str) -> Result<()> {
        let _timer = self.timer(OperationKind::RemoveAll);
        let result = self.inner.remove_all(path).await;
        self.record(OperationKind::RemoveAll, result)
    }

    async fn presign_read(&self, path: &str, expire: Duration) -> Result<PresignedRequest> {
        let _timer = self.timer(OperationKind::Presign);
        let result = self.inner.presign_read(path, expire).await;
        self.record(OperationKind::Presign, result)
    }

    async fn presign_write(&self, path: &str, expire: Duration) -> Result<PresignedRequest> {
        let _timer = self.timer(OperationKind::Presign);
        let result = self.inner.presign_write(path, expire).await;
        self.record(OperationKind::Presign, result)
    }

    async fn presign_stat(&self, path: &str, expire: Duration) -> Result<PresignedRequest> {
        let _timer = self.timer(OperationKind::Presign);
        let result = self.inner.presign_stat(path, expire).await;
        self.record(OperationKind::Presign, result)
    }
}

/// Create a native operator from configuration and wrap it with metrics.
pub fn create_instrumented_operator(
    config: &Configuration,
    metrics: Arc<OperatorMetrics>,
) -> Result<Arc<dyn Operator>> {
    let inner = create_operator(config)?;
    Ok(Arc::new(InstrumentedOperator::new(inner, metrics)))
}
