//! Label types for Prometheus metrics.

use prometheus_client::encoding::EncodeLabelSet;

use crate::ErrorKind;

/// Operator calls that get their own metric series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Read,
    Write,
    Stat,
    Exists,
    Delete,
    Copy,
    Rename,
    CreateDir,
    List,
    RemoveAll,
    Presign,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Read => "read",
            OperationKind::Write => "write",
            OperationKind::Stat => "stat",
            OperationKind::Exists => "exists",
            OperationKind::Delete => "delete",
            OperationKind::Copy => "copy",
            OperationKind::Rename => "rename",
            OperationKind::CreateDir => "create_dir",
            OperationKind::List => "list",
            OperationKind::RemoveAll => "remove_all",
            OperationKind::Presign => "presign",
        }
    }
}

/// Labels for per-operation latency and call counts.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct OperationLabels {
    pub backend: String,
    pub operation: String,
}

impl OperationLabels {
    pub fn new(backend: impl Into<String>, operation: OperationKind) -> Self {
        Self {
            backend: backend.into(),
            operation: operation.as_str().to_string(),
        }
    }
}

/// Labels for byte counters.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct BytesLabels {
    pub backend: String,
}

impl BytesLabels {
    pub fn new(backend: impl Into<String>) -> Self {
        Self {
            backend: backend.into(),
        }
    }
}

/// Labels for failed operations, by classified error kind.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct ErrorLabels {
    pub backend: String,
    pub operation: String,
    pub kind: String,
}

impl ErrorLabels {
    pub fn new(backend: impl Into<String>, operation: OperationKind, kind: ErrorKind) -> Self {
        Self {
            backend: backend.into(),
            operation: operation.as_str().to_string(),
            kind: kind.as_str().to_string(),
        }
    }
}
