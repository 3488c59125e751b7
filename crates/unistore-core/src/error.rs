//! Error types for the unified storage layer.
//!
//! Every failure crossing the [`Operator`](crate::Operator) boundary is an
//! [`Error`] carrying one of the closed set of [`ErrorKind`]s. Retry
//! decisions are made purely from the kind.

use std::fmt;

use thiserror::Error;

/// Result type alias using the library's Error type.
pub type Result<T> = std::result::Result<T, Error>;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Closed classification of storage failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The path does not exist
    NotFound,
    /// Connection-level failure talking to the backend
    Network,
    /// The backend reported a transient server-side condition
    Temporary,
    /// Credentials were rejected or access was denied
    Unauthorized,
    /// The configuration is missing or carries invalid values
    InvalidConfig,
    /// The backend or operator cannot perform the requested operation
    UnsupportedOperation,
    /// Anything the classifier could not place
    Unknown,
}

/// Coarse grouping of error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Retrying will not help
    Permanent,
    /// Retrying may succeed
    Transient,
    /// The configuration must be fixed before anything can succeed
    Configuration,
}

const NOT_FOUND_TOKENS: &[&str] = &["not found", "does not exist", "nosuchfile", "notfound", "404"];
const NETWORK_TOKENS: &[&str] = &["connection", "network", "timeout", "unreachable"];
const TEMPORARY_TOKENS: &[&str] = &["500", "502", "503", "temporary"];
const UNAUTHORIZED_TOKENS: &[&str] = &["unauthorized", "forbidden", "401", "403", "access denied"];

impl ErrorKind {
    pub const ALL: [ErrorKind; 7] = [
        ErrorKind::NotFound,
        ErrorKind::Network,
        ErrorKind::Temporary,
        ErrorKind::Unauthorized,
        ErrorKind::InvalidConfig,
        ErrorKind::UnsupportedOperation,
        ErrorKind::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::Network => "network",
            ErrorKind::Temporary => "temporary",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::InvalidConfig => "invalid_config",
            ErrorKind::UnsupportedOperation => "unsupported_operation",
            ErrorKind::Unknown => "unknown",
        }
    }

    /// Whether a failure of this kind is worth retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            ErrorKind::NotFound
            | ErrorKind::Unauthorized
            | ErrorKind::InvalidConfig
            | ErrorKind::UnsupportedOperation => false,
            ErrorKind::Network | ErrorKind::Temporary | ErrorKind::Unknown => true,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ErrorKind::NotFound | ErrorKind::Unauthorized | ErrorKind::UnsupportedOperation => {
                ErrorCategory::Permanent
            }
            ErrorKind::InvalidConfig => ErrorCategory::Configuration,
            ErrorKind::Network | ErrorKind::Temporary | ErrorKind::Unknown => {
                ErrorCategory::Transient
            }
        }
    }

    /// Classify a raw backend failure message.
    ///
    /// Token groups are checked in a fixed order and the first match wins:
    /// not-found, network, temporary, unauthorized. A message mentioning both
    /// "not found" and "timeout" is therefore `NotFound`.
    pub fn classify(message: &str) -> Self {
        let lower = message.to_lowercase();
        let matches = |tokens: &[&str]| tokens.iter().any(|t| lower.contains(t));

        if matches(NOT_FOUND_TOKENS) {
            ErrorKind::NotFound
        } else if matches(NETWORK_TOKENS) {
            ErrorKind::Network
        } else if matches(TEMPORARY_TOKENS) {
            ErrorKind::Temporary
        } else if matches(UNAUTHORIZED_TOKENS) {
            ErrorKind::Unauthorized
        } else {
            ErrorKind::Unknown
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Main error type for the storage layer.
#[derive(Error, Debug)]
#[error("{kind}: {message}")]
pub struct Error {
    kind: ErrorKind,
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl Error {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Attach the underlying cause.
    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Build an error from a raw backend failure, classifying its message.
    pub fn from_raw_failure(message: impl Into<String>, cause: Option<BoxError>) -> Self {
        let message = message.into();
        Self {
            kind: ErrorKind::classify(&message),
            message,
            source: cause,
        }
    }

    pub fn not_found(path: &str) -> Self {
        Self::new(ErrorKind::NotFound, format!("path not found: {}", path))
    }

    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidConfig, message)
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnsupportedOperation, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == ErrorKind::NotFound
    }

    /// Prefix the message with the operation and path that failed.
    pub(crate) fn context(mut self, operation: &str, path: &str) -> Self {
        self.message = format!("{} {} failed: {}", operation, path, self.message);
        self
    }
}

impl From<object_store::Error> for Error {
    fn from(err: object_store::Error) -> Self {
        use object_store::Error as StoreError;

        let kind = match &err {
            StoreError::NotFound { .. } => Some(ErrorKind::NotFound),
            StoreError::PermissionDenied { .. } | StoreError::Unauthenticated { .. } => {
                Some(ErrorKind::Unauthorized)
            }
            StoreError::NotSupported { .. } | StoreError::NotImplemented => {
                Some(ErrorKind::UnsupportedOperation)
            }
            // Create-only writes that hit an existing object; retrying cannot succeed.
            StoreError::AlreadyExists { .. } | StoreError::Precondition { .. } => {
                Some(ErrorKind::UnsupportedOperation)
            }
            _ => None,
        };

        let message = err.to_string();
        match kind {
            Some(kind) => Error::new(kind, message).with_source(err),
            None => Error::from_raw_failure(message, Some(Box::new(err))),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => {
                Error::new(ErrorKind::NotFound, err.to_string()).with_source(err)
            }
            std::io::ErrorKind::PermissionDenied => {
                Error::new(ErrorKind::Unauthorized, err.to_string()).with_source(err)
            }
            _ => Error::from_raw_failure(err.to_string(), Some(Box::new(err))),
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::invalid_config(format!("invalid storage URL: {}", err)).with_source(err)
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::invalid_config(format!("invalid configuration: {}", err)).with_source(err)
    }
}
