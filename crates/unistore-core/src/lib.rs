//! Unified storage access layer.
//!
//! One [`Operator`] contract over many storage backends (local filesystem,
//! in-memory, S3, Azure Blob, GCS, HTTP, ...), with a closed error taxonomy,
//! retry orchestration driven by that taxonomy, and validated configuration.
//!
//! ```rust,ignore
//! use unistore_core::{create_operator, Configuration, Operator};
//!
//! let config = Configuration::filesystem("/var/data");
//! let op = create_operator(&config)?;
//! op.write("hello.txt", Bytes::from("Hello, World!")).await?;
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod ext;
pub mod metrics;
pub mod operator;
pub mod options;
pub mod platform;
pub mod retry;
pub mod scheme;
pub mod types;

pub use config::Configuration;
pub use error::{Error, ErrorCategory, ErrorKind, Result};
pub use operator::{
    create_operator, create_test_operator, MemoryOperator, NativeOperator, Operator,
};
pub use options::{ListOptions, ReadOptions, StatOptions, WriteOptions};
pub use retry::{with_retry, RetryPolicy};
pub use scheme::Scheme;
pub use types::{Capability, Entry, Metadata, OperatorInfo, PresignedRequest};
