//! Operator metrics.
//!
//! - [`labels`] - Label types for Prometheus metrics dimensions
//! - [`registry`] - The [`OperatorMetrics`] registry
//! - [`instrumented_operator`] - Operator decorator that records into the registry
//!
//! ```rust,ignore
//! use unistore_core::metrics::{create_instrumented_operator, OperatorMetrics};
//!
//! let metrics = Arc::new(OperatorMetrics::new());
//! let op = create_instrumented_operator(&config, metrics.clone())?;
//! op.write("a.txt", Bytes::from("a")).await?;
//! println!("{}", metrics.encode());
//! ```

pub mod instrumented_operator;
pub mod labels;
pub mod registry;

pub use instrumented_operator::{create_instrumented_operator, InstrumentedOperator};
pub use labels::{BytesLabels, ErrorLabels, OperationKind, OperationLabels};
pub use registry::{OperatorMetrics, TimerGuard};
