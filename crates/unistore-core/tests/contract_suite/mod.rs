//! Contract tests for unistore-core.

pub mod classification;
pub mod configuration;
pub mod properties;
pub mod scenario;
