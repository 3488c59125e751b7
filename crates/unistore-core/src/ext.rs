//! Convenience helpers over any [`Operator`].

use std::time::Duration;

use bytes::Bytes;

use crate::operator::Operator;
use crate::types::PresignedRequest;
use crate::{Error, ErrorKind, Result};

/// Write a UTF-8 string.
pub async fn write_text(op: &dyn Operator, path: &str, text: &str) -> Result<()> {
    op.write(path, Bytes::copy_from_slice(text.as_bytes())).await
}

/// Read an object as a UTF-8 string.
pub async fn read_text(op: &dyn Operator, path: &str) -> Result<String> {
    decode(path, op.read(path).await?)
}

/// Read `length` bytes at `offset` as a UTF-8 string.
///
/// The range is in bytes, so it must not split a multi-byte character.
pub async fn read_text_range(
    op: &dyn Operator,
    path: &str,
    offset: u64,
    length: u64,
) -> Result<String> {
    decode(path, op.read_range(path, offset, length).await?)
}

/// Presign a read with the expiry given in seconds.
pub async fn presign_read_secs(op: &dyn Operator, path: &str, secs: u64) -> Result<PresignedRequest> {
    op.presign_read(path, Duration::from_secs(secs)).await
}

/// Presign a write with the expiry given in seconds.
pub async fn presign_write_secs(op: &dyn Operator, path: &str, secs: u64) -> Result<PresignedRequest> {
    op.presign_write(path, Duration::from_secs(secs)).await
}

/// Presign a stat with the expiry given in seconds.
pub async fn presign_stat_secs(op: &dyn Operator, path: &str, secs: u64) -> Result<PresignedRequest> {
    op.presign_stat(path, Duration::from_secs(secs)).await
}

fn decode(path: &str, data: Bytes) -> Result<String> {
    String::from_utf8(data.to_vec()).map_err(|e| {
        Error::new(ErrorKind::Unknown, format!("{} is not valid UTF-8", path)).with_source(e)
    })
}
