//! The operator contract and its implementations.
//!
//! - **NativeOperator**: backed by the `object_store` engine (S3, Azure Blob,
//!   GCS, HTTP, local filesystem, in-memory), with classified errors and
//!   retries
//! - **MemoryOperator**: a deterministic in-process map for tests
//!
//! Both implement [`Operator`], so callers can swap one for the other.

mod memory;
mod native;

pub use memory::MemoryOperator;
pub use native::NativeOperator;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::warn;

use crate::config::Configuration;
use crate::options::{ListOptions, ReadOptions, StatOptions, WriteOptions};
use crate::types::{Capability, Entry, Metadata, OperatorInfo, PresignedRequest};
use crate::{Error, Result};

/// Uniform access to one configured storage backend.
///
/// Operations fall into five groups:
///
/// - **basic**: `read`, `write`, `stat`, `delete`
/// - **files**: `copy`, `rename`, `exists`
/// - **directories**: `list`, `create_dir`, `remove_all`
/// - **presign**: `presign_read`, `presign_write`, `presign_stat`
/// - **info**: `info`, `capabilities`
///
/// A path ending in `/` names a directory-like prefix. Calls are independent;
/// there is no session state and no ordering between concurrent calls.
#[async_trait]
pub trait Operator: Send + Sync {
    fn info(&self) -> OperatorInfo;

    fn capabilities(&self) -> Capability;

    /// Read the object, or the byte range selected by `opts`.
    ///
    /// Fails with `NotFound` if the path does not exist.
    async fn read_with(&self, path: &str, opts: ReadOptions) -> Result<Bytes>;

    async fn read(&self, path: &str) -> Result<Bytes> {
        self.read_with(path, ReadOptions::empty()).await
    }

    /// Read `length` bytes starting at `offset`.
    async fn read_range(&self, path: &str, offset: u64, length: u64) -> Result<Bytes> {
        self.read_with(path, ReadOptions::empty().with_range(offset, length))
            .await
    }

    async fn write_with(&self, path: &str, data: Bytes, opts: WriteOptions) -> Result<()>;

    /// Write the object, replacing any existing content.
    async fn write(&self, path: &str, data: Bytes) -> Result<()> {
        self.write_with(path, data, WriteOptions::empty()).await
    }

    async fn stat_with(&self, path: &str, opts: StatOptions) -> Result<Metadata>;

    async fn stat(&self, path: &str) -> Result<Metadata> {
        self.stat_with(path, StatOptions::empty()).await
    }

    /// Delete the object. Deleting a missing path succeeds.
    async fn delete(&self, path: &str) -> Result<()>;

    /// Copy `from` to `to`, overwriting `to`.
    async fn copy(&self, from: &str, to: &str) -> Result<()>;

    /// Move `from` to `to`.
    ///
    /// Unless [`Capability::rename_is_atomic`] is set this is a copy followed
    /// by a delete. If the copy fails `from` is untouched. If the delete
    /// fails, its error is returned and both paths exist.
    async fn rename(&self, from: &str, to: &str) -> Result<()> {
        self.copy(from, to).await?;
        self.delete(from).await
    }

    /// Whether the path exists. Only `NotFound` is turned into `false`.
    async fn exists(&self, path: &str) -> Result<bool> {
        match self.stat(path).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Create a directory. A no-op on backends without directories.
    async fn create_dir(&self, path: &str) -> Result<()>;

    async fn list_with(&self, path: &str, opts: ListOptions) -> Result<Vec<Entry>>;

    /// List the entries directly below `path`.
    async fn list(&self, path: &str) -> Result<Vec<Entry>> {
        self.list_with(path, ListOptions::empty()).await
    }

    /// Delete everything below `path`.
    ///
    /// Best-effort: a failed delete does not stop the remaining ones, and the
    /// last failure is returned.
    async fn remove_all(&self, path: &str) -> Result<()> {
        remove_listed(self, path).await
    }

    async fn presign_read(&self, path: &str, expire: Duration) -> Result<PresignedRequest>;

    async fn presign_write(&self, path: &str, expire: Duration) -> Result<PresignedRequest>;

    async fn presign_stat(&self, path: &str, expire: Duration) -> Result<PresignedRequest>;
}

/// Build a native operator from a configuration.
///
/// The configuration is validated first; a failed validation never produces
/// an operator.
pub fn create_operator(config: &Configuration) -> Result<Arc<dyn Operator>> {
    Ok(Arc::new(NativeOperator::new(config)?))
}

/// Build an in-memory operator. Never fails.
pub fn create_test_operator(config: &Configuration) -> Arc<dyn Operator> {
    Arc::new(MemoryOperator::new(config))
}

/// The prefix a listing or removal under `path` covers: `""` for the root,
/// otherwise `path` with a trailing `/`.
pub(crate) fn dir_prefix(path: &str) -> String {
    if path.is_empty() || path == "/" {
        String::new()
    } else if path.ends_with('/') {
        path.to_string()
    } else {
        format!("{}/", path)
    }
}

/// Check that `path` names an object every backend can store verbatim.
///
/// Keys are opaque, but empty segments (leading, trailing or doubled `/`),
/// `.` and `..` segments and control characters cannot be kept as written
/// by path based engines, so they are refused rather than rewritten.
pub(crate) fn validate_key(path: &str) -> Result<()> {
    let invalid = |reason: &str| {
        Error::invalid_config(format!("invalid object path '{}': {}", path, reason))
    };

    if path.is_empty() {
        return Err(invalid("empty path"));
    }
    for segment in path.split('/') {
        if segment.is_empty() {
            return Err(invalid("empty segment"));
        }
        if segment == "." || segment == ".." {
            return Err(invalid("relative segment"));
        }
        if segment.chars().any(|c| c.is_ascii_control()) {
            return Err(invalid("control character"));
        }
    }
    Ok(())
}

/// Turn full object paths below `dir` into listing entries.
///
/// Applies, in order: the name prefix filter, non-recursive collapsing of
/// deeper keys into one `dir/child/` entry, `start_after`, and `limit`.
/// Input order is preserved.
pub(crate) fn collect_listing<I>(dir: &str, objects: I, opts: &ListOptions) -> Vec<Entry>
where
    I: IntoIterator<Item = (String, Metadata)>,
{
    let delimiter = opts.delimiter();
    let limit = opts.limit.map(|l| l as usize).unwrap_or(usize::MAX);
    let mut seen_dirs = HashSet::new();
    let mut entries = Vec::new();

    for (path, metadata) in objects {
        if entries.len() >= limit {
            break;
        }

        let Some(rest) = path.strip_prefix(dir) else {
            continue;
        };
        if rest.is_empty() {
            continue;
        }
        if let Some(prefix) = opts.prefix.as_deref() {
            if !rest.starts_with(prefix) {
                continue;
            }
        }

        let entry = match rest.find(delimiter) {
            Some(idx) if !opts.recursive => {
                let child = format!("{}{}", dir, &rest[..idx + delimiter.len()]);
                if !seen_dirs.insert(child.clone()) {
                    continue;
                }
                Entry::dir(child)
            }
            _ => Entry::new(path.clone(), metadata),
        };

        if let Some(start_after) = opts.start_after.as_deref() {
            if entry.path.as_str() <= start_after {
                continue;
            }
        }

        entries.push(entry);
    }

    entries
}

/// List everything below `path` and delete each entry, continuing past
/// failures and returning the last one.
pub(crate) async fn remove_listed<O>(op: &O, path: &str) -> Result<()>
where
    O: Operator + ?Sized,
{
    let entries = op
        .list_with(path, ListOptions::empty().with_recursive(true))
        .await?;

    let mut last_error: Option<Error> = None;
    for entry in entries {
        if let Err(e) = op.delete(&entry.path).await {
            warn!("remove_all {}: failed to delete {}: {}", path, entry.path, e);
            last_error = Some(e);
        }
    }

    match last_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
