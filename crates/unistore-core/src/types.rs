//! Values returned by operators.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::scheme::Scheme;

/// Metadata about a stored object
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    /// Size in bytes
    pub content_length: u64,
    pub content_type: Option<String>,
    /// ETag or other opaque content identifier
    pub etag: Option<String>,
    pub content_disposition: Option<String>,
    pub cache_control: Option<String>,
    pub content_encoding: Option<String>,
    pub last_modified: Option<DateTime<Utc>>,
    pub version: Option<String>,
    /// User metadata written with the object
    pub user_metadata: BTreeMap<String, String>,
    /// Hex SHA-256 of the content, only filled when requested
    pub checksum: Option<String>,
}

impl Metadata {
    pub fn new(content_length: u64) -> Self {
        Self {
            content_length,
            ..Default::default()
        }
    }

    /// Drop every optional attribute except the modification time.
    pub(crate) fn without_attributes(self) -> Self {
        Self {
            content_length: self.content_length,
            last_modified: self.last_modified,
            version: self.version,
            checksum: self.checksum,
            ..Default::default()
        }
    }
}

/// One listing result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub path: String,
    pub metadata: Metadata,
}

impl Entry {
    pub fn new(path: impl Into<String>, metadata: Metadata) -> Self {
        Self {
            path: path.into(),
            metadata,
        }
    }

    /// A directory placeholder (path ending in `/`).
    pub fn dir(path: impl Into<String>) -> Self {
        Self::new(path, Metadata::new(0))
    }

    pub fn is_dir(&self) -> bool {
        self.path.ends_with('/')
    }

    /// Last path segment, keeping a trailing `/` for directories.
    pub fn name(&self) -> &str {
        let trimmed = self.path.trim_end_matches('/');
        let start = trimmed.rfind('/').map(|i| i + 1).unwrap_or(0);
        &self.path[start..]
    }
}

/// A time-limited request that reaches the backend directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresignedRequest {
    /// HTTP method (GET, PUT, HEAD)
    pub method: String,
    pub uri: String,
    /// Headers the client must send with the request
    pub headers: BTreeMap<String, String>,
    pub expires_in: Duration,
}

/// Descriptive data about an operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorInfo {
    pub scheme: Scheme,
    /// Root path all operations are relative to
    pub root: String,
    /// Bucket, container or other backend name
    pub name: String,
}

/// What an operator can do, and which operations it emulates.
///
/// Emulated operations work but cost more than their native counterparts:
/// an emulated copy transfers the whole object through this process, and a
/// non-atomic rename can leave both paths populated if its delete phase
/// fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capability {
    pub read: bool,
    pub read_with_range: bool,
    pub write: bool,
    pub write_with_content_type: bool,
    pub write_with_user_metadata: bool,
    pub write_can_refuse_overwrite: bool,
    pub stat: bool,
    pub stat_with_version: bool,
    pub delete: bool,
    pub copy: bool,
    /// Copy is implemented as read + write
    pub copy_is_emulated: bool,
    pub rename: bool,
    /// Rename happens in a single backend step
    pub rename_is_atomic: bool,
    pub list: bool,
    pub list_recursive: bool,
    pub create_dir: bool,
    /// `remove_all` is implemented as list + delete-each
    pub remove_all_is_emulated: bool,
    /// Stat checksums are computed by reading the content
    pub checksum_is_emulated: bool,
    pub presign: bool,
    pub presign_read: bool,
    pub presign_write: bool,
    pub presign_stat: bool,
}
