//! Per-call option bags.
//!
//! All option types are plain values: every `with_*` method consumes the
//! receiver and returns an updated copy, so a shared base value can be
//! specialised without affecting other holders of it. Where two calls set
//! the same field the later one wins.

use std::collections::BTreeMap;
use std::ops::Range;

/// Options for `read_with`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadOptions {
    pub offset: Option<u64>,
    pub length: Option<u64>,
    /// Hint for chunked readers; the whole-object readers ignore it.
    pub buffer_size: Option<u32>,
}

impl ReadOptions {
    pub const fn empty() -> Self {
        Self {
            offset: None,
            length: None,
            buffer_size: None,
        }
    }

    #[must_use]
    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    #[must_use]
    pub fn with_length(mut self, length: u64) -> Self {
        self.length = Some(length);
        self
    }

    /// Set offset and length together, replacing both.
    #[must_use]
    pub fn with_range(mut self, offset: u64, length: u64) -> Self {
        self.offset = Some(offset);
        self.length = Some(length);
        self
    }

    #[must_use]
    pub fn with_buffer_size(mut self, buffer_size: u32) -> Self {
        self.buffer_size = Some(buffer_size);
        self
    }

    /// Resolve the requested range against an object of `size` bytes.
    ///
    /// The range is clamped to the object; an offset at or past the end
    /// yields an empty range.
    pub fn resolve(&self, size: u64) -> Range<u64> {
        let start = self.offset.unwrap_or(0).min(size);
        let end = match self.length {
            Some(length) => start.saturating_add(length).min(size),
            None => size,
        };
        start..end
    }
}

/// Options for `write_with`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOptions {
    pub content_type: Option<String>,
    pub content_disposition: Option<String>,
    pub cache_control: Option<String>,
    pub content_encoding: Option<String>,
    /// User metadata stored alongside the object
    pub metadata: BTreeMap<String, String>,
    /// Replace an existing object at the same path (default: true)
    pub overwrite: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self::empty()
    }
}

impl WriteOptions {
    pub const fn empty() -> Self {
        Self {
            content_type: None,
            content_disposition: None,
            cache_control: None,
            content_encoding: None,
            metadata: BTreeMap::new(),
            overwrite: true,
        }
    }

    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    #[must_use]
    pub fn with_content_disposition(mut self, disposition: impl Into<String>) -> Self {
        self.content_disposition = Some(disposition.into());
        self
    }

    #[must_use]
    pub fn with_cache_control(mut self, cache_control: impl Into<String>) -> Self {
        self.cache_control = Some(cache_control.into());
        self
    }

    #[must_use]
    pub fn with_content_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.content_encoding = Some(encoding.into());
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// True when any attribute beyond the payload itself is requested.
    pub fn has_attributes(&self) -> bool {
        self.content_type.is_some()
            || self.content_disposition.is_some()
            || self.cache_control.is_some()
            || self.content_encoding.is_some()
            || !self.metadata.is_empty()
    }
}

/// Options for `list_with`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    pub recursive: bool,
    pub limit: Option<u64>,
    /// Separator used to collapse deeper keys in non-recursive listings (default `/`)
    pub delimiter: Option<String>,
    /// Keep only entries whose name below the listed directory starts with this
    pub prefix: Option<String>,
    /// Keep only entries whose path sorts strictly after this
    pub start_after: Option<String>,
}

impl ListOptions {
    pub const DEFAULT_DELIMITER: &'static str = "/";

    pub const fn empty() -> Self {
        Self {
            recursive: false,
            limit: None,
            delimiter: None,
            prefix: None,
            start_after: None,
        }
    }

    #[must_use]
    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = Some(delimiter.into());
        self
    }

    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    #[must_use]
    pub fn with_start_after(mut self, start_after: impl Into<String>) -> Self {
        self.start_after = Some(start_after.into());
        self
    }

    pub fn delimiter(&self) -> &str {
        match self.delimiter.as_deref() {
            Some(d) if !d.is_empty() => d,
            _ => Self::DEFAULT_DELIMITER,
        }
    }
}

/// Options for `stat_with`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatOptions {
    /// Compute a content checksum
    pub checksum: bool,
    /// Return content type, etag and the other optional attributes (default: true)
    pub include_metadata: bool,
    /// Return the object version when the backend reports one
    pub version: bool,
}

impl Default for StatOptions {
    fn default() -> Self {
        Self::empty()
    }
}

impl StatOptions {
    pub const fn empty() -> Self {
        Self {
            checksum: false,
            include_metadata: true,
            version: false,
        }
    }

    #[must_use]
    pub fn with_checksum(mut self, checksum: bool) -> Self {
        self.checksum = checksum;
        self
    }

    #[must_use]
    pub fn with_include_metadata(mut self, include_metadata: bool) -> Self {
        self.include_metadata = include_metadata;
        self
    }

    #[must_use]
    pub fn with_version(mut self, version: bool) -> Self {
        self.version = version;
        self
    }
}
