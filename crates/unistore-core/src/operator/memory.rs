//! In-memory operator for testing.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;
use sha2::{Digest, Sha256};

use super::{collect_listing, dir_prefix, validate_key, Operator};
use crate::config::Configuration;
use crate::options::{ListOptions, ReadOptions, StatOptions, WriteOptions};
use crate::scheme::Scheme;
use crate::types::{Capability, Entry, Metadata, OperatorInfo, PresignedRequest};
use crate::{Error, Result};

/// Content type reported for objects written without one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug, Clone)]
struct StoredObject {
    data: Bytes,
    attributes: WriteOptions,
}

/// Deterministic operator backed by an ordered in-process map.
///
/// Nothing here can fail transiently, so there is no error classification and
/// no retrying. Individual operations are atomic with respect to each other;
/// `rename` (copy then delete) is not.
pub struct MemoryOperator {
    scheme: Scheme,
    objects: RwLock<BTreeMap<String, StoredObject>>,
}

impl MemoryOperator {
    pub fn new(config: &Configuration) -> Self {
        Self {
            scheme: config.scheme(),
            objects: RwLock::new(BTreeMap::new()),
        }
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }

    fn path_etag(path: &str) -> String {
        let digest = Sha256::digest(path.as_bytes());
        format!("\"{}\"", &hex::encode(digest)[..32])
    }

    fn metadata_for(path: &str, object: &StoredObject) -> Metadata {
        let attrs = &object.attributes;
        Metadata {
            content_length: object.data.len() as u64,
            content_type: Some(
                attrs
                    .content_type
                    .clone()
                    .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
            ),
            etag: Some(Self::path_etag(path)),
            content_disposition: attrs.content_disposition.clone(),
            cache_control: attrs.cache_control.clone(),
            content_encoding: attrs.content_encoding.clone(),
            user_metadata: attrs.metadata.clone(),
            ..Default::default()
        }
    }

    fn unsupported_presign(path: &str) -> Error {
        Error::unsupported(format!("presign is not supported by the memory operator: {}", path))
    }
}

impl Default for MemoryOperator {
    fn default() -> Self {
        Self::new(&Configuration::memory())
    }
}

#[async_trait]
impl Operator for MemoryOperator {
    fn info(&self) -> OperatorInfo {
        OperatorInfo {
            scheme: self.scheme,
            root: "/".to_string(),
            name: "memory".to_string(),
        }
    }

    fn capabilities(&self) -> Capability {
        Capability {
            read: true,
            read_with_range: true,
            write: true,
            write_with_content_type: true,
            write_with_user_metadata: true,
            write_can_refuse_overwrite: true,
            stat: true,
            delete: true,
            copy: true,
            rename: true,
            list: true,
            list_recursive: true,
            create_dir: true,
            ..Default::default()
        }
    }

    async fn read_with(&self, path: &str, opts: ReadOptions) -> Result<Bytes> {
        validate_key(path)?;
        let objects = self.objects.read();
        let object = objects.get(path).ok_or_else(|| Error::not_found(path))?;
        let range = opts.resolve(object.data.len() as u64);
        Ok(object.data.slice(range.start as usize..range.end as usize))
    }

    async fn write_with(&self, path: &str, data: Bytes, opts: WriteOptions) -> Result<()> {
        validate_key(path)?;
        let mut objects = self.objects.write();
        if !opts.overwrite && objects.contains_key(path) {
            return Err(Error::unsupported(format!(
                "{} already exists and overwrite is disabled",
                path
            )));
        }
        objects.insert(
            path.to_string(),
            StoredObject {
                data,
                attributes: opts,
            },
        );
        Ok(())
    }

    async fn stat_with(&self, path: &str, opts: StatOptions) -> Result<Metadata> {
        validate_key(path)?;
        let objects = self.objects.read();
        let object = objects.get(path).ok_or_else(|| Error::not_found(path))?;

        let mut metadata = Self::metadata_for(path, object);
        if opts.checksum {
            metadata.checksum = Some(hex::encode(Sha256::digest(&object.data)));
        }
        if !opts.include_metadata {
            metadata = metadata.without_attributes();
        }
        Ok(metadata)
    }

    async fn delete(&self, path: &str) -> Result<()> {
        validate_key(path)?;
        self.objects.write().remove(path);
        Ok(())
    }

    async fn copy(&self, from: &str, to: &str) -> Result<()> {
        validate_key(from)?;
        validate_key(to)?;
        let object = self
            .objects
            .read()
            .get(from)
            .cloned()
            .ok_or_else(|| Error::not_found(from))?;
        self.objects.write().insert(to.to_string(), object);
        Ok(())
    }

    async fn create_dir(&self, _path: &str) -> Result<()> {
        Ok(())
    }

    async fn list_with(&self, path: &str, opts: ListOptions) -> Result<Vec<Entry>> {
        let dir = dir_prefix(path);
        let objects = self.objects.read();
        let matching = objects
            .range(dir.clone()..)
            .take_while(|(key, _)| key.starts_with(&dir))
            .map(|(key, object)| (key.clone(), Self::metadata_for(key, object)));

        Ok(collect_listing(&dir, matching, &opts))
    }

    async fn remove_all(&self, path: &str) -> Result<()> {
        let dir = dir_prefix(path);
        self.objects.write().retain(|key, _| !key.starts_with(&dir));
        Ok(())
    }

    async fn presign_read(&self, path: &str, _expire: Duration) -> Result<PresignedRequest> {
        Err(Self::unsupported_presign(path))
    }

    async fn presign_write(&self, path: &str, _expire: Duration) -> Result<PresignedRequest> {
        Err(Self::unsupported_presign(path))
    }

    async fn presign_stat(&self, path: &str, _expire: Duration) -> Result<PresignedRequest> {
        Err(Self::unsupported_presign(path))
    }
}
