//! Operator backed by the `object_store` engine.

use std::collections::BTreeMap;
use std::future::Future;
use std::path::{Path as FsPath, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::TryStreamExt;
use http::Method;
use object_store::aws::{AmazonS3Builder, AmazonS3ConfigKey};
use object_store::azure::{AzureConfigKey, MicrosoftAzureBuilder};
use object_store::gcp::{GoogleCloudStorageBuilder, GoogleConfigKey};
use object_store::http::HttpBuilder;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path;
use object_store::signer::Signer;
use object_store::{
    Attribute, Attributes, GetOptions, GetRange, ObjectMeta, ObjectStore, PutMode, PutOptions,
    PutPayload,
};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use super::{collect_listing, dir_prefix, remove_listed, validate_key, Operator};
use crate::config::Configuration;
use crate::engine;
use crate::options::{ListOptions, ReadOptions, StatOptions, WriteOptions};
use crate::retry::{with_retry, RetryPolicy};
use crate::scheme::Scheme;
use crate::types::{Capability, Entry, Metadata, OperatorInfo, PresignedRequest};
use crate::{Error, ErrorKind, Result};

/// Production operator.
///
/// Holds one engine handle, shared read-only by all concurrent callers.
/// Every engine call goes through the configured [`RetryPolicy`]: failures
/// are classified and retried while their kind is retryable.
///
/// Operations the engine lacks are emulated on top of simpler calls and
/// flagged in [`Capability`]:
///
/// - `remove_all` lists then deletes each entry
/// - `copy` falls back to read + write when the backend refuses a native copy
/// - `rename` is copy + delete except on the local filesystem
/// - stat checksums read the whole object
/// - create-only writes on S3 check for the object first (racy)
///
/// Release the handle with [`NativeOperator::close`], or use
/// [`NativeOperator::scoped`] to have it released on every exit path.
pub struct NativeOperator {
    store: Arc<dyn ObjectStore>,
    signer: Option<Arc<dyn Signer>>,
    info: OperatorInfo,
    capability: Capability,
    retry: RetryPolicy,
    /// Key prefix applied to every path (object stores only)
    root: Option<Path>,
    /// Directory backing the `fs` scheme
    local_root: Option<PathBuf>,
}

struct EngineHandle {
    store: Arc<dyn ObjectStore>,
    signer: Option<Arc<dyn Signer>>,
    local_root: Option<PathBuf>,
}

impl NativeOperator {
    /// Validate the configuration and open an engine handle for it.
    pub fn new(config: &Configuration) -> Result<Self> {
        config.validate()?;

        if !config.native_access() {
            return Err(Error::invalid_config(
                "native engine access is disabled for this configuration",
            ));
        }

        let engine = engine::ensure_loaded(config.platform_override());
        let handle = open_engine(config)?;
        let op = Self::assemble(config, handle)?;

        info!(
            "Created {} operator for {} (root: {}, platform: {})",
            op.info.scheme, op.info.name, op.info.root, engine.platform
        );
        Ok(op)
    }

    /// Wrap an already opened store.
    #[cfg(test)]
    pub(crate) fn from_store(config: &Configuration, store: Arc<dyn ObjectStore>) -> Result<Self> {
        Self::assemble(
            config,
            EngineHandle {
                store,
                signer: None,
                local_root: None,
            },
        )
    }

    fn assemble(config: &Configuration, handle: EngineHandle) -> Result<Self> {
        let scheme = config.scheme();
        let root = match scheme {
            Scheme::Fs | Scheme::Memory | Scheme::Http => None,
            _ => config
                .get("root")
                .map(|r| r.trim_matches('/'))
                .filter(|r| !r.is_empty())
                .map(|r| {
                    Path::parse(r).map_err(|e| {
                        Error::invalid_config(format!("invalid root '{}': {}", r, e)).with_source(e)
                    })
                })
                .transpose()?,
        };

        let info = OperatorInfo {
            scheme,
            root: config
                .get("root")
                .map(str::to_string)
                .unwrap_or_else(|| "/".to_string()),
            name: backend_name(config),
        };

        Ok(Self {
            capability: capabilities_for(scheme, handle.signer.is_some()),
            store: handle.store,
            signer: handle.signer,
            info,
            retry: config.retry_policy().clone(),
            root,
            local_root: handle.local_root,
        })
    }

    /// Open an operator, run `f` with it, and close it afterwards whether `f`
    /// succeeded or not.
    pub async fn scoped<T, F, Fut>(config: &Configuration, f: F) -> Result<T>
    where
        F: FnOnce(Arc<NativeOperator>) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let op = Arc::new(Self::new(config)?);
        let result = f(op.clone()).await;

        match Arc::try_unwrap(op) {
            Ok(op) => op.close(),
            Err(shared) => warn!(
                "{} operator still referenced after scope exit ({} handles); released when the last one drops",
                shared.info.scheme,
                Arc::strong_count(&shared)
            ),
        }

        result
    }

    /// Release the engine handle. Never fails.
    pub fn close(self) {
        info!("Closed {} operator for {}", self.info.scheme, self.info.name);
    }

    /// Build the engine path for a key. Keys are kept as written; keys the
    /// engine cannot hold verbatim are rejected.
    fn full_path(&self, key: &str) -> Result<Path> {
        validate_key(key)?;
        let location = Path::parse(key).map_err(|e| {
            Error::invalid_config(format!("invalid object path '{}': {}", key, e)).with_source(e)
        })?;
        Ok(match &self.root {
            Some(root) => root.parts().chain(location.parts()).collect(),
            None => location,
        })
    }

    /// Engine prefix for a listing directory (`""` or ending in `/`).
    fn dir_path(&self, dir: &str) -> Result<Option<Path>> {
        if dir.is_empty() {
            return Ok(self.root.clone());
        }
        let location = Path::parse(dir.trim_end_matches('/')).map_err(|e| {
            Error::invalid_config(format!("invalid directory '{}': {}", dir, e)).with_source(e)
        })?;
        Ok(Some(match &self.root {
            Some(root) => root.parts().chain(location.parts()).collect(),
            None => location,
        }))
    }

    /// Strip the root from an engine path to get the key
    fn key_of(&self, location: &Path) -> String {
        let full = location.to_string();
        match &self.root {
            Some(root) => full
                .strip_prefix(&format!("{}/", root))
                .unwrap_or(&full)
                .to_string(),
            None => full,
        }
    }

    /// Run one engine call under the retry policy.
    async fn call<T, F, Fut>(&self, operation: &str, path: &str, f: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        debug!("{} {}: {}", self.info.scheme, operation, path);
        with_retry(&self.retry, operation, f)
            .await
            .map_err(|e| e.context(operation, path))
    }

    async fn get_once(&self, location: &Path, opts: &ReadOptions) -> Result<Bytes> {
        let range = match (opts.offset, opts.length) {
            (None, None) => None,
            (Some(offset), None) => Some(GetRange::Offset(offset as usize)),
            (offset, Some(length)) => {
                let start = offset.unwrap_or(0) as usize;
                Some(GetRange::Bounded(start..start.saturating_add(length as usize)))
            }
        };
        let ranged = range.is_some();
        let options = GetOptions {
            range,
            ..Default::default()
        };

        match self.store.get_opts(location, options).await {
            Ok(result) => Ok(result.bytes().await?),
            Err(e) if ranged && !matches!(e, object_store::Error::NotFound { .. }) => {
                // A range starting at or past the end is empty, not an error.
                let meta = self.store.head(location).await?;
                if opts.offset.unwrap_or(0) >= meta.size as u64 {
                    Ok(Bytes::new())
                } else {
                    Err(e.into())
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    fn attributes_for(&self, path: &str, opts: &WriteOptions) -> Attributes {
        let mut attributes = Attributes::new();
        if !opts.has_attributes() {
            return attributes;
        }
        if !self.capability.write_with_content_type {
            debug!(
                "{} cannot store object attributes, dropping them for {}",
                self.info.scheme, path
            );
            return attributes;
        }

        let fields = [
            (Attribute::ContentType, &opts.content_type),
            (Attribute::ContentDisposition, &opts.content_disposition),
            (Attribute::CacheControl, &opts.cache_control),
            (Attribute::ContentEncoding, &opts.content_encoding),
        ];
        for (attribute, value) in fields {
            if let Some(value) = value {
                attributes.insert(attribute, value.clone().into());
            }
        }
        if self.capability.write_with_user_metadata {
            for (key, value) in &opts.metadata {
                attributes.insert(Attribute::Metadata(key.clone().into()), value.clone().into());
            }
        }
        attributes
    }

    async fn presign(&self, method: Method, path: &str, expire: Duration) -> Result<PresignedRequest> {
        let signer = self.signer.as_ref().ok_or_else(|| {
            Error::unsupported(format!(
                "presign is not supported by the {} backend",
                self.info.scheme
            ))
        })?;

        let location = self.full_path(path)?;
        let location = &location;
        let method_ref = &method;
        let url = self
            .call("presign", path, || async move {
                Ok(signer.signed_url(method_ref.clone(), location, expire).await?)
            })
            .await?;

        Ok(PresignedRequest {
            method: method.to_string(),
            uri: url.to_string(),
            headers: BTreeMap::new(),
            expires_in: expire,
        })
    }

    /// Remove directories left empty under `dir` on the local filesystem.
    async fn prune_local_dirs(&self, dir: &str) {
        let Some(root) = &self.local_root else {
            return;
        };
        let target = root.join(dir.trim_matches('/'));
        let keep_target = dir.is_empty();

        let outcome =
            tokio::task::spawn_blocking(move || prune_empty_dirs(&target, keep_target)).await;
        match outcome {
            Ok(Ok(_)) => {}
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {}
            Ok(Err(e)) => debug!("Failed to prune empty directories under {}: {}", dir, e),
            Err(e) => debug!("Directory pruning task failed: {}", e),
        }
    }
}

#[async_trait]
impl Operator for NativeOperator {
    fn info(&self) -> OperatorInfo {
        self.info.clone()
    }

    fn capabilities(&self) -> Capability {
        self.capability
    }

    async fn read_with(&self, path: &str, opts: ReadOptions) -> Result<Bytes> {
        if opts.length == Some(0) {
            self.stat_with(path, StatOptions::empty().with_include_metadata(false))
                .await?;
            return Ok(Bytes::new());
        }

        let location = self.full_path(path)?;
        let location = &location;
        let opts = &opts;
        self.call("read", path, || async move { self.get_once(location, opts).await })
            .await
    }

    async fn write_with(&self, path: &str, data: Bytes, opts: WriteOptions) -> Result<()> {
        let mode = if opts.overwrite {
            PutMode::Overwrite
        } else if self.capability.write_can_refuse_overwrite {
            PutMode::Create
        } else {
            if self.exists(path).await? {
                return Err(Error::unsupported(format!(
                    "{} already exists and overwrite is disabled",
                    path
                )));
            }
            PutMode::Overwrite
        };

        let put_options = PutOptions {
            mode,
            attributes: self.attributes_for(path, &opts),
            ..Default::default()
        };

        let location = self.full_path(path)?;
        let location = &location;
        let put_options = &put_options;
        let data = &data;
        self.call("write", path, || async move {
            let payload = PutPayload::from_bytes(data.clone());
            self.store
                .put_opts(location, payload, put_options.clone())
                .await?;
            Ok(())
        })
        .await
    }

    async fn stat_with(&self, path: &str, opts: StatOptions) -> Result<Metadata> {
        let location = self.full_path(path)?;
        let location = &location;
        let mut metadata = self
            .call("stat", path, || async move {
                let options = GetOptions {
                    head: true,
                    ..Default::default()
                };
                let result = self.store.get_opts(location, options).await?;
                Ok(metadata_from(&result.meta, &result.attributes))
            })
            .await?;

        if !opts.version {
            metadata.version = None;
        }
        if opts.checksum {
            let data = self.read(path).await?;
            metadata.checksum = Some(hex::encode(Sha256::digest(&data)));
        }
        if !opts.include_metadata {
            metadata = metadata.without_attributes();
        }
        Ok(metadata)
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let location = self.full_path(path)?;
        let location = &location;
        self.call("delete", path, || async move {
            match self.store.delete(location).await {
                Ok(()) | Err(object_store::Error::NotFound { .. }) => Ok(()),
                Err(e) => Err(e.into()),
            }
        })
        .await
    }

    async fn copy(&self, from: &str, to: &str) -> Result<()> {
        let source = self.full_path(from)?;
        let dest = self.full_path(to)?;
        let (source, dest) = (&source, &dest);

        let native = self
            .call("copy", from, || async move {
                Ok(self.store.copy(source, dest).await?)
            })
            .await;

        match native {
            Err(e) if e.kind() == ErrorKind::UnsupportedOperation => {
                debug!(
                    "{} has no native copy, copying {} -> {} through memory",
                    self.info.scheme, from, to
                );
                let data = self.read(from).await?;
                self.write(to, data).await
            }
            other => other,
        }
    }

    async fn rename(&self, from: &str, to: &str) -> Result<()> {
        if !self.capability.rename_is_atomic {
            self.copy(from, to).await?;
            return self.delete(from).await;
        }

        let source = self.full_path(from)?;
        let dest = self.full_path(to)?;
        let (source, dest) = (&source, &dest);
        self.call("rename", from, || async move {
            Ok(self.store.rename(source, dest).await?)
        })
        .await
    }

    async fn create_dir(&self, path: &str) -> Result<()> {
        let Some(root) = &self.local_root else {
            return Ok(());
        };

        let dir = root.join(path.trim_matches('/'));
        let dir = &dir;
        self.call("create_dir", path, || async move {
            Ok(tokio::fs::create_dir_all(dir).await?)
        })
        .await
    }

    async fn list_with(&self, path: &str, opts: ListOptions) -> Result<Vec<Entry>> {
        let dir = dir_prefix(path);
        let prefix = self.dir_path(&dir)?;
        let prefix = prefix.as_ref();

        let listed = if !opts.recursive && opts.delimiter() == ListOptions::DEFAULT_DELIMITER {
            self.call("list", path, || async move {
                let listing = self.store.list_with_delimiter(prefix).await?;
                let mut items: Vec<(String, Metadata)> = listing
                    .objects
                    .iter()
                    .map(|meta| (self.key_of(&meta.location), metadata_from(meta, &Attributes::new())))
                    .collect();
                items.extend(
                    listing
                        .common_prefixes
                        .iter()
                        .map(|p| (format!("{}/", self.key_of(p)), Metadata::new(0))),
                );
                Ok(items)
            })
            .await
        } else {
            let offset = opts.start_after.as_deref().and_then(|s| self.full_path(s).ok());
            let offset = offset.as_ref();
            self.call("list", path, || async move {
                let stream = match offset {
                    Some(offset) => self.store.list_with_offset(prefix, offset),
                    None => self.store.list(prefix),
                };
                let metas: Vec<ObjectMeta> = stream.try_collect().await?;
                Ok(metas
                    .iter()
                    .map(|meta| (self.key_of(&meta.location), metadata_from(meta, &Attributes::new())))
                    .collect())
            })
            .await
        };

        let mut items = match listed {
            Ok(items) => items,
            Err(e) if e.is_not_found() => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };
        items.sort_by(|a, b| a.0.cmp(&b.0));

        Ok(collect_listing(&dir, items, &opts))
    }

    async fn remove_all(&self, path: &str) -> Result<()> {
        remove_listed(self, path).await?;
        self.prune_local_dirs(&dir_prefix(path)).await;
        Ok(())
    }

    async fn presign_read(&self, path: &str, expire: Duration) -> Result<PresignedRequest> {
        self.presign(Method::GET, path, expire).await
    }

    async fn presign_write(&self, path: &str, expire: Duration) -> Result<PresignedRequest> {
        self.presign(Method::PUT, path, expire).await
    }

    async fn presign_stat(&self, path: &str, expire: Duration) -> Result<PresignedRequest> {
        self.presign(Method::HEAD, path, expire).await
    }
}

fn open_engine(config: &Configuration) -> Result<EngineHandle> {
    let scheme = config.scheme();
    let unhandled = |e: object_store::Error| {
        Error::from_raw_failure(
            format!("failed to open {} backend: {}", scheme, e),
            Some(e.into()),
        )
    };

    let handle = match scheme {
        Scheme::Memory => EngineHandle {
            store: Arc::new(InMemory::new()),
            signer: None,
            local_root: None,
        },
        Scheme::Fs => {
            let root = PathBuf::from(required(config, "root")?);
            std::fs::create_dir_all(&root)?;
            let store = LocalFileSystem::new_with_prefix(&root).map_err(unhandled)?;
            EngineHandle {
                store: Arc::new(store),
                signer: None,
                local_root: Some(root),
            }
        }
        Scheme::S3 => {
            let mut builder = AmazonS3Builder::new()
                .with_bucket_name(required(config, "bucket")?)
                .with_region(required(config, "region")?);

            if let Some(endpoint) = config.get("endpoint") {
                builder = builder
                    .with_endpoint(endpoint)
                    .with_virtual_hosted_style_request(false);
                if endpoint.starts_with("http://") {
                    builder = builder.with_allow_http(true);
                }
            }
            if let Some(key) = config.get("access_key_id") {
                builder = builder.with_access_key_id(key);
            }
            if let Some(secret) = config.get("secret_access_key") {
                builder = builder.with_secret_access_key(secret);
            }
            if let Some(token) = config.get("session_token") {
                builder = builder.with_token(token);
            }
            for (key, value) in passthrough::<AmazonS3ConfigKey>(
                config,
                &["bucket", "region", "endpoint", "access_key_id", "secret_access_key", "session_token"],
            ) {
                builder = builder.with_config(key, value);
            }

            let store = Arc::new(builder.build().map_err(unhandled)?);
            EngineHandle {
                store: store.clone(),
                signer: Some(store),
                local_root: None,
            }
        }
        Scheme::Azblob => {
            let mut builder = MicrosoftAzureBuilder::new()
                .with_account(required(config, "account_name")?)
                .with_container_name(required(config, "container")?);

            if let Some(endpoint) = config.get("endpoint") {
                builder = builder.with_endpoint(endpoint.to_string());
            }
            if let Some(sas) = config.get("sas_token") {
                builder = builder.with_sas_authorization(parse_sas_token(sas));
            } else if let Some(key) = config.get("account_key") {
                builder = builder.with_access_key(key);
            } else if let Some(secret) = config.get("client_secret") {
                if let Some(client_id) = config.get("client_id") {
                    builder = builder.with_client_id(client_id);
                }
                if let Some(tenant_id) = config.get("tenant_id") {
                    builder = builder.with_tenant_id(tenant_id);
                }
                builder = builder.with_client_secret(secret);
            }
            for (key, value) in passthrough::<AzureConfigKey>(
                config,
                &[
                    "account_name",
                    "container",
                    "endpoint",
                    "sas_token",
                    "account_key",
                    "client_id",
                    "tenant_id",
                    "client_secret",
                ],
            ) {
                builder = builder.with_config(key, value);
            }

            let store = Arc::new(builder.build().map_err(unhandled)?);
            EngineHandle {
                store: store.clone(),
                signer: Some(store),
                local_root: None,
            }
        }
        Scheme::Gcs => {
            let mut builder =
                GoogleCloudStorageBuilder::new().with_bucket_name(required(config, "bucket")?);

            if let Some(path) = config.get("service_account") {
                builder = builder.with_service_account_path(path);
            }
            if let Some(key) = config.get("credential") {
                builder = builder.with_service_account_key(key);
            }
            for (key, value) in passthrough::<GoogleConfigKey>(
                config,
                &["bucket", "service_account", "credential", "project_id"],
            ) {
                builder = builder.with_config(key, value);
            }

            let store = Arc::new(builder.build().map_err(unhandled)?);
            EngineHandle {
                store: store.clone(),
                signer: Some(store),
                local_root: None,
            }
        }
        Scheme::Http => {
            let store = HttpBuilder::new()
                .with_url(required(config, "endpoint")?)
                .build()
                .map_err(unhandled)?;
            EngineHandle {
                store: Arc::new(store),
                signer: None,
                local_root: None,
            }
        }
        other => {
            return Err(Error::unsupported(format!(
                "no engine adapter for the {} scheme",
                other
            )))
        }
    };

    Ok(handle)
}

fn required<'a>(config: &'a Configuration, key: &str) -> Result<&'a str> {
    config.get(key).ok_or_else(|| {
        Error::invalid_config(format!(
            "missing required configuration key '{}' for scheme {}",
            key,
            config.scheme()
        ))
    })
}

/// Extra config keys the engine recognises for this backend; `root` and the
/// keys already applied are skipped, unrecognised keys are ignored.
fn passthrough<K: FromStr>(config: &Configuration, handled: &[&str]) -> Vec<(K, String)> {
    config
        .config()
        .iter()
        .filter(|(key, _)| key.as_str() != "root" && !handled.contains(&key.as_str()))
        .filter_map(|(key, value)| match key.parse::<K>() {
            Ok(parsed) => Some((parsed, value.clone())),
            Err(_) => {
                debug!("Ignoring configuration key not used by the engine: {}", key);
                None
            }
        })
        .collect()
}

/// Split a SAS query string into key/value pairs.
fn parse_sas_token(sas: &str) -> Vec<(String, String)> {
    sas.trim_start_matches('?')
        .split('&')
        .filter_map(|pair| {
            let mut parts = pair.splitn(2, '=');
            match (parts.next(), parts.next()) {
                (Some(k), Some(v)) => Some((k.to_string(), v.to_string())),
                _ => None,
            }
        })
        .collect()
}

fn backend_name(config: &Configuration) -> String {
    let key = match config.scheme() {
        Scheme::Fs => "root",
        Scheme::Azblob => "container",
        Scheme::Http => "endpoint",
        Scheme::Memory => return "memory".to_string(),
        _ => "bucket",
    };
    config.get(key).unwrap_or_default().to_string()
}

fn capabilities_for(scheme: Scheme, has_signer: bool) -> Capability {
    let stores_attributes = matches!(
        scheme,
        Scheme::S3 | Scheme::Azblob | Scheme::Gcs | Scheme::Memory
    );

    Capability {
        read: true,
        read_with_range: true,
        write: true,
        write_with_content_type: stores_attributes,
        write_with_user_metadata: stores_attributes,
        write_can_refuse_overwrite: !matches!(scheme, Scheme::S3 | Scheme::Http),
        stat: true,
        stat_with_version: matches!(scheme, Scheme::S3 | Scheme::Azblob | Scheme::Gcs),
        delete: true,
        copy: true,
        copy_is_emulated: false,
        rename: true,
        rename_is_atomic: scheme == Scheme::Fs,
        list: true,
        list_recursive: true,
        create_dir: true,
        remove_all_is_emulated: true,
        checksum_is_emulated: true,
        presign: has_signer,
        presign_read: has_signer,
        presign_write: has_signer,
        presign_stat: has_signer,
    }
}

fn attribute(attributes: &Attributes, key: &Attribute) -> Option<String> {
    attributes.get(key).map(|value| {
        let value: &str = value.as_ref();
        value.to_string()
    })
}

fn metadata_from(meta: &ObjectMeta, attributes: &Attributes) -> Metadata {
    let mut user_metadata = BTreeMap::new();
    for (key, value) in attributes.iter() {
        if let Attribute::Metadata(name) = key {
            let value: &str = value.as_ref();
            user_metadata.insert(name.to_string(), value.to_string());
        }
    }

    Metadata {
        content_length: meta.size as u64,
        content_type: attribute(attributes, &Attribute::ContentType),
        etag: meta.e_tag.clone(),
        content_disposition: attribute(attributes, &Attribute::ContentDisposition),
        cache_control: attribute(attributes, &Attribute::CacheControl),
        content_encoding: attribute(attributes, &Attribute::ContentEncoding),
        last_modified: Some(meta.last_modified),
        version: meta.version.clone(),
        user_metadata,
        checksum: None,
    }
}

/// Remove empty directories below `dir`, bottom-up. Returns whether `dir`
/// itself ended up empty (and was removed unless `keep_dir`).
fn prune_empty_dirs(dir: &FsPath, keep_dir: bool) -> std::io::Result<bool> {
    let mut empty = true;
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            if !prune_empty_dirs(&entry.path(), false)? {
                empty = false;
            }
        } else {
            empty = false;
        }
    }
    if empty && !keep_dir {
        std::fs::remove_dir(dir)?;
    }
    Ok(empty)
}
