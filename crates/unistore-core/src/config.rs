//! Operator configuration.
//!
//! A [`Configuration`] names a [`Scheme`], carries the backend's free-form
//! key/value settings and the retry policy, and is validated once before an
//! operator is built from it. Builder methods return a new value and leave
//! the original untouched.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::platform;
use crate::retry::RetryPolicy;
use crate::scheme::Scheme;
use crate::{Error, Result};

/// Backend selection plus settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    scheme: Scheme,

    /// Backend-specific settings (bucket, region, root, endpoint, ...)
    #[serde(default)]
    config: BTreeMap<String, String>,

    #[serde(default)]
    retry: RetryPolicy,

    /// Allow construction of the native engine operator (default: true)
    #[serde(default = "default_native_access")]
    native_access: bool,

    /// Engine platform selector; auto-detected when absent
    #[serde(default)]
    platform_override: Option<String>,
}

fn default_native_access() -> bool {
    true
}

impl Configuration {
    pub fn new(scheme: Scheme) -> Self {
        Self {
            scheme,
            config: BTreeMap::new(),
            retry: RetryPolicy::default(),
            native_access: default_native_access(),
            platform_override: None,
        }
    }

    /// Local filesystem rooted at `root`.
    pub fn filesystem(root: impl Into<String>) -> Self {
        Self::new(Scheme::Fs).with_config("root", root)
    }

    pub fn memory() -> Self {
        Self::new(Scheme::Memory)
    }

    pub fn s3(
        bucket: impl Into<String>,
        region: impl Into<String>,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Self {
        Self::new(Scheme::S3)
            .with_config("bucket", bucket)
            .with_config("region", region)
            .with_config("access_key_id", access_key_id)
            .with_config("secret_access_key", secret_access_key)
    }

    /// S3 API served from a custom endpoint (MinIO, Ceph RGW, R2, ...).
    pub fn s3_compatible(
        bucket: impl Into<String>,
        region: impl Into<String>,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self::s3(bucket, region, access_key_id, secret_access_key).with_config("endpoint", endpoint)
    }

    pub fn azure_blob(
        container: impl Into<String>,
        account_name: impl Into<String>,
        account_key: impl Into<String>,
    ) -> Self {
        Self::new(Scheme::Azblob)
            .with_config("container", container)
            .with_config("account_name", account_name)
            .with_config("account_key", account_key)
    }

    /// Google Cloud Storage. `service_account` is a path to a service account
    /// key file.
    pub fn gcs(
        bucket: impl Into<String>,
        service_account: impl Into<String>,
        project_id: impl Into<String>,
    ) -> Self {
        Self::new(Scheme::Gcs)
            .with_config("bucket", bucket)
            .with_config("service_account", service_account)
            .with_config("project_id", project_id)
    }

    /// Parse a configuration from a storage URL.
    ///
    /// Supported URL formats:
    /// - `s3://bucket-name/optional/root?region=us-east-1&endpoint=http://localhost:9000`
    /// - `azblob://container@account.blob.core.windows.net`
    /// - `gcs://bucket-name`
    /// - `file:///path/to/data`
    /// - `memory://`
    /// - `http://host/base`
    ///
    /// Query parameters are copied into the config map. Credentials are
    /// picked up from the usual environment variables when present.
    pub fn from_url(url: &str) -> Result<Self> {
        let parsed = url::Url::parse(url)?;
        let host = parsed.host_str().unwrap_or_default().to_string();
        let path = parsed.path().trim_start_matches('/').to_string();

        let mut cfg = match parsed.scheme() {
            "http" | "https" => Self::new(Scheme::Http).with_config("endpoint", url),
            "file" => Self::filesystem(parsed.path()),
            "memory" => Self::memory(),
            "s3" | "s3a" => {
                let region = std::env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string());
                let mut cfg = Self::new(Scheme::S3)
                    .with_config("bucket", host)
                    .with_config("region", region)
                    .with_env("access_key_id", "AWS_ACCESS_KEY_ID")
                    .with_env("secret_access_key", "AWS_SECRET_ACCESS_KEY");
                if !path.is_empty() {
                    cfg = cfg.with_config("root", path);
                }
                cfg
            }
            "azblob" | "azure" | "az" => {
                let account = host.split('.').next().unwrap_or_default().to_string();
                let container = if parsed.username().is_empty() {
                    path
                } else {
                    parsed.username().to_string()
                };
                Self::new(Scheme::Azblob)
                    .with_config("container", container)
                    .with_config("account_name", account)
                    .with_env("account_key", "AZURE_STORAGE_KEY")
            }
            "gcs" | "gs" => Self::new(Scheme::Gcs)
                .with_config("bucket", host)
                .with_env("service_account", "GOOGLE_APPLICATION_CREDENTIALS"),
            other => {
                let scheme: Scheme = other.parse()?;
                let mut cfg = Self::new(scheme);
                if !host.is_empty() {
                    cfg = cfg.with_config("endpoint", host);
                }
                cfg
            }
        };

        for (key, value) in parsed.query_pairs() {
            cfg = cfg.with_config(key.into_owned(), value.into_owned());
        }

        Ok(cfg)
    }

    /// Parse a YAML document such as:
    ///
    /// ```yaml
    /// scheme: s3
    /// config:
    ///   bucket: my-bucket
    ///   region: us-east-1
    /// retry:
    ///   max_attempts: 5
    /// ```
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Check the required keys for the scheme are present and non-blank.
    ///
    /// Extra keys are passed through to the backend untouched.
    pub fn validate(&self) -> Result<()> {
        for key in self.scheme.required_config_keys() {
            let present = self
                .config
                .get(*key)
                .is_some_and(|value| !value.trim().is_empty());
            if !present {
                return Err(Error::invalid_config(format!(
                    "missing required configuration key '{}' for scheme {}",
                    key, self.scheme
                )));
            }
        }

        if self.retry.max_attempts == 0 {
            return Err(Error::invalid_config("retry max_attempts must be at least 1"));
        }

        Ok(())
    }

    #[must_use]
    pub fn with_config(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    #[must_use]
    pub fn without_retry(self) -> Self {
        self.with_retry_policy(RetryPolicy::none())
    }

    #[must_use]
    pub fn with_native_access(mut self, enabled: bool) -> Self {
        self.native_access = enabled;
        self
    }

    #[must_use]
    pub fn with_platform_override(mut self, platform: impl Into<String>) -> Self {
        self.platform_override = Some(platform.into());
        self
    }

    fn with_env(self, key: &str, var: &str) -> Self {
        match std::env::var(var) {
            Ok(value) if !value.is_empty() => self.with_config(key, value),
            _ => self,
        }
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.config.get(key).map(String::as_str)
    }

    pub fn config(&self) -> &BTreeMap<String, String> {
        &self.config
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    pub fn native_access(&self) -> bool {
        self.native_access
    }

    pub fn platform_override(&self) -> Option<&str> {
        self.platform_override.as_deref()
    }

    /// The override if set, otherwise the auto-detected platform.
    pub fn platform(&self) -> String {
        self.platform_override
            .clone()
            .unwrap_or_else(platform::current)
    }
}
