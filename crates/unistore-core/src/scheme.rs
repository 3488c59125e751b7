//! Registry of supported backend schemes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Identifier of one storage backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    /// Local POSIX filesystem
    Fs,
    /// Process-local memory
    Memory,
    /// AWS S3 and S3-compatible services
    S3,
    /// Azure Blob Storage
    Azblob,
    /// Google Cloud Storage
    Gcs,
    /// Read-only HTTP server
    Http,
    Webdav,
    Ftp,
    Sftp,
    Hdfs,
    Redis,
    Rocksdb,
    Sled,
    Postgresql,
    Mysql,
    Mongodb,
    /// GitHub Actions cache
    Ghac,
    Ipfs,
    /// Aliyun OSS
    Oss,
    /// Tencent COS
    Cos,
    /// Huawei OBS
    Obs,
    Dropbox,
    Onedrive,
    Gdrive,
}

impl Scheme {
    pub const ALL: [Scheme; 24] = [
        Scheme::Fs,
        Scheme::Memory,
        Scheme::S3,
        Scheme::Azblob,
        Scheme::Gcs,
        Scheme::Http,
        Scheme::Webdav,
        Scheme::Ftp,
        Scheme::Sftp,
        Scheme::Hdfs,
        Scheme::Redis,
        Scheme::Rocksdb,
        Scheme::Sled,
        Scheme::Postgresql,
        Scheme::Mysql,
        Scheme::Mongodb,
        Scheme::Ghac,
        Scheme::Ipfs,
        Scheme::Oss,
        Scheme::Cos,
        Scheme::Obs,
        Scheme::Dropbox,
        Scheme::Onedrive,
        Scheme::Gdrive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Fs => "fs",
            Scheme::Memory => "memory",
            Scheme::S3 => "s3",
            Scheme::Azblob => "azblob",
            Scheme::Gcs => "gcs",
            Scheme::Http => "http",
            Scheme::Webdav => "webdav",
            Scheme::Ftp => "ftp",
            Scheme::Sftp => "sftp",
            Scheme::Hdfs => "hdfs",
            Scheme::Redis => "redis",
            Scheme::Rocksdb => "rocksdb",
            Scheme::Sled => "sled",
            Scheme::Postgresql => "postgresql",
            Scheme::Mysql => "mysql",
            Scheme::Mongodb => "mongodb",
            Scheme::Ghac => "ghac",
            Scheme::Ipfs => "ipfs",
            Scheme::Oss => "oss",
            Scheme::Cos => "cos",
            Scheme::Obs => "obs",
            Scheme::Dropbox => "dropbox",
            Scheme::Onedrive => "onedrive",
            Scheme::Gdrive => "gdrive",
        }
    }

    /// Configuration keys that must be present before an operator is built.
    pub fn required_config_keys(&self) -> &'static [&'static str] {
        match self {
            Scheme::Fs => &["root"],
            Scheme::Memory => &[],
            Scheme::S3 => &["bucket", "region"],
            Scheme::Azblob => &["container", "account_name"],
            Scheme::Gcs => &["bucket"],
            Scheme::Http => &["endpoint"],
            Scheme::Webdav => &["endpoint"],
            Scheme::Ftp => &["endpoint"],
            Scheme::Sftp => &["endpoint"],
            Scheme::Hdfs => &["name_node"],
            Scheme::Redis => &["endpoint"],
            Scheme::Rocksdb => &["datadir"],
            Scheme::Sled => &["datadir"],
            Scheme::Postgresql => &["connection_string", "table"],
            Scheme::Mysql => &["connection_string", "table"],
            Scheme::Mongodb => &["connection_string", "database", "collection"],
            Scheme::Ghac => &[],
            Scheme::Ipfs => &["endpoint"],
            Scheme::Oss => &["bucket", "endpoint"],
            Scheme::Cos => &["bucket", "endpoint"],
            Scheme::Obs => &["bucket", "endpoint"],
            Scheme::Dropbox => &["access_token"],
            Scheme::Onedrive => &["access_token"],
            Scheme::Gdrive => &["access_token"],
        }
    }

    /// Whether the backend can issue presigned requests.
    pub fn supports_presign(&self) -> bool {
        matches!(
            self,
            Scheme::S3 | Scheme::Azblob | Scheme::Gcs | Scheme::Oss | Scheme::Cos | Scheme::Obs
        )
    }

    /// Whether the backend needs credentials to be reached.
    pub fn requires_auth(&self) -> bool {
        !matches!(
            self,
            Scheme::Fs
                | Scheme::Memory
                | Scheme::Http
                | Scheme::Rocksdb
                | Scheme::Sled
                | Scheme::Ipfs
        )
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scheme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.to_lowercase();
        let scheme = match lower.as_str() {
            "file" => Scheme::Fs,
            "azure" | "az" => Scheme::Azblob,
            "gs" => Scheme::Gcs,
            "s3a" => Scheme::S3,
            other => Scheme::ALL
                .iter()
                .copied()
                .find(|scheme| scheme.as_str() == other)
                .ok_or_else(|| Error::invalid_config(format!("unknown scheme: {}", s)))?,
        };
        Ok(scheme)
    }
}
