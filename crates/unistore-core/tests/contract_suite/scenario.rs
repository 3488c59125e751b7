//! End-to-end scenarios.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use unistore_core::ext::{read_text, read_text_range, write_text};
use unistore_core::{
    Capability, Configuration, Entry, Error, ErrorKind, ListOptions, MemoryOperator, Metadata,
    NativeOperator, Operator, OperatorInfo, PresignedRequest, ReadOptions, Result, StatOptions,
    WriteOptions,
};

use super::helpers::all_operators;

#[tokio::test]
async fn test_hello_scenario() {
    for t in all_operators() {
        t.op.write("hello.txt", Bytes::from("Hello, World!")).await.unwrap();

        assert_eq!(t.op.stat("hello.txt").await.unwrap().content_length, 13, "{}", t.label);
        assert!(t.op.exists("hello.txt").await.unwrap(), "{}", t.label);
        assert!(!t.op.exists("missing.txt").await.unwrap(), "{}", t.label);
        assert_eq!(
            t.op.read_range("hello.txt", 7, 5).await.unwrap(),
            Bytes::from("World"),
            "{}",
            t.label
        );
    }
}

#[tokio::test]
async fn test_text_helpers() {
    for t in all_operators() {
        write_text(t.op.as_ref(), "notes/today.md", "# Notes\nship it")
            .await
            .unwrap();
        assert_eq!(
            read_text(t.op.as_ref(), "notes/today.md").await.unwrap(),
            "# Notes\nship it"
        );
        assert_eq!(
            read_text_range(t.op.as_ref(), "notes/today.md", 2, 5).await.unwrap(),
            "Notes"
        );
    }
}

#[tokio::test]
async fn test_scoped_native_operator() {
    let written = NativeOperator::scoped(&Configuration::memory(), |op| async move {
        op.write("scoped.txt", Bytes::from("inside")).await?;
        op.read("scoped.txt").await
    })
    .await
    .unwrap();
    assert_eq!(written, Bytes::from("inside"));
}

/// Memory operator whose deletes fail for paths containing `locked`.
struct LockedDeletes {
    inner: MemoryOperator,
    delete_calls: AtomicU32,
}

#[async_trait]
impl Operator for LockedDeletes {
    fn info(&self) -> OperatorInfo {
        self.inner.info()
    }

    fn capabilities(&self) -> Capability {
        self.inner.capabilities()
    }

    async fn read_with(&self, path: &str, opts: ReadOptions) -> Result<Bytes> {
        self.inner.read_with(path, opts).await
    }

    async fn write_with(&self, path: &str, data: Bytes, opts: WriteOptions) -> Result<()> {
        self.inner.write_with(path, data, opts).await
    }

    async fn stat_with(&self, path: &str, opts: StatOptions) -> Result<Metadata> {
        self.inner.stat_with(path, opts).await
    }

    async fn delete(&self, path: &str) -> Result<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if path.contains("locked") {
            return Err(Error::from_raw_failure(
                format!("403 Forbidden: {} is locked", path),
                None,
            ));
        }
        self.inner.delete(path).await
    }

    async fn copy(&self, from: &str, to: &str) -> Result<()> {
        self.inner.copy(from, to).await
    }

    async fn create_dir(&self, path: &str) -> Result<()> {
        self.inner.create_dir(path).await
    }

    async fn list_with(&self, path: &str, opts: ListOptions) -> Result<Vec<Entry>> {
        self.inner.list_with(path, opts).await
    }

    async fn presign_read(&self, path: &str, expire: Duration) -> Result<PresignedRequest> {
        self.inner.presign_read(path, expire).await
    }

    async fn presign_write(&self, path: &str, expire: Duration) -> Result<PresignedRequest> {
        self.inner.presign_write(path, expire).await
    }

    async fn presign_stat(&self, path: &str, expire: Duration) -> Result<PresignedRequest> {
        self.inner.presign_stat(path, expire).await
    }
}

#[tokio::test]
async fn test_remove_all_is_best_effort() {
    let op = LockedDeletes {
        inner: MemoryOperator::default(),
        delete_calls: AtomicU32::new(0),
    };
    for key in ["d/a", "d/locked-1", "d/m", "d/locked-2", "d/z"] {
        op.write(key, Bytes::from("x")).await.unwrap();
    }

    let err = op.remove_all("d/").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert!(err.message().contains("locked-2"));
    assert_eq!(op.delete_calls.load(Ordering::SeqCst), 5);

    let remaining: Vec<String> = op
        .list("d/")
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.path)
        .collect();
    assert_eq!(remaining, vec!["d/locked-1", "d/locked-2"]);
}

#[tokio::test]
async fn test_rename_surfaces_delete_failure() {
    let op = LockedDeletes {
        inner: MemoryOperator::default(),
        delete_calls: AtomicU32::new(0),
    };
    op.write("locked.txt", Bytes::from("keep")).await.unwrap();

    let err = op.rename("locked.txt", "moved.txt").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);

    // copy phase completed, so both paths exist
    assert!(op.exists("locked.txt").await.unwrap());
    assert_eq!(op.read("moved.txt").await.unwrap(), Bytes::from("keep"));
}
