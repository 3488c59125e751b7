//! Behavioural properties every operator must satisfy.

use bytes::Bytes;
use unistore_core::{ErrorKind, ListOptions, ReadOptions, StatOptions, WriteOptions};

use super::helpers::{all_operators, init_tracing, payload};

fn sorted_paths(entries: &[unistore_core::Entry]) -> Vec<String> {
    let mut paths: Vec<String> = entries.iter().map(|e| e.path.clone()).collect();
    paths.sort();
    paths
}

#[tokio::test]
async fn test_round_trip() {
    init_tracing();
    for t in all_operators() {
        for (path, len) in [("empty.bin", 0), ("small.txt", 13), ("nested/deep/large.bin", 64 * 1024)] {
            let data = Bytes::from(payload(len));
            t.op.write(path, data.clone()).await.unwrap();
            assert_eq!(t.op.read(path).await.unwrap(), data, "{}: {}", t.label, path);
        }
    }
}

#[tokio::test]
async fn test_overwrite_replaces_content() {
    for t in all_operators() {
        t.op.write("f", Bytes::from("first")).await.unwrap();
        t.op.write("f", Bytes::from("second")).await.unwrap();
        assert_eq!(t.op.read("f").await.unwrap(), Bytes::from("second"), "{}", t.label);
    }
}

#[tokio::test]
async fn test_range_correctness() {
    let data = payload(32);
    for t in all_operators() {
        t.op.write("r.bin", Bytes::from(data.clone())).await.unwrap();

        for offset in [0usize, 1, 15, 31] {
            for length in [0usize, 1, 7, 32 - offset] {
                if length > data.len() - offset {
                    continue;
                }
                let got = t
                    .op
                    .read_range("r.bin", offset as u64, length as u64)
                    .await
                    .unwrap();
                assert_eq!(
                    got.as_ref(),
                    &data[offset..offset + length],
                    "{}: offset {} length {}",
                    t.label,
                    offset,
                    length
                );
            }
        }
    }
}

#[tokio::test]
async fn test_range_clamps_to_object_end() {
    for t in all_operators() {
        t.op.write("c.txt", Bytes::from("abcdef")).await.unwrap();

        let tail = t
            .op
            .read_with("c.txt", ReadOptions::empty().with_offset(4))
            .await
            .unwrap();
        assert_eq!(tail, Bytes::from("ef"), "{}", t.label);

        let clamped = t.op.read_range("c.txt", 2, 100).await.unwrap();
        assert_eq!(clamped, Bytes::from("cdef"), "{}", t.label);

        let past_end = t.op.read_range("c.txt", 6, 3).await.unwrap();
        assert!(past_end.is_empty(), "{}", t.label);
    }
}

#[tokio::test]
async fn test_read_missing_is_not_found() {
    for t in all_operators() {
        let err = t.op.read("missing.txt").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound, "{}", t.label);

        let err = t.op.stat("missing.txt").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound, "{}", t.label);
    }
}

#[tokio::test]
async fn test_idempotent_delete() {
    for t in all_operators() {
        t.op.write("gone.txt", Bytes::from("x")).await.unwrap();

        t.op.delete("gone.txt").await.unwrap();
        assert!(!t.op.exists("gone.txt").await.unwrap(), "{}", t.label);

        t.op.delete("gone.txt").await.unwrap();
        assert!(!t.op.exists("gone.txt").await.unwrap(), "{}", t.label);
    }
}

#[tokio::test]
async fn test_copy_independence() {
    for t in all_operators() {
        t.op.write("p1", Bytes::from("original")).await.unwrap();
        t.op.copy("p1", "p2").await.unwrap();
        t.op.write("p1", Bytes::from("changed")).await.unwrap();

        assert_eq!(t.op.read("p2").await.unwrap(), Bytes::from("original"), "{}", t.label);
        assert_eq!(t.op.read("p1").await.unwrap(), Bytes::from("changed"), "{}", t.label);
    }
}

#[tokio::test]
async fn test_copy_missing_source() {
    for t in all_operators() {
        let err = t.op.copy("nope", "dest").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound, "{}", t.label);
        assert!(!t.op.exists("dest").await.unwrap(), "{}", t.label);
    }
}

#[tokio::test]
async fn test_rename_moves() {
    for t in all_operators() {
        t.op.write("from/a.txt", Bytes::from("moving")).await.unwrap();
        t.op.rename("from/a.txt", "to/b.txt").await.unwrap();

        assert!(!t.op.exists("from/a.txt").await.unwrap(), "{}", t.label);
        assert_eq!(t.op.read("to/b.txt").await.unwrap(), Bytes::from("moving"), "{}", t.label);
    }
}

#[tokio::test]
async fn test_list_filtering() {
    for t in all_operators() {
        for key in ["d/a.txt", "d/b.txt", "d/sub/c.txt", "other/x.txt"] {
            t.op.write(key, Bytes::from("1")).await.unwrap();
        }

        let shallow = t.op.list("d/").await.unwrap();
        assert_eq!(
            sorted_paths(&shallow),
            vec!["d/a.txt", "d/b.txt", "d/sub/"],
            "{}",
            t.label
        );
        let sub = shallow.iter().find(|e| e.path == "d/sub/").unwrap();
        assert!(sub.is_dir());

        let deep = t
            .op
            .list_with("d/", ListOptions::empty().with_recursive(true))
            .await
            .unwrap();
        assert_eq!(
            sorted_paths(&deep),
            vec!["d/a.txt", "d/b.txt", "d/sub/c.txt"],
            "{}",
            t.label
        );

        // without the trailing slash the same directory is listed
        assert_eq!(sorted_paths(&t.op.list("d").await.unwrap()), sorted_paths(&shallow));
    }
}

#[tokio::test]
async fn test_list_options() {
    for t in all_operators() {
        for key in ["logs/app-1.log", "logs/app-2.log", "logs/app-3.log", "logs/db-1.log"] {
            t.op.write(key, Bytes::from("l")).await.unwrap();
        }

        let apps = t
            .op
            .list_with("logs/", ListOptions::empty().with_prefix("app-"))
            .await
            .unwrap();
        assert_eq!(apps.len(), 3, "{}", t.label);

        let after = t
            .op
            .list_with(
                "logs/",
                ListOptions::empty()
                    .with_recursive(true)
                    .with_start_after("logs/app-1.log"),
            )
            .await
            .unwrap();
        assert_eq!(
            sorted_paths(&after),
            vec!["logs/app-2.log", "logs/app-3.log", "logs/db-1.log"],
            "{}",
            t.label
        );

        let limited = t
            .op
            .list_with("logs/", ListOptions::empty().with_limit(2))
            .await
            .unwrap();
        assert_eq!(limited.len(), 2, "{}", t.label);
    }
}

#[tokio::test]
async fn test_list_missing_directory_is_empty() {
    for t in all_operators() {
        assert!(t.op.list("nothing/here/").await.unwrap().is_empty(), "{}", t.label);
    }
}

#[tokio::test]
async fn test_remove_all() {
    for t in all_operators() {
        for i in 0..5 {
            t.op.write(&format!("d/file-{}", i), Bytes::from("x")).await.unwrap();
        }
        t.op.write("d/nested/inner", Bytes::from("y")).await.unwrap();
        t.op.write("keep/me", Bytes::from("z")).await.unwrap();

        t.op.remove_all("d/").await.unwrap();

        assert!(t.op.list("d/").await.unwrap().is_empty(), "{}", t.label);
        assert!(t.op.exists("keep/me").await.unwrap(), "{}", t.label);
    }
}

#[tokio::test]
async fn test_create_dir_then_write() {
    for t in all_operators() {
        t.op.create_dir("made/").await.unwrap();
        t.op.write("made/file", Bytes::from("f")).await.unwrap();
        assert!(t.op.exists("made/file").await.unwrap(), "{}", t.label);
    }
}

#[tokio::test]
async fn test_stat_reports_length_and_checksum() {
    for t in all_operators() {
        t.op.write("sum.txt", Bytes::from("abc")).await.unwrap();

        let meta = t
            .op
            .stat_with("sum.txt", StatOptions::empty().with_checksum(true))
            .await
            .unwrap();
        assert_eq!(meta.content_length, 3, "{}", t.label);
        assert_eq!(
            meta.checksum.as_deref(),
            Some("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"),
            "{}",
            t.label
        );
    }
}

#[tokio::test]
async fn test_create_only_write_refuses_existing() {
    for t in all_operators() {
        let opts = WriteOptions::empty().with_overwrite(false);
        t.op.write_with("once", Bytes::from("1"), opts.clone()).await.unwrap();

        let err = t
            .op
            .write_with("once", Bytes::from("2"), opts)
            .await
            .unwrap_err();
        assert!(!err.is_retryable(), "{}", t.label);
        assert_eq!(t.op.read("once").await.unwrap(), Bytes::from("1"), "{}", t.label);
    }
}

#[tokio::test]
async fn test_concurrent_writers() {
    for t in all_operators() {
        let mut handles = Vec::new();
        for i in 0..8 {
            let op = t.op.clone();
            handles.push(tokio::spawn(async move {
                op.write(&format!("c/{}", i), Bytes::from(format!("v{}", i)))
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let entries = t.op.list("c/").await.unwrap();
        assert_eq!(entries.len(), 8, "{}", t.label);
    }
}

#[tokio::test]
async fn test_keys_are_opaque() {
    let keys = ["d/a#1.txt", "d/b c%20.txt", "d/50%off", "d/[x]|y.txt"];
    for t in all_operators() {
        for key in keys {
            t.op.write(key, Bytes::from(key)).await.unwrap();
        }

        let listed = t.op.list("d/").await.unwrap();
        let mut expected = keys.to_vec();
        expected.sort();
        assert_eq!(sorted_paths(&listed), expected, "{}", t.label);

        for entry in &listed {
            let data = t.op.read(&entry.path).await.unwrap();
            assert_eq!(data, Bytes::from(entry.path.clone()), "{}: {}", t.label, entry.path);
        }

        t.op.remove_all("d/").await.unwrap();
        assert!(t.op.list("d/").await.unwrap().is_empty(), "{}", t.label);
    }
}

#[tokio::test]
async fn test_unrepresentable_keys_are_refused() {
    for t in all_operators() {
        for key in ["a//b", "/lead", "trail/", "a/../b"] {
            let err = t.op.write(key, Bytes::from("x")).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidConfig, "{}: {}", t.label, key);
        }

        assert!(!t.op.exists("a/b").await.unwrap(), "{}", t.label);
        assert!(t.op.list("").await.unwrap().is_empty(), "{}", t.label);
    }
}
