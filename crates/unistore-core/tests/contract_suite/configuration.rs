//! Configuration parsing, validation and operator construction.

use unistore_core::{create_operator, create_test_operator, Configuration, ErrorKind, Scheme};

#[test]
fn test_validation_gates_construction() {
    let missing_region = Configuration::new(Scheme::S3).with_config("bucket", "b");
    let err = missing_region.validate().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidConfig);
    assert!(err.message().contains("region"));

    let err = create_operator(&missing_region).err().unwrap();
    assert_eq!(err.kind(), ErrorKind::InvalidConfig);

    let blank_root = Configuration::filesystem("   ");
    assert_eq!(create_operator(&blank_root).err().unwrap().kind(), ErrorKind::InvalidConfig);
}

#[test]
fn test_test_operator_never_fails() {
    // even an invalid configuration yields a usable in-memory operator
    let op = create_test_operator(&Configuration::new(Scheme::S3));
    assert_eq!(op.info().scheme, Scheme::S3);
    assert!(!op.capabilities().presign);
}

#[test]
fn test_scheme_ids_round_trip() {
    for scheme in Scheme::ALL {
        assert_eq!(scheme.as_str().parse::<Scheme>().unwrap(), scheme);
    }
    assert_eq!("file".parse::<Scheme>().unwrap(), Scheme::Fs);
    assert_eq!(
        "not-a-backend".parse::<Scheme>().unwrap_err().kind(),
        ErrorKind::InvalidConfig
    );
}

#[test]
fn test_from_yaml() {
    let yaml = r#"
scheme: fs
config:
  root: /tmp/unistore-yaml
retry:
  max_attempts: 2
  base_delay_ms: 10
"#;
    let config = Configuration::from_yaml_str(yaml).unwrap();
    assert_eq!(config.scheme(), Scheme::Fs);
    assert_eq!(config.get("root"), Some("/tmp/unistore-yaml"));
    assert_eq!(config.retry_policy().max_attempts, 2);
    assert!(config.validate().is_ok());
}

#[test]
fn test_from_url_query_pairs() {
    let config =
        Configuration::from_url("s3://my-bucket/backups?region=eu-west-1&endpoint=http://localhost:9000")
            .unwrap();
    assert_eq!(config.scheme(), Scheme::S3);
    assert_eq!(config.get("bucket"), Some("my-bucket"));
    assert_eq!(config.get("root"), Some("backups"));
    assert_eq!(config.get("region"), Some("eu-west-1"));
    assert_eq!(config.get("endpoint"), Some("http://localhost:9000"));
}

#[tokio::test]
async fn test_s3_compatible_construction_is_offline() {
    let config = Configuration::s3_compatible(
        "bucket",
        "us-east-1",
        "minio",
        "minio-secret",
        "http://localhost:9000",
    );
    let op = create_operator(&config).unwrap();

    let info = op.info();
    assert_eq!(info.scheme, Scheme::S3);
    assert_eq!(info.name, "bucket");

    let caps = op.capabilities();
    assert!(caps.presign_read && caps.presign_write && caps.presign_stat);
    assert!(!caps.rename_is_atomic);

    let request = op
        .presign_write("upload.bin", std::time::Duration::from_secs(60))
        .await
        .unwrap();
    assert_eq!(request.method, "PUT");
    assert!(request.uri.starts_with("http://localhost:9000/bucket/upload.bin"));
}
