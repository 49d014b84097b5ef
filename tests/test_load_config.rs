use std::env;
use std::fs::write;
use std::path::PathBuf;

use serial_test::serial;
use tempfile::NamedTempFile;

use annex_bridge::load_config::{load_config, ENV_LOG_LEVEL, ENV_LOG_PATH};

/// This test ensures that a full static config file produces a merged
/// RunConfig with every section populated.
#[tokio::test]
#[serial]
async fn test_load_config_success_merges_all_sections() {
    let config_yaml = r#"
inbound:
  dir: ./tmp/inbound
  prefix: BUL_ANNEX
archive:
  originals_dir: ./tmp/archives/originals
  parsed_dir: ./tmp/archives/parsed
gfa:
  data_dir: ./tmp/gfa/data
  count_dir: ./tmp/gfa/count
lookup:
  base_url: "http://mapper.internal:8080"
  timeout_seconds: 5
log:
  level: DEBUG
  path: ./tmp/annex-bridge.log
"#;
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), config_yaml).unwrap();

    // No environment overrides in play for this case
    env::remove_var(ENV_LOG_LEVEL);
    env::remove_var(ENV_LOG_PATH);

    let config = load_config(config_file.path()).expect("Config should load");

    assert_eq!(config.inbound.dir, PathBuf::from("./tmp/inbound"));
    assert_eq!(config.inbound.prefix, "BUL_ANNEX");
    assert_eq!(
        config.archive.originals_dir,
        PathBuf::from("./tmp/archives/originals")
    );
    assert_eq!(
        config.archive.parsed_dir,
        PathBuf::from("./tmp/archives/parsed")
    );
    assert_eq!(config.gfa.data_dir, PathBuf::from("./tmp/gfa/data"));
    assert_eq!(config.gfa.count_dir, PathBuf::from("./tmp/gfa/count"));

    let lookup = config.lookup.as_ref().expect("lookup section present");
    assert_eq!(lookup.base_url, "http://mapper.internal:8080");
    assert_eq!(lookup.timeout_seconds, 5);

    assert_eq!(config.log.level, "DEBUG");
    assert_eq!(config.log.path, Some(PathBuf::from("./tmp/annex-bridge.log")));
}

/// This test ensures that the environment overrides the file's log settings.
#[tokio::test]
#[serial]
async fn test_load_config_env_overrides_log_settings() {
    let config_yaml = r#"
inbound:
  dir: ./tmp/inbound
  prefix: BUL_ANNEX
archive:
  originals_dir: ./tmp/archives/originals
  parsed_dir: ./tmp/archives/parsed
gfa:
  data_dir: ./tmp/gfa/data
  count_dir: ./tmp/gfa/count
log:
  level: INFO
"#;
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), config_yaml).unwrap();

    env::set_var(ENV_LOG_LEVEL, "TRACE");
    env::set_var(ENV_LOG_PATH, "/var/log/annex-bridge.log");

    let config = load_config(config_file.path()).expect("Config should load");

    assert_eq!(config.log.level, "TRACE");
    assert_eq!(
        config.log.path,
        Some(PathBuf::from("/var/log/annex-bridge.log"))
    );

    env::remove_var(ENV_LOG_LEVEL);
    env::remove_var(ENV_LOG_PATH);
}

/// This test ensures that the optional sections default sensibly when the
/// file omits them.
#[tokio::test]
#[serial]
async fn test_load_config_defaults_optional_sections() {
    let config_yaml = r#"
inbound:
  dir: ./tmp/inbound
  prefix: BUL_ANNEX
archive:
  originals_dir: ./tmp/archives/originals
  parsed_dir: ./tmp/archives/parsed
gfa:
  data_dir: ./tmp/gfa/data
  count_dir: ./tmp/gfa/count
"#;
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), config_yaml).unwrap();

    env::remove_var(ENV_LOG_LEVEL);
    env::remove_var(ENV_LOG_PATH);

    let config = load_config(config_file.path()).expect("Config should load");

    assert!(config.lookup.is_none());
    assert_eq!(config.log.level, "INFO");
    assert_eq!(config.log.path, None);
}

/// This test ensures that a lookup section without a timeout falls back to
/// the default.
#[tokio::test]
#[serial]
async fn test_load_config_defaults_the_lookup_timeout() {
    let config_yaml = r#"
inbound:
  dir: ./tmp/inbound
  prefix: BUL_ANNEX
archive:
  originals_dir: ./tmp/archives/originals
  parsed_dir: ./tmp/archives/parsed
gfa:
  data_dir: ./tmp/gfa/data
  count_dir: ./tmp/gfa/count
lookup:
  base_url: "http://mapper.internal:8080"
"#;
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), config_yaml).unwrap();

    let config = load_config(config_file.path()).expect("Config should load");
    let lookup = config.lookup.as_ref().expect("lookup section present");
    assert_eq!(lookup.timeout_seconds, 10);
}

/// This test ensures that a missing config file errors and names the path.
#[tokio::test]
#[serial]
async fn test_load_config_errors_for_missing_file() {
    let err = load_config("/definitely/not/here/annex.yaml").unwrap_err();
    let msg = err.to_string();
    assert!(
        msg.contains("read config file"),
        "Read error expected, got: {msg}"
    );
}

/// This test ensures that if the config file is not valid YAML, load_config
/// errors and reports as such.
#[tokio::test]
#[serial]
async fn test_load_config_errors_for_invalid_file() {
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), b"not-yaml: [:::").unwrap();

    let err = load_config(config_file.path()).unwrap_err();
    let msg = err.to_string();
    assert!(
        msg.contains("parse") || msg.contains("YAML"),
        "Parse error expected, got: {msg}"
    );
}

/// This test ensures that an empty arrival prefix is rejected up front.
#[tokio::test]
#[serial]
async fn test_load_config_rejects_an_empty_prefix() {
    let config_yaml = r#"
inbound:
  dir: ./tmp/inbound
  prefix: ""
archive:
  originals_dir: ./tmp/archives/originals
  parsed_dir: ./tmp/archives/parsed
gfa:
  data_dir: ./tmp/gfa/data
  count_dir: ./tmp/gfa/count
"#;
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), config_yaml).unwrap();

    let err = load_config(config_file.path()).unwrap_err();
    let msg = err.to_string();
    assert!(
        msg.contains("inbound.prefix"),
        "Prefix validation expected, got: {msg}"
    );
}

/// This test ensures that a lookup section without a usable URL is rejected.
#[tokio::test]
#[serial]
async fn test_load_config_rejects_an_empty_lookup_url() {
    let config_yaml = r#"
inbound:
  dir: ./tmp/inbound
  prefix: BUL_ANNEX
archive:
  originals_dir: ./tmp/archives/originals
  parsed_dir: ./tmp/archives/parsed
gfa:
  data_dir: ./tmp/gfa/data
  count_dir: ./tmp/gfa/count
lookup:
  base_url: ""
"#;
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), config_yaml).unwrap();

    let err = load_config(config_file.path()).unwrap_err();
    let msg = err.to_string();
    assert!(
        msg.contains("lookup.base_url"),
        "Lookup validation expected, got: {msg}"
    );
}
