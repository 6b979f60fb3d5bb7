// crates/spine-server/tests/config_validation.rs
// ============================================================================
// Module: Server Config Tests
// Description: Tests for strict, fail-closed configuration loading.
// Purpose: Validate parsing, defaults, unknown-field rejection, and limits.
// Dependencies: spine-server, tempfile
// ============================================================================
//! ## Overview
//! Exercises the TOML configuration loader against valid files, unknown
//! fields, and constraint violations.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::fs;
use std::path::PathBuf;

use spine_server::ConfigError;
use spine_server::NarrativeSection;
use spine_server::ServerConfig;
use spine_server::config::DEFAULT_MAX_BODY_BYTES;

/// Writes a config file and loads it.
fn load(contents: &str) -> Result<ServerConfig, ConfigError> {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("spine.toml");
    fs::write(&path, contents).unwrap();
    ServerConfig::load(&path)
}

/// A minimal directory-backed config parses with defaults applied.
#[test]
fn minimal_dir_config_parses_with_defaults() {
    let config = load(
        r#"
        [server]
        bind_addr = "127.0.0.1:8080"

        [narrative]
        kind = "dir"
        root = "narratives"
        "#,
    )
    .unwrap();

    assert_eq!(config.server.max_body_bytes, DEFAULT_MAX_BODY_BYTES);
    assert!(config.store.path.is_none());
    assert!(config.telemetry.log_path.is_none());
    assert_eq!(
        config.narrative,
        NarrativeSection::Dir {
            root: PathBuf::from("narratives"),
        }
    );
}

/// A full HTTP-backed config parses every section.
#[test]
fn http_config_parses_all_sections() {
    let config = load(
        r#"
        [server]
        bind_addr = "127.0.0.1:0"
        max_body_bytes = 65536

        [store]
        path = "bundles.db"

        [narrative]
        kind = "http"
        base_url = "http://governance.internal/"

        [telemetry]
        log_path = "telemetry.jsonl"
        "#,
    )
    .unwrap();

    assert_eq!(config.server.max_body_bytes, 65536);
    assert_eq!(config.store.path, Some(PathBuf::from("bundles.db")));
    assert_eq!(config.telemetry.log_path, Some(PathBuf::from("telemetry.jsonl")));
}

/// Unknown fields fail closed instead of being ignored.
#[test]
fn unknown_fields_are_rejected() {
    let err = load(
        r#"
        [server]
        bind_addr = "127.0.0.1:8080"
        surprise = true

        [narrative]
        kind = "dir"
        root = "narratives"
        "#,
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

/// A zero body limit is rejected by validation.
#[test]
fn zero_body_limit_is_rejected() {
    let err = load(
        r#"
        [server]
        bind_addr = "127.0.0.1:8080"
        max_body_bytes = 0

        [narrative]
        kind = "dir"
        root = "narratives"
        "#,
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

/// An empty upstream base URL is rejected by validation.
#[test]
fn empty_base_url_is_rejected() {
    let err = load(
        r#"
        [server]
        bind_addr = "127.0.0.1:8080"

        [narrative]
        kind = "http"
        base_url = "  "
        "#,
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

/// A missing config file reports an I/O error.
#[test]
fn missing_config_file_is_an_io_error() {
    let err = ServerConfig::load("/nonexistent/spine.toml").unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}
