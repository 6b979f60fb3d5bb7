// crates/spine-server/src/config.rs
// ============================================================================
// Module: Spine Server Configuration
// Description: Configuration loading and validation for the Spine HTTP API.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size limits and
//! unknown-field rejection. Missing or invalid configuration fails closed;
//! the server never starts with a partially understood config.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum configuration file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;
/// Default maximum request body size in bytes.
pub const DEFAULT_MAX_BODY_BYTES: usize = 256 * 1024;
/// Hard upper bound for the configurable request body limit.
pub const MAX_BODY_BYTES_LIMIT: usize = 4 * 1024 * 1024;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("failed to read config: {0}")]
    Io(String),
    /// Config file exceeds the size limit.
    #[error("config file exceeds size limit: {actual} bytes (max {max})")]
    TooLarge {
        /// Actual file size in bytes.
        actual: u64,
        /// Maximum accepted size in bytes.
        max: u64,
    },
    /// Config file failed to parse.
    #[error("failed to parse config: {0}")]
    Parse(String),
    /// Config contents failed validation.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Sections
// ============================================================================

/// Listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    /// Socket address the API binds to.
    pub bind_addr: SocketAddr,
    /// Maximum accepted request body size in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

/// Returns the default request body limit.
const fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

/// Proof bundle store settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct StoreSection {
    /// Database path; omitted selects an in-memory store for demos.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Narrative source selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NarrativeSection {
    /// Directory of `<thread_id>.json` narrative documents.
    Dir {
        /// Root directory holding narrative documents.
        root: PathBuf,
    },
    /// Upstream HTTP narrative backend.
    Http {
        /// Base URL of the upstream backend.
        base_url: String,
    },
}

/// Telemetry output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct TelemetrySection {
    /// JSON-line log path; omitted disables telemetry output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_path: Option<PathBuf>,
}

// ============================================================================
// SECTION: Server Configuration
// ============================================================================

/// Full Spine server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Listener settings.
    pub server: ServerSection,
    /// Proof bundle store settings.
    #[serde(default)]
    pub store: StoreSection,
    /// Narrative source selection.
    pub narrative: NarrativeSection,
    /// Telemetry output settings.
    #[serde(default)]
    pub telemetry: TelemetrySection,
}

impl ServerConfig {
    /// Loads and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file is unreadable, oversized,
    /// unparsable, or fails validation.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let metadata = fs::metadata(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::TooLarge {
                actual: metadata.len(),
                max: MAX_CONFIG_FILE_SIZE,
            });
        }
        let text = fs::read_to_string(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        let config: Self =
            toml::from_str(&text).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a constraint is violated.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.max_body_bytes == 0 {
            return Err(ConfigError::Invalid("max_body_bytes must be greater than zero".to_string()));
        }
        if self.server.max_body_bytes > MAX_BODY_BYTES_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "max_body_bytes exceeds hard limit: {} (max {MAX_BODY_BYTES_LIMIT})",
                self.server.max_body_bytes
            )));
        }
        match &self.narrative {
            NarrativeSection::Dir {
                root,
            } => {
                if root.as_os_str().is_empty() {
                    return Err(ConfigError::Invalid("narrative root must not be empty".to_string()));
                }
            }
            NarrativeSection::Http {
                base_url,
            } => {
                if base_url.trim().is_empty() {
                    return Err(ConfigError::Invalid(
                        "narrative base_url must not be empty".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }
}
