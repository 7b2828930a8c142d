//! Loading formatter defaults from files and the environment.
//!
//! [`Settings`] is the serializable form of [`Defaults`]. It can be read
//! from a YAML or JSON file, overlaid with environment variables, and then
//! installed through [`configure`](crate::configure).
//!
//! # Example
//!
//! ```rust,ignore
//! use errstack::config::{load_settings_file, Settings};
//!
//! let settings = load_settings_file("errstack.yaml")?.overlay_env("ERRSTACK")?;
//! errstack::configure(settings.into_defaults())?;
//! ```
//!
//! # Environment variables
//!
//! With prefix `ERRSTACK`: `ERRSTACK_SEPARATOR`, `ERRSTACK_FRAME_LIMIT`,
//! `ERRSTACK_ERROR_PREFIX`, `ERRSTACK_ERROR_SEPARATOR`,
//! `ERRSTACK_STACK_SEPARATOR`, `ERRSTACK_FRAME_SEPARATOR`,
//! `ERRSTACK_FRAME_INDENT`, `ERRSTACK_SKIP_LOCATION`,
//! `ERRSTACK_SKIP_STACK_INDEX`.

use crate::constants::{ERROR_CHAIN_SEPARATOR, MAX_CALL_DEPTH};
use crate::defaults::Defaults;
use crate::format::{
    ChainErrorFormatter, ErrorOptions, FrameOptions, PlainErrorFormatter, PlainFrameFormatter,
    PlainStackTraceFormatter, StackTraceFormatter, StackTraceOptions,
};
use crate::types::{ErrstackError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Serializable formatter defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Chain separator for `text()` and `+s`
    pub separator: String,
    pub frame_limit: usize,
    pub error: ErrorOptions,
    pub stack: StackTraceOptions,
    pub frame: FrameOptions,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            separator: ERROR_CHAIN_SEPARATOR.to_string(),
            frame_limit: MAX_CALL_DEPTH,
            error: ErrorOptions::default(),
            stack: StackTraceOptions::default(),
            frame: FrameOptions::default(),
        }
    }
}

impl Settings {
    /// Default settings overlaid with `PREFIX_*` environment variables.
    pub fn from_env(prefix: &str) -> Result<Self> {
        Self::default().overlay_env(prefix)
    }

    /// Replaces every field whose `PREFIX_*` variable is set.
    pub fn overlay_env(mut self, prefix: &str) -> Result<Self> {
        if let Some(value) = env_var(prefix, "SEPARATOR") {
            self.separator = value;
        }
        if let Some(value) = env_var(prefix, "FRAME_LIMIT") {
            self.frame_limit = value.parse().map_err(|e| {
                ErrstackError::ConfigError(format!(
                    "Failed to parse environment variable '{}': {}",
                    env_key(prefix, "FRAME_LIMIT"),
                    e
                ))
            })?;
        }
        if let Some(value) = env_var(prefix, "ERROR_PREFIX") {
            self.error.error_prefix = value;
        }
        if let Some(value) = env_var(prefix, "ERROR_SEPARATOR") {
            self.error.error_separator = value;
        }
        if let Some(value) = env_var(prefix, "STACK_SEPARATOR") {
            self.error.stack_trace_separator = value;
        }
        if let Some(value) = env_var(prefix, "FRAME_SEPARATOR") {
            self.stack.frame_separator = value;
        }
        if let Some(value) = env_var(prefix, "FRAME_INDENT") {
            self.stack.frame_indent = value;
        }
        if let Some(value) = env_var(prefix, "SKIP_LOCATION") {
            self.frame.skip_location = parse_bool(&env_key(prefix, "SKIP_LOCATION"), &value)?;
        }
        if let Some(value) = env_var(prefix, "SKIP_STACK_INDEX") {
            self.stack.skip_stack_index =
                parse_bool(&env_key(prefix, "SKIP_STACK_INDEX"), &value)?;
        }

        Ok(self)
    }

    /// Builds the formatter graph: one frame formatter shared by one stack
    /// formatter, shared by the error and chain formatters.
    pub fn into_defaults(self) -> Defaults {
        let frame = Arc::new(PlainFrameFormatter::new(self.frame));
        let stack: Arc<dyn StackTraceFormatter> =
            Arc::new(PlainStackTraceFormatter::new(self.stack, frame));

        Defaults {
            error_formatter: Arc::new(PlainErrorFormatter::new(
                self.error.clone(),
                Some(stack.clone()),
            )),
            chain_formatter: Arc::new(ChainErrorFormatter::new(self.error, Some(stack))),
            separator: self.separator,
            frame_limit: self.frame_limit,
        }
    }
}

/// Load settings from a YAML file.
pub fn load_yaml_settings(path: impl AsRef<Path>) -> Result<Settings> {
    let content = std::fs::read_to_string(path.as_ref())?;
    serde_yaml::from_str(&content).map_err(|e| {
        ErrstackError::ConfigError(format!(
            "Failed to parse YAML settings from {:?}: {}",
            path.as_ref(),
            e
        ))
    })
}

/// Load settings from a JSON file.
pub fn load_json_settings(path: impl AsRef<Path>) -> Result<Settings> {
    let content = std::fs::read_to_string(path.as_ref())?;
    serde_json::from_str(&content).map_err(|e| {
        ErrstackError::ConfigError(format!(
            "Failed to parse JSON settings from {:?}: {}",
            path.as_ref(),
            e
        ))
    })
}

/// Load settings from a file, picking the format from its extension.
pub fn load_settings_file(path: impl AsRef<Path>) -> Result<Settings> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .ok_or_else(|| {
            ErrstackError::ConfigError(format!(
                "Unable to determine file extension for {:?}",
                path
            ))
        })?;

    debug!(path = %path.display(), "loading errstack settings");
    match extension.to_lowercase().as_str() {
        "yaml" | "yml" => load_yaml_settings(path),
        "json" => load_json_settings(path),
        _ => Err(ErrstackError::ConfigError(format!(
            "Unsupported settings file extension: {}",
            extension
        ))),
    }
}

fn env_key(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}_{}", prefix, name)
    }
}

fn env_var(prefix: &str, name: &str) -> Option<String> {
    std::env::var(env_key(prefix, name)).ok()
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ErrstackError::ConfigError(format!(
            "Invalid boolean value for '{}': {}",
            key, value
        ))),
    }
}
