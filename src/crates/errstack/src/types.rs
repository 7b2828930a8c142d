//! Core types for the errstack library

use thiserror::Error;

/// Result type for the fallible configuration and parsing surface.
pub type Result<T> = std::result::Result<T, ErrstackError>;

/// Boxed error accepted as the cause of a [`StacktraceError`](crate::StacktraceError).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised by configuration and directive parsing.
///
/// Capturing, chaining and rendering never fail; only the ambient surface
/// around them does.
#[derive(Debug, Error)]
pub enum ErrstackError {
    /// The process defaults were already installed or already read.
    #[error("formatter defaults are already initialized")]
    AlreadyConfigured,

    /// A directive string could not be parsed.
    #[error("Invalid directive {directive:?}: {reason}")]
    InvalidDirective { directive: String, reason: String },

    /// A directive named a verb other than `s`, `v` or `j`.
    #[error("Unknown verb: {0:?}")]
    UnknownVerb(char),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl ErrstackError {
    pub fn invalid_directive(directive: impl Into<String>, reason: impl Into<String>) -> Self {
        ErrstackError::InvalidDirective {
            directive: directive.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for ErrstackError {
    fn from(err: serde_json::Error) -> Self {
        ErrstackError::SerializationError(err.to_string())
    }
}

impl From<serde_yaml::Error> for ErrstackError {
    fn from(err: serde_yaml::Error) -> Self {
        ErrstackError::SerializationError(err.to_string())
    }
}

/// When an error records its stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureMode {
    /// The whole stack is captured once, at construction
    Eager,
    /// One frame is appended per explicit `mark()`/`throw()`
    #[default]
    Manual,
}

/// Options for building a [`StacktraceError`](crate::StacktraceError)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CaptureOptions {
    pub mode: CaptureMode,
    /// Maximum number of frames kept; `None` uses the process default
    pub frame_limit: Option<usize>,
}

impl CaptureOptions {
    pub fn eager() -> Self {
        Self {
            mode: CaptureMode::Eager,
            frame_limit: None,
        }
    }

    pub fn manual() -> Self {
        Self {
            mode: CaptureMode::Manual,
            frame_limit: None,
        }
    }

    pub fn with_frame_limit(mut self, limit: usize) -> Self {
        self.frame_limit = Some(limit);
        self
    }
}

impl From<CaptureMode> for CaptureOptions {
    fn from(mode: CaptureMode) -> Self {
        Self {
            mode,
            frame_limit: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_mode_converts_into_options() {
        let opts: CaptureOptions = CaptureMode::Eager.into();
        assert_eq!(opts, CaptureOptions::eager());
        assert_eq!(CaptureOptions::default().mode, CaptureMode::Manual);
    }

    #[test]
    fn test_error_display() {
        let err = ErrstackError::invalid_directive("+q", "unknown verb");
        assert_eq!(err.to_string(), "Invalid directive \"+q\": unknown verb");
        assert_eq!(
            ErrstackError::UnknownVerb('x').to_string(),
            "Unknown verb: 'x'"
        );
    }
}
