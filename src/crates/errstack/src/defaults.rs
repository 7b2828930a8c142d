//! Process-wide formatter defaults
//!
//! The defaults are installed at most once. Any read (including building the
//! first error) seals them, so configuration has to happen during startup,
//! before errors are created or rendered.

use crate::constants::{ERROR_CHAIN_SEPARATOR, MAX_CALL_DEPTH};
use crate::format::{
    ChainErrorFormatter, ErrorFormatter, FrameFormatter, PlainErrorFormatter,
    PlainStackTraceFormatter, StackTraceFormatter,
};
use crate::types::{ErrstackError, Result};
use std::sync::{Arc, OnceLock};
use tracing::{debug, warn};

/// Formatters and limits used when a call does not supply its own
#[derive(Debug, Clone)]
pub struct Defaults {
    /// Renders single errors
    pub error_formatter: Arc<dyn ErrorFormatter>,
    /// Renders chains
    pub chain_formatter: Arc<dyn ErrorFormatter>,
    /// Joins chain links for `text()` and `+s` (default: `": "`)
    pub separator: String,
    /// Frame bound for errors that do not set their own
    pub frame_limit: usize,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            error_formatter: Arc::new(PlainErrorFormatter::default()),
            chain_formatter: Arc::new(ChainErrorFormatter::default()),
            separator: ERROR_CHAIN_SEPARATOR.to_string(),
            frame_limit: MAX_CALL_DEPTH,
        }
    }
}

impl Defaults {
    /// Stack formatter of the error formatter, or a plain one
    pub fn stack_trace_formatter(&self) -> Arc<dyn StackTraceFormatter> {
        self.error_formatter
            .stack_trace_formatter()
            .unwrap_or_else(|| Arc::new(PlainStackTraceFormatter::default()))
    }

    pub fn frame_formatter(&self) -> Arc<dyn FrameFormatter> {
        self.stack_trace_formatter().frame_formatter()
    }
}

static DEFAULTS: OnceLock<Defaults> = OnceLock::new();

/// The installed defaults; seals them on first call.
pub fn defaults() -> &'static Defaults {
    DEFAULTS.get_or_init(Defaults::default)
}

/// Installs the process defaults.
///
/// Fails with [`ErrstackError::AlreadyConfigured`] once defaults were
/// installed or read.
pub fn configure(defaults: Defaults) -> Result<()> {
    match DEFAULTS.set(defaults) {
        Ok(()) => {
            debug!("errstack defaults installed");
            Ok(())
        }
        Err(_) => {
            warn!("errstack defaults already initialized, ignoring configure");
            Err(ErrstackError::AlreadyConfigured)
        }
    }
}

pub fn is_configured() -> bool {
    DEFAULTS.get().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let defaults = Defaults::default();
        assert_eq!(defaults.separator, ": ");
        assert_eq!(defaults.frame_limit, 32);
        assert_eq!(defaults.error_formatter.options().error_separator, ", ");
        assert!(!defaults.frame_formatter().options().skip_location);
    }

    #[test]
    fn test_configure_after_read_fails() {
        let _ = defaults();
        assert!(is_configured());
        assert!(matches!(
            configure(Defaults::default()),
            Err(ErrstackError::AlreadyConfigured)
        ));
    }
}
