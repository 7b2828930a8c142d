//! A single resolved stack location

use crate::defaults::defaults;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One resolved stack location
///
/// Serializes as `{"file": ..., "function": ..., "line": ...}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Frame {
    file: String,
    function: String,
    line: u32,
}

impl Frame {
    pub fn new(file: impl Into<String>, function: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            function: function.into(),
            line,
        }
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn function(&self) -> &str {
        &self.function
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    /// True for the sentinel frame produced when resolution fails
    pub fn is_unknown(&self) -> bool {
        self.file.is_empty() && self.function.is_empty() && self.line == 0
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        defaults().frame_formatter().render_into(f, self)
    }
}
