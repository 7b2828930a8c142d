//! Frame formatter

use crate::constants::{DEFAULT_FILE_LINE_SEPARATOR, DEFAULT_LOCATION_PREFIX, DEFAULT_LOCATION_SUFFIX};
use crate::frame::Frame;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Options for rendering a single frame as `<function> [<file>:<line>]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameOptions {
    /// Written between the function name and the location (default: `" ["`)
    pub location_prefix: String,
    /// Written after the location (default: `"]"`)
    pub location_suffix: String,
    /// Written between file and line (default: `":"`)
    pub file_line_separator: String,
    pub skip_function_name: bool,
    pub skip_location: bool,
}

impl Default for FrameOptions {
    fn default() -> Self {
        Self {
            location_prefix: DEFAULT_LOCATION_PREFIX.to_string(),
            location_suffix: DEFAULT_LOCATION_SUFFIX.to_string(),
            file_line_separator: DEFAULT_FILE_LINE_SEPARATOR.to_string(),
            skip_function_name: false,
            skip_location: false,
        }
    }
}

/// Renders one [`Frame`] into a sink
pub trait FrameFormatter: fmt::Debug + Send + Sync {
    fn options(&self) -> FrameOptions;

    fn set_options(&mut self, opts: FrameOptions);

    /// Independent copy
    fn clone_formatter(&self) -> Box<dyn FrameFormatter>;

    /// Shallow copy; frame formatters hold nothing nested, so this is a clone
    fn copy_formatter(&self) -> Box<dyn FrameFormatter> {
        self.clone_formatter()
    }

    fn render_into(&self, w: &mut dyn fmt::Write, frame: &Frame) -> fmt::Result;

    fn render(&self, frame: &Frame) -> String {
        let mut out = String::new();
        let _ = self.render_into(&mut out, frame);
        out
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlainFrameFormatter {
    opts: FrameOptions,
}

impl PlainFrameFormatter {
    pub fn new(opts: FrameOptions) -> Self {
        Self { opts }
    }
}

impl FrameFormatter for PlainFrameFormatter {
    fn options(&self) -> FrameOptions {
        self.opts.clone()
    }

    fn set_options(&mut self, opts: FrameOptions) {
        self.opts = opts;
    }

    fn clone_formatter(&self) -> Box<dyn FrameFormatter> {
        Box::new(self.clone())
    }

    fn render_into(&self, w: &mut dyn fmt::Write, frame: &Frame) -> fmt::Result {
        let opts = &self.opts;
        if opts.skip_function_name && opts.skip_location {
            return Ok(());
        }

        if !opts.skip_function_name {
            w.write_str(frame.function())?;
        }

        if !opts.skip_location {
            if !opts.skip_function_name {
                w.write_str(&opts.location_prefix)?;
            }
            w.write_str(frame.file())?;
            w.write_str(&opts.file_line_separator)?;
            write!(w, "{}", frame.line())?;
            if !opts.skip_function_name {
                w.write_str(&opts.location_suffix)?;
            }
        }

        Ok(())
    }
}
