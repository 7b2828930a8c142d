//! Stack trace formatter

use super::frame::{FrameFormatter, PlainFrameFormatter};
use crate::constants::{DEFAULT_FRAME_SEPARATOR, DEFAULT_INDEX_PREFIX, DEFAULT_INDEX_SUFFIX};
use crate::stack::StackTrace;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Options for rendering a whole trace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StackTraceOptions {
    /// Written before every frame
    pub frame_indent: String,
    /// Written between frames, never after the last one (default: `";"`)
    pub frame_separator: String,
    pub index_prefix: String,
    pub index_suffix: String,
    pub skip_stack_index: bool,
}

impl Default for StackTraceOptions {
    fn default() -> Self {
        Self {
            frame_indent: String::new(),
            frame_separator: DEFAULT_FRAME_SEPARATOR.to_string(),
            index_prefix: DEFAULT_INDEX_PREFIX.to_string(),
            index_suffix: DEFAULT_INDEX_SUFFIX.to_string(),
            skip_stack_index: false,
        }
    }
}

/// Renders a [`StackTrace`] frame by frame through a nested [`FrameFormatter`]
pub trait StackTraceFormatter: fmt::Debug + Send + Sync {
    fn options(&self) -> StackTraceOptions;

    fn set_options(&mut self, opts: StackTraceOptions);

    fn frame_formatter(&self) -> Arc<dyn FrameFormatter>;

    fn set_frame_formatter(&mut self, formatter: Arc<dyn FrameFormatter>);

    /// Deep copy: the nested frame formatter is cloned too
    fn clone_formatter(&self) -> Box<dyn StackTraceFormatter>;

    /// Shallow copy: the nested frame formatter is shared
    fn copy_formatter(&self) -> Box<dyn StackTraceFormatter>;

    fn render_into(&self, w: &mut dyn fmt::Write, trace: &StackTrace) -> fmt::Result;

    fn render(&self, trace: &StackTrace) -> String {
        let mut out = String::new();
        let _ = self.render_into(&mut out, trace);
        out
    }
}

#[derive(Debug, Clone)]
pub struct PlainStackTraceFormatter {
    opts: StackTraceOptions,
    frame: Arc<dyn FrameFormatter>,
}

impl PlainStackTraceFormatter {
    pub fn new(opts: StackTraceOptions, frame: Arc<dyn FrameFormatter>) -> Self {
        Self { opts, frame }
    }
}

impl Default for PlainStackTraceFormatter {
    fn default() -> Self {
        Self::new(
            StackTraceOptions::default(),
            Arc::new(PlainFrameFormatter::default()),
        )
    }
}

impl StackTraceFormatter for PlainStackTraceFormatter {
    fn options(&self) -> StackTraceOptions {
        self.opts.clone()
    }

    fn set_options(&mut self, opts: StackTraceOptions) {
        self.opts = opts;
    }

    fn frame_formatter(&self) -> Arc<dyn FrameFormatter> {
        Arc::clone(&self.frame)
    }

    fn set_frame_formatter(&mut self, formatter: Arc<dyn FrameFormatter>) {
        self.frame = formatter;
    }

    fn clone_formatter(&self) -> Box<dyn StackTraceFormatter> {
        Box::new(Self {
            opts: self.opts.clone(),
            frame: Arc::from(self.frame.clone_formatter()),
        })
    }

    fn copy_formatter(&self) -> Box<dyn StackTraceFormatter> {
        Box::new(self.clone())
    }

    fn render_into(&self, w: &mut dyn fmt::Write, trace: &StackTrace) -> fmt::Result {
        let opts = &self.opts;
        let count = trace.len();

        for (i, frame) in trace.iter().enumerate() {
            w.write_str(&opts.frame_indent)?;
            if !opts.skip_stack_index {
                w.write_str(&opts.index_prefix)?;
                write!(w, "{}", trace.display_index(i))?;
                w.write_str(&opts.index_suffix)?;
            }

            self.frame.render_into(w, frame)?;

            if i + 1 < count {
                w.write_str(&opts.frame_separator)?;
            }
        }

        Ok(())
    }
}
