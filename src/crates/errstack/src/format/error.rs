//! Error formatter for a single error

use super::stack::{PlainStackTraceFormatter, StackTraceFormatter};
use super::Traced;
use crate::constants::{DEFAULT_ERROR_SEPARATOR, NIL_ERROR_STRING};
use crate::stacktrace::StacktraceError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Options shared by the single-error and chain formatters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorOptions {
    /// Written before every error text
    pub error_prefix: String,
    /// Written between chain links (default: `", "`)
    pub error_separator: String,
    /// Written between an error and its stack; empty disables the stack
    pub stack_trace_separator: String,
}

impl Default for ErrorOptions {
    fn default() -> Self {
        Self {
            error_prefix: String::new(),
            error_separator: DEFAULT_ERROR_SEPARATOR.to_string(),
            stack_trace_separator: String::new(),
        }
    }
}

/// Renders anything [`Traced`] into a sink
pub trait ErrorFormatter: fmt::Debug + Send + Sync {
    fn options(&self) -> ErrorOptions;

    fn set_options(&mut self, opts: ErrorOptions);

    fn stack_trace_formatter(&self) -> Option<Arc<dyn StackTraceFormatter>>;

    fn set_stack_trace_formatter(&mut self, formatter: Option<Arc<dyn StackTraceFormatter>>);

    /// Deep copy: nested stack and frame formatters are cloned too
    fn clone_formatter(&self) -> Box<dyn ErrorFormatter>;

    /// Shallow copy: the nested stack formatter is shared
    fn copy_formatter(&self) -> Box<dyn ErrorFormatter>;

    fn render_into(&self, w: &mut dyn fmt::Write, err: &dyn Traced) -> fmt::Result;

    fn render(&self, err: &dyn Traced) -> String {
        let mut out = String::new();
        let _ = self.render_into(&mut out, err);
        out
    }
}

/// Writes prefix, text and, when a stack separator is set and frames exist,
/// the separator followed by the trace.
pub(crate) fn render_link(
    w: &mut dyn fmt::Write,
    opts: &ErrorOptions,
    stack: Option<&dyn StackTraceFormatter>,
    link: &StacktraceError,
) -> fmt::Result {
    w.write_str(&opts.error_prefix)?;
    w.write_str(&link.text())?;

    let Some(stack) = stack else {
        return Ok(());
    };
    if opts.stack_trace_separator.is_empty() {
        return Ok(());
    }

    let trace = link.stack_trace();
    if trace.is_empty() {
        return Ok(());
    }

    w.write_str(&opts.stack_trace_separator)?;
    stack.render_into(w, trace)
}

/// Renders only the first (most specific) link
#[derive(Debug, Clone)]
pub struct PlainErrorFormatter {
    opts: ErrorOptions,
    stack: Option<Arc<dyn StackTraceFormatter>>,
}

impl PlainErrorFormatter {
    pub fn new(opts: ErrorOptions, stack: Option<Arc<dyn StackTraceFormatter>>) -> Self {
        Self { opts, stack }
    }
}

impl Default for PlainErrorFormatter {
    fn default() -> Self {
        Self::new(
            ErrorOptions::default(),
            Some(Arc::new(PlainStackTraceFormatter::default())),
        )
    }
}

impl ErrorFormatter for PlainErrorFormatter {
    fn options(&self) -> ErrorOptions {
        self.opts.clone()
    }

    fn set_options(&mut self, opts: ErrorOptions) {
        self.opts = opts;
    }

    fn stack_trace_formatter(&self) -> Option<Arc<dyn StackTraceFormatter>> {
        self.stack.clone()
    }

    fn set_stack_trace_formatter(&mut self, formatter: Option<Arc<dyn StackTraceFormatter>>) {
        self.stack = formatter;
    }

    fn clone_formatter(&self) -> Box<dyn ErrorFormatter> {
        Box::new(Self {
            opts: self.opts.clone(),
            stack: self.stack.as_ref().map(|s| Arc::from(s.clone_formatter())),
        })
    }

    fn copy_formatter(&self) -> Box<dyn ErrorFormatter> {
        Box::new(self.clone())
    }

    fn render_into(&self, w: &mut dyn fmt::Write, err: &dyn Traced) -> fmt::Result {
        match err.links().next() {
            Some(link) => render_link(w, &self.opts, self.stack.as_deref(), link),
            None => w.write_str(NIL_ERROR_STRING),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Frame;
    use crate::stack::StackTrace;

    fn traced() -> StacktraceError {
        let trace: StackTrace = vec![
            Frame::new("a.rs", "inner", 2),
            Frame::new("b.rs", "outer", 1),
        ]
        .into_iter()
        .collect();
        StacktraceError::with_trace("disk full", trace)
    }

    #[test]
    fn test_text_only_by_default() {
        let formatter = PlainErrorFormatter::default();
        assert_eq!(formatter.render(&traced()), "disk full");
    }

    #[test]
    fn test_prefix_and_stack() {
        let formatter = PlainErrorFormatter::new(
            ErrorOptions {
                error_prefix: "Error: ".to_string(),
                stack_trace_separator: " @ ".to_string(),
                ..Default::default()
            },
            Some(Arc::new(PlainStackTraceFormatter::default())),
        );
        assert_eq!(
            formatter.render(&traced()),
            "Error: disk full @ #1: inner [a.rs:2];#0: outer [b.rs:1]"
        );
    }

    #[test]
    fn test_separator_skipped_without_frames() {
        let formatter = PlainErrorFormatter::new(
            ErrorOptions {
                stack_trace_separator: "=>".to_string(),
                ..Default::default()
            },
            Some(Arc::new(PlainStackTraceFormatter::default())),
        );
        let err = StacktraceError::msg("bare");
        assert_eq!(formatter.render(&err), "bare");
    }

    #[test]
    fn test_absent_error_renders_nil() {
        let formatter = PlainErrorFormatter::default();
        let absent: Option<&StacktraceError> = None;
        assert_eq!(formatter.render(&absent), NIL_ERROR_STRING);
    }
}
