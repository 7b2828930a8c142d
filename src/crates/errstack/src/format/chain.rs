//! Error formatter for whole chains

use super::error::{render_link, ErrorFormatter, ErrorOptions};
use super::stack::{PlainStackTraceFormatter, StackTraceFormatter};
use super::Traced;
use crate::constants::NIL_ERROR_STRING;
use std::fmt;
use std::sync::Arc;

/// Renders every link of a chain, most specific first, joined by the
/// error separator
#[derive(Debug, Clone)]
pub struct ChainErrorFormatter {
    opts: ErrorOptions,
    stack: Option<Arc<dyn StackTraceFormatter>>,
}

impl ChainErrorFormatter {
    pub fn new(opts: ErrorOptions, stack: Option<Arc<dyn StackTraceFormatter>>) -> Self {
        Self { opts, stack }
    }
}

impl Default for ChainErrorFormatter {
    fn default() -> Self {
        Self::new(
            ErrorOptions::default(),
            Some(Arc::new(PlainStackTraceFormatter::default())),
        )
    }
}

impl ErrorFormatter for ChainErrorFormatter {
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
        let mut links = err.links().peekable();
        if links.peek().is_none() {
            return w.write_str(NIL_ERROR_STRING);
        }

        while let Some(link) = links.next() {
            render_link(w, &self.opts, self.stack.as_deref(), link)?;
            if links.peek().is_some() {
                w.write_str(&self.opts.error_separator)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::ChainedError;
    use crate::frame::Frame;
    use crate::stack::StackTrace;
    use crate::stacktrace::StacktraceError;

    fn chain() -> ChainedError {
        let first: StackTrace = vec![Frame::new("a.rs", "load", 9)].into_iter().collect();
        let second: StackTrace = vec![
            Frame::new("b.rs", "open", 4),
            Frame::new("c.rs", "main", 1),
        ]
        .into_iter()
        .collect();
        ChainedError::from(StacktraceError::with_trace("Error 1", first))
            .chain(StacktraceError::with_trace("Error 2", second))
    }

    #[test]
    fn test_default_join() {
        let formatter = ChainErrorFormatter::default();
        assert_eq!(formatter.render(&chain()), "Error 1, Error 2");
    }

    #[test]
    fn test_stack_per_link() {
        let mut formatter = ChainErrorFormatter::default();
        formatter.set_options(ErrorOptions {
            error_separator: " | ".to_string(),
            stack_trace_separator: "=>".to_string(),
            ..Default::default()
        });
        assert_eq!(
            formatter.render(&chain()),
            "Error 1=>#0: load [a.rs:9] | Error 2=>#1: open [b.rs:4];#0: main [c.rs:1]"
        );
    }

    #[test]
    fn test_single_error_is_one_link() {
        let formatter = ChainErrorFormatter::default();
        assert_eq!(formatter.render(&StacktraceError::msg("alone")), "alone");
    }

    #[test]
    fn test_without_stack_formatter() {
        let formatter = ChainErrorFormatter::new(
            ErrorOptions {
                stack_trace_separator: "=>".to_string(),
                ..Default::default()
            },
            None,
        );
        assert_eq!(formatter.render(&chain()), "Error 1, Error 2");
    }

    #[test]
    fn test_absent_chain_renders_nil() {
        let absent: Option<&ChainedError> = None;
        assert_eq!(ChainErrorFormatter::default().render(&absent), NIL_ERROR_STRING);
    }

    #[test]
    fn test_copy_leaves_original_options() {
        let formatter = ChainErrorFormatter::default();
        let mut copy = formatter.copy_formatter();
        copy.set_options(ErrorOptions {
            error_separator: ": ".to_string(),
            ..Default::default()
        });
        assert_eq!(copy.render(&chain()), "Error 1: Error 2");
        assert_eq!(formatter.render(&chain()), "Error 1, Error 2");
    }
}
