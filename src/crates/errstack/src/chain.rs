//! Ordered chains of errors
//!
//! A chain is a singly linked list of [`StacktraceError`]s. The head is the
//! most specific error and every following link an earlier cause. Links are
//! only ever appended at the tail, so a chain cannot contain a cycle.

use crate::constants::NIL_ERROR_STRING;
use crate::defaults::defaults;
use crate::format::dispatch::{fmt_debug, fmt_display, JsonView};
use crate::stack::StackTrace;
use crate::stacktrace::{Source, StacktraceError};
use crate::types::{BoxError, CaptureOptions};
use serde::{Serialize, Serializer};
use std::error::Error;
use std::fmt;
use std::hint;
use std::panic::Location;

/// A link in an error chain: the current error plus the rest of the chain
///
/// ```
/// use errstack::{chain, ChainedError};
///
/// let err = chain("Error 1", "Error 2");
/// assert_eq!(err.text(), "Error 1: Error 2");
/// assert_eq!(format!("{}", err), "Error 1, Error 2");
/// assert_eq!(format!("{:+}", err), "Error 1: Error 2");
/// ```
pub struct ChainedError {
    current: StacktraceError,
    next: Option<Box<ChainedError>>,
}

impl ChainedError {
    /// Starts a chain from an existing error.
    #[inline(never)]
    pub fn wrap(cause: impl Into<BoxError>, opts: impl Into<CaptureOptions>) -> Self {
        // `build` counts this frame; it must not become a tail call.
        hint::black_box(Self::link(StacktraceError::build(
            Source::Cause(cause.into()),
            opts.into(),
            1,
        )))
    }

    /// Starts a chain from a literal message.
    #[inline(never)]
    pub fn from_message(text: impl Into<String>, opts: impl Into<CaptureOptions>) -> Self {
        hint::black_box(Self::link(StacktraceError::build(
            Source::Message(text.into()),
            opts.into(),
            1,
        )))
    }

    fn link(current: StacktraceError) -> Self {
        Self {
            current,
            next: None,
        }
    }

    /// Appends `link` (and everything chained behind it) at the tail.
    pub fn chain(mut self, link: impl Into<ChainedError>) -> Self {
        let mut tail = &mut self.next;
        while let Some(node) = tail {
            tail = &mut node.next;
        }
        *tail = Some(Box::new(link.into()));
        self
    }

    pub fn next(&self) -> Option<&ChainedError> {
        self.next.as_deref()
    }

    pub fn inner(&self) -> &StacktraceError {
        &self.current
    }

    pub fn inner_mut(&mut self) -> &mut StacktraceError {
        &mut self.current
    }

    /// Every link's error, most specific first
    pub fn iter(&self) -> Links<'_> {
        Links::chained(Some(self))
    }

    pub fn unwrap_all(&self) -> Vec<&StacktraceError> {
        self.iter().collect()
    }

    /// Number of links
    pub fn depth(&self) -> usize {
        self.iter().count()
    }

    /// Link texts joined by the process separator (default `": "`)
    pub fn text(&self) -> String {
        self.text_with(&defaults().separator)
    }

    pub fn text_with(&self, separator: &str) -> String {
        let mut out = String::new();
        for (i, link) in self.iter().enumerate() {
            if i > 0 {
                out.push_str(separator);
            }
            out.push_str(&link.text());
        }
        out
    }

    /// The current link's stack trace
    pub fn stack_trace(&self) -> &StackTrace {
        self.current.stack_trace()
    }

    /// Marks the calling frame on the current (most specific) link.
    #[track_caller]
    #[inline(never)]
    pub fn mark(&mut self) -> &mut Self {
        self.current.mark_at(Location::caller(), 1);
        self
    }

    /// By-value [`mark`](Self::mark)
    #[track_caller]
    #[inline(never)]
    pub fn throw(mut self) -> Self {
        self.current.mark_at(Location::caller(), 1);
        self
    }

    /// Marks the frame `skip` levels above the caller on the current link.
    #[inline(never)]
    pub fn mark_skip(&mut self, skip: usize) -> &mut Self {
        self.current.mark_resolved(skip + 1);
        self
    }

    /// By-value [`mark_skip`](Self::mark_skip)
    #[inline(never)]
    pub fn throw_skip(mut self, skip: usize) -> Self {
        self.current.mark_resolved(skip + 1);
        self
    }
}

/// Chains two errors, either of which may already be a chain.
///
/// `first` keeps its links; `second` and its links follow them.
pub fn chain(first: impl Into<ChainedError>, second: impl Into<ChainedError>) -> ChainedError {
    first.into().chain(second)
}

impl Drop for ChainedError {
    fn drop(&mut self) {
        let mut next = self.next.take();
        while let Some(mut node) = next {
            next = node.next.take();
        }
    }
}

impl From<StacktraceError> for ChainedError {
    fn from(err: StacktraceError) -> Self {
        Self::link(err)
    }
}

impl From<BoxError> for ChainedError {
    fn from(err: BoxError) -> Self {
        Self::link(StacktraceError::new(err))
    }
}

impl From<String> for ChainedError {
    fn from(text: String) -> Self {
        Self::link(StacktraceError::msg(text))
    }
}

impl From<&str> for ChainedError {
    fn from(text: &str) -> Self {
        Self::link(StacktraceError::msg(text))
    }
}

impl fmt::Display for ChainedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_display(self, f)
    }
}

impl fmt::Debug for ChainedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_debug(self, f)
    }
}

impl Error for ChainedError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.next.as_deref().map(|next| next as &(dyn Error + 'static))
    }
}

/// A JSON array of link objects, most specific first
impl Serialize for ChainedError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        JsonView(self.iter()).serialize(serializer)
    }
}

#[derive(Debug, Clone, Copy)]
enum Cursor<'a> {
    Done,
    Single(&'a StacktraceError),
    Chain(&'a ChainedError),
}

/// Iterator over the errors of a chain (or of a lone error)
#[derive(Debug, Clone)]
pub struct Links<'a> {
    cursor: Cursor<'a>,
    chained: bool,
}

impl<'a> Links<'a> {
    pub(crate) fn single(err: Option<&'a StacktraceError>) -> Self {
        Self {
            cursor: err.map_or(Cursor::Done, Cursor::Single),
            chained: false,
        }
    }

    pub(crate) fn chained(err: Option<&'a ChainedError>) -> Self {
        Self {
            cursor: err.map_or(Cursor::Done, Cursor::Chain),
            chained: true,
        }
    }

    /// True when walking a chain, even an absent or one-link chain
    pub fn is_chain(&self) -> bool {
        self.chained
    }
}

impl<'a> Iterator for Links<'a> {
    type Item = &'a StacktraceError;

    fn next(&mut self) -> Option<Self::Item> {
        match self.cursor {
            Cursor::Done => None,
            Cursor::Single(err) => {
                self.cursor = Cursor::Done;
                Some(err)
            }
            Cursor::Chain(link) => {
                self.cursor = link.next().map_or(Cursor::Done, Cursor::Chain);
                Some(link.inner())
            }
        }
    }
}

/// Reads that stay defined for an absent chain
pub trait ChainView<'a> {
    fn next(&self) -> Option<&'a ChainedError>;

    fn inner(&self) -> Option<&'a StacktraceError>;

    /// `"<nil>"` when absent
    fn text(&self) -> String;

    /// Empty when absent
    fn unwrap_all(&self) -> Vec<&'a StacktraceError>;

    /// Empty when absent
    fn stack_trace(&self) -> &'a StackTrace;
}

impl<'a> ChainView<'a> for Option<&'a ChainedError> {
    fn next(&self) -> Option<&'a ChainedError> {
        (*self).and_then(ChainedError::next)
    }

    fn inner(&self) -> Option<&'a StacktraceError> {
        (*self).map(ChainedError::inner)
    }

    fn text(&self) -> String {
        match *self {
            Some(err) => err.text(),
            None => NIL_ERROR_STRING.to_string(),
        }
    }

    fn unwrap_all(&self) -> Vec<&'a StacktraceError> {
        Links::chained(*self).collect()
    }

    fn stack_trace(&self) -> &'a StackTrace {
        match *self {
            Some(err) => err.stack_trace(),
            None => StackTrace::empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn texts(err: &ChainedError) -> Vec<String> {
        err.unwrap_all().iter().map(|e| e.text().into_owned()).collect()
    }

    #[test]
    fn test_unwrap_all_forward_order() {
        let err = chain("A", chain("B", "C"));
        assert_eq!(texts(&err), vec!["A", "B", "C"]);

        let err = chain(chain("A", "B"), "C");
        assert_eq!(texts(&err), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_chain_appends_at_tail() {
        let err = ChainedError::from("A").chain("B").chain("C");
        assert_eq!(err.depth(), 3);
        let last = err.next().and_then(ChainedError::next).unwrap();
        assert_eq!(last.inner().text(), "C");
        assert!(last.next().is_none());
    }

    #[test]
    fn test_text_joins_links() {
        let err = chain("Error 1", "Error 2");
        assert_eq!(err.text(), "Error 1: Error 2");
        assert_eq!(err.text_with(" <- "), "Error 1 <- Error 2");
        assert_eq!(ChainedError::from("only").text(), "only");
    }

    #[test]
    fn test_display_verbs() {
        let err = chain("Error 1", "Error 2");
        assert_eq!(format!("{}", err), "Error 1, Error 2");
        assert_eq!(format!("{:+}", err), "Error 1: Error 2");
    }

    #[test]
    fn test_mark_targets_current_link() {
        let mut err = chain("outer", "inner");
        err.mark();
        err.mark();
        assert_eq!(err.stack_trace().len(), 2);
        assert!(err.next().unwrap().stack_trace().is_empty());
    }

    #[inline(never)]
    fn eager_chain_here() -> ChainedError {
        ChainedError::from_message("timeout", CaptureOptions::eager()).chain("connect")
    }

    #[inline(never)]
    fn propagate(err: ChainedError) -> ChainedError {
        let err = err.throw_skip(1);
        assert_eq!(err.stack_trace().len(), 1);
        err
    }

    #[inline(never)]
    fn handler() -> ChainedError {
        let err = propagate(chain("A", "B"));
        assert_eq!(err.depth(), 2);
        err
    }

    #[test]
    fn test_eager_chain_starts_at_constructor_caller() {
        let err = eager_chain_here();
        let trace = err.stack_trace();
        assert!(!trace.is_empty());
        assert!(trace.frames()[0].function().contains("eager_chain_here"));
        assert!(err.next().unwrap().stack_trace().is_empty());
    }

    #[test]
    fn test_throw_skip_records_helpers_caller() {
        let err = handler();
        let frame = &err.stack_trace().frames()[0];
        assert!(frame.function().contains("handler"));
        assert!(!frame.function().contains("propagate"));
        assert!(err.next().unwrap().stack_trace().is_empty());
    }

    #[test]
    fn test_wrap_keeps_cause() {
        let err = ChainedError::wrap(io::Error::other("disk"), CaptureOptions::manual());
        assert_eq!(err.inner().text(), "disk");
        assert!(err.inner().cause().is_some());
    }

    #[test]
    fn test_source_walks_links() {
        let err = chain("A", chain("B", "C"));
        let mut seen = Vec::new();
        let mut cur: Option<&(dyn Error + 'static)> = Some(&err);
        while let Some(e) = cur {
            seen.push(e.to_string());
            cur = e.source();
        }
        assert_eq!(seen, vec!["A, B, C", "B, C", "C"]);
    }

    #[test]
    fn test_from_boxed_error() {
        let boxed: BoxError = Box::new(io::Error::other("boxed"));
        let err = ChainedError::from(boxed);
        assert_eq!(err.text(), "boxed");
    }

    #[test]
    fn test_json_is_array() {
        let err = chain("A", "B");
        assert_eq!(
            serde_json::to_string(&err).unwrap(),
            r#"[{"error":"A"},{"error":"B"}]"#
        );
    }

    #[test]
    fn test_long_chain_drops() {
        let mut err = ChainedError::from("0");
        for i in 1..100_000 {
            err = ChainedError::from(i.to_string()).chain(err);
        }
        assert_eq!(err.inner().text(), "99999");
        drop(err);
    }

    #[test]
    fn test_absent_chain_view() {
        let absent: Option<&ChainedError> = None;
        assert!(absent.next().is_none());
        assert!(absent.inner().is_none());
        assert_eq!(absent.text(), NIL_ERROR_STRING);
        assert!(absent.unwrap_all().is_empty());
        assert!(absent.stack_trace().is_empty());

        let err = chain("A", "B");
        let view = Some(&err);
        assert_eq!(view.next().map(|n| n.text()), Some("B".to_string()));
        assert_eq!(view.inner().map(|e| e.text().into_owned()), Some("A".to_string()));
    }
}
