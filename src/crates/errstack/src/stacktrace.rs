//! A single error carrying its own stack trace

use crate::capture;
use crate::constants::NIL_ERROR_STRING;
use crate::defaults::defaults;
use crate::format::dispatch::{fmt_debug, fmt_display, LinkJson};
use crate::stack::StackTrace;
use crate::types::{BoxError, CaptureMode, CaptureOptions};
use serde::{Serialize, Serializer};
use std::borrow::Cow;
use std::error::Error;
use std::fmt;
use std::hint;
use std::panic::Location;
use std::sync::OnceLock;

pub(crate) enum Source {
    Cause(BoxError),
    Message(String),
}

enum Trace {
    /// Program counters captured at construction, symbolized on first read
    Eager {
        pcs: Box<[usize]>,
        len: usize,
        limit: usize,
        resolved: OnceLock<StackTrace>,
    },
    /// One frame per mark, never more than `limit`
    Manual { frames: StackTrace, limit: usize },
}

/// An error value plus the frames recorded for it.
///
/// In [`CaptureMode::Eager`] the whole stack is captured when the error is
/// built. In [`CaptureMode::Manual`] the trace starts empty and every
/// [`mark`](Self::mark) appends the marking call site, up to the frame limit;
/// marks past the limit are dropped.
///
/// ```
/// use errstack::StacktraceError;
///
/// fn open() -> Result<(), StacktraceError> {
///     Err(StacktraceError::msg("file not found").throw())
/// }
///
/// fn load() -> Result<(), StacktraceError> {
///     open().map_err(|e| e.throw())
/// }
///
/// let err = load().unwrap_err();
/// assert_eq!(err.text(), "file not found");
/// assert_eq!(err.stack_trace().len(), 2);
/// ```
pub struct StacktraceError {
    source: Source,
    trace: Trace,
}

impl StacktraceError {
    /// Wraps an existing error.
    #[inline(never)]
    pub fn wrap(cause: impl Into<BoxError>, opts: impl Into<CaptureOptions>) -> Self {
        // `build` counts this frame; it must not become a tail call.
        hint::black_box(Self::build(Source::Cause(cause.into()), opts.into(), 1))
    }

    /// Builds an error from a literal message.
    #[inline(never)]
    pub fn from_message(text: impl Into<String>, opts: impl Into<CaptureOptions>) -> Self {
        hint::black_box(Self::build(Source::Message(text.into()), opts.into(), 1))
    }

    /// Wraps an existing error in manual mode.
    #[inline(never)]
    pub fn new(cause: impl Into<BoxError>) -> Self {
        Self::build(Source::Cause(cause.into()), CaptureOptions::manual(), 1)
    }

    /// Builds a manual-mode error from a literal message.
    #[inline(never)]
    pub fn msg(text: impl Into<String>) -> Self {
        Self::build(Source::Message(text.into()), CaptureOptions::manual(), 1)
    }

    /// `skip` counts frames above the caller of `build`; 0 keeps the caller.
    /// Every counted frame has to stay on the stack until the capture runs,
    /// so callers passing a non-zero skip must not tail-call `build`.
    #[inline(never)]
    pub(crate) fn build(source: Source, opts: CaptureOptions, skip: usize) -> Self {
        let limit = opts.frame_limit.unwrap_or_else(|| defaults().frame_limit);
        let trace = match opts.mode {
            CaptureMode::Eager => {
                let mut pcs = vec![0usize; limit].into_boxed_slice();
                let len = capture::callers_into(skip + 1, &mut pcs);
                Trace::Eager {
                    pcs,
                    len,
                    limit,
                    resolved: OnceLock::new(),
                }
            }
            CaptureMode::Manual => Trace::Manual {
                frames: StackTrace::with_capacity(limit.min(8)),
                limit,
            },
        };

        Self { source, trace }
    }

    #[cfg(test)]
    pub(crate) fn with_trace(text: impl Into<String>, frames: StackTrace) -> Self {
        let limit = frames.len().max(crate::constants::MAX_CALL_DEPTH);
        Self {
            source: Source::Message(text.into()),
            trace: Trace::Manual { frames, limit },
        }
    }

    /// Appends the calling frame to a manual trace.
    ///
    /// Does nothing for an eager trace or once the frame limit is reached.
    #[track_caller]
    #[inline(never)]
    pub fn mark(&mut self) -> &mut Self {
        self.mark_at(Location::caller(), 1);
        self
    }

    /// By-value [`mark`](Self::mark), for `Err(e.throw())` and `map_err`.
    #[track_caller]
    #[inline(never)]
    pub fn throw(mut self) -> Self {
        self.mark_at(Location::caller(), 1);
        self
    }

    /// Appends the frame `skip` levels above the caller; a helper that
    /// marks on behalf of its caller passes 1.
    ///
    /// Unlike [`mark`](Self::mark), file and line come from debug info, so
    /// they are empty in builds without it.
    #[inline(never)]
    pub fn mark_skip(&mut self, skip: usize) -> &mut Self {
        self.mark_resolved(skip + 1);
        self
    }

    /// By-value [`mark_skip`](Self::mark_skip)
    #[inline(never)]
    pub fn throw_skip(mut self, skip: usize) -> Self {
        self.mark_resolved(skip + 1);
        self
    }

    #[inline(never)]
    pub(crate) fn mark_resolved(&mut self, skip: usize) {
        let Trace::Manual { frames, limit } = &mut self.trace else {
            return;
        };
        if frames.len() >= *limit {
            return;
        }

        let frame = capture::caller(skip + 1);
        frames.push_bounded(frame, *limit);
    }

    #[inline(never)]
    pub(crate) fn mark_at(&mut self, location: &'static Location<'static>, skip: usize) {
        let Trace::Manual { frames, limit } = &mut self.trace else {
            return;
        };
        if frames.len() >= *limit {
            return;
        }

        let frame = capture::caller_at(location, skip + 1);
        frames.push_bounded(frame, *limit);
    }

    /// The cause's text when wrapping an error, the literal message otherwise.
    pub fn text(&self) -> Cow<'_, str> {
        match &self.source {
            Source::Cause(cause) => Cow::Owned(cause.to_string()),
            Source::Message(text) => Cow::Borrowed(text),
        }
    }

    /// The wrapped error; `None` for errors built from a message.
    pub fn cause(&self) -> Option<&(dyn Error + Send + Sync + 'static)> {
        match &self.source {
            Source::Cause(cause) => Some(cause.as_ref()),
            Source::Message(_) => None,
        }
    }

    pub fn into_cause(self) -> Option<BoxError> {
        match self.source {
            Source::Cause(cause) => Some(cause),
            Source::Message(_) => None,
        }
    }

    pub fn stack_trace(&self) -> &StackTrace {
        match &self.trace {
            Trace::Eager {
                pcs,
                len,
                limit,
                resolved,
            } => resolved.get_or_init(|| {
                let mut frames = capture::resolve(&pcs[..*len]);
                frames.truncate(*limit);
                frames.into_iter().collect()
            }),
            Trace::Manual { frames, .. } => frames,
        }
    }

    /// The first `n` frames, indexed as a trace of their own
    pub fn stack_trace_n(&self, n: usize) -> StackTrace {
        self.stack_trace().truncated(n)
    }

    pub fn capture_mode(&self) -> CaptureMode {
        match self.trace {
            Trace::Eager { .. } => CaptureMode::Eager,
            Trace::Manual { .. } => CaptureMode::Manual,
        }
    }

    pub fn frame_limit(&self) -> usize {
        match self.trace {
            Trace::Eager { limit, .. } | Trace::Manual { limit, .. } => limit,
        }
    }
}

impl fmt::Display for StacktraceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_display(self, f)
    }
}

impl fmt::Debug for StacktraceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_debug(self, f)
    }
}

impl Error for StacktraceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.source {
            Source::Cause(cause) => Some(cause.as_ref()),
            Source::Message(_) => None,
        }
    }
}

/// `{"error": ..., "stack": [...]}`, `stack` omitted when empty
impl Serialize for StacktraceError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        LinkJson(self).serialize(serializer)
    }
}

/// Reads that stay defined for an absent error
pub trait ErrorView<'a> {
    /// `"<nil>"` when absent
    fn text(&self) -> Cow<'a, str>;

    /// Empty when absent
    fn stack_trace(&self) -> &'a StackTrace;

    fn cause(&self) -> Option<&'a (dyn Error + Send + Sync + 'static)>;
}

impl<'a> ErrorView<'a> for Option<&'a StacktraceError> {
    fn text(&self) -> Cow<'a, str> {
        match *self {
            Some(err) => err.text(),
            None => Cow::Borrowed(NIL_ERROR_STRING),
        }
    }

    fn stack_trace(&self) -> &'a StackTrace {
        match *self {
            Some(err) => err.stack_trace(),
            None => StackTrace::empty(),
        }
    }

    fn cause(&self) -> Option<&'a (dyn Error + Send + Sync + 'static)> {
        (*self).and_then(StacktraceError::cause)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::MAX_CALL_DEPTH;
    use std::io;

    #[inline(never)]
    fn eager_here() -> StacktraceError {
        let err = StacktraceError::from_message("boom", CaptureOptions::eager());
        assert_eq!(err.capture_mode(), CaptureMode::Eager);
        err
    }

    /// Marks on behalf of whoever called it
    #[inline(never)]
    fn record_failure(err: &mut StacktraceError) -> usize {
        err.mark_skip(1);
        err.stack_trace().len()
    }

    #[inline(never)]
    fn load_settings() -> StacktraceError {
        let mut err = StacktraceError::msg("unreadable");
        let recorded = record_failure(&mut err);
        assert_eq!(recorded, 1);
        err
    }

    #[test]
    fn test_manual_marks_count_down_to_zero() {
        let mut err = StacktraceError::msg("x");
        for _ in 0..5 {
            err.mark();
        }
        let trace = err.stack_trace();
        assert_eq!(trace.len(), 5);
        let indices: Vec<usize> = (0..trace.len()).map(|i| trace.display_index(i)).collect();
        assert_eq!(indices, vec![4, 3, 2, 1, 0]);
    }

    #[test]
    fn test_marks_stop_at_bound() {
        let mut err = StacktraceError::msg("x");
        for _ in 0..MAX_CALL_DEPTH + 8 {
            err.mark();
        }
        assert_eq!(err.stack_trace().len(), MAX_CALL_DEPTH);
    }

    #[test]
    fn test_custom_frame_limit() {
        let mut err =
            StacktraceError::from_message("x", CaptureOptions::manual().with_frame_limit(3));
        for _ in 0..6 {
            err.mark();
        }
        assert_eq!(err.frame_limit(), 3);
        assert_eq!(err.stack_trace().len(), 3);
    }

    #[test]
    fn test_mark_records_call_site() {
        let mut err = StacktraceError::msg("x");
        let line = line!() + 1;
        err.mark();
        let frame = &err.stack_trace().frames()[0];
        assert!(frame.file().ends_with("stacktrace.rs"));
        assert_eq!(frame.line(), line);
    }

    #[test]
    fn test_throw_marks_by_value() {
        let err = StacktraceError::msg("x").throw().throw();
        assert_eq!(err.stack_trace().len(), 2);
    }

    #[test]
    fn test_eager_starts_at_constructor_caller() {
        let err = eager_here();
        assert_eq!(err.capture_mode(), CaptureMode::Eager);
        let trace = err.stack_trace();
        assert!(!trace.is_empty());
        assert!(trace.len() <= MAX_CALL_DEPTH);
        assert!(trace.frames()[0].function().contains("eager_here"));
    }

    #[test]
    fn test_mark_skip_records_helpers_caller() {
        let err = load_settings();
        let frame = &err.stack_trace().frames()[0];
        assert!(frame.function().contains("load_settings"));
        assert!(!frame.function().contains("record_failure"));
    }

    #[test]
    fn test_mark_skip_respects_bound() {
        let mut err =
            StacktraceError::from_message("x", CaptureOptions::manual().with_frame_limit(2));
        err.mark_skip(0);
        let err = err.throw_skip(0).throw_skip(0);
        assert_eq!(err.stack_trace().len(), 2);
    }

    #[test]
    fn test_mark_skip_ignored_when_eager() {
        let mut err = eager_here();
        let before = err.stack_trace().len();
        err.mark_skip(0);
        assert_eq!(err.stack_trace().len(), before);
    }

    #[test]
    fn test_eager_ignores_mark() {
        let mut err = eager_here();
        let before = err.stack_trace().len();
        err.mark();
        assert_eq!(err.stack_trace().len(), before);
    }

    #[test]
    fn test_eager_respects_frame_limit() {
        let err = StacktraceError::wrap(
            io::Error::other("disk"),
            CaptureOptions::eager().with_frame_limit(2),
        );
        assert!(err.stack_trace().len() <= 2);
    }

    #[test]
    fn test_stack_trace_n_renumbers() {
        let mut err = StacktraceError::msg("x");
        for _ in 0..4 {
            err.mark();
        }
        let head = err.stack_trace_n(2);
        assert_eq!(head.len(), 2);
        assert_eq!(head.display_index(0), 1);
        assert_eq!(head.display_index(1), 0);
    }

    #[test]
    fn test_cause_text_and_source() {
        let err = StacktraceError::new(io::Error::other("disk full"));
        assert_eq!(err.text(), "disk full");
        assert!(err.cause().is_some());
        assert!(Error::source(&err).is_some());

        let msg = StacktraceError::msg("plain");
        assert_eq!(msg.text(), "plain");
        assert!(msg.cause().is_none());
        assert!(msg.into_cause().is_none());
    }

    #[test]
    fn test_absent_error_view() {
        let absent: Option<&StacktraceError> = None;
        assert_eq!(absent.text(), NIL_ERROR_STRING);
        assert!(absent.stack_trace().is_empty());
        assert!(absent.cause().is_none());

        let err = StacktraceError::msg("here");
        assert_eq!(Some(&err).text(), "here");
    }

    #[test]
    fn test_display_and_debug() {
        let err = StacktraceError::with_trace(
            "broken",
            vec![crate::frame::Frame::new("a.rs", "a::f", 3)]
                .into_iter()
                .collect(),
        );
        assert_eq!(format!("{}", err), "broken");
        assert_eq!(format!("{:?}", err), "broken=>a::f");
        assert_eq!(format!("{:-?}", err), "broken=>a::f [a.rs:3]");
        assert_eq!(format!("{:#?}", err), "broken\n#0: a::f [a.rs:3]");
    }

    #[test]
    fn test_json_shape() {
        let err = StacktraceError::msg("plain");
        assert_eq!(serde_json::to_string(&err).unwrap(), r#"{"error":"plain"}"#);
    }
}
