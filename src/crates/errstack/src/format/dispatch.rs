//! Layout selection and rendering
//!
//! Every layout works on copies of the configured formatters, so the process
//! defaults never see the overrides a single call applies.

use super::directive::{Directive, Flags, Verb};
use super::error::ErrorFormatter;
use super::stack::{PlainStackTraceFormatter, StackTraceFormatter};
use super::writer::FmtSink;
use super::Traced;
use crate::chain::Links;
use crate::constants::{
    JSON_ERROR_KEY, JSON_STACK_KEY, MIN_INDENT, NEWLINE, NIL_ERROR_STRING, VERBOSE_STACK_SEPARATOR,
};
use crate::defaults::{defaults, Defaults};
use crate::stacktrace::StacktraceError;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// What a render call produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Error text only, default separators
    Text,
    /// Error text only, links joined with the process separator
    Joined,
    /// Error text followed by its stack
    Trace(TraceLayout),
    /// JSON; `indent` pretty-prints with that many spaces
    Json { indent: Option<usize> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TraceLayout {
    /// Newline between errors, between text and stack, and between frames
    pub multiline: bool,
    /// Include `file:line`
    pub location: bool,
    /// Include frame indices
    pub indices: bool,
    /// Spaces before every frame
    pub indent: Option<usize>,
}

/// Renders with the process defaults
pub fn render(w: &mut dyn fmt::Write, err: &dyn Traced, layout: &Layout) -> fmt::Result {
    render_with(w, err, layout, defaults())
}

/// Renders with explicit defaults
pub fn render_with(
    w: &mut dyn fmt::Write,
    err: &dyn Traced,
    layout: &Layout,
    defaults: &Defaults,
) -> fmt::Result {
    let links = err.links();
    let base: &dyn ErrorFormatter = if links.is_chain() {
        defaults.chain_formatter.as_ref()
    } else {
        defaults.error_formatter.as_ref()
    };

    match layout {
        Layout::Text if !links.is_chain() => {
            let mut links = links;
            match links.next() {
                Some(link) => w.write_str(&link.text()),
                None => w.write_str(NIL_ERROR_STRING),
            }
        }
        Layout::Text => {
            let mut formatter = base.copy_formatter();
            let mut opts = formatter.options();
            opts.stack_trace_separator.clear();
            formatter.set_options(opts);
            formatter.render_into(w, err)
        }
        Layout::Joined => {
            let mut formatter = base.copy_formatter();
            let mut opts = formatter.options();
            opts.error_separator = defaults.separator.clone();
            opts.stack_trace_separator.clear();
            formatter.set_options(opts);
            formatter.render_into(w, err)
        }
        Layout::Trace(trace) => render_trace(w, err, base, trace),
        Layout::Json { indent } => render_json(w, links, *indent),
    }
}

fn render_trace(
    w: &mut dyn fmt::Write,
    err: &dyn Traced,
    base: &dyn ErrorFormatter,
    trace: &TraceLayout,
) -> fmt::Result {
    let mut error_fmt = base.copy_formatter();
    let mut stack_fmt: Box<dyn StackTraceFormatter> = match base.stack_trace_formatter() {
        Some(stack) => stack.copy_formatter(),
        None => Box::new(PlainStackTraceFormatter::default()),
    };
    let mut frame_fmt = stack_fmt.frame_formatter().copy_formatter();

    let mut error_opts = error_fmt.options();
    let mut stack_opts = stack_fmt.options();
    let mut frame_opts = frame_fmt.options();

    error_opts.stack_trace_separator = VERBOSE_STACK_SEPARATOR.to_string();
    frame_opts.skip_location = !trace.location;
    stack_opts.skip_stack_index = !trace.indices;

    if trace.multiline {
        error_opts.error_separator = NEWLINE.to_string();
        error_opts.stack_trace_separator = NEWLINE.to_string();
        stack_opts.frame_separator = NEWLINE.to_string();
        if let Some(width) = trace.indent {
            stack_opts.frame_indent = " ".repeat(width.max(MIN_INDENT));
        }
    }

    frame_fmt.set_options(frame_opts);
    stack_fmt.set_options(stack_opts);
    stack_fmt.set_frame_formatter(Arc::from(frame_fmt));
    error_fmt.set_options(error_opts);
    error_fmt.set_stack_trace_formatter(Some(Arc::from(stack_fmt)));

    error_fmt.render_into(w, err)
}

fn render_json(w: &mut dyn fmt::Write, links: Links<'_>, indent: Option<usize>) -> fmt::Result {
    let view = JsonView(links);
    let mut sink = FmtSink::new(w);

    let result = match indent {
        None => serde_json::to_writer(&mut sink, &view),
        Some(width) => {
            let indent = " ".repeat(width);
            let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
            let mut serializer = serde_json::Serializer::with_formatter(&mut sink, formatter);
            view.serialize(&mut serializer)
        }
    };

    result.map_err(|_| fmt::Error)
}

/// Renders a directive string such as `"+v"`; an invalid directive writes
/// nothing.
pub fn render_directive(w: &mut dyn fmt::Write, err: &dyn Traced, directive: &str) -> fmt::Result {
    match directive.parse::<Directive>() {
        Ok(directive) => render(w, err, &directive.layout()),
        Err(e) => {
            debug!(directive, error = %e, "ignoring format directive");
            Ok(())
        }
    }
}

pub fn format_directive(err: &dyn Traced, directive: &str) -> String {
    let mut out = String::new();
    let _ = render_directive(&mut out, err, directive);
    out
}

/// `{}` renders `s`, `{:+}` renders `+s`.
pub(crate) fn fmt_display(err: &dyn Traced, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let directive = Directive::new(Verb::Text).with_flags(Flags {
        plus: f.sign_plus(),
        ..Flags::default()
    });
    render(f, err, &directive.layout())
}

/// `{:?}` renders `v`; `-`, `+`, `#` and a width carry over.
pub(crate) fn fmt_debug(err: &dyn Traced, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let directive = Directive {
        verb: Verb::Verbose,
        flags: Flags {
            space: false,
            minus: f.sign_minus(),
            plus: f.sign_plus(),
            hash: f.alternate(),
        },
        width: f.width(),
    };
    render(f, err, &directive.layout())
}

/// JSON shape of one link: `{"error": ..., "stack": [...]}`, the stack key
/// omitted when no frames were captured
pub(crate) struct LinkJson<'a>(pub &'a StacktraceError);

impl Serialize for LinkJson<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let trace = self.0.stack_trace();
        let len = if trace.is_empty() { 1 } else { 2 };
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry(JSON_ERROR_KEY, &self.0.text())?;
        if !trace.is_empty() {
            map.serialize_entry(JSON_STACK_KEY, trace.frames())?;
        }
        map.end()
    }
}

/// A chain serializes as an array of links, a single error as one link
/// object, an absent error as `null`
pub(crate) struct JsonView<'a>(pub Links<'a>);

impl Serialize for JsonView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let links = self.0.clone();
        let Some(first) = links.clone().next() else {
            return serializer.serialize_unit();
        };
        if !links.is_chain() {
            return LinkJson(first).serialize(serializer);
        }

        let mut seq = serializer.serialize_seq(None)?;
        for link in links {
            seq.serialize_element(&LinkJson(link))?;
        }
        seq.end()
    }
}
