//! Formatter subsystem
//!
//! Frame, stack trace and error formatters are independent configuration
//! plus render pairs. Error formatters hold a stack formatter, which holds a
//! frame formatter; `copy_formatter` shares those nested formatters,
//! `clone_formatter` duplicates them.

pub mod chain;
pub mod directive;
pub mod dispatch;
pub mod error;
pub mod frame;
pub mod stack;
mod writer;

pub use chain::ChainErrorFormatter;
pub use directive::{Directive, Flags, Verb};
pub use dispatch::{format_directive, render, render_directive, render_with, Layout, TraceLayout};
pub use error::{ErrorFormatter, ErrorOptions, PlainErrorFormatter};
pub use frame::{FrameFormatter, FrameOptions, PlainFrameFormatter};
pub use stack::{PlainStackTraceFormatter, StackTraceFormatter, StackTraceOptions};

use crate::chain::{ChainedError, Links};
use crate::stacktrace::StacktraceError;

/// Anything the formatters can render: a sequence of links, most specific
/// first. An absent error has no links.
pub trait Traced {
    fn links(&self) -> Links<'_>;
}

impl Traced for StacktraceError {
    fn links(&self) -> Links<'_> {
        Links::single(Some(self))
    }
}

impl Traced for ChainedError {
    fn links(&self) -> Links<'_> {
        self.iter()
    }
}

impl Traced for Option<&StacktraceError> {
    fn links(&self) -> Links<'_> {
        Links::single(*self)
    }
}

impl Traced for Option<&ChainedError> {
    fn links(&self) -> Links<'_> {
        Links::chained(*self)
    }
}

impl<T: Traced + ?Sized> Traced for &T {
    fn links(&self) -> Links<'_> {
        (**self).links()
    }
}
