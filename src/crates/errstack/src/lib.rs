//! errstack - errors with call stacks
//!
//! Errors carry the frames they were raised and propagated through, can be
//! chained most specific first, and render as plain text, with their stacks,
//! or as JSON.
//!
//! # Example
//!
//! ```rust
//! use errstack::{chain, format_directive, StacktraceError};
//!
//! fn read_config() -> Result<(), StacktraceError> {
//!     Err(StacktraceError::msg("permission denied").throw())
//! }
//!
//! fn start() -> Result<(), errstack::ChainedError> {
//!     read_config().map_err(|e| chain("cannot start", e).throw())
//! }
//!
//! let err = start().unwrap_err();
//! assert_eq!(err.text(), "cannot start: permission denied");
//! assert_eq!(format!("{}", err), "cannot start, permission denied");
//!
//! // One frame per line, with file:line and indices
//! println!("{:#?}", err);
//! // cannot start
//! // #0: start [src/main.rs:17]
//! // permission denied
//! // #0: read_config [src/main.rs:13]
//!
//! let json = format_directive(&err, "j");
//! assert!(json.starts_with(r#"[{"error":"cannot start","stack":"#));
//! ```
//!
//! # Format directives
//!
//! `Display` and `Debug` map onto directives: `{}` is `s`, `{:+}` is `+s`,
//! `{:?}` is `v`, `{:-?}` is `-v`, `{:+?}` is `+v` (`{:+4?}` indents by
//! four) and `{:#?}` is `#v`. [`render_directive`] accepts the full set,
//! including `" v"`, `"j"` and `"+j"`; [`render`] takes a [`Layout`]
//! directly.

pub mod capture;
pub mod chain;
pub mod config;
pub mod constants;
pub mod defaults;
pub mod format;
pub mod frame;
pub mod stack;
pub mod stacktrace;
pub mod types;

pub use chain::{chain, ChainView, ChainedError, Links};
pub use constants::{MAX_CALL_DEPTH, NIL_ERROR_STRING};
pub use defaults::{configure, defaults, is_configured, Defaults};
pub use format::{
    format_directive, render, render_directive, render_with, Directive, Layout, TraceLayout,
    Traced,
};
pub use frame::Frame;
pub use stack::StackTrace;
pub use stacktrace::{ErrorView, StacktraceError};
pub use types::{BoxError, CaptureMode, CaptureOptions, ErrstackError, Result};
