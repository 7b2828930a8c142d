//! Constants used throughout the errstack library

/// Default bound on the number of frames a single error keeps.
pub const MAX_CALL_DEPTH: usize = 32;

/// Text rendered in place of an absent error.
pub const NIL_ERROR_STRING: &str = "<nil>";

/// Default separator used by `text()` and the `+s` verb to join chain links.
pub const ERROR_CHAIN_SEPARATOR: &str = ": ";

// Error formatter defaults
pub const DEFAULT_ERROR_SEPARATOR: &str = ", ";
pub const VERBOSE_STACK_SEPARATOR: &str = "=>";

// Stack trace formatter defaults
pub const DEFAULT_FRAME_SEPARATOR: &str = ";";
pub const DEFAULT_INDEX_PREFIX: &str = "#";
pub const DEFAULT_INDEX_SUFFIX: &str = ": ";

// Frame formatter defaults
pub const DEFAULT_LOCATION_PREFIX: &str = " [";
pub const DEFAULT_LOCATION_SUFFIX: &str = "]";
pub const DEFAULT_FILE_LINE_SEPARATOR: &str = ":";

// Layout
pub const NEWLINE: &str = "\n";
pub const MIN_INDENT: usize = 2;

// JSON field names
pub const JSON_ERROR_KEY: &str = "error";
pub const JSON_STACK_KEY: &str = "stack";
