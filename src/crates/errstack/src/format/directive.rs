//! Format directives: a verb plus flags and an optional width
//!
//! | Directive | Output |
//! |-----------|--------|
//! | `s`  | error text only |
//! | `+s` | error text joined with the process separator (`": "`) |
//! | `v`  | text and stack, function names only, single line |
//! | ` v` | as `v`, one frame per line |
//! | `-v` | as `v`, with file and line |
//! | `+v` | as `-v`, one frame per line; a width sets the indent |
//! | `#v` | as `+v`, with frame indices |
//! | `j`  | JSON |
//! | `+j` | pretty JSON; a width sets the indent |

use super::dispatch::{Layout, TraceLayout};
use crate::constants::MIN_INDENT;
use crate::types::ErrstackError;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    /// `s`
    Text,
    /// `v`
    Verbose,
    /// `j`
    Json,
}

impl Verb {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            's' => Some(Verb::Text),
            'v' => Some(Verb::Verbose),
            'j' => Some(Verb::Json),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            Verb::Text => 's',
            Verb::Verbose => 'v',
            Verb::Json => 'j',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Flags {
    pub space: bool,
    pub minus: bool,
    pub plus: bool,
    pub hash: bool,
}

/// The one flag a verbose directive honours
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Emphasis {
    Space,
    Minus,
    Plus,
    Hash,
}

impl Flags {
    fn set(&mut self, c: char) -> bool {
        match c {
            ' ' => self.space = true,
            '-' => self.minus = true,
            '+' => self.plus = true,
            '#' => self.hash = true,
            _ => return false,
        }
        true
    }

    // Priority order: space, minus, plus, hash.
    fn emphasis(&self) -> Option<Emphasis> {
        if self.space {
            Some(Emphasis::Space)
        } else if self.minus {
            Some(Emphasis::Minus)
        } else if self.plus {
            Some(Emphasis::Plus)
        } else if self.hash {
            Some(Emphasis::Hash)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Directive {
    pub verb: Verb,
    pub flags: Flags,
    pub width: Option<usize>,
}

impl Directive {
    pub fn new(verb: Verb) -> Self {
        Self {
            verb,
            flags: Flags::default(),
            width: None,
        }
    }

    pub fn with_flags(mut self, flags: Flags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.width = Some(width);
        self
    }

    /// Resolves flags and width into the layout to render
    pub fn layout(&self) -> Layout {
        match self.verb {
            Verb::Text if self.flags.plus => Layout::Joined,
            Verb::Text => Layout::Text,
            Verb::Verbose => {
                let emphasis = self.flags.emphasis();
                let multiline = matches!(
                    emphasis,
                    Some(Emphasis::Space | Emphasis::Plus | Emphasis::Hash)
                );
                let location = matches!(
                    emphasis,
                    Some(Emphasis::Minus | Emphasis::Plus | Emphasis::Hash)
                );
                Layout::Trace(TraceLayout {
                    multiline,
                    location,
                    indices: emphasis == Some(Emphasis::Hash),
                    indent: if multiline {
                        self.width.map(|w| w.max(MIN_INDENT))
                    } else {
                        None
                    },
                })
            }
            Verb::Json => Layout::Json {
                indent: self
                    .flags
                    .plus
                    .then(|| self.width.unwrap_or(0).max(MIN_INDENT)),
            },
        }
    }
}

impl From<Directive> for Layout {
    fn from(directive: Directive) -> Self {
        directive.layout()
    }
}

/// Parses `[%][flags][width]verb`, e.g. `"s"`, `" v"`, `"+4j"`, `"%#v"`.
impl FromStr for Directive {
    type Err = ErrstackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let body = s.strip_prefix('%').unwrap_or(s);
        let mut chars = body.chars().peekable();

        let mut flags = Flags::default();
        while let Some(&c) = chars.peek() {
            if !flags.set(c) {
                break;
            }
            chars.next();
        }

        let mut width: Option<usize> = None;
        while let Some(digit) = chars.peek().and_then(|c| c.to_digit(10)) {
            let current = width.unwrap_or(0);
            width = Some(
                current
                    .checked_mul(10)
                    .and_then(|w| w.checked_add(digit as usize))
                    .ok_or_else(|| ErrstackError::invalid_directive(s, "width overflows"))?,
            );
            chars.next();
        }

        let verb_char = chars
            .next()
            .ok_or_else(|| ErrstackError::invalid_directive(s, "missing verb"))?;
        let verb = Verb::from_char(verb_char).ok_or(ErrstackError::UnknownVerb(verb_char))?;

        if chars.next().is_some() {
            return Err(ErrstackError::invalid_directive(
                s,
                "unexpected characters after verb",
            ));
        }

        Ok(Self { verb, flags, width })
    }
}
