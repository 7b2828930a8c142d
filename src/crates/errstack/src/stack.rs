//! Ordered sequence of frames captured for one error

use crate::defaults::defaults;
use crate::frame::Frame;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An ordered sequence of [`Frame`]s.
///
/// Index 0 holds the frame closest to where the error was raised, the last
/// element the outermost caller observed. Rendered indices count the other
/// way (`len - 1 - i`) so the outermost frame is `#0`.
///
/// Standalone, it serializes as `{"stack": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackTrace {
    #[serde(rename = "stack", default)]
    frames: Vec<Frame>,
}

static EMPTY: StackTrace = StackTrace::new();

impl StackTrace {
    pub const fn new() -> Self {
        Self { frames: Vec::new() }
    }

    /// Shared empty trace handed out for absent errors
    pub fn empty() -> &'static StackTrace {
        &EMPTY
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            frames: Vec::with_capacity(capacity),
        }
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Frame> {
        self.frames.iter()
    }

    /// Index printed for the frame stored at `position`
    pub fn display_index(&self, position: usize) -> usize {
        self.frames.len().saturating_sub(position + 1)
    }

    /// The first `n` frames as a trace of their own
    pub fn truncated(&self, n: usize) -> StackTrace {
        let n = n.min(self.frames.len());
        Self {
            frames: self.frames[..n].to_vec(),
        }
    }

    /// Appends unless `limit` frames are already held; returns whether it did.
    pub(crate) fn push_bounded(&mut self, frame: Frame, limit: usize) -> bool {
        if self.frames.len() >= limit {
            return false;
        }
        self.frames.push(frame);
        true
    }
}

impl FromIterator<Frame> for StackTrace {
    fn from_iter<I: IntoIterator<Item = Frame>>(iter: I) -> Self {
        Self {
            frames: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a StackTrace {
    type Item = &'a Frame;
    type IntoIter = std::slice::Iter<'a, Frame>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.iter()
    }
}

impl fmt::Display for StackTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        defaults().stack_trace_formatter().render_into(f, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(n: u32) -> StackTrace {
        (0..n)
            .map(|i| Frame::new("src/lib.rs", format!("f{}", i), i + 1))
            .collect()
    }

    #[test]
    fn test_display_index_counts_from_outermost() {
        let trace = sample(3);
        assert_eq!(trace.display_index(0), 2);
        assert_eq!(trace.display_index(1), 1);
        assert_eq!(trace.display_index(2), 0);
    }

    #[test]
    fn test_push_bounded() {
        let mut trace = StackTrace::new();
        assert!(trace.push_bounded(Frame::default(), 2));
        assert!(trace.push_bounded(Frame::default(), 2));
        assert!(!trace.push_bounded(Frame::default(), 2));
        assert_eq!(trace.len(), 2);
    }

    #[test]
    fn test_truncated_keeps_leading_frames() {
        let trace = sample(4);
        let head = trace.truncated(2);
        assert_eq!(head.len(), 2);
        assert_eq!(head.frames()[0].function(), "f0");
        assert_eq!(trace.truncated(10).len(), 4);
    }

    #[test]
    fn test_json_roundtrip_preserves_frames() {
        let trace = sample(3);
        let encoded = serde_json::to_string(&trace).unwrap();
        assert!(encoded.starts_with("{\"stack\":["));
        let decoded: StackTrace = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, trace);
    }

    #[test]
    fn test_empty_is_shared() {
        assert!(StackTrace::empty().is_empty());
        assert_eq!(StackTrace::empty().to_string(), "");
    }
}
