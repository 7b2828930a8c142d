//! Frame capture on top of the `backtrace` unwinder
//!
//! Skip counts are relative to the function that called into this module:
//! `caller(0)` resolves the frame of whoever invoked `caller`. Every wrapper
//! that forwards a skip adds one for itself so the user's call site stays the
//! first visible frame.

use crate::frame::Frame;
use std::ffi::c_void;
use std::panic::Location;
use tracing::trace;

/// Walks the stack, dropping every frame up to and including `anchor`, then
/// `skip` more, handing each remaining program counter to `visit` until it
/// returns false.
///
/// When no frame matches `anchor` (the capture function was inlined, or the
/// platform reports no symbol addresses) the walk falls back to dropping the
/// leading frames that symbolize into the unwinder or this module. That
/// fallback is best effort: without symbols nothing can be recognized and the
/// count starts at the raw top of the stack.
#[inline(never)]
fn walk(anchor: usize, skip: usize, mut visit: impl FnMut(usize) -> bool) {
    let mut anchored = false;
    let mut remaining = skip;

    backtrace::trace(|frame| {
        if !anchored {
            anchored = frame.symbol_address() as usize == anchor;
            return true;
        }
        if remaining > 0 {
            remaining -= 1;
            return true;
        }
        visit(frame.ip() as usize)
    });

    if anchored {
        return;
    }

    trace!(skip, "anchor frame not found, skipping capture frames by name");
    let mut internal = true;
    let mut remaining = skip;
    backtrace::trace(|frame| {
        if internal {
            internal = is_capture_frame(frame);
            if internal {
                return true;
            }
        }
        if remaining > 0 {
            remaining -= 1;
            return true;
        }
        visit(frame.ip() as usize)
    });
}

/// True for frames that belong to the unwinder or to this module
fn is_capture_frame(frame: &backtrace::Frame) -> bool {
    let mut internal = false;
    backtrace::resolve_frame(frame, |symbol| {
        if let Some(name) = symbol.name() {
            internal |= is_capture_symbol(&format!("{:#}", name));
        }
    });
    internal
}

fn is_capture_symbol(name: &str) -> bool {
    let name = name.trim_start_matches('<');
    name.starts_with("backtrace::") || name.starts_with(module_path!())
}

/// Resolves the single frame `skip` levels above the caller.
///
/// Returns `Frame::default()` when the stack is shallower than `skip` or the
/// frame cannot be symbolized.
#[inline(never)]
pub fn caller(skip: usize) -> Frame {
    let anchor = (caller as fn(usize) -> Frame) as usize;
    let mut pc = None;
    walk(anchor, skip, |ip| {
        pc = Some(ip);
        false
    });

    pc.and_then(resolve_first).unwrap_or_default()
}

/// Resolves up to `max` frames starting `skip` levels above the caller.
#[inline(never)]
pub fn callers(skip: usize, max: usize) -> Vec<Frame> {
    if max == 0 {
        return Vec::new();
    }

    let anchor = (callers as fn(usize, usize) -> Vec<Frame>) as usize;
    let mut pcs = Vec::with_capacity(max);
    walk(anchor, skip, |ip| {
        pcs.push(ip);
        pcs.len() < max
    });

    let mut frames = resolve(&pcs);
    frames.truncate(max);
    frames
}

/// Fills `buf` with program counters starting `skip` levels above the
/// caller; returns how many were written.
#[inline(never)]
pub fn callers_into(skip: usize, buf: &mut [usize]) -> usize {
    if buf.is_empty() {
        return 0;
    }

    let anchor = (callers_into as fn(usize, &mut [usize]) -> usize) as usize;
    let mut count = 0;
    walk(anchor, skip, |ip| {
        buf[count] = ip;
        count += 1;
        count < buf.len()
    });

    count
}

/// The frame `skip` levels above the caller, with file and line taken from a
/// `#[track_caller]` location and the function name from the unwound frame.
#[inline(never)]
pub(crate) fn caller_at(location: &'static Location<'static>, skip: usize) -> Frame {
    let anchor = (caller_at as fn(&'static Location<'static>, usize) -> Frame) as usize;
    let mut pc = None;
    walk(anchor, skip, |ip| {
        pc = Some(ip);
        false
    });

    let function = pc
        .and_then(resolve_first)
        .map(|frame| frame.function().to_string())
        .unwrap_or_default();

    Frame::new(location.file(), function, location.line())
}

/// Symbolizes program counters. Inlined calls expand into one frame each,
/// innermost first; counters that do not resolve are skipped.
pub fn resolve(pcs: &[usize]) -> Vec<Frame> {
    let mut frames = Vec::with_capacity(pcs.len());
    for &pc in pcs {
        let before = frames.len();
        resolve_pc(pc, |frame| frames.push(frame));
        if frames.len() == before {
            trace!(pc, "program counter did not resolve");
        }
    }
    frames
}

fn resolve_first(pc: usize) -> Option<Frame> {
    let mut first = None;
    resolve_pc(pc, |frame| {
        if first.is_none() {
            first = Some(frame);
        }
    });
    first
}

fn resolve_pc(pc: usize, mut emit: impl FnMut(Frame)) {
    if pc == 0 {
        return;
    }

    // Return addresses point past the call instruction.
    backtrace::resolve((pc - 1) as *mut c_void, |symbol| {
        let function = symbol
            .name()
            .map(|name| format!("{:#}", name))
            .unwrap_or_default();
        let file = symbol
            .filename()
            .map(|path| path.display().to_string())
            .unwrap_or_default();
        emit(Frame::new(file, function, symbol.lineno().unwrap_or(0)));
    });
}
