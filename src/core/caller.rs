//! Caller enrichment
//!
//! Every emitted event carries `Caller`, `FilePath` and `LineNumber`. The
//! logging macros supply them from the call site; the plain logger methods fall
//! back to walking the stack with [`CallerResolver`].

use backtrace::{Backtrace, BacktraceFrame};
use serde::Serialize;
use std::ffi::c_void;
use std::panic::{self, AssertUnwindSafe};

/// Frames from the resolver to the code that called a logger method
pub const DEFAULT_FRAME_INDEX: usize = 3;

/// Frames searched for the resolver's own frame before giving up
const MAX_ANCHOR_DEPTH: usize = 16;

/// Where a log call came from.
///
/// All three fields come from the same frame, or all three are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CallerInfo {
    pub file_name: String,
    pub line_number: String,
    pub caller: String,
}

impl CallerInfo {
    /// Caller info that could not be resolved
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from an explicit call site; `function_path` is a Rust path such
    /// as `my_app::worker::Worker::run`
    pub fn from_location(file: &str, line: u32, function_path: &str) -> Self {
        Self {
            file_name: file.to_string(),
            line_number: line.to_string(),
            caller: signature_from_path(function_path),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.file_name.is_empty() && self.line_number.is_empty() && self.caller.is_empty()
    }
}

/// Turn `a::b::Type::method` into `a::b::Type.method()`.
///
/// Closure segments and the trailing symbol hash are dropped. Parameter types
/// are not recoverable from Rust symbols, so the parameter list is empty.
pub fn signature_from_path(path: &str) -> String {
    let mut path = strip_symbol_hash(path.trim());
    while let Some(outer) = path.strip_suffix("::{{closure}}") {
        path = outer;
    }

    match path.rsplit_once("::") {
        Some((owner, method)) => format!("{}.{}()", owner, method),
        None => format!("{}()", path),
    }
}

fn strip_symbol_hash(path: &str) -> &str {
    match path.rsplit_once("::") {
        Some((rest, last))
            if last.len() == 17
                && last.starts_with('h')
                && last[1..].chars().all(|c| c.is_ascii_hexdigit()) =>
        {
            rest
        }
        _ => path,
    }
}

/// Resolves the application frame that issued a log call.
///
/// The resolver inspects the frame at `max(frame_index - 1, 1)` counted from
/// its own frame (frames of the capture machinery above it are skipped), and falls back to the frame one closer when that one has no
/// symbol. With the default of 3, the inspected frames are the logger method
/// and its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerResolver {
    frame_index: usize,
}

impl Default for CallerResolver {
    fn default() -> Self {
        Self::new(DEFAULT_FRAME_INDEX)
    }
}

impl CallerResolver {
    pub fn new(frame_index: usize) -> Self {
        Self { frame_index }
    }

    pub fn frame_index(&self) -> usize {
        self.frame_index
    }

    /// Index of the first frame inspected
    pub fn effective_index(&self) -> usize {
        self.frame_index.saturating_sub(1).max(1)
    }

    /// Capture the current stack and resolve the caller.
    ///
    /// Never fails: anything that goes wrong yields [`CallerInfo::empty`].
    #[inline(never)]
    pub fn resolve(&self) -> CallerInfo {
        // Captured here, not inside the unwind guard, so this frame is on the stack
        let trace = Backtrace::new_unresolved();

        panic::catch_unwind(AssertUnwindSafe(|| {
            let entry = CallerResolver::resolve as fn(&CallerResolver) -> CallerInfo;
            let anchor = anchor_frame(trace.frames(), entry as usize, "CallerResolver::resolve");
            let frames = &trace.frames()[anchor..];
            self.select(frames.len(), |index| symbolize(&frames[index]))
        }))
        .unwrap_or_default()
    }

    /// Frame selection over a stack of `frame_count` frames.
    ///
    /// `symbolize` returns caller info for a frame index, or `None` when the
    /// frame carries no method metadata.
    pub fn select<F>(&self, frame_count: usize, mut symbolize: F) -> CallerInfo
    where
        F: FnMut(usize) -> Option<CallerInfo>,
    {
        let index = self.effective_index();
        if frame_count <= index {
            return CallerInfo::empty();
        }

        symbolize(index)
            .or_else(|| symbolize(index - 1))
            .unwrap_or_default()
    }
}

/// Index of the frame belonging to the function at `entry`.
///
/// Depending on the build, the capture leaves zero or more of its own frames
/// above the caller. Frames are matched by symbol address first and by
/// resolved name (`name_suffix`) second; 0 when neither matches.
fn anchor_frame(frames: &[BacktraceFrame], entry: usize, name_suffix: &str) -> usize {
    let searched = &frames[..frames.len().min(MAX_ANCHOR_DEPTH)];

    searched
        .iter()
        .position(|frame| frame.symbol_address() as usize == entry)
        .or_else(|| {
            searched.iter().position(|frame| {
                let mut matched = false;
                backtrace::resolve(return_site(frame), |symbol| {
                    if let Some(name) = symbol.name() {
                        matched |= strip_symbol_hash(&format!("{:#}", name)).ends_with(name_suffix);
                    }
                });
                matched
            })
        })
        .unwrap_or(0)
}

/// The recorded ip is a return address; step back into the call instruction
fn return_site(frame: &BacktraceFrame) -> *mut c_void {
    (frame.ip() as usize).saturating_sub(1) as *mut c_void
}

fn symbolize(frame: &BacktraceFrame) -> Option<CallerInfo> {
    let mut resolved = None;
    backtrace::resolve(return_site(frame), |symbol| {
        if resolved.is_some() {
            return;
        }
        if let Some(name) = symbol.name() {
            resolved = Some(CallerInfo {
                file_name: symbol
                    .filename()
                    .map(|path| path.display().to_string())
                    .unwrap_or_default(),
                line_number: symbol.lineno().unwrap_or(0).to_string(),
                caller: signature_from_path(&format!("{:#}", name)),
            });
        }
    });
    resolved
}
