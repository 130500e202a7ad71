// Call-site stack capture and HTML rendering.
//
// Frames are parsed out of the std backtrace display format. Anything that
// does not look like a user frame (std/core/runtime/recorder internals) is
// dropped so the panel shows where in the application the call originated.

use crate::common::escape_html;
use serde::Serialize;
use std::backtrace::Backtrace;

/// One frame of the call site stack.
#[derive(Debug, Clone, Serialize)]
pub struct StackFrame {
    pub file: String,
    pub line: u32,
    pub function: String,
    /// Source line text, empty when the file could not be read.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub source: String,
}

/// Symbols that are infrastructure rather than application code.
const SKIP_SYMBOLS: &[&str] = &[
    "std::",
    "core::",
    "alloc::",
    "backtrace",
    "__rust_begin_short_backtrace",
    "__rust_end_short_backtrace",
    "__libc_start_main",
    "graphdb_panel::domain::stacktrace",
    "graphdb_panel::infrastructure::recorder",
    "_start",
];

/// Capture the current call stack, excluding recorder and runtime frames.
///
/// Returns at most `max_frames` frames, outermost first. When
/// `with_source` is set the source line for each frame is read from disk;
/// unreadable files leave the field empty.
pub fn capture_stack(max_frames: usize, with_source: bool) -> Vec<StackFrame> {
    let bt = Backtrace::force_capture();
    let mut frames = parse_backtrace(&bt.to_string());
    // The parsed order is innermost first; keep the frames closest to the
    // call, then flip to outermost-first for display.
    frames.truncate(max_frames);
    frames.reverse();
    if with_source {
        for frame in &mut frames {
            frame.source = read_source_line(&frame.file, frame.line);
        }
    }
    frames
}

/// Parse the display output of a std backtrace into frames.
///
/// Frames without a resolvable symbol or file location are skipped, as are
/// infrastructure frames. Malformed lines never abort the parse.
pub fn parse_backtrace(full: &str) -> Vec<StackFrame> {
    let mut frames = Vec::new();
    let mut lines = full.lines().peekable();

    while let Some(line) = lines.next() {
        let trimmed = line.trim();
        // Symbol lines look like "12: path::to::function".
        let Some((index, symbol)) = trimmed.split_once(": ") else {
            continue;
        };
        if index.parse::<u32>().is_err() {
            continue;
        }
        let symbol = symbol.trim().to_string();

        // The location, if resolved, follows on its own "at file:line:col"
        // line.
        let mut file = String::new();
        let mut line_no = 0u32;
        if let Some(next) = lines.peek().copied() {
            if let Some(location) = next.trim().strip_prefix("at ") {
                lines.next();
                if let Some((f, l)) = split_location(location) {
                    file = f;
                    line_no = l;
                }
            }
        }

        if symbol.is_empty() || file.is_empty() || line_no == 0 {
            continue;
        }
        if SKIP_SYMBOLS.iter().any(|s| symbol.contains(s)) {
            continue;
        }

        frames.push(StackFrame {
            file,
            line: line_no,
            function: symbol,
            source: String::new(),
        });
    }

    frames
}

/// Split "path/to/file.rs:123:45" into (path, line).
fn split_location(location: &str) -> Option<(String, u32)> {
    let mut parts = location.rsplitn(3, ':');
    let _column = parts.next()?;
    let line = parts.next()?.parse::<u32>().ok()?;
    let file = parts.next()?;
    if file.is_empty() {
        return None;
    }
    Some((file.to_string(), line))
}

fn read_source_line(file: &str, line: u32) -> String {
    if line == 0 {
        return String::new();
    }
    std::fs::read_to_string(file)
        .ok()
        .and_then(|src| src.lines().nth(line as usize - 1).map(|l| l.trim().to_string()))
        .unwrap_or_default()
}

/// Render captured frames as the panel's HTML-escaped stack trace.
///
/// Frames missing file or function information are skipped; rendering
/// continues with the remaining frames. The returned string is already
/// escaped and is inserted into the fragment verbatim.
pub fn render_stacktrace(frames: &[StackFrame]) -> String {
    let mut rendered = Vec::new();
    for frame in frames {
        if frame.file.is_empty() || frame.function.is_empty() {
            continue;
        }
        let (dir, base) = match frame.file.rsplit_once('/') {
            Some((dir, base)) => (dir, base),
            None => ("", frame.file.as_str()),
        };
        rendered.push(format!(
            "<span class=\"path\">{}/</span><span class=\"file\">{}</span> \
             in <span class=\"func\">{}</span>(<span class=\"lineno\">{}</span>)\n \
             <span class=\"code\">{}</span>",
            escape_html(dir),
            escape_html(base),
            escape_html(&frame.function),
            frame.line,
            escape_html(&frame.source),
        ));
    }
    rendered.join("\n")
}
