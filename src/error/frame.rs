//! Call-site capture for wrapped errors.
//!
//! # Responsibilities
//! - Attribute a wrapped error to the code that created it
//! - Resolve the enclosing function name when debug info allows it
//! - Walk further up the stack for helpers wrapping on behalf of a caller
//!
//! # Design Decisions
//! - `#[track_caller]` gives the exact file and line of the caller for free
//! - `std::backtrace` is only consulted for function names and extra skip,
//!   anchored on the frame whose location matches the caller
//! - Resolution is best effort: a miss yields `None`, never an error

use std::backtrace::Backtrace;
use std::panic::Location;

use serde::{Deserialize, Serialize};

/// Source location that produced a wrapped error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    /// Fully qualified function name, when symbols are available.
    pub function: Option<String>,
    /// Source file path in the compiler's form (`file!()`), whatever the skip.
    pub file: String,
    /// 1-based line number.
    pub line: u32,
}

/// Capture the frame `skip` levels above the tracked caller.
///
/// With `skip == 0` the location is the call site that invoked this function
/// (or the outermost `#[track_caller]` function leading to it). Larger values
/// walk outwards through the call stack.
///
/// Returns `None` when the stack is shallower than requested.
///
/// Every call captures and symbolizes the current stack to resolve function
/// names, which costs on the order of hundreds of microseconds. Wrapping is
/// meant for error paths, not for loops on the happy path.
#[track_caller]
pub fn capture_frame(skip: usize) -> Option<Frame> {
    let caller = Location::caller();
    let backtrace = Backtrace::force_capture();
    let entries = parse_backtrace(&format!("{backtrace:#}"));

    let anchor = find_anchor(&entries, caller.file(), caller.line());

    if skip == 0 {
        let function = anchor.and_then(|idx| entries[idx].function.clone());
        return Some(Frame {
            function,
            file: caller.file().to_string(),
            line: caller.line(),
        });
    }

    let anchor = anchor?;
    let target = entries.get(anchor.checked_add(skip)?)?;
    let (path, line) = target.location.as_ref()?;
    let file = match &entries[anchor].location {
        Some((anchor_path, _)) => compiler_path(path, anchor_path, caller.file()),
        None => path.clone(),
    };

    Some(Frame {
        function: target.function.clone(),
        file,
        line: *line,
    })
}

/// One symbol of a rendered backtrace.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    function: Option<String>,
    location: Option<(String, u32)>,
}

/// Parse the alternate (`{:#}`) rendering of a `std::backtrace::Backtrace`.
///
/// Each symbol line opens a new entry; inlined symbols are printed without
/// an index and still count as their own entry. `at path:line:col` lines
/// attach a location to the entry above them.
fn parse_backtrace(text: &str) -> Vec<Entry> {
    let mut entries: Vec<Entry> = Vec::new();

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(location) = line.strip_prefix("at ") {
            if let Some(entry) = entries.last_mut() {
                if entry.location.is_none() {
                    entry.location = parse_location(location);
                }
            }
            continue;
        }

        let symbol = match line.split_once(": ") {
            Some((index, rest)) if index.chars().all(|c| c.is_ascii_digit()) => rest,
            _ => line,
        };

        entries.push(Entry {
            function: clean_symbol(symbol),
            location: None,
        });
    }

    entries
}

/// Split `path:line:col` (or `path:line`) from the right, so paths
/// containing colons survive.
fn parse_location(text: &str) -> Option<(String, u32)> {
    let mut parts = text.rsplitn(3, ':');
    let last = parts.next()?;
    let middle = parts.next()?;

    match parts.next() {
        Some(path) => {
            let line = middle.parse().ok()?;
            Some((path.to_string(), line))
        }
        None => {
            let line = last.parse().ok()?;
            Some((middle.to_string(), line))
        }
    }
}

/// Drop the `::h<16 hex>` disambiguator and unresolved placeholders.
fn clean_symbol(symbol: &str) -> Option<String> {
    let symbol = symbol.trim();
    if symbol.is_empty() || symbol == "<unknown>" {
        return None;
    }

    let stripped = match symbol.rsplit_once("::h") {
        Some((head, hash)) if hash.len() == 16 && hash.chars().all(|c| c.is_ascii_hexdigit()) => head,
        _ => symbol,
    };

    Some(stripped.to_string())
}

/// Index of the innermost entry located exactly at `file:line`.
///
/// The compiler records `file` relative to the workspace while backtraces
/// usually carry absolute paths, hence the suffix match.
fn find_anchor(entries: &[Entry], file: &str, line: u32) -> Option<usize> {
    entries.iter().position(|entry| match &entry.location {
        Some((path, l)) => *l == line && same_file(path, file),
        None => false,
    })
}

/// Express a backtrace `path` the way the compiler records file names.
///
/// The anchor pairs a backtrace path with its compiler form, which yields the
/// directory the crate was built from. Paths outside it are kept as they are.
fn compiler_path(path: &str, anchor_path: &str, caller_file: &str) -> String {
    let anchor_path = anchor_path.replace('\\', "/");
    let caller_file = caller_file.replace('\\', "/");
    let path = path.replace('\\', "/");

    let root = anchor_path
        .strip_suffix(caller_file.trim_start_matches("./"))
        .filter(|root| root.ends_with('/'));

    if let Some(relative) = root.and_then(|root| path.strip_prefix(root)) {
        return relative.to_string();
    }
    path
}

fn same_file(backtrace_path: &str, caller_file: &str) -> bool {
    let normalize = |p: &str| p.replace('\\', "/");
    let full = normalize(backtrace_path);
    let tail = normalize(caller_file);
    full == tail || full.ends_with(&format!("/{}", tail.trim_start_matches("./")))
}
