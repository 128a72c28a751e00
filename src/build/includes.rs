//! Local include extraction.
//!
//! This is a line-based heuristic, not a preprocessor. Only quoted includes are
//! collected; `<...>` includes never take part in invalidation. Conditional
//! blocks, comments and line continuations are not understood. A directive
//! with a single `"` yields an empty path, which references every header.

use crate::error::BuildError;
use std::fs;
use std::path::Path;

/// Included path of a single line, if the line is a quoted include directive.
pub fn parse_include_line(line: &str) -> Option<&str> {
    let line = line.trim_start();
    if !line.starts_with('#') || !line.contains("include") {
        return None;
    }
    let first = line.find('"')?;
    let last = line.rfind('"')?;
    Some(&line[first + 1..last.max(first + 1)])
}

/// All quoted includes in `content`, in order, duplicates preserved.
pub fn parse_includes(content: &str) -> Vec<String> {
    content
        .lines()
        .filter_map(parse_include_line)
        .map(str::to_string)
        .collect()
}

/// Read `path` and return its quoted includes.
pub fn parse_file(path: &Path) -> Result<Vec<String>, BuildError> {
    let bytes = fs::read(path).map_err(|e| BuildError::io(path, e))?;
    Ok(parse_includes(&String::from_utf8_lossy(&bytes)))
}
