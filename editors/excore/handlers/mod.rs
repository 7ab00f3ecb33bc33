//
// Copyright (c) 2024 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! Command handlers, one `impl Session` block per family.
//!
//! Handlers that edit the buffer at the location of their own regions walk
//! those regions from the bottom up, so an edit never shifts a region that
//! is still waiting to be processed.

mod file;
mod global;
mod lines;
mod shell;
mod substitute;

pub use substitute::convert_replacement;

use crate::buffer::TextBuffer;
use crate::range::{Destination, ResolvedRange};

/// Text of each line in `lines`, terminators excluded.
pub(crate) fn line_texts(buf: &dyn TextBuffer, lines: &[usize]) -> Vec<String> {
    lines.iter().map(|&line| buf.line_text(line)).collect()
}

/// Text of `lines` as written to a file or pipe. An empty buffer has none.
pub(crate) fn buffer_lines(buf: &dyn TextBuffer, lines: &[usize]) -> Vec<String> {
    if buf.is_empty() {
        Vec::new()
    } else {
        line_texts(buf, lines)
    }
}

/// Index of the line `destination` puts new lines in front of.
pub(crate) fn insertion_line(destination: Destination) -> usize {
    match destination {
        Destination::BeforeFirst => 0,
        Destination::After(line) => line + 1,
    }
}

/// Lines joined with `\n`, plus a final `\n`.
pub(crate) fn joined(lines: &[String]) -> String {
    let mut text = lines.join("\n");
    text.push('\n');
    text
}

/// Group ascending line numbers into runs of consecutive lines.
pub(crate) fn line_runs(lines: &[usize]) -> Vec<ResolvedRange> {
    let mut runs: Vec<ResolvedRange> = Vec::new();
    for &line in lines {
        match runs.last_mut() {
            Some(run) if run.end + 1 == line => run.end = line,
            _ => runs.push(ResolvedRange::single(line)),
        }
    }
    runs
}

/// Remove lines `first..=last` with their terminators.
pub(crate) fn delete_lines(buf: &mut dyn TextBuffer, first: usize, last: usize) {
    let begin = if last < buf.last_line() {
        buf.offset_of_line(first)
    } else if first > 0 {
        // Last line has no terminator; take the one before the range.
        buf.line_region(first - 1).end()
    } else {
        0
    };
    let end = if last < buf.last_line() {
        buf.offset_of_line(last + 1)
    } else {
        buf.len()
    };
    buf.erase(crate::buffer::Region::new(begin, end));
}

/// Insert `lines` so the first of them becomes line `before`.
///
/// `before` may be `line_count()` to append. An empty buffer counts as
/// having no lines.
pub(crate) fn insert_lines(buf: &mut dyn TextBuffer, before: usize, lines: &[String]) {
    if lines.is_empty() {
        return;
    }
    let text = lines.join("\n");
    if buf.is_empty() {
        buf.insert(0, &text);
    } else if before < buf.line_count() {
        let offset = buf.offset_of_line(before);
        buf.insert(offset, &format!("{}\n", text));
    } else {
        let offset = buf.len();
        buf.insert(offset, &format!("\n{}", text));
    }
}

/// Offset of the first non-blank character of `line`.
pub(crate) fn first_non_blank(buf: &dyn TextBuffer, line: usize) -> usize {
    let region = buf.line_region(line);
    let text = buf.substr(region);
    let indent = text.len() - text.trim_start_matches([' ', '\t']).len();
    region.begin() + indent
}

/// Put the caret at the start of `line`, clamped to the buffer.
pub(crate) fn caret_to_line(buf: &mut dyn TextBuffer, line: usize) {
    let line = line.min(buf.last_line());
    let offset = first_non_blank(buf, line);
    buf.set_caret(offset);
}

/// Status line for commands that touch more than two lines.
pub(crate) fn report(count: usize, what: &str) -> Option<String> {
    if count > 2 {
        Some(format!("{} {}", count, what))
    } else {
        None
    }
}
