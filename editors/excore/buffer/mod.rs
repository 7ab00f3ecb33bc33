//
// Copyright (c) 2024 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! The text buffer the ex engine operates on.
//!
//! The engine never owns text storage. Everything it needs from the host
//! editor goes through [`TextBuffer`]: line/offset mapping, reads, edits,
//! selections, marks and searching. Lines are terminated by `\n`; the last
//! line has no terminator, so an empty buffer still has one (empty) line.

mod memory;
mod region;

pub use memory::MemoryBuffer;
pub use region::Region;

use regex::Regex;
use std::io;
use std::path::PathBuf;

/// Direction of a buffer search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchDirection {
    Forward,
    Backward,
}

/// Host buffer interface consumed by the ex engine.
///
/// Line indices are 0-based. Offsets are byte offsets and callers only pass
/// offsets obtained from the buffer itself (line starts, match bounds).
pub trait TextBuffer {
    /// Total length of the text in bytes.
    fn len(&self) -> usize;

    /// Number of lines. Never zero.
    fn line_count(&self) -> usize;

    /// Offset where `line` begins. Lines past the end map to `len()`.
    fn offset_of_line(&self, line: usize) -> usize;

    /// Line containing `offset`. Offsets past the end map to the last line.
    fn line_of(&self, offset: usize) -> usize;

    /// Text covered by `region`.
    fn substr(&self, region: Region) -> String;

    /// Replace the text of `region` with `text`.
    fn replace(&mut self, region: Region, text: &str);

    /// Current selections; the first one holds the primary caret.
    fn selections(&self) -> Vec<Region>;

    fn set_selections(&mut self, regions: Vec<Region>);

    /// Offset recorded for mark `name`, if set.
    fn mark(&self, name: char) -> Option<usize>;

    fn set_mark(&mut self, name: char, offset: usize);

    /// Whether the buffer differs from its file.
    fn is_dirty(&self) -> bool;

    fn file_name(&self) -> Option<PathBuf>;

    /// Write the buffer to its file and clear the dirty flag.
    fn save(&mut self) -> io::Result<()>;

    /// Reload the buffer from its file, discarding changes.
    fn revert(&mut self) -> io::Result<()>;

    fn is_read_only(&self) -> bool {
        false
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index of the last line.
    fn last_line(&self) -> usize {
        self.line_count().saturating_sub(1)
    }

    /// Region of `line` without its terminator.
    fn line_region(&self, line: usize) -> Region {
        let begin = self.offset_of_line(line);
        let end = if line + 1 < self.line_count() {
            self.offset_of_line(line + 1) - 1
        } else {
            self.len()
        };
        Region::new(begin, end)
    }

    /// Region of `line` including its terminator, if it has one.
    fn full_line_region(&self, line: usize) -> Region {
        let begin = self.offset_of_line(line);
        let end = if line + 1 < self.line_count() {
            self.offset_of_line(line + 1)
        } else {
            self.len()
        };
        Region::new(begin, end)
    }

    /// Text of `line` without its terminator.
    fn line_text(&self, line: usize) -> String {
        self.substr(self.line_region(line))
    }

    fn insert(&mut self, offset: usize, text: &str) {
        self.replace(Region::point(offset), text);
    }

    fn erase(&mut self, region: Region) {
        self.replace(region, "");
    }

    /// Offset of the primary caret.
    fn caret(&self) -> usize {
        self.selections().first().map(|r| r.b).unwrap_or(0)
    }

    /// Collapse the selections to a single caret at `offset`.
    fn set_caret(&mut self, offset: usize) {
        self.set_selections(vec![Region::point(offset)]);
    }

    /// Find `pattern` starting at `from`.
    ///
    /// Forward searches return the first match beginning at or after `from`;
    /// backward searches return the last match beginning before `from`.
    /// Neither wraps around the buffer boundary.
    fn find(&self, pattern: &Regex, from: usize, direction: SearchDirection) -> Option<Region> {
        let text = self.substr(Region::new(0, self.len()));
        let from = from.min(text.len());
        let found = match direction {
            SearchDirection::Forward => pattern.find_at(&text, from),
            SearchDirection::Backward => pattern
                .find_iter(&text)
                .take_while(|m| m.start() < from)
                .last(),
        };
        found.map(|m| Region::new(m.start(), m.end()))
    }
}
