//
// Copyright (c) 2024 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! In-memory buffer backed by a single `String`.

use super::{Region, TextBuffer};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// A `TextBuffer` holding its text in memory.
///
/// A file's final newline is stripped on load and written back on save, so
/// `"a\nb\n"` is two lines.
#[derive(Debug, Clone, Default)]
pub struct MemoryBuffer {
    text: String,
    /// Offset of the first byte of each line; always starts with 0.
    line_starts: Vec<usize>,
    path: Option<PathBuf>,
    dirty: bool,
    read_only: bool,
    selections: Vec<Region>,
    marks: HashMap<char, usize>,
}

impl MemoryBuffer {
    /// Create an empty buffer with no file.
    pub fn new() -> Self {
        Self::from_text("")
    }

    /// Create a buffer holding `text`.
    pub fn from_text(text: &str) -> Self {
        let mut buf = MemoryBuffer {
            text: strip_final_newline(text).to_string(),
            line_starts: Vec::new(),
            path: None,
            dirty: false,
            read_only: false,
            selections: vec![Region::point(0)],
            marks: HashMap::new(),
        };
        buf.index_lines();
        buf
    }

    /// Load `path`. A missing file yields an empty buffer bound to it.
    pub fn open(path: &Path) -> io::Result<Self> {
        let mut buf = Self::from_text(&read_or_empty(path)?);
        buf.read_only = match fs::metadata(path) {
            Ok(meta) => meta.permissions().readonly(),
            Err(_) => false,
        };
        buf.path = Some(path.to_path_buf());
        Ok(buf)
    }

    /// The buffer text, without the final newline.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The text as it would be written to a file.
    pub fn contents(&self) -> String {
        if self.text.is_empty() {
            String::new()
        } else {
            format!("{}\n", self.text)
        }
    }

    pub fn set_file_name(&mut self, path: Option<PathBuf>) {
        self.path = path;
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    fn index_lines(&mut self) {
        self.line_starts.clear();
        self.line_starts.push(0);
        self.line_starts.extend(
            self.text
                .match_indices('\n')
                .map(|(i, _)| i + 1),
        );
    }

    /// Move a position recorded before an edit of `region` to `inserted` bytes.
    fn shift(pos: usize, region: Region, inserted: usize) -> usize {
        if pos >= region.end() {
            pos - region.end() + region.begin() + inserted
        } else if pos > region.begin() {
            region.begin()
        } else {
            pos
        }
    }
}

fn strip_final_newline(text: &str) -> &str {
    text.strip_suffix('\n').unwrap_or(text)
}

fn read_or_empty(path: &Path) -> io::Result<String> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(text),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(e),
    }
}

impl TextBuffer for MemoryBuffer {
    fn len(&self) -> usize {
        self.text.len()
    }

    fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    fn offset_of_line(&self, line: usize) -> usize {
        self.line_starts.get(line).copied().unwrap_or(self.text.len())
    }

    fn line_of(&self, offset: usize) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next.saturating_sub(1),
        }
    }

    fn substr(&self, region: Region) -> String {
        let end = region.end().min(self.text.len());
        let begin = region.begin().min(end);
        self.text[begin..end].to_string()
    }

    fn replace(&mut self, region: Region, text: &str) {
        let end = region.end().min(self.text.len());
        let region = Region::new(region.begin().min(end), end);
        if region.is_empty() && text.is_empty() {
            return;
        }
        self.text.replace_range(region.begin()..region.end(), text);
        self.index_lines();
        self.dirty = true;

        let inserted = text.len();
        for pos in self.marks.values_mut() {
            *pos = Self::shift(*pos, region, inserted);
        }
        for sel in self.selections.iter_mut() {
            sel.a = Self::shift(sel.a, region, inserted);
            sel.b = Self::shift(sel.b, region, inserted);
        }
    }

    fn selections(&self) -> Vec<Region> {
        self.selections.clone()
    }

    fn set_selections(&mut self, regions: Vec<Region>) {
        let len = self.text.len();
        self.selections = regions
            .into_iter()
            .map(|r| Region::new(r.a.min(len), r.b.min(len)))
            .collect();
    }

    fn mark(&self, name: char) -> Option<usize> {
        self.marks.get(&name).copied()
    }

    fn set_mark(&mut self, name: char, offset: usize) {
        self.marks.insert(name, offset.min(self.text.len()));
    }

    fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn is_read_only(&self) -> bool {
        self.read_only
    }

    fn file_name(&self) -> Option<PathBuf> {
        self.path.clone()
    }

    fn save(&mut self) -> io::Result<()> {
        let path = self
            .path
            .clone()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no file name"))?;
        if self.read_only {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "buffer is read-only",
            ));
        }
        fs::write(&path, self.contents())?;
        self.dirty = false;
        log::debug!("saved {} ({} bytes)", path.display(), self.text.len());
        Ok(())
    }

    fn revert(&mut self) -> io::Result<()> {
        let path = self
            .path
            .clone()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no file name"))?;
        self.text = strip_final_newline(&read_or_empty(&path)?).to_string();
        self.index_lines();
        self.dirty = false;
        self.marks.clear();
        self.selections = vec![Region::point(0)];
        Ok(())
    }
}
