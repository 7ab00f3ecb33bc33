//
// Copyright (c) 2024 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

use super::{
    caret_to_line, delete_lines, insert_lines, insertion_line, joined, line_runs, line_texts,
    report,
};
use crate::address::Address;
use crate::buffer::{Region, TextBuffer};
use crate::command::{ExOutcome, PrintFlags};
use crate::error::{ExError, Result};
use crate::range::{resolve_destination, DefaultRange};
use crate::regions::{covered_lines, materialize, region_lines, RangeSource};
use crate::registers::RegisterContent;
use crate::session::Session;

fn message_or_continue(message: Option<String>) -> ExOutcome {
    match message {
        Some(text) => ExOutcome::Message(text),
        None => ExOutcome::Continue,
    }
}

/// Render a line the way `:list` shows it.
fn list_form(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 1);
    for c in text.chars() {
        match c {
            '\t' => out.push_str("^I"),
            c if (c as u32) < 0x20 => {
                out.push('^');
                out.push(char::from(b'@' + c as u8));
            }
            '\u{7f}' => out.push_str("^?"),
            c => out.push(c),
        }
    }
    out.push('$');
    out
}

impl Session {
    /// A bare range: move to the last line it names.
    pub(crate) fn goto(
        &mut self,
        buf: &mut dyn TextBuffer,
        source: &mut RangeSource,
    ) -> Result<ExOutcome> {
        let ctx = self.search_context();
        let regions = materialize(buf, source, DefaultRange::CurrentLine, false, None, &ctx)?;
        if let Some(region) = regions.last() {
            let line = region_lines(buf, *region).end;
            caret_to_line(buf, line);
        }
        Ok(ExOutcome::Continue)
    }

    /// Lines covered by the regions of `source`.
    fn selected_lines(
        &self,
        buf: &dyn TextBuffer,
        source: &mut RangeSource,
        count: Option<usize>,
    ) -> Result<Vec<usize>> {
        let ctx = self.search_context();
        let regions = materialize(buf, source, DefaultRange::CurrentLine, false, count, &ctx)?;
        Ok(covered_lines(buf, &regions))
    }

    /// `:d [x] [count]`
    pub(crate) fn delete(
        &mut self,
        buf: &mut dyn TextBuffer,
        source: &mut RangeSource,
        register: Option<char>,
        count: Option<usize>,
    ) -> Result<ExOutcome> {
        let lines = self.selected_lines(buf, source, count)?;
        let Some(&first) = lines.first() else {
            return Ok(ExOutcome::Continue);
        };

        let text = joined(&line_texts(buf, &lines));
        for run in line_runs(&lines).iter().rev() {
            delete_lines(buf, run.start, run.end);
        }
        self.registers.delete(register, RegisterContent::lines(text));
        caret_to_line(buf, first);

        Ok(message_or_continue(report(lines.len(), "fewer lines")))
    }

    /// `:y [x] [count]`
    pub(crate) fn yank(
        &mut self,
        buf: &mut dyn TextBuffer,
        source: &mut RangeSource,
        register: Option<char>,
        count: Option<usize>,
    ) -> Result<ExOutcome> {
        let lines = self.selected_lines(buf, source, count)?;
        if lines.is_empty() {
            return Ok(ExOutcome::Continue);
        }
        let text = joined(&line_texts(buf, &lines));
        self.registers.yank(register, RegisterContent::lines(text));
        Ok(message_or_continue(report(lines.len(), "lines yanked")))
    }

    /// `:co {address}`: copy lines below `destination`.
    pub(crate) fn copy(
        &mut self,
        buf: &mut dyn TextBuffer,
        source: &mut RangeSource,
        destination: &Address,
    ) -> Result<ExOutcome> {
        let lines = self.selected_lines(buf, source, None)?;
        let destination = resolve_destination(buf, destination, &self.search_context())?;
        if lines.is_empty() {
            return Ok(ExOutcome::Continue);
        }

        let texts = line_texts(buf, &lines);
        let before = insertion_line(destination);
        insert_lines(buf, before, &texts);
        caret_to_line(buf, before + texts.len() - 1);
        Ok(ExOutcome::Continue)
    }

    /// `:m {address}`: move lines below `destination`.
    ///
    /// Fails when the destination falls inside or directly below one of the
    /// moved runs, which would move lines onto themselves.
    pub(crate) fn move_lines(
        &mut self,
        buf: &mut dyn TextBuffer,
        source: &mut RangeSource,
        destination: &Address,
    ) -> Result<ExOutcome> {
        let lines = self.selected_lines(buf, source, None)?;
        let destination = resolve_destination(buf, destination, &self.search_context())?;
        if lines.is_empty() {
            return Ok(ExOutcome::Continue);
        }

        let before = insertion_line(destination);
        let runs = line_runs(&lines);
        if runs
            .iter()
            .any(|run| run.start < before && before <= run.end + 1)
        {
            return Err(ExError::InvalidDestination);
        }

        let texts = line_texts(buf, &lines);
        let removed_above: usize = runs
            .iter()
            .filter(|run| run.end < before)
            .map(|run| run.line_count())
            .sum();
        for run in runs.iter().rev() {
            delete_lines(buf, run.start, run.end);
        }

        let before = before - removed_above;
        insert_lines(buf, before, &texts);
        caret_to_line(buf, before + texts.len() - 1);
        Ok(message_or_continue(report(texts.len(), "lines moved")))
    }

    /// `:p`, `:nu`, `:#` and `:l`.
    pub(crate) fn print(
        &mut self,
        buf: &mut dyn TextBuffer,
        source: &mut RangeSource,
        flags: PrintFlags,
        count: Option<usize>,
    ) -> Result<ExOutcome> {
        let lines = self.selected_lines(buf, source, count)?;
        let number = flags.number || self.options.number;

        let output: Vec<String> = lines
            .iter()
            .map(|&line| {
                let text = buf.line_text(line);
                let text = if flags.list { list_form(&text) } else { text };
                if number {
                    format!("{:6}\t{}", line + 1, text)
                } else {
                    text
                }
            })
            .collect();

        if let Some(&last) = lines.last() {
            caret_to_line(buf, last);
        }
        Ok(ExOutcome::Output(output))
    }

    /// `:ma x` / `:kx`: mark the last line of the range.
    pub(crate) fn mark(
        &mut self,
        buf: &mut dyn TextBuffer,
        source: &mut RangeSource,
        name: char,
    ) -> Result<ExOutcome> {
        let ctx = self.search_context();
        let regions = materialize(buf, source, DefaultRange::CurrentLine, false, None, &ctx)?;
        let line = regions
            .last()
            .map(|region: &Region| region_lines(buf, *region).end)
            .unwrap_or_else(|| buf.line_of(buf.caret()));
        let offset = buf.offset_of_line(line);
        buf.set_mark(name, offset);
        Ok(ExOutcome::Continue)
    }
}
