//
// Copyright (c) 2024 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

use super::{buffer_lines, caret_to_line, delete_lines, insert_lines, joined, line_texts, report};
use crate::buffer::TextBuffer;
use crate::command::ExOutcome;
use crate::error::Result;
use crate::range::DefaultRange;
use crate::regions::{covered_lines, materialize, region_lines, RangeSource};
use crate::session::Session;
use crate::shell::{check_status, expand_command, ShellOutput};

impl Session {
    /// Expand `%` and `!` in `command` and remember the result for `!`.
    fn expand_shell(&mut self, buf: &dyn TextBuffer, command: &str) -> Result<String> {
        let file = buf.file_name().map(|path| path.display().to_string());
        let expanded = expand_command(command, file.as_deref(), self.last_shell.as_deref())?;
        self.last_shell = Some(expanded.clone());
        Ok(expanded)
    }

    fn run_shell(&mut self, command: &str, input: Option<&str>) -> Result<ShellOutput> {
        let output = self
            .shell
            .run(&self.options.shell, command, input, &self.cwd)?;
        check_status(command, &output)?;
        Ok(output)
    }

    /// `:w !cmd`: pipe lines (default: whole buffer) to a command.
    pub(crate) fn write_shell(
        &mut self,
        buf: &mut dyn TextBuffer,
        source: &mut RangeSource,
        command: &str,
    ) -> Result<ExOutcome> {
        let command = self.expand_shell(buf, command)?;
        let ctx = self.search_context();
        let regions = materialize(buf, source, DefaultRange::WholeBuffer, false, None, &ctx)?;
        let lines = buffer_lines(buf, &covered_lines(buf, &regions));
        let input = if lines.is_empty() {
            String::new()
        } else {
            joined(&lines)
        };

        let output = self.run_shell(&command, Some(&input))?;
        Ok(ExOutcome::Output(output.stdout_lines()))
    }

    /// `:r !cmd`: insert command output below a line.
    pub(crate) fn read_shell(
        &mut self,
        buf: &mut dyn TextBuffer,
        source: &mut RangeSource,
        command: &str,
    ) -> Result<ExOutcome> {
        let command = self.expand_shell(buf, command)?;
        let before = self.read_position(buf, source)?;
        let output = self.run_shell(&command, None)?;

        let lines = output.stdout_lines();
        if !lines.is_empty() {
            insert_lines(buf, before, &lines);
            caret_to_line(buf, before + lines.len() - 1);
        }
        Ok(ExOutcome::Continue)
    }

    /// `:!cmd` runs a command; `:{range}!cmd` replaces the range with the
    /// command's output when fed the range's lines.
    pub(crate) fn shell_command(
        &mut self,
        buf: &mut dyn TextBuffer,
        source: &mut RangeSource,
        command: &str,
    ) -> Result<ExOutcome> {
        let command = self.expand_shell(buf, command)?;
        if !source.is_given() {
            let output = self.run_shell(&command, None)?;
            return Ok(ExOutcome::Output(output.stdout_lines()));
        }

        let ctx = self.search_context();
        let regions = materialize(buf, source, DefaultRange::CurrentLine, false, None, &ctx)?;
        let mut filtered = 0;
        let mut first_line = None;
        for region in regions.iter().rev() {
            let range = region_lines(buf, *region);
            let lines: Vec<usize> = range.lines().collect();
            let input = joined(&line_texts(buf, &lines));
            let output = self.run_shell(&command, Some(&input))?;

            delete_lines(buf, range.start, range.end);
            insert_lines(buf, range.start, &output.stdout_lines());
            filtered += lines.len();
            first_line = Some(range.start);
        }

        if let Some(line) = first_line {
            caret_to_line(buf, line);
        }
        Ok(match report(filtered, "lines filtered") {
            Some(message) => ExOutcome::Message(message),
            None => ExOutcome::Continue,
        })
    }
}
