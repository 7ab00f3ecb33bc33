//
// Copyright (c) 2024 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

use crate::buffer::TextBuffer;
use crate::command::ExOutcome;
use crate::error::{ExError, Result};
use crate::parser::parse_ex_command;
use crate::range::DefaultRange;
use crate::regions::{materialize, PendingRegions, RangeSource};
use crate::session::Session;
use regex::RegexBuilder;

/// Subcommand run when `:g/pat/` names none.
const DEFAULT_SUBCOMMAND: &str = "p";

impl Session {
    /// `:g/pat/cmd`, `:g!/pat/cmd` and `:v/pat/cmd`.
    ///
    /// Lines in the range (default: whole buffer) whose text matches, or
    /// does not match when `invert` is set, are collected top to bottom and
    /// handed to `command` in one dispatch. Any range typed on `command`
    /// itself is ignored.
    pub(crate) fn global(
        &mut self,
        buf: &mut dyn TextBuffer,
        source: &mut RangeSource,
        pattern: &str,
        command: &str,
        invert: bool,
    ) -> Result<ExOutcome> {
        let pattern = if pattern.is_empty() {
            self.last_global
                .clone()
                .ok_or(ExError::NoPreviousPattern)?
        } else {
            pattern.to_string()
        };

        let ctx = self.search_context();
        let regions = materialize(buf, source, DefaultRange::WholeBuffer, true, None, &ctx)?;
        let re = RegexBuilder::new(&pattern)
            .case_insensitive(self.options.ignorecase)
            .build()
            .map_err(|e| ExError::bad_pattern(&pattern, e))?;
        self.last_global = Some(pattern.clone());
        self.last_search = Some(pattern);

        let mut pending = PendingRegions::default();
        for region in regions {
            if re.is_match(&buf.substr(region)) != invert {
                pending.push(region);
            }
        }
        log::debug!("global: {} lines selected", pending.len());
        if pending.is_empty() {
            return Ok(ExOutcome::Continue);
        }

        let command = command.trim();
        let command = if command.is_empty() {
            DEFAULT_SUBCOMMAND
        } else {
            command
        };
        let parsed = parse_ex_command(command)?;
        if parsed.range.is_given() {
            log::debug!("global: ignoring range {:?} on subcommand", parsed.range.text);
        }
        self.dispatch(buf, RangeSource::Provided(pending), parsed.command)
    }
}
