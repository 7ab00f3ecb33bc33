//
// Copyright (c) 2024 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

use super::caret_to_line;
use crate::buffer::TextBuffer;
use crate::command::{ExOutcome, SubstituteFlags, SubstituteSpec};
use crate::error::{ExError, Result};
use crate::range::DefaultRange;
use crate::regions::{materialize, RangeSource};
use crate::session::{LastSubstitute, Session};
use regex::RegexBuilder;

/// Convert an ex replacement string to `regex` replacement syntax.
///
/// `&` and `\0` are the whole match, `\1`-`\9` are groups, `\n` and a
/// backslash-newline split the line, `\t` is a tab. A literal `$` is
/// escaped for `regex`.
pub fn convert_replacement(repl: &str) -> String {
    let mut result = String::with_capacity(repl.len());
    let mut chars = repl.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '\\' => match chars.next() {
                Some(digit @ '0'..='9') => {
                    result.push_str("${");
                    result.push(digit);
                    result.push('}');
                }
                Some('n') | Some('\n') => result.push('\n'),
                Some('t') => result.push('\t'),
                Some('$') => result.push_str("$$"),
                Some(other) => result.push(other),
                None => result.push('\\'),
            },
            '&' => result.push_str("${0}"),
            '$' => result.push_str("$$"),
            _ => result.push(ch),
        }
    }

    result
}

impl Session {
    /// `:s`, `:&` and `:&&`.
    pub(crate) fn substitute(
        &mut self,
        buf: &mut dyn TextBuffer,
        source: &mut RangeSource,
        spec: SubstituteSpec,
    ) -> Result<ExOutcome> {
        let previous = self.last_substitute.clone();
        let (pattern, replacement, flags, count) = match spec {
            SubstituteSpec::Full {
                pattern,
                replacement,
                flags,
                count,
            } => {
                let pattern = if pattern.is_empty() {
                    self.last_search
                        .clone()
                        .or_else(|| previous.as_ref().map(|last| last.pattern.clone()))
                        .ok_or(ExError::NoPreviousPattern)?
                } else {
                    pattern
                };
                let previous_flags = previous.map(|last| last.flags).unwrap_or_default();
                (pattern, replacement, flags.merged_with(previous_flags), count)
            }
            SubstituteSpec::Short { flags, count } => {
                let last = previous.ok_or(ExError::NoPreviousPattern)?;
                (
                    last.pattern,
                    last.replacement,
                    flags.merged_with(last.flags),
                    count,
                )
            }
        };

        if flags.confirm {
            return Err(ExError::NotImplemented(
                "confirmed substitution".to_string(),
            ));
        }

        let ignore_case = flags.ignore_case.unwrap_or(self.options.ignorecase);
        let re = RegexBuilder::new(&pattern)
            .case_insensitive(ignore_case)
            .build()
            .map_err(|e| ExError::bad_pattern(&pattern, e))?;

        self.last_substitute = Some(LastSubstitute {
            pattern: pattern.clone(),
            replacement: replacement.clone(),
            flags: SubstituteFlags {
                keep: false,
                ..flags
            },
        });
        self.last_search = Some(pattern);

        let ctx = self.search_context();
        let mut regions = materialize(buf, source, DefaultRange::CurrentLine, true, count, &ctx)?;
        regions.sort_by_key(|r| r.begin());

        let template = convert_replacement(&replacement);
        let mut lines_changed = 0;
        let mut substitutions = 0;
        // End of the bottom-most replacement, shifted by the edits above it.
        let mut last_change: Option<usize> = None;

        for region in regions.into_iter().rev() {
            let text = buf.substr(region);
            let matches = if flags.global {
                re.find_iter(&text).count()
            } else {
                usize::from(re.is_match(&text))
            };
            if matches == 0 {
                continue;
            }

            let new_text = if flags.global {
                re.replace_all(&text, template.as_str())
            } else {
                re.replace(&text, template.as_str())
            };
            let new_text = new_text.into_owned();
            let new_len = new_text.len();
            buf.replace(region, &new_text);

            last_change = Some(match last_change {
                Some(end) => end + new_len - region.len(),
                None => region.begin() + new_len,
            });
            lines_changed += 1;
            substitutions += matches;
        }

        let Some(end) = last_change else {
            log::debug!("substitute: no match for {:?}", re.as_str());
            return Ok(ExOutcome::Continue);
        };
        let line = buf.line_of(end);
        caret_to_line(buf, line);

        Ok(if lines_changed > 2 {
            ExOutcome::Message(format!(
                "{} substitutions on {} lines",
                substitutions, lines_changed
            ))
        } else {
            ExOutcome::Continue
        })
    }
}
