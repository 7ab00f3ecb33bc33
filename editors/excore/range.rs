//
// Copyright (c) 2024 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! Resolution of parsed addresses against a buffer.
//!
//! Resolution is permissive: out-of-range lines are clamped and reversed
//! ranges are swapped. Searches, marks and bad patterns still fail.

use crate::address::{Address, AddressKind, LineRange, Separator};
use crate::buffer::{SearchDirection, TextBuffer};
use crate::error::{ExError, Result};
use regex::{Regex, RegexBuilder};
use std::ops::RangeInclusive;

/// A concrete range of 0-based line indices, `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedRange {
    pub start: usize,
    pub end: usize,
}

impl ResolvedRange {
    /// Build a range, swapping the ends if needed.
    pub fn new(start: usize, end: usize) -> Self {
        ResolvedRange {
            start: start.min(end),
            end: start.max(end),
        }
    }

    pub fn single(line: usize) -> Self {
        Self::new(line, line)
    }

    pub fn lines(&self) -> RangeInclusive<usize> {
        self.start..=self.end
    }

    pub fn line_count(&self) -> usize {
        self.end - self.start + 1
    }
}

/// What a command acts on when no range is typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultRange {
    CurrentLine,
    WholeBuffer,
}

/// Where copied or moved lines go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    /// Above line 1 (address `0`).
    BeforeFirst,
    /// Below the given 0-based line.
    After(usize),
}

/// Search settings shared by all address resolution in a session.
#[derive(Debug, Clone, Default)]
pub struct SearchContext {
    pub ignore_case: bool,
    /// Pattern reused by empty searches (`//`).
    pub last_pattern: Option<String>,
}

impl SearchContext {
    /// Compile `pattern`, substituting the last pattern when it is empty.
    pub fn compile(&self, pattern: &str) -> Result<Regex> {
        let pattern = if pattern.is_empty() {
            self.last_pattern
                .as_deref()
                .ok_or(ExError::NoPreviousPattern)?
        } else {
            pattern
        };
        RegexBuilder::new(pattern)
            .case_insensitive(self.ignore_case)
            .build()
            .map_err(|e| ExError::bad_pattern(pattern, e))
    }
}

/// Resolve `range` against `buf`.
///
/// An untyped range yields `default`. `%` on either side wins over anything
/// else in the range.
pub fn resolve_line_range(
    buf: &dyn TextBuffer,
    range: &LineRange,
    default: DefaultRange,
    ctx: &SearchContext,
) -> Result<ResolvedRange> {
    let caret = buf.caret();
    if !range.is_given() {
        return Ok(match default {
            DefaultRange::CurrentLine => ResolvedRange::single(buf.line_of(caret)),
            DefaultRange::WholeBuffer => ResolvedRange::new(0, buf.last_line()),
        });
    }

    let is_all = |a: &Option<Address>| matches!(a, Some(a) if a.kind == AddressKind::AllLines);
    if is_all(&range.left) || is_all(&range.right) {
        return Ok(ResolvedRange::new(0, buf.last_line()));
    }

    let left = match &range.left {
        Some(address) => resolve_address(buf, address, caret, ctx)?,
        None => buf.line_of(caret),
    };
    let right_base = match range.separator {
        Separator::Comma => caret,
        Separator::Semicolon => buf.offset_of_line(left),
    };
    let right = match &range.right {
        Some(address) => resolve_address(buf, address, right_base, ctx)?,
        None => left,
    };

    let resolved = ResolvedRange::new(left, right);
    log::debug!("range {:?} resolved to {:?}", range.text, resolved);
    Ok(resolved)
}

/// Resolve one address to a clamped 0-based line.
///
/// `current` is the offset that `.` refers to; searches start there.
pub fn resolve_address(
    buf: &dyn TextBuffer,
    address: &Address,
    current: usize,
    ctx: &SearchContext,
) -> Result<usize> {
    let line = resolve_raw(buf, address, current, ctx)?;
    Ok(clamp(buf, line))
}

/// Resolve the target of `:copy`/`:move`.
///
/// Anything that lands above line 1, including a literal `0`, means
/// "before the first line".
pub fn resolve_destination(
    buf: &dyn TextBuffer,
    address: &Address,
    ctx: &SearchContext,
) -> Result<Destination> {
    let line = resolve_raw(buf, address, buf.caret(), ctx)?;
    if line < 0 {
        Ok(Destination::BeforeFirst)
    } else {
        Ok(Destination::After(clamp(buf, line)))
    }
}

fn clamp(buf: &dyn TextBuffer, line: i64) -> usize {
    line.clamp(0, buf.last_line() as i64) as usize
}

/// Resolve to an unclamped line index; `0` as typed becomes -1.
fn resolve_raw(
    buf: &dyn TextBuffer,
    address: &Address,
    current: usize,
    ctx: &SearchContext,
) -> Result<i64> {
    let base: i64 = match &address.kind {
        AddressKind::CurrentLine => buf.line_of(current) as i64,
        AddressKind::LastLine => buf.last_line() as i64,
        AddressKind::AllLines => {
            return Err(ExError::InvalidAddress(
                "% is only valid as a whole range".to_string(),
            ))
        }
        AddressKind::AbsoluteLine(n) => i64::try_from(*n).unwrap_or(i64::MAX).saturating_sub(1),
        AddressKind::Mark(name) => mark_line(buf, *name)? as i64,
        AddressKind::SearchForward(pattern) => {
            search_line(buf, pattern, current, SearchDirection::Forward, ctx)? as i64
        }
        AddressKind::SearchBackward(pattern) => {
            search_line(buf, pattern, current, SearchDirection::Backward, ctx)? as i64
        }
    };

    let mut line = base.saturating_add(address.line_offset());
    for chained in &address.search_offsets {
        let from_line = clamp(buf, line);
        let from = match chained.direction {
            SearchDirection::Forward => buf.offset_of_line(from_line + 1),
            SearchDirection::Backward => buf.offset_of_line(from_line),
        };
        let found = search_line(buf, &chained.pattern, from, chained.direction, ctx)?;
        line = (found as i64).saturating_add(chained.offset);
    }
    log::trace!("address {:?} -> line index {}", address.kind, line);
    Ok(line)
}

fn search_line(
    buf: &dyn TextBuffer,
    pattern: &str,
    from: usize,
    direction: SearchDirection,
    ctx: &SearchContext,
) -> Result<usize> {
    let regex = ctx.compile(pattern)?;
    match buf.find(&regex, from, direction) {
        Some(found) => Ok(buf.line_of(found.begin())),
        None => Err(ExError::PatternNotFound(regex.as_str().to_string())),
    }
}

fn mark_line(buf: &dyn TextBuffer, name: char) -> Result<usize> {
    let selections = buf.selections();
    match name {
        '<' => selections
            .iter()
            .map(|r| buf.line_of(r.begin()))
            .min()
            .ok_or(ExError::MarkNotSet(name)),
        '>' => selections
            .iter()
            .map(|r| {
                // A selection ending at a line start does not cover that line.
                if r.is_empty() {
                    buf.line_of(r.end())
                } else {
                    buf.line_of(r.end() - 1)
                }
            })
            .max()
            .ok_or(ExError::MarkNotSet(name)),
        _ => buf
            .mark(name)
            .map(|offset| buf.line_of(offset))
            .ok_or(ExError::MarkNotSet(name)),
    }
}
