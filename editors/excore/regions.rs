//
// Copyright (c) 2024 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! Turning ranges into the regions commands operate on.
//!
//! A command either gets its regions from its own typed range or, when run
//! by `:global`, from the set of lines `:global` selected. The latter travels
//! as [`RangeSource::Provided`] and is consumed exactly once.

use crate::address::LineRange;
use crate::buffer::{Region, TextBuffer};
use crate::error::Result;
use crate::range::{resolve_line_range, DefaultRange, ResolvedRange, SearchContext};
use std::mem;

/// Regions handed from `:global` to its subcommand.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingRegions {
    regions: Vec<Region>,
}

impl PendingRegions {
    pub fn new(regions: Vec<Region>) -> Self {
        PendingRegions { regions }
    }

    pub fn push(&mut self, region: Region) {
        self.regions.push(region);
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Take every pending region, leaving the set empty.
    pub fn drain(&mut self) -> Vec<Region> {
        mem::take(&mut self.regions)
    }
}

/// Where a command's regions come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeSource {
    /// Resolve the typed range.
    Text(LineRange),
    /// Use regions computed by an enclosing `:global`.
    Provided(PendingRegions),
}

impl RangeSource {
    /// Source for a command typed with no range.
    pub fn none() -> Self {
        RangeSource::Text(LineRange::none())
    }

    /// Check if the user typed a range or regions were provided.
    pub fn is_given(&self) -> bool {
        match self {
            RangeSource::Text(range) => range.is_given(),
            RangeSource::Provided(_) => true,
        }
    }
}

impl From<LineRange> for RangeSource {
    fn from(range: LineRange) -> Self {
        RangeSource::Text(range)
    }
}

/// Produce the regions a command acts on.
///
/// Provided regions are drained and returned as they are, without looking
/// at anything else. Otherwise the range is resolved (falling back to
/// `default`), narrowed by `count` and split into one region per line when
/// `as_lines` is set, or returned as a single block.
pub fn materialize(
    buf: &dyn TextBuffer,
    source: &mut RangeSource,
    default: DefaultRange,
    as_lines: bool,
    count: Option<usize>,
    ctx: &SearchContext,
) -> Result<Vec<Region>> {
    let range = match source {
        RangeSource::Provided(pending) => {
            let regions = pending.drain();
            log::trace!("using {} provided regions", regions.len());
            return Ok(regions);
        }
        RangeSource::Text(range) => range,
    };

    let mut resolved = resolve_line_range(buf, range, default, ctx)?;
    if let Some(count) = count {
        resolved = apply_count(buf, resolved, count);
    }

    Ok(if as_lines {
        line_regions(buf, resolved)
    } else {
        vec![block_region(buf, resolved)]
    })
}

/// `count` lines starting at the last line of `resolved`.
pub fn apply_count(buf: &dyn TextBuffer, resolved: ResolvedRange, count: usize) -> ResolvedRange {
    let start = resolved.end;
    let end = start
        .saturating_add(count.max(1) - 1)
        .min(buf.last_line());
    ResolvedRange::new(start, end)
}

/// One region per line, terminators excluded.
pub fn line_regions(buf: &dyn TextBuffer, resolved: ResolvedRange) -> Vec<Region> {
    resolved.lines().map(|line| buf.line_region(line)).collect()
}

/// From the start of the first line to the end of the last, excluding the
/// final terminator.
pub fn block_region(buf: &dyn TextBuffer, resolved: ResolvedRange) -> Region {
    Region::new(
        buf.line_region(resolved.start).begin(),
        buf.line_region(resolved.end).end(),
    )
}

/// Lines spanned by `region`.
pub fn region_lines(buf: &dyn TextBuffer, region: Region) -> ResolvedRange {
    let first = buf.line_of(region.begin());
    let last = if region.is_empty() {
        first
    } else {
        buf.line_of(region.end() - 1)
    };
    ResolvedRange::new(first, last)
}

/// Every line touched by `regions`, ascending and without duplicates.
pub fn covered_lines(buf: &dyn TextBuffer, regions: &[Region]) -> Vec<usize> {
    let mut lines: Vec<usize> = regions
        .iter()
        .flat_map(|r| region_lines(buf, *r).lines())
        .collect();
    lines.sort_unstable();
    lines.dedup();
    lines
}
