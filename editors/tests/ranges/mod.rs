//
// Copyright (c) 2024 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! Range resolution and region materialization through the public API.

use excore::{
    materialize, parse_line_range, resolve_line_range, DefaultRange, ErrorKind, MemoryBuffer,
    PendingRegions, RangeSource, Region, ResolvedRange, SearchContext, TextBuffer,
};
use test_log::test;

fn buffer(lines: usize) -> MemoryBuffer {
    let text: Vec<String> = (1..=lines).map(|n| format!("line {}", n)).collect();
    MemoryBuffer::from_text(&text.join("\n"))
}

fn resolve(buf: &MemoryBuffer, text: &str) -> excore::Result<ResolvedRange> {
    let (range, rest) = parse_line_range(text)?;
    assert!(rest.is_empty(), "unparsed text {:?}", rest);
    resolve_line_range(buf, &range, DefaultRange::CurrentLine, &SearchContext::default())
}

fn regions(buf: &MemoryBuffer, text: &str, as_lines: bool) -> Vec<Region> {
    let (range, _) = parse_line_range(text).unwrap();
    let mut source = RangeSource::Text(range);
    materialize(
        buf,
        &mut source,
        DefaultRange::CurrentLine,
        as_lines,
        None,
        &SearchContext::default(),
    )
    .unwrap()
}

#[test]
fn test_resolution_is_deterministic() {
    let mut buf = buffer(20);
    buf.set_caret(buf.offset_of_line(7));
    for text in ["3,.+4", "/line 1/,$-2", "'<,'>", ".;+3", "%"] {
        let first = resolve(&buf, text).unwrap();
        let second = resolve(&buf, text).unwrap();
        assert_eq!(first, second, "range {:?}", text);
    }
}

#[test]
fn test_percent_is_whole_buffer_from_anywhere() {
    let mut buf = buffer(10);
    for line in [0, 4, 9] {
        buf.set_caret(buf.offset_of_line(line));
        assert_eq!(resolve(&buf, "%").unwrap(), ResolvedRange::new(0, 9));
    }
}

#[test]
fn test_reversed_range_swaps() {
    let buf = buffer(8);
    assert_eq!(regions(&buf, "5,2", true), regions(&buf, "2,5", true));
    assert_eq!(regions(&buf, "5,2", false), regions(&buf, "2,5", false));
    assert_eq!(regions(&buf, "2,5", true).len(), 4);
}

#[test]
fn test_block_region_excludes_final_terminator() {
    let buf = MemoryBuffer::from_text("ab\ncd\nef");
    assert_eq!(regions(&buf, "1,2", false), vec![Region::new(0, 5)]);
    assert_eq!(
        regions(&buf, "1,2", true),
        vec![Region::new(0, 2), Region::new(3, 5)]
    );
}

#[test]
fn test_default_ranges() {
    let mut buf = buffer(5);
    buf.set_caret(buf.offset_of_line(3));
    let ctx = SearchContext::default();
    let none = excore::LineRange::none();
    assert_eq!(
        resolve_line_range(&buf, &none, DefaultRange::CurrentLine, &ctx).unwrap(),
        ResolvedRange::single(3)
    );
    assert_eq!(
        resolve_line_range(&buf, &none, DefaultRange::WholeBuffer, &ctx).unwrap(),
        ResolvedRange::new(0, 4)
    );
}

#[test]
fn test_zero_and_clamping() {
    let buf = buffer(5);
    assert_eq!(resolve(&buf, "0").unwrap(), ResolvedRange::single(0));
    assert_eq!(resolve(&buf, "3,99").unwrap(), ResolvedRange::new(2, 4));
    assert_eq!(resolve(&buf, "$+3").unwrap(), ResolvedRange::single(4));
}

#[test]
fn test_search_addresses() {
    let buf = MemoryBuffer::from_text("alpha\nbeta\ngamma\nbeta\ndelta");
    assert_eq!(resolve(&buf, "/beta/").unwrap(), ResolvedRange::single(1));
    assert_eq!(resolve(&buf, "/beta//beta/").unwrap(), ResolvedRange::single(3));
    assert_eq!(resolve(&buf, "/gamma/;/delta/").unwrap(), ResolvedRange::new(2, 4));
    assert_eq!(resolve(&buf, "/beta/+1").unwrap(), ResolvedRange::single(2));

    let err = resolve(&buf, "/omega/").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidAddress);
    let err = resolve(&buf, "/be(ta/").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BadPattern);
}

#[test]
fn test_marks_and_selection() {
    let mut buf = buffer(6);
    buf.set_mark('a', buf.offset_of_line(1));
    buf.set_selections(vec![Region::new(buf.offset_of_line(2), buf.offset_of_line(5))]);
    assert_eq!(resolve(&buf, "'a").unwrap(), ResolvedRange::single(1));
    assert_eq!(resolve(&buf, "'<,'>").unwrap(), ResolvedRange::new(2, 4));

    let err = resolve(&buf, "'z").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidAddress);
}

#[test]
fn test_provided_regions_bypass_range() {
    let buf = buffer(4);
    let provided = vec![buf.line_region(3), buf.line_region(0)];
    let mut source = RangeSource::Provided(PendingRegions::new(provided.clone()));
    let ctx = SearchContext::default();

    let first = materialize(&buf, &mut source, DefaultRange::WholeBuffer, true, Some(2), &ctx)
        .unwrap();
    assert_eq!(first, provided);

    let second =
        materialize(&buf, &mut source, DefaultRange::WholeBuffer, true, None, &ctx).unwrap();
    assert!(second.is_empty());
}

#[test]
fn test_drain_twice_is_empty() {
    let mut pending = PendingRegions::new(vec![Region::new(0, 1)]);
    assert_eq!(pending.drain().len(), 1);
    assert!(pending.drain().is_empty());
    assert!(pending.drain().is_empty());
}
