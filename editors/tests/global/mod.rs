//
// Copyright (c) 2024 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! `:global` and its hand-off to subcommands.

use crate::common::edit;
use excore::{ErrorKind, ExOutcome, MemoryBuffer, Session, TextBuffer};
use test_log::test;

/// Twelve lines; even ones contain `X`, all contain `Y`.
fn sample() -> String {
    (1..=12)
        .map(|n| {
            if n % 2 == 0 {
                format!("{} X Y Y", n)
            } else {
                format!("{} Y Y", n)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn test_global_substitute_only_touches_range_matches() {
    let buf = edit(&sample(), &["5,10g/X/s/Y/Z/g"]);
    for line in 0..buf.line_count() {
        let n = line + 1;
        let text = buf.line_text(line);
        let touched = (5..=10).contains(&n) && n % 2 == 0;
        assert_eq!(text.contains('Z'), touched, "line {}: {:?}", n, text);
        if touched {
            assert!(!text.contains('Y'), "line {}: {:?}", n, text);
        }
    }
}

#[test]
fn test_global_without_match_changes_nothing() {
    let mut session = Session::new();
    let mut buf = MemoryBuffer::from_text(&sample());
    let outcome = session.execute(&mut buf, "g/nowhere/d").unwrap();
    assert_eq!(outcome, ExOutcome::Continue);
    assert_eq!(buf.text(), sample());
    assert!(!buf.is_dirty());
}

#[test]
fn test_global_delete_every_line() {
    let buf = edit("a\na\na", &["g/a/d"]);
    assert_eq!(buf.text(), "");
}

#[test]
fn test_vglobal_keeps_matches() {
    let buf = edit(&sample(), &["v/X/d"]);
    assert_eq!(buf.line_count(), 6);
    assert!((0..6).all(|line| buf.line_text(line).contains('X')));
}

#[test]
fn test_global_copy_and_move_keep_order() {
    let buf = edit("x1\na\nx2\nb", &["g/x/t$"]);
    assert_eq!(buf.text(), "x1\na\nx2\nb\nx1\nx2");

    let buf = edit("a\nx1\nb\nx2", &["g/x/m0"]);
    assert_eq!(buf.text(), "x1\nx2\na\nb");
}

#[test]
fn test_global_empty_subpattern_uses_global_pattern() {
    let buf = edit("cat\ndog\ncatalog", &["g/cat/s//CAT/"]);
    assert_eq!(buf.text(), "CAT\ndog\nCATalog");
}

#[test]
fn test_global_print_output() {
    let mut session = Session::new();
    let mut buf = MemoryBuffer::from_text(&sample());
    match session.execute(&mut buf, "1,4g/X/").unwrap() {
        ExOutcome::Output(lines) => assert_eq!(lines, vec!["2 X Y Y", "4 X Y Y"]),
        other => panic!("unexpected outcome {:?}", other),
    }
}

#[test]
fn test_global_pending_set_is_consumed() {
    let mut session = Session::new();
    let mut buf = MemoryBuffer::from_text("x\ny\nx\ny\ny");
    session.execute(&mut buf, "g/x/d").unwrap();
    assert_eq!(buf.text(), "y\ny\ny");

    // The next command uses its own range, not the lines `:g` selected.
    session.execute(&mut buf, "3d").unwrap();
    assert_eq!(buf.text(), "y\ny");
}

#[test]
fn test_nested_global_is_rejected() {
    let mut session = Session::new();
    let mut buf = MemoryBuffer::from_text("a\nb");
    let err = session.execute(&mut buf, "g/a/v/b/d").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotImplemented);
    assert_eq!(buf.text(), "a\nb");
}
