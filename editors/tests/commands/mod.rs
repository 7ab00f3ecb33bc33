//
// Copyright (c) 2024 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! Command behavior through `Session`.

use crate::common::{edit, SortShell};
use excore::{ErrorKind, ExError, ExOutcome, MemoryBuffer, Session, TextBuffer};
use test_log::test;

#[test]
fn test_substitute_first_and_all() {
    assert_eq!(edit("aaa", &["s/a/b/"]).text(), "baa");
    assert_eq!(edit("aaa", &["s/a/b/g"]).text(), "bbb");
    assert_eq!(edit("a.a", &[r"s/\./-/"]).text(), "a-a");
    assert_eq!(edit("x=1", &["s#=#: #"]).text(), "x: 1");
}

#[test]
fn test_substitute_escaped_delimiter() {
    assert_eq!(edit("a/b", &[r"s/\//|/"]).text(), "a|b");
}

#[test]
fn test_move_block_to_top() {
    let buf = edit("1\n2\n3\n4\n5", &["4,5m0"]);
    assert_eq!(buf.text(), "4\n5\n1\n2\n3");
    assert_eq!(buf.line_count(), 5);

    let buf = edit("1\n2\n3\n4\n5", &["1,3m0"]);
    assert_eq!(buf.text(), "1\n2\n3\n4\n5");
}

#[test]
fn test_copy_to_end() {
    let buf = edit("a\nb\nc", &["2co$"]);
    assert_eq!(buf.text(), "a\nb\nc\nb");
    assert_eq!(buf.line_count(), 4);
}

#[test]
fn test_move_onto_itself_fails_cleanly() {
    let mut session = Session::new();
    let mut buf = MemoryBuffer::from_text("a\nb\nc");
    let err = session.execute(&mut buf, "1m1").unwrap_err();
    assert!(matches!(err, ExError::InvalidDestination));
    assert_eq!(err.kind(), ErrorKind::InvalidDestination);
    assert_eq!(buf.text(), "a\nb\nc");
}

#[test]
fn test_errors_do_not_leak() {
    let mut session = Session::new();
    let mut buf = MemoryBuffer::from_text("a\nb\nc");
    assert!(matches!(
        session.run(&mut buf, "1m1"),
        ExOutcome::Error(_)
    ));
    assert!(matches!(
        session.run(&mut buf, "/nothing/d"),
        ExOutcome::Error(_)
    ));
    assert_eq!(session.run(&mut buf, "2d"), ExOutcome::Continue);
    assert_eq!(buf.text(), "a\nc");
}

#[test]
fn test_delete_fills_numbered_registers() {
    let mut session = Session::new();
    let mut buf = MemoryBuffer::from_text("1\n2\n3");
    session.execute(&mut buf, "1d").unwrap();
    session.execute(&mut buf, "1d").unwrap();
    assert_eq!(session.registers.get('1').unwrap().text(), "2\n");
    assert_eq!(session.registers.get('2').unwrap().text(), "1\n");
    assert_eq!(session.registers.get('"').unwrap().text(), "2\n");

    session.execute(&mut buf, "1d _").unwrap();
    assert_eq!(buf.text(), "");
    assert_eq!(session.registers.get('1').unwrap().text(), "2\n");
}

#[test]
fn test_yank_then_list() {
    let mut session = Session::new();
    let mut buf = MemoryBuffer::from_text("x\ny");
    session.execute(&mut buf, "%y").unwrap();
    assert_eq!(
        session.execute(&mut buf, "reg").unwrap(),
        ExOutcome::Output(vec![
            "\"\"   x^Jy^J".to_string(),
            "\"0   x^Jy^J".to_string(),
        ])
    );
}

#[test]
fn test_print_variants() {
    let mut session = Session::new();
    let mut buf = MemoryBuffer::from_text("a\tb\nc");
    assert_eq!(
        session.execute(&mut buf, "%nu").unwrap(),
        ExOutcome::Output(vec!["     1\ta\tb".to_string(), "     2\tc".to_string()])
    );
    assert_eq!(
        session.execute(&mut buf, "1l").unwrap(),
        ExOutcome::Output(vec!["a^Ib$".to_string()])
    );
}

#[test]
fn test_filter_through_shell() {
    let shell = SortShell::default();
    let mut session = Session::with_shell(Box::new(shell.clone()));
    let mut buf = MemoryBuffer::from_text("head\nc\na\nb");
    session.execute(&mut buf, "2,$!sort").unwrap();
    assert_eq!(buf.text(), "head\na\nb\nc");
    assert_eq!(shell.calls.borrow().as_slice(), ["sort".to_string()]);
}

#[test]
fn test_filter_large_buffer_through_system_shell() {
    let text: Vec<String> = (0..20_000).map(|i| format!("line number {}", i)).collect();
    let text = text.join("\n");
    let mut session = Session::new();
    let mut buf = MemoryBuffer::from_text(&text);
    assert_eq!(
        session.execute(&mut buf, "%!cat").unwrap(),
        ExOutcome::Message("20000 lines filtered".to_string())
    );
    assert_eq!(buf.text(), text);
}

#[test]
fn test_unknown_and_unsupported() {
    let mut session = Session::new();
    let mut buf = MemoryBuffer::from_text("a");
    let err = session.execute(&mut buf, "frobnicate").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotImplemented);
    let err = session.execute(&mut buf, "d!").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotImplemented);
    let err = session.execute(&mut buf, "set bogus").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotImplemented);
}

#[test]
fn test_quit_guard() {
    let mut session = Session::new();
    let mut buf = MemoryBuffer::from_text("a\nb");
    assert_eq!(session.execute(&mut buf, "q").unwrap(), ExOutcome::Quit);
    session.execute(&mut buf, "1d").unwrap();
    let err = session.execute(&mut buf, "q").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsavedChanges);
    assert_eq!(session.execute(&mut buf, "qa!").unwrap(), ExOutcome::Quit);
}
