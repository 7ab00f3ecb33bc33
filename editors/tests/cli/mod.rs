//
// Copyright (c) 2024 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! Tests for the `excmd` binary.

use crate::common::{run_excmd, run_test, run_test_with_env, TestPlan};
use std::fs;
use tempfile::{NamedTempFile, TempDir};

fn temp_file(content: &str) -> NamedTempFile {
    let temp = NamedTempFile::new().unwrap();
    fs::write(temp.path(), content).unwrap();
    temp
}

fn path_arg(temp: &NamedTempFile) -> String {
    temp.path().to_string_lossy().to_string()
}

#[test]
fn test_print_from_stdin() {
    let temp = temp_file("one\ntwo\nthree\n");
    run_test(TestPlan {
        args: vec!["-s".to_string(), path_arg(&temp)],
        stdin_data: "2,3p\nq\n".to_string(),
        expected_out: "two\nthree\n".to_string(),
        expected_err: String::new(),
        expected_exit_code: 0,
    });
}

#[test]
fn test_commands_from_flags() {
    let temp = temp_file("b\na\n");
    run_test(TestPlan {
        args: vec![
            "-s".to_string(),
            "-n".to_string(),
            "-c".to_string(),
            "1m$".to_string(),
            "-c".to_string(),
            "%nu".to_string(),
            path_arg(&temp),
        ],
        stdin_data: String::new(),
        expected_out: "     1\ta\n     2\tb\n".to_string(),
        expected_err: String::new(),
        expected_exit_code: 0,
    });
}

#[test]
fn test_edit_and_write() {
    let temp = temp_file("keep\ndrop\nkeep\n");
    run_test(TestPlan {
        args: vec!["-s".to_string(), path_arg(&temp)],
        stdin_data: "g/drop/d\n%s/keep/kept/\nwq\n".to_string(),
        expected_out: String::new(),
        expected_err: String::new(),
        expected_exit_code: 0,
    });
    assert_eq!(fs::read_to_string(temp.path()).unwrap(), "kept\nkept\n");
}

#[test]
fn test_error_sets_exit_code() {
    let temp = temp_file("a\n");
    run_test(TestPlan {
        args: vec!["-s".to_string(), path_arg(&temp)],
        stdin_data: "frob\n1p\n".to_string(),
        expected_out: "a\n".to_string(),
        expected_err: "excmd: Not an editor command: frob\n".to_string(),
        expected_exit_code: 1,
    });
}

#[test]
fn test_quit_refuses_unsaved_changes() {
    let temp = temp_file("a\nb\n");
    run_test(TestPlan {
        args: vec!["-s".to_string(), path_arg(&temp)],
        stdin_data: "1d\nq\nq!\n".to_string(),
        expected_out: String::new(),
        expected_err: "excmd: No write since last change (add ! to override)\n".to_string(),
        expected_exit_code: 1,
    });
    assert_eq!(fs::read_to_string(temp.path()).unwrap(), "a\nb\n");
}

#[test]
fn test_exinit_runs_first() {
    let temp = temp_file("x\n");
    run_test_with_env(
        TestPlan {
            args: vec!["-s".to_string(), path_arg(&temp)],
            stdin_data: "p\n".to_string(),
            expected_out: "     1\tx\n".to_string(),
            expected_err: String::new(),
            expected_exit_code: 0,
        },
        &[("EXINIT", "set nu | set ic")],
    );
}

#[test]
fn test_status_messages_without_silent() {
    let temp = temp_file("1\n2\n3\n4\n");
    let output = run_excmd(&[path_arg(&temp)], b"%d\nq!\n", &[]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains(" 4 lines\n"), "stderr: {:?}", stderr);
    assert!(stderr.contains("4 fewer lines\n"), "stderr: {:?}", stderr);
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn test_edit_switches_file() {
    let dir = TempDir::new().unwrap();
    let first = dir.path().join("first.txt");
    let second = dir.path().join("second.txt");
    fs::write(&first, "first\n").unwrap();
    fs::write(&second, "second\n").unwrap();

    run_test(TestPlan {
        args: vec!["-s".to_string(), first.to_string_lossy().to_string()],
        stdin_data: format!("e {}\np\n", second.display()),
        expected_out: "second\n".to_string(),
        expected_err: String::new(),
        expected_exit_code: 0,
    });
}

#[test]
fn test_missing_file_starts_empty() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("new.txt");
    run_test(TestPlan {
        args: vec!["-s".to_string(), path.to_string_lossy().to_string()],
        stdin_data: "r !echo hello\nw\n".to_string(),
        expected_out: String::new(),
        expected_err: String::new(),
        expected_exit_code: 0,
    });
    assert_eq!(fs::read_to_string(&path).unwrap(), "hello\n");
}
