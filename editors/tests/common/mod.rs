//
// Copyright (c) 2024 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! Helpers shared by the integration suites.

use excore::{MemoryBuffer, Result, Session, ShellOutput, ShellRunner};
use std::cell::RefCell;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use std::rc::Rc;

pub struct TestPlan {
    pub args: Vec<String>,
    pub stdin_data: String,
    pub expected_out: String,
    pub expected_err: String,
    pub expected_exit_code: i32,
}

/// Run the `excmd` binary with a clean environment plus `env_vars`.
pub fn run_excmd(args: &[String], stdin_data: &[u8], env_vars: &[(&str, &str)]) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_excmd"));
    command
        .args(args)
        .env_remove("EXINIT")
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    for (key, value) in env_vars {
        command.env(key, value);
    }

    let mut child = command.spawn().expect("failed to spawn excmd");
    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(stdin_data)
            .expect("failed to write to excmd stdin");
    }
    child.wait_with_output().expect("failed to wait for excmd")
}

pub fn run_test_with_env(plan: TestPlan, env_vars: &[(&str, &str)]) {
    let output = run_excmd(&plan.args, plan.stdin_data.as_bytes(), env_vars);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout, plan.expected_out);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stderr, plan.expected_err);

    assert_eq!(output.status.code(), Some(plan.expected_exit_code));
}

pub fn run_test(plan: TestPlan) {
    run_test_with_env(plan, &[]);
}

/// Apply `commands` to a fresh buffer holding `text`; every command must
/// succeed.
pub fn edit(text: &str, commands: &[&str]) -> MemoryBuffer {
    let mut session = Session::new();
    let mut buf = MemoryBuffer::from_text(text);
    for command in commands {
        if let Err(e) = session.execute(&mut buf, command) {
            panic!("{:?} failed: {}", command, e);
        }
    }
    buf
}

/// Shell runner that records its calls and sorts its input.
#[derive(Default, Clone)]
pub struct SortShell {
    pub calls: Rc<RefCell<Vec<String>>>,
}

impl ShellRunner for SortShell {
    fn run(
        &mut self,
        _program: &str,
        command: &str,
        input: Option<&str>,
        _cwd: &Path,
    ) -> Result<ShellOutput> {
        self.calls.borrow_mut().push(command.to_string());
        let mut lines: Vec<&str> = input.unwrap_or_default().lines().collect();
        lines.sort_unstable();
        let mut stdout = lines.join("\n");
        stdout.push('\n');
        Ok(ShellOutput {
            success: true,
            exit_code: 0,
            stdout: stdout.into_bytes(),
            stderr: Vec::new(),
        })
    }
}
