//
// Copyright (c) 2024 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! Shell command execution.
//!
//! Used by:
//! - `:!command` - run and show output
//! - `:[range]!command` - filter lines through command
//! - `:r !command` - read command output into buffer
//! - `:w !command` - write lines to command stdin
//!
//! Commands run through the `shell` option, invoked with `-c`. Execution
//! blocks until the command exits.

use crate::error::{ExError, Result};
use std::io::{self, Write};
use std::path::Path;
use std::process::{ChildStdin, Command, Stdio};
use std::thread;

/// Maximum allowed command length.
const MAX_COMMAND_LEN: usize = 8192;

/// Output from a shell command.
#[derive(Debug, Clone, Default)]
pub struct ShellOutput {
    /// Whether the command succeeded (exit code 0).
    pub success: bool,
    /// Exit code of the command, -1 if killed by a signal.
    pub exit_code: i32,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ShellOutput {
    /// Get stdout as a string, lossy conversion.
    pub fn stdout_string(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    /// Get stderr as a string, lossy conversion.
    pub fn stderr_string(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }

    /// Get stdout as lines.
    pub fn stdout_lines(&self) -> Vec<String> {
        self.stdout_string().lines().map(|l| l.to_string()).collect()
    }
}

/// Runs shell commands on behalf of the ex engine.
pub trait ShellRunner {
    /// Run `program -c command` in `cwd`, feeding `input` on stdin when
    /// given, and capture its output.
    fn run(
        &mut self,
        program: &str,
        command: &str,
        input: Option<&str>,
        cwd: &Path,
    ) -> Result<ShellOutput>;
}

/// Shell runner backed by `std::process`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemShell;

impl ShellRunner for SystemShell {
    fn run(
        &mut self,
        program: &str,
        command: &str,
        input: Option<&str>,
        cwd: &Path,
    ) -> Result<ShellOutput> {
        validate_command(command)?;
        log::debug!("running {} -c {:?} in {}", program, command, cwd.display());

        let mut child = Command::new(program)
            .arg("-c")
            .arg(command)
            .current_dir(cwd)
            .stdin(if input.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ExError::Shell(format!("failed to spawn command: {}", e)))?;

        // Feed stdin from its own thread while output drains here.
        let stdin = child.stdin.take();
        let (written, output) = thread::scope(|s| {
            let writer = s.spawn(move || match (input, stdin) {
                (Some(input), Some(mut stdin)) => write_input(&mut stdin, input),
                _ => Ok(()),
            });
            let output = child.wait_with_output();
            (writer.join(), output)
        });

        let output =
            output.map_err(|e| ExError::Shell(format!("failed to read command output: {}", e)))?;
        match written {
            Ok(result) => {
                result.map_err(|e| ExError::Shell(format!("failed to write to command: {}", e)))?
            }
            Err(_) => return Err(ExError::Shell("stdin writer panicked".to_string())),
        }

        Ok(ShellOutput {
            success: output.status.success(),
            exit_code: output.status.code().unwrap_or(-1),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

/// Write `input` to a child's stdin. A command that exits without reading
/// all of it is not an error.
fn write_input(stdin: &mut ChildStdin, input: &str) -> io::Result<()> {
    match stdin.write_all(input.as_bytes()) {
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        result => result,
    }
}

/// Validate command before execution.
fn validate_command(command: &str) -> Result<()> {
    if command.trim().is_empty() {
        return Err(ExError::Shell("empty command".to_string()));
    }
    if command.len() > MAX_COMMAND_LEN {
        return Err(ExError::Shell(format!(
            "command too long (max {} characters)",
            MAX_COMMAND_LEN
        )));
    }
    Ok(())
}

/// Expand special characters in a shell command.
///
/// - `%` expands to the current file name
/// - `!` expands to the previous command
/// - a backslash escapes either
pub fn expand_command(
    command: &str,
    current_file: Option<&str>,
    last_command: Option<&str>,
) -> Result<String> {
    let mut result = String::with_capacity(command.len());
    let mut chars = command.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(&next @ ('%' | '!')) = chars.peek() {
                    result.push(next);
                    chars.next();
                } else {
                    result.push('\\');
                }
            }
            '%' => result.push_str(current_file.ok_or(ExError::NoFileName)?),
            '!' => result.push_str(
                last_command.ok_or_else(|| ExError::Shell("no previous command".to_string()))?,
            ),
            _ => result.push(c),
        }
    }

    Ok(result)
}

/// Turn a failed run into an error carrying its stderr.
pub fn check_status(command: &str, output: &ShellOutput) -> Result<()> {
    if output.success {
        return Ok(());
    }
    let stderr = output.stderr_string();
    let detail = stderr.trim();
    Err(ExError::Shell(if detail.is_empty() {
        format!("'{}' returned {}", command, output.exit_code)
    } else {
        format!("'{}' returned {}: {}", command, output.exit_code, detail)
    }))
}
