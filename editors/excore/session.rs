//
// Copyright (c) 2024 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! Command dispatch and session state.
//!
//! A [`Session`] owns everything that outlives a single command (options,
//! registers, remembered patterns, working directory) but not the buffer,
//! which is passed to every call. Errors abort only the command that raised
//! them.

use crate::buffer::TextBuffer;
use crate::command::{ExCommand, ExOutcome, SubstituteFlags};
use crate::error::{ExError, Result};
use crate::options::Options;
use crate::parser::parse_ex_command;
use crate::range::SearchContext;
use crate::registers::Registers;
use crate::regions::RangeSource;
use crate::shell::{ShellRunner, SystemShell};
use std::env;
use std::path::{Path, PathBuf};

/// The last `:s` pattern, replacement and flags.
#[derive(Debug, Clone, Default)]
pub(crate) struct LastSubstitute {
    pub pattern: String,
    pub replacement: String,
    pub flags: SubstituteFlags,
}

/// Ex command interpreter state.
pub struct Session {
    pub options: Options,
    pub registers: Registers,
    pub(crate) cwd: PathBuf,
    pub(crate) last_substitute: Option<LastSubstitute>,
    pub(crate) last_global: Option<String>,
    pub(crate) last_search: Option<String>,
    pub(crate) last_shell: Option<String>,
    pub(crate) last_error: Option<String>,
    pub(crate) shell: Box<dyn ShellRunner>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Create a session running shell commands on the host system.
    pub fn new() -> Self {
        Self::with_shell(Box::new(SystemShell))
    }

    /// Create a session with a custom shell runner.
    pub fn with_shell(shell: Box<dyn ShellRunner>) -> Self {
        Session {
            options: Options::default(),
            registers: Registers::new(),
            cwd: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            last_substitute: None,
            last_global: None,
            last_search: None,
            last_shell: None,
            last_error: None,
            shell,
        }
    }

    /// Working directory for relative paths and shell commands.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn set_cwd(&mut self, dir: PathBuf) {
        self.cwd = dir;
    }

    /// Message of the most recent failed command.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Run a command line, turning any error into [`ExOutcome::Error`].
    pub fn run(&mut self, buf: &mut dyn TextBuffer, line: &str) -> ExOutcome {
        match self.execute(buf, line) {
            Ok(outcome) => outcome,
            Err(e) => {
                let message = e.to_string();
                log::warn!("{}: {}", line.trim(), message);
                self.last_error = Some(message.clone());
                ExOutcome::Error(message)
            }
        }
    }

    /// Parse and execute a command line.
    pub fn execute(&mut self, buf: &mut dyn TextBuffer, line: &str) -> Result<ExOutcome> {
        let parsed = parse_ex_command(line)?;
        let outcome = self.dispatch(buf, RangeSource::Text(parsed.range.clone()), parsed.command);
        // A search in the range becomes the last pattern once it has been used.
        if let Some(pattern) = parsed.range.last_pattern() {
            self.last_search = Some(pattern.to_string());
        }
        outcome
    }

    /// Execute one parsed command against `source`.
    ///
    /// This is the only entry point for nested execution: `:global` calls it
    /// with [`RangeSource::Provided`] regions instead of a typed range.
    pub fn dispatch(
        &mut self,
        buf: &mut dyn TextBuffer,
        mut source: RangeSource,
        command: ExCommand,
    ) -> Result<ExOutcome> {
        log::debug!(
            "dispatch {} ({})",
            command.name(),
            match &source {
                RangeSource::Text(range) => format!("range {:?}", range.text),
                RangeSource::Provided(pending) => format!("{} provided regions", pending.len()),
            }
        );

        match command {
            ExCommand::Nop => Ok(ExOutcome::Continue),
            ExCommand::Goto => self.goto(buf, &mut source),
            ExCommand::Substitute(spec) => self.substitute(buf, &mut source, spec),
            ExCommand::Global {
                pattern,
                command,
                invert,
            } => {
                if matches!(source, RangeSource::Provided(_)) {
                    return Err(ExError::NotImplemented("nested :global".to_string()));
                }
                self.global(buf, &mut source, &pattern, &command, invert)
            }
            ExCommand::Delete { register, count } => {
                self.delete(buf, &mut source, register, count)
            }
            ExCommand::Yank { register, count } => self.yank(buf, &mut source, register, count),
            ExCommand::Copy { destination } => self.copy(buf, &mut source, &destination),
            ExCommand::Move { destination } => self.move_lines(buf, &mut source, &destination),
            ExCommand::Print { flags, count } => self.print(buf, &mut source, flags, count),
            ExCommand::Write {
                force,
                append,
                file,
            } => self.write(buf, &mut source, force, append, file.as_deref()),
            ExCommand::WriteShell { command } => self.write_shell(buf, &mut source, &command),
            ExCommand::WriteQuit { force, file } => {
                self.write_quit(buf, &mut source, force, file.as_deref())
            }
            ExCommand::Exit { force } => self.exit(buf, &mut source, force),
            ExCommand::Quit { force, .. } => self.quit(buf, force),
            ExCommand::Edit { force, file } => self.edit(buf, force, file.as_deref()),
            ExCommand::Read { file } => self.read(buf, &mut source, file.as_deref()),
            ExCommand::ReadShell { command } => self.read_shell(buf, &mut source, &command),
            ExCommand::Shell { command } => self.shell_command(buf, &mut source, &command),
            ExCommand::Mark { name } => self.mark(buf, &mut source, name),
            ExCommand::Registers => Ok(self.list_registers()),
            ExCommand::Set { args } => Ok(match self.options.set(&args)? {
                Some(text) => ExOutcome::Message(text),
                None => ExOutcome::Continue,
            }),
            ExCommand::Cd { force, path } => self.cd(buf, force, path.as_deref()),
            ExCommand::Pwd => Ok(ExOutcome::Message(self.cwd.display().to_string())),
            ExCommand::File => Ok(self.file_info(buf)),
        }
    }

    /// Search settings for address resolution.
    pub(crate) fn search_context(&self) -> SearchContext {
        SearchContext {
            ignore_case: self.options.ignorecase,
            last_pattern: self.last_search.clone(),
        }
    }

    /// Resolve `path` against the working directory.
    pub(crate) fn resolve_path(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        }
    }

    fn list_registers(&self) -> ExOutcome {
        let lines = self.registers.display();
        if lines.is_empty() {
            ExOutcome::Message("No registers".to_string())
        } else {
            ExOutcome::Output(lines)
        }
    }
}
