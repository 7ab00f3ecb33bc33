//
// Copyright (c) 2024 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! Ex command definitions.

use crate::address::{Address, LineRange};
use std::path::PathBuf;

/// A command line split into its range and command.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedCommand {
    pub range: LineRange,
    pub command: ExCommand,
}

/// Parsed ex command. The range is carried separately.
#[derive(Debug, Clone, PartialEq)]
pub enum ExCommand {
    /// Empty command line.
    Nop,
    /// Bare range (`:10`).
    Goto,
    /// Substitute (:s, :substitute) and repeat (:&, :&&).
    Substitute(SubstituteSpec),
    /// Global command (:g, :g!, :v).
    Global {
        pattern: String,
        command: String,
        invert: bool,
    },
    /// Delete lines (:d, :delete).
    Delete {
        register: Option<char>,
        count: Option<usize>,
    },
    /// Yank lines (:y, :yank).
    Yank {
        register: Option<char>,
        count: Option<usize>,
    },
    /// Copy lines (:co, :copy, :t).
    Copy { destination: Address },
    /// Move lines (:m, :move).
    Move { destination: Address },
    /// Print lines (:p, :nu, :#, :l).
    Print {
        flags: PrintFlags,
        count: Option<usize>,
    },
    /// Write buffer or range to a file (:w, :w >>).
    Write {
        force: bool,
        append: bool,
        file: Option<String>,
    },
    /// Pipe lines to a shell command (:w !cmd).
    WriteShell { command: String },
    /// Write and quit (:wq).
    WriteQuit { force: bool, file: Option<String> },
    /// Write if modified, then quit (:x, :exit).
    Exit { force: bool },
    /// Quit (:q, :qa, :quitall).
    Quit { force: bool, all: bool },
    /// Edit file (:e, :edit).
    Edit { force: bool, file: Option<String> },
    /// Read file below a line (:r).
    Read { file: Option<String> },
    /// Read command output below a line (:r !cmd).
    ReadShell { command: String },
    /// Run a shell command, or filter the range through it (:!).
    Shell { command: String },
    /// Mark line (:ma, :mark, :k).
    Mark { name: char },
    /// List registers (:reg, :display).
    Registers,
    /// Set options (:se, :set).
    Set { args: String },
    /// Change directory (:cd, :chdir).
    Cd { force: bool, path: Option<String> },
    /// Print working directory (:pwd).
    Pwd,
    /// Show file info (:f, :file).
    File,
}

impl ExCommand {
    /// Name used in log and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            ExCommand::Nop => "nop",
            ExCommand::Goto => "goto",
            ExCommand::Substitute(_) => "substitute",
            ExCommand::Global { .. } => "global",
            ExCommand::Delete { .. } => "delete",
            ExCommand::Yank { .. } => "yank",
            ExCommand::Copy { .. } => "copy",
            ExCommand::Move { .. } => "move",
            ExCommand::Print { .. } => "print",
            ExCommand::Write { .. } => "write",
            ExCommand::WriteShell { .. } => "write !",
            ExCommand::WriteQuit { .. } => "wq",
            ExCommand::Exit { .. } => "exit",
            ExCommand::Quit { .. } => "quit",
            ExCommand::Edit { .. } => "edit",
            ExCommand::Read { .. } => "read",
            ExCommand::ReadShell { .. } => "read !",
            ExCommand::Shell { .. } => "!",
            ExCommand::Mark { .. } => "mark",
            ExCommand::Registers => "registers",
            ExCommand::Set { .. } => "set",
            ExCommand::Cd { .. } => "cd",
            ExCommand::Pwd => "pwd",
            ExCommand::File => "file",
        }
    }
}

/// The two shapes of a substitute argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubstituteSpec {
    /// `/pattern/replacement/flags count`
    Full {
        pattern: String,
        replacement: String,
        flags: SubstituteFlags,
        count: Option<usize>,
    },
    /// `flags count`, reusing the last pattern and replacement.
    Short {
        flags: SubstituteFlags,
        count: Option<usize>,
    },
}

/// Flags for substitute command.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SubstituteFlags {
    /// `&`: start from the previous flags.
    pub keep: bool,
    /// `g`: every match on a line.
    pub global: bool,
    /// `i` forces, `I` disables case folding; unset follows `ignorecase`.
    pub ignore_case: Option<bool>,
    /// `c`: confirm each substitution.
    pub confirm: bool,
}

impl SubstituteFlags {
    /// Combine with remembered flags when `&` was given.
    pub fn merged_with(self, previous: SubstituteFlags) -> SubstituteFlags {
        if !self.keep {
            return self;
        }
        SubstituteFlags {
            keep: false,
            global: previous.global || self.global,
            ignore_case: self.ignore_case.or(previous.ignore_case),
            confirm: previous.confirm || self.confirm,
        }
    }
}

/// Output options of `:print` and friends.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PrintFlags {
    /// Prefix line numbers.
    pub number: bool,
    /// Show tabs as `^I` and mark line ends with `$`.
    pub list: bool,
}

/// Result of executing an ex command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExOutcome {
    /// Nothing to report.
    Continue,
    /// Status message.
    Message(String),
    /// Lines to display (like :p output).
    Output(Vec<String>),
    /// Error message; the command was aborted.
    Error(String),
    /// Leave the editor.
    Quit,
    /// Load a different file.
    Edit(PathBuf),
}
