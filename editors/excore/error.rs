//
// Copyright (c) 2024 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! Error types for the ex command engine.

use std::io;
use std::path::PathBuf;

/// Result type alias for ex operations.
pub type Result<T> = std::result::Result<T, ExError>;

/// Broad classification of a failed command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad or unresolvable address, mark or search.
    InvalidAddress,
    /// Copy/move target overlaps its source.
    InvalidDestination,
    /// Regex or search syntax error.
    BadPattern,
    /// Guard against discarding modifications.
    UnsavedChanges,
    /// Unsupported command or command variant.
    NotImplemented,
    /// File or shell failure.
    IoFailure,
}

/// All errors an ex command can report.
#[derive(thiserror::Error, Debug)]
pub enum ExError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Mark not set: '{0}'")]
    MarkNotSet(char),

    #[error("Pattern not found: {0}")]
    PatternNotFound(String),

    #[error("Cannot move lines onto themselves")]
    InvalidDestination,

    #[error("Bad pattern '{pattern}': {reason}")]
    BadPattern { pattern: String, reason: String },

    #[error("No previous regular expression")]
    NoPreviousPattern,

    #[error("Trailing characters: {0}")]
    TrailingCharacters(String),

    #[error("No write since last change (add ! to override)")]
    UnsavedChanges,

    #[error("Not an editor command: {0}")]
    UnknownCommand(String),

    #[error("Unknown option: {0}")]
    UnknownOption(String),

    #[error("Not implemented: {0}")]
    NotImplemented(String),

    #[error("File exists (add ! to override): {}", .0.display())]
    FileExists(PathBuf),

    #[error("Directory does not exist: {}", .0.display())]
    NoSuchDirectory(PathBuf),

    #[error("No file name")]
    NoFileName,

    #[error("Read-only buffer (add ! to override)")]
    ReadOnly,

    #[error("Use ! to write partial buffer")]
    PartialWrite,

    #[error("Shell command failed: {0}")]
    Shell(String),

    #[error("{0}")]
    Io(#[from] io::Error),
}

impl ExError {
    /// Build a `BadPattern` from a regex compile failure.
    pub fn bad_pattern(pattern: &str, err: regex::Error) -> Self {
        ExError::BadPattern {
            pattern: pattern.to_string(),
            reason: err.to_string(),
        }
    }

    /// The taxonomy bucket this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExError::InvalidAddress(_) | ExError::MarkNotSet(_) | ExError::PatternNotFound(_) => {
                ErrorKind::InvalidAddress
            }
            ExError::InvalidDestination => ErrorKind::InvalidDestination,
            ExError::BadPattern { .. }
            | ExError::NoPreviousPattern
            | ExError::TrailingCharacters(_) => ErrorKind::BadPattern,
            ExError::UnsavedChanges => ErrorKind::UnsavedChanges,
            ExError::UnknownCommand(_)
            | ExError::UnknownOption(_)
            | ExError::NotImplemented(_) => ErrorKind::NotImplemented,
            ExError::FileExists(_)
            | ExError::NoSuchDirectory(_)
            | ExError::NoFileName
            | ExError::ReadOnly
            | ExError::PartialWrite
            | ExError::Shell(_)
            | ExError::Io(_) => ErrorKind::IoFailure,
        }
    }
}
