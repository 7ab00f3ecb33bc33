//
// Copyright (c) 2024 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! excore: the ex command engine of a vi-style editing layer.
//!
//! A command line such as `:10,20g/FOO/s/old/new/g` is parsed into a range
//! and a command, the range is resolved against a [`TextBuffer`] into
//! regions, and the command edits the buffer or produces output. The host
//! editor supplies the buffer; [`MemoryBuffer`] is a complete in-memory
//! implementation.

pub mod address;
pub mod buffer;
pub mod command;
pub mod error;
mod handlers;
pub mod options;
pub mod parser;
pub mod range;
pub mod regions;
pub mod registers;
pub mod session;
pub mod shell;

pub use address::{
    parse_address, parse_line_range, Address, AddressKind, LineRange, SearchOffset, Separator,
};
pub use buffer::{MemoryBuffer, Region, SearchDirection, TextBuffer};
pub use command::{
    ExCommand, ExOutcome, ParsedCommand, PrintFlags, SubstituteFlags, SubstituteSpec,
};
pub use error::{ErrorKind, ExError, Result};
pub use handlers::convert_replacement;
pub use options::Options;
pub use parser::{parse_ex_command, split_global, split_substitute};
pub use range::{
    resolve_address, resolve_destination, resolve_line_range, DefaultRange, Destination,
    ResolvedRange, SearchContext,
};
pub use regions::{materialize, PendingRegions, RangeSource};
pub use registers::{RegisterContent, Registers};
pub use session::Session;
pub use shell::{ShellOutput, ShellRunner, SystemShell};
