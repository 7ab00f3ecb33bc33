//
// Copyright (c) 2024 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! Session options, changed with `:set`.

use crate::error::{ExError, Result};
use std::env;

const DEFAULT_SHELL: &str = "/bin/sh";

/// Session options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Case insensitive search (ignorecase/ic).
    pub ignorecase: bool,
    /// Show line numbers when printing (number/nu).
    pub number: bool,
    /// Program for shell commands (shell/sh).
    pub shell: String,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            ignorecase: false,
            number: false,
            shell: default_shell(),
        }
    }
}

/// `$SHELL`, or `/bin/sh` when unset or empty.
fn default_shell() -> String {
    env::var("SHELL")
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_SHELL.to_string())
}

fn flag(name: &str, value: bool) -> String {
    format!("{}{}", if value { "" } else { "no" }, name)
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply the arguments of a `:set` command.
    ///
    /// Arguments are blank separated. Returns text to display, if any.
    pub fn set(&mut self, args: &str) -> Result<Option<String>> {
        let args = args.trim();
        if args.is_empty() {
            return Ok(Some(self.show_changed()));
        }

        let mut shown = Vec::new();
        for arg in args.split_whitespace() {
            if let Some(text) = self.set_one(arg)? {
                shown.push(text);
            }
        }
        Ok(if shown.is_empty() {
            None
        } else {
            Some(shown.join("  "))
        })
    }

    fn set_one(&mut self, arg: &str) -> Result<Option<String>> {
        if arg == "all" {
            return Ok(Some(self.show_all()));
        }
        if let Some(name) = arg.strip_suffix('?') {
            return self.query(name).map(Some);
        }
        if let Some((name, value)) = arg.split_once('=') {
            self.set_value(name, value)?;
            return Ok(None);
        }
        if let Some(name) = arg.strip_prefix("no") {
            if self.set_bool(name, false).is_ok() {
                return Ok(None);
            }
        }
        match arg {
            // Naming a value option shows it.
            "shell" | "sh" => self.query(arg).map(Some),
            _ => {
                self.set_bool(arg, true)?;
                Ok(None)
            }
        }
    }

    fn set_bool(&mut self, name: &str, value: bool) -> Result<()> {
        match name {
            "ignorecase" | "ic" => self.ignorecase = value,
            "number" | "nu" => self.number = value,
            _ => return Err(ExError::UnknownOption(name.to_string())),
        }
        log::debug!("option {} = {}", name, value);
        Ok(())
    }

    fn set_value(&mut self, name: &str, value: &str) -> Result<()> {
        match name {
            "shell" | "sh" => self.shell = value.to_string(),
            _ => return Err(ExError::UnknownOption(format!("{}={}", name, value))),
        }
        log::debug!("option {} = {}", name, value);
        Ok(())
    }

    fn query(&self, name: &str) -> Result<String> {
        match name {
            "ignorecase" | "ic" => Ok(flag("ignorecase", self.ignorecase)),
            "number" | "nu" => Ok(flag("number", self.number)),
            "shell" | "sh" => Ok(format!("shell={}", self.shell)),
            _ => Err(ExError::UnknownOption(name.to_string())),
        }
    }

    fn show_all(&self) -> String {
        [
            flag("ignorecase", self.ignorecase),
            flag("number", self.number),
            format!("shell={}", self.shell),
        ]
        .join("  ")
    }

    /// Options that differ from their defaults.
    fn show_changed(&self) -> String {
        let defaults = Self::default();
        let mut changes = Vec::new();
        if self.ignorecase != defaults.ignorecase {
            changes.push(flag("ignorecase", self.ignorecase));
        }
        if self.number != defaults.number {
            changes.push(flag("number", self.number));
        }
        if self.shell != defaults.shell {
            changes.push(format!("shell={}", self.shell));
        }

        if changes.is_empty() {
            "No changes from defaults".to_string()
        } else {
            changes.join("  ")
        }
    }
}
