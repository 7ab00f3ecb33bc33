//
// Copyright (c) 2024 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! Register management.
//!
//! Registers hold yanked and deleted text for later reuse:
//! - Unnamed register ("): the most recent yank or delete
//! - Yank register (0): the most recent unnamed yank
//! - Numbered registers (1-9): previous unnamed deletes, newest first
//! - Named registers (a-z): user registers; A-Z append to them
//! - Black hole (_): discards whatever is stored in it
//!
//! Each register holds a list of fragments, one per selection the text
//! came from.

use std::collections::HashMap;

/// Content stored in a register.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterContent {
    pub fragments: Vec<String>,
    /// Whether this is line-wise content.
    pub linewise: bool,
}

impl RegisterContent {
    /// Line-wise content from a single fragment.
    pub fn lines(text: String) -> Self {
        RegisterContent {
            fragments: vec![text],
            linewise: true,
        }
    }

    /// All fragments joined together.
    pub fn text(&self) -> String {
        self.fragments.concat()
    }
}

/// Register storage.
#[derive(Debug, Default)]
pub struct Registers {
    named: HashMap<char, RegisterContent>,
    numbered: [Option<RegisterContent>; 9],
}

impl Registers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get content from a register.
    pub fn get(&self, name: char) -> Option<&RegisterContent> {
        match name {
            '"' | '0' | 'a'..='z' => self.named.get(&name),
            'A'..='Z' => self.named.get(&name.to_ascii_lowercase()),
            '1'..='9' => self.numbered[(name as u8 - b'1') as usize].as_ref(),
            _ => None,
        }
    }

    /// Set content in a register. Uppercase names append.
    pub fn set(&mut self, name: char, content: RegisterContent) {
        match name {
            '"' | '0' | 'a'..='z' => {
                self.named.insert(name, content);
            }
            'A'..='Z' => {
                let lower = name.to_ascii_lowercase();
                match self.named.get_mut(&lower) {
                    Some(existing) => {
                        append(existing, content);
                    }
                    None => {
                        self.named.insert(lower, content);
                    }
                }
            }
            '1'..='9' => {
                self.numbered[(name as u8 - b'1') as usize] = Some(content);
            }
            _ => {}
        }
    }

    /// Store yanked text.
    ///
    /// Without a register the text goes to `"` and `0`.
    pub fn yank(&mut self, register: Option<char>, content: RegisterContent) {
        match register {
            Some('_') => {}
            Some(name) if name != '"' => {
                self.set(name, content);
                self.sync_unnamed(name);
            }
            _ => {
                self.set('0', content.clone());
                self.set('"', content);
            }
        }
    }

    /// Store deleted text.
    ///
    /// Without a register the text goes to `"` and register 1, shifting
    /// 1-8 down to 2-9.
    pub fn delete(&mut self, register: Option<char>, content: RegisterContent) {
        match register {
            Some('_') => {}
            Some(name) if name != '"' => {
                self.set(name, content);
                self.sync_unnamed(name);
            }
            _ => {
                self.numbered.rotate_right(1);
                self.numbered[0] = Some(content.clone());
                self.set('"', content);
            }
        }
    }

    /// Point the unnamed register at the full content of `name`.
    fn sync_unnamed(&mut self, name: char) {
        if let Some(content) = self.get(name).cloned() {
            self.named.insert('"', content);
        }
    }

    /// Non-empty registers in display order: `"`, `0`-`9`, `a`-`z`.
    pub fn list(&self) -> Vec<(char, &RegisterContent)> {
        std::iter::once('"')
            .chain('0'..='9')
            .chain('a'..='z')
            .filter_map(|name| self.get(name).map(|content| (name, content)))
            .filter(|(_, content)| content.fragments.iter().any(|f| !f.is_empty()))
            .collect()
    }

    /// One line per non-empty register: name, first fragment, and a
    /// `... [+N]` marker when more fragments follow.
    pub fn display(&self) -> Vec<String> {
        self.list()
            .into_iter()
            .map(|(name, content)| {
                let first = content
                    .fragments
                    .first()
                    .map(|f| escape_controls(f))
                    .unwrap_or_default();
                if content.fragments.len() > 1 {
                    format!("\"{}   {}   ... [+{}]", name, first, content.fragments.len() - 1)
                } else {
                    format!("\"{}   {}", name, first)
                }
            })
            .collect()
    }
}

fn append(existing: &mut RegisterContent, content: RegisterContent) {
    existing.linewise = existing.linewise || content.linewise;
    existing.fragments.extend(content.fragments);
}

/// Render control characters in caret notation.
fn escape_controls(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\n' => out.push_str("^J"),
            c if (c as u32) < 0x20 => {
                out.push('^');
                out.push(char::from(b'@' + c as u8));
            }
            c => out.push(c),
        }
    }
    out
}
