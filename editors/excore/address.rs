//
// Copyright (c) 2024 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! Ex address and range parsing.
//!
//! An address names one line: `.`, `$`, `%`, `12`, `'a`, `/pat/`, `?pat?`,
//! optionally followed by `+N`/`-N` offsets and chained searches. A range is
//! zero, one or two addresses separated by `,` or `;`. Parsing never touches
//! a buffer; resolution happens later in [`crate::range`].

use crate::buffer::SearchDirection;
use crate::error::{ExError, Result};

/// Base form of an address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressKind {
    /// `.`
    CurrentLine,
    /// `$`
    LastLine,
    /// `%`, only valid as a whole range.
    AllLines,
    /// A 1-based line number as typed. `0` means "before the first line".
    AbsoluteLine(usize),
    /// `'x`
    Mark(char),
    /// `/pattern/`; an empty pattern reuses the last search.
    SearchForward(String),
    /// `?pattern?`
    SearchBackward(String),
}

/// A search chained after an address, as in `/foo//bar/-1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOffset {
    pub direction: SearchDirection,
    pub pattern: String,
    /// Line offset applied after the match is found.
    pub offset: i64,
}

/// One parsed address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    pub kind: AddressKind,
    /// Line offsets, summed left to right.
    pub offsets: Vec<i64>,
    /// Searches applied after the line offsets.
    pub search_offsets: Vec<SearchOffset>,
}

impl Address {
    pub fn new(kind: AddressKind) -> Self {
        Address {
            kind,
            offsets: Vec::new(),
            search_offsets: Vec::new(),
        }
    }

    pub fn with_offset(mut self, offset: i64) -> Self {
        self.offsets.push(offset);
        self
    }

    /// Sum of the line offsets.
    pub fn line_offset(&self) -> i64 {
        sum_offsets(&self.offsets)
    }

    /// The last non-empty search pattern this address mentions.
    pub fn last_pattern(&self) -> Option<&str> {
        let chained = self
            .search_offsets
            .iter()
            .rev()
            .map(|s| s.pattern.as_str())
            .find(|p| !p.is_empty());
        chained.or(match &self.kind {
            AddressKind::SearchForward(p) | AddressKind::SearchBackward(p) if !p.is_empty() => {
                Some(p.as_str())
            }
            _ => None,
        })
    }
}

/// How the two addresses of a range were joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Separator {
    /// `,`: both addresses are relative to the caret.
    #[default]
    Comma,
    /// `;`: the right address is relative to the left one.
    Semicolon,
}

/// A parsed, unresolved range.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LineRange {
    pub left: Option<Address>,
    pub right: Option<Address>,
    pub separator: Separator,
    /// The range as typed; empty when the user gave no range at all.
    pub text: String,
}

impl LineRange {
    /// A range that was not given; commands substitute their default.
    pub fn none() -> Self {
        LineRange::default()
    }

    /// The `%` range.
    pub fn all() -> Self {
        LineRange {
            left: Some(Address::new(AddressKind::AllLines)),
            right: None,
            separator: Separator::Comma,
            text: "%".to_string(),
        }
    }

    /// A single absolute line, 1-based.
    pub fn line(n: usize) -> Self {
        LineRange {
            left: Some(Address::new(AddressKind::AbsoluteLine(n))),
            right: None,
            separator: Separator::Comma,
            text: n.to_string(),
        }
    }

    /// Check if any range text was supplied.
    pub fn is_given(&self) -> bool {
        !self.text.is_empty()
    }

    /// The last non-empty search pattern used by either address.
    pub fn last_pattern(&self) -> Option<&str> {
        let right = self.right.as_ref().and_then(|a| a.last_pattern());
        right.or_else(|| self.left.as_ref().and_then(|a| a.last_pattern()))
    }
}

/// Byte-level cursor over the input.
struct Scanner<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str) -> Self {
        Scanner { input, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn skip_blanks(&mut self) {
        while matches!(self.peek(), Some(' ') | Some('\t')) {
            self.pos += 1;
        }
    }

    fn digits(&mut self) -> &'a str {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.pos += 1;
        }
        &self.input[start..self.pos]
    }

    /// Read a pattern up to the unescaped `delim`, which is consumed.
    /// The opening delimiter must already be consumed.
    fn delimited(&mut self, delim: char) -> Result<String> {
        let mut pattern = String::new();
        loop {
            match self.bump() {
                None => {
                    return Err(ExError::InvalidAddress(format!(
                        "unterminated pattern: {}{}",
                        delim, pattern
                    )))
                }
                Some('\\') => match self.bump() {
                    Some(c) if c == delim => pattern.push(c),
                    Some(c) => {
                        pattern.push('\\');
                        pattern.push(c);
                    }
                    None => pattern.push('\\'),
                },
                Some(c) if c == delim => return Ok(pattern),
                Some(c) => pattern.push(c),
            }
        }
    }

    /// Read a run of `+N`/`-N` tokens.
    fn offsets(&mut self) -> Result<Vec<i64>> {
        let mut offsets = Vec::new();
        while let Some(sign @ ('+' | '-')) = self.peek() {
            self.pos += 1;
            let digits = self.digits();
            let magnitude: i64 = if digits.is_empty() {
                1
            } else {
                digits
                    .parse()
                    .map_err(|_| ExError::InvalidAddress(format!("offset too large: {}", digits)))?
            };
            offsets.push(if sign == '-' { -magnitude } else { magnitude });
        }
        Ok(offsets)
    }

    /// Parse one address at the cursor, if one starts here.
    fn address(&mut self) -> Result<Option<Address>> {
        let kind = match self.peek() {
            Some('.') => {
                self.pos += 1;
                AddressKind::CurrentLine
            }
            Some('$') => {
                self.pos += 1;
                AddressKind::LastLine
            }
            Some('%') => {
                self.pos += 1;
                if matches!(self.peek(), Some('+' | '-' | '/' | '?')) {
                    return Err(ExError::InvalidAddress(
                        "% cannot be combined with offsets".to_string(),
                    ));
                }
                return Ok(Some(Address::new(AddressKind::AllLines)));
            }
            Some(c) if c.is_ascii_digit() => {
                let digits = self.digits();
                let n = digits
                    .parse()
                    .map_err(|_| ExError::InvalidAddress(format!("line number too large: {}", digits)))?;
                AddressKind::AbsoluteLine(n)
            }
            Some('\'') => {
                self.pos += 1;
                match self.bump() {
                    Some(c) if is_mark_name(c) => AddressKind::Mark(c),
                    Some(c) => {
                        return Err(ExError::InvalidAddress(format!(
                            "invalid mark character: {}",
                            c
                        )))
                    }
                    None => {
                        return Err(ExError::InvalidAddress(
                            "missing mark character".to_string(),
                        ))
                    }
                }
            }
            Some('/') => {
                self.pos += 1;
                AddressKind::SearchForward(self.delimited('/')?)
            }
            Some('?') => {
                self.pos += 1;
                AddressKind::SearchBackward(self.delimited('?')?)
            }
            // A bare offset is relative to the current line.
            Some('+' | '-') => AddressKind::CurrentLine,
            _ => return Ok(None),
        };

        let mut address = Address::new(kind);
        address.offsets = self.offsets()?;

        while let Some(delim @ ('/' | '?')) = self.peek() {
            self.pos += 1;
            let pattern = self.delimited(delim)?;
            let offset = sum_offsets(&self.offsets()?);
            let direction = if delim == '/' {
                SearchDirection::Forward
            } else {
                SearchDirection::Backward
            };
            address.search_offsets.push(SearchOffset {
                direction,
                pattern,
                offset,
            });
        }

        Ok(Some(address))
    }
}

/// Characters accepted after `'`.
/// Offsets saturate instead of overflowing; resolution clamps afterwards.
fn sum_offsets(offsets: &[i64]) -> i64 {
    offsets.iter().copied().fold(0i64, i64::saturating_add)
}

fn is_mark_name(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '<' | '>' | '\'' | '[' | ']')
}

/// Parse a complete address string.
///
/// Empty (or blank) input is the current line. Anything left over after the
/// address is an error.
pub fn parse_address(input: &str) -> Result<Address> {
    let mut scanner = Scanner::new(input.trim());
    if scanner.rest().is_empty() {
        return Ok(Address::new(AddressKind::CurrentLine));
    }
    match scanner.address()? {
        Some(address) if scanner.rest().is_empty() => Ok(address),
        Some(_) => Err(ExError::InvalidAddress(format!(
            "trailing characters: {}",
            scanner.rest()
        ))),
        None => Err(ExError::InvalidAddress(input.trim().to_string())),
    }
}

/// Parse the range prefix of a command line.
///
/// Returns the range and the unparsed remainder (the command). With more than
/// two addresses only the last two count, as in `:1,2,3p`.
pub fn parse_line_range(input: &str) -> Result<(LineRange, &str)> {
    let input = input.trim_start_matches([' ', '\t', ':']);
    let mut scanner = Scanner::new(input);
    let mut range = LineRange::none();

    range.left = scanner.address()?;
    loop {
        scanner.skip_blanks();
        let separator = match scanner.peek() {
            Some(',') => Separator::Comma,
            Some(';') => Separator::Semicolon,
            _ => break,
        };
        scanner.pos += 1;
        scanner.skip_blanks();
        if range.right.is_some() {
            range.left = range.right.take();
        }
        range.separator = separator;
        range.right = scanner.address()?;
        if range.right.is_none() {
            // `5,` means `5,.`
            range.right = Some(Address::new(AddressKind::CurrentLine));
        }
    }

    range.text = input[..scanner.pos].trim_end().to_string();
    log::trace!("parsed range {:?} from {:?}", range.text, input);
    Ok((range, scanner.rest().trim_start()))
}
