//
// Copyright (c) 2024 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! Ex command parser.
//!
//! Wire format: `[range]name[!][arguments]`. Names may be abbreviated down
//! to the minimum length listed in [`COMMANDS`].

use crate::address::{parse_address, parse_line_range, Address, LineRange};
use crate::command::{ExCommand, ParsedCommand, PrintFlags, SubstituteFlags, SubstituteSpec};
use crate::error::{ExError, Result};

/// Commands with alphabetic names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Name {
    Substitute,
    Set,
    Global,
    VGlobal,
    Delete,
    Display,
    Yank,
    Copy,
    T,
    Move,
    Mark,
    K,
    Print,
    Number,
    List,
    Write,
    WriteQuit,
    Xit,
    Exit,
    Quit,
    QAll,
    QuitAll,
    Edit,
    Read,
    Registers,
    Cd,
    Chdir,
    Pwd,
    File,
}

/// Name table: full name, shortest accepted abbreviation, `!` allowed.
/// Checked in order, so ambiguous prefixes resolve to the earlier entry.
const COMMANDS: &[(&str, usize, bool, Name)] = &[
    ("substitute", 1, false, Name::Substitute),
    ("set", 2, false, Name::Set),
    ("global", 1, true, Name::Global),
    ("vglobal", 1, false, Name::VGlobal),
    ("delete", 1, false, Name::Delete),
    ("display", 2, false, Name::Display),
    ("yank", 1, false, Name::Yank),
    ("copy", 2, false, Name::Copy),
    ("t", 1, false, Name::T),
    ("move", 1, false, Name::Move),
    ("mark", 2, false, Name::Mark),
    ("k", 1, false, Name::K),
    ("print", 1, false, Name::Print),
    ("number", 2, false, Name::Number),
    ("list", 1, false, Name::List),
    ("write", 1, true, Name::Write),
    ("wq", 2, true, Name::WriteQuit),
    ("xit", 1, true, Name::Xit),
    ("exit", 3, true, Name::Exit),
    ("quit", 1, true, Name::Quit),
    ("qall", 2, true, Name::QAll),
    ("quitall", 5, true, Name::QuitAll),
    ("edit", 1, true, Name::Edit),
    ("read", 1, true, Name::Read),
    ("registers", 3, false, Name::Registers),
    ("cd", 2, true, Name::Cd),
    ("chdir", 3, true, Name::Chdir),
    ("pwd", 2, false, Name::Pwd),
    ("file", 1, false, Name::File),
];

fn lookup(name: &str) -> Option<(Name, bool)> {
    COMMANDS
        .iter()
        .find(|(full, min, _, _)| name.len() >= *min && full.starts_with(name))
        .map(|(_, _, bang, id)| (*id, *bang))
}

/// Parse an ex command line.
pub fn parse_ex_command(input: &str) -> Result<ParsedCommand> {
    let (range, rest) = parse_line_range(input.trim())?;
    let command = parse_command(&range, rest.trim())?;
    log::debug!("parsed {:?} as {} with range {:?}", input, command.name(), range.text);
    Ok(ParsedCommand { range, command })
}

fn parse_command(range: &LineRange, rest: &str) -> Result<ExCommand> {
    if rest.is_empty() {
        return Ok(if range.is_given() {
            ExCommand::Goto
        } else {
            ExCommand::Nop
        });
    }

    let (name, bang, args) = split_command(rest);
    match name {
        "!" => {
            return Ok(ExCommand::Shell {
                command: args.to_string(),
            })
        }
        "&" => {
            let (flags, count) = parse_flags_and_count(args)?;
            return Ok(ExCommand::Substitute(SubstituteSpec::Short { flags, count }));
        }
        "#" => {
            let (flags, count) = parse_print_args(args)?;
            return Ok(ExCommand::Print {
                flags: PrintFlags {
                    number: true,
                    ..flags
                },
                count,
            });
        }
        _ => {}
    }

    let (id, bang_allowed) = match lookup(name) {
        Some(found) => found,
        // `:ka` is `:k a`
        None if name.len() == 2 && name.starts_with('k') => {
            return parse_mark(&name[1..]);
        }
        None => return Err(ExError::UnknownCommand(name.to_string())),
    };
    if bang && !bang_allowed {
        return Err(ExError::NotImplemented(format!("{}!", name)));
    }

    match id {
        Name::Substitute => Ok(ExCommand::Substitute(split_substitute(args)?)),
        Name::Global | Name::VGlobal => {
            let (pattern, command) = split_global(args)?;
            Ok(ExCommand::Global {
                pattern,
                command,
                invert: bang || id == Name::VGlobal,
            })
        }
        Name::Delete => {
            let (register, count) = parse_register_and_count(args)?;
            Ok(ExCommand::Delete { register, count })
        }
        Name::Yank => {
            let (register, count) = parse_register_and_count(args)?;
            Ok(ExCommand::Yank { register, count })
        }
        Name::Copy | Name::T => Ok(ExCommand::Copy {
            destination: parse_destination(args)?,
        }),
        Name::Move => Ok(ExCommand::Move {
            destination: parse_destination(args)?,
        }),
        Name::Print | Name::Number | Name::List => {
            let (mut flags, count) = parse_print_args(args)?;
            flags.number |= id == Name::Number;
            flags.list |= id == Name::List;
            Ok(ExCommand::Print { flags, count })
        }
        Name::Write => Ok(parse_write(args, bang)),
        Name::WriteQuit => Ok(ExCommand::WriteQuit {
            force: bang,
            file: optional_arg(args),
        }),
        Name::Xit | Name::Exit => Ok(ExCommand::Exit { force: bang }),
        Name::Quit => Ok(ExCommand::Quit {
            force: bang,
            all: false,
        }),
        Name::QAll | Name::QuitAll => Ok(ExCommand::Quit {
            force: bang,
            all: true,
        }),
        Name::Edit => Ok(ExCommand::Edit {
            force: bang,
            file: optional_arg(args),
        }),
        Name::Read => {
            if bang {
                Ok(ExCommand::ReadShell {
                    command: args.to_string(),
                })
            } else if let Some(command) = args.strip_prefix('!') {
                Ok(ExCommand::ReadShell {
                    command: command.trim().to_string(),
                })
            } else {
                Ok(ExCommand::Read {
                    file: optional_arg(args),
                })
            }
        }
        Name::Mark | Name::K => parse_mark(args),
        Name::Registers | Name::Display => Ok(ExCommand::Registers),
        Name::Set => Ok(ExCommand::Set {
            args: args.to_string(),
        }),
        Name::Cd | Name::Chdir => Ok(ExCommand::Cd {
            force: bang,
            path: optional_arg(args),
        }),
        Name::Pwd => Ok(ExCommand::Pwd),
        Name::File => Ok(ExCommand::File),
    }
}

/// Split `rest` into command name, bang and arguments.
fn split_command(rest: &str) -> (&str, bool, &str) {
    let first = match rest.chars().next() {
        Some(c) => c,
        None => return ("", false, ""),
    };

    let name_end = if first.is_ascii_alphabetic() {
        rest.find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(rest.len())
    } else {
        first.len_utf8()
    };
    let name = &rest[..name_end];
    let after = &rest[name_end..];

    if name == "!" {
        return (name, false, after.trim());
    }
    match after.strip_prefix('!') {
        Some(args) => (name, true, args.trim()),
        None => (name, false, after.trim()),
    }
}

fn optional_arg(args: &str) -> Option<String> {
    let args = args.trim();
    if args.is_empty() {
        None
    } else {
        Some(args.to_string())
    }
}

/// Characters that may delimit a pattern.
fn is_delimiter(c: char) -> bool {
    c.is_ascii_punctuation() && !matches!(c, '\\' | '"' | '|' | '&')
}

/// Read up to the unescaped `delim`. Returns the text and whether the
/// delimiter was found. Escaped delimiters lose their backslash; other
/// escapes are kept for the regex or replacement parser.
fn take_delimited(input: &str, delim: char) -> (String, bool, &str) {
    let mut text = String::new();
    let mut chars = input.char_indices();
    while let Some((i, c)) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some((_, next)) if next == delim => text.push(next),
                Some((_, next)) => {
                    text.push('\\');
                    text.push(next);
                }
                None => text.push('\\'),
            }
        } else if c == delim {
            return (text, true, &input[i + c.len_utf8()..]);
        } else {
            text.push(c);
        }
    }
    (text, false, "")
}

/// Split the argument of `:s` into its full or short form.
///
/// `/pat/rep/flags count` is the full form; a missing closing delimiter
/// ends the pattern or replacement at end of line. Anything not starting
/// with a delimiter is the short form `flags count`.
pub fn split_substitute(args: &str) -> Result<SubstituteSpec> {
    let delim = match args.chars().next() {
        Some(c) if is_delimiter(c) => c,
        _ => {
            let (flags, count) = parse_flags_and_count(args)?;
            return Ok(SubstituteSpec::Short { flags, count });
        }
    };

    let (pattern, closed, rest) = take_delimited(&args[delim.len_utf8()..], delim);
    let (replacement, rest) = if closed {
        let (replacement, _, rest) = take_delimited(rest, delim);
        (replacement, rest)
    } else {
        (String::new(), "")
    };
    let (flags, count) = parse_flags_and_count(rest)?;
    Ok(SubstituteSpec::Full {
        pattern,
        replacement,
        flags,
        count,
    })
}

/// Parse `[&][flags] [count]`.
fn parse_flags_and_count(args: &str) -> Result<(SubstituteFlags, Option<usize>)> {
    let args = args.trim_start();
    let mut flags = SubstituteFlags::default();
    let mut rest = args;
    if let Some(after) = rest.strip_prefix('&') {
        flags.keep = true;
        rest = after;
    }

    let flag_end = rest
        .find(|c: char| !matches!(c, 'g' | 'i' | 'I' | 'c' | 'e'))
        .unwrap_or(rest.len());
    for c in rest[..flag_end].chars() {
        match c {
            'g' => flags.global = true,
            'i' => flags.ignore_case = Some(true),
            'I' => flags.ignore_case = Some(false),
            'c' => flags.confirm = true,
            _ => {}
        }
    }

    let count = parse_count(&rest[flag_end..])?;
    Ok((flags, count))
}

/// Parse an optional positive count and reject anything after it.
fn parse_count(args: &str) -> Result<Option<usize>> {
    let args = args.trim();
    if args.is_empty() {
        return Ok(None);
    }
    let digits_end = args
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(args.len());
    if digits_end == 0 || digits_end != args.len() {
        return Err(ExError::TrailingCharacters(args.to_string()));
    }
    match args.parse::<usize>() {
        Ok(0) | Err(_) => Err(ExError::InvalidAddress(format!("bad count: {}", args))),
        Ok(n) => Ok(Some(n)),
    }
}

/// Split the argument of `:g` into pattern and subcommand.
pub fn split_global(args: &str) -> Result<(String, String)> {
    let delim = match args.chars().next() {
        Some(c) if is_delimiter(c) => c,
        _ => {
            return Err(ExError::BadPattern {
                pattern: args.to_string(),
                reason: "regular expression missing from :global".to_string(),
            })
        }
    };
    let (pattern, _, rest) = take_delimited(&args[delim.len_utf8()..], delim);
    Ok((pattern, rest.trim().to_string()))
}

/// Parse `[x] [count]` for delete and yank.
fn parse_register_and_count(args: &str) -> Result<(Option<char>, Option<usize>)> {
    let args = args.trim();
    match args.chars().next() {
        Some(c) if c.is_ascii_alphabetic() || matches!(c, '"' | '_') => {
            Ok((Some(c), parse_count(&args[c.len_utf8()..])?))
        }
        _ => Ok((None, parse_count(args)?)),
    }
}

/// Parse `[count] [flags]` for print; flags are `#`, `l` and `p`.
fn parse_print_args(args: &str) -> Result<(PrintFlags, Option<usize>)> {
    let mut flags = PrintFlags::default();
    let mut digits = String::new();
    let mut count_done = false;
    for c in args.chars() {
        match c {
            '#' => flags.number = true,
            'l' => flags.list = true,
            'p' => {}
            ' ' | '\t' => count_done = !digits.is_empty(),
            c if c.is_ascii_digit() && !count_done => digits.push(c),
            _ => return Err(ExError::TrailingCharacters(args.to_string())),
        }
    }
    Ok((flags, parse_count(&digits)?))
}

fn parse_destination(args: &str) -> Result<Address> {
    if args.trim().is_empty() {
        return Err(ExError::InvalidAddress("missing destination".to_string()));
    }
    parse_address(args)
}

fn parse_mark(args: &str) -> Result<ExCommand> {
    let args = args.trim();
    let mut chars = args.chars();
    match (chars.next(), chars.next()) {
        (Some(name), None) if name.is_ascii_alphabetic() => Ok(ExCommand::Mark { name }),
        (None, _) => Err(ExError::InvalidAddress("mark name required".to_string())),
        _ => Err(ExError::InvalidAddress(format!("invalid mark name: {}", args))),
    }
}

/// Parse `:w` arguments.
fn parse_write(args: &str, force: bool) -> ExCommand {
    if let Some(rest) = args.strip_prefix(">>") {
        return ExCommand::Write {
            force,
            append: true,
            file: optional_arg(rest),
        };
    }
    if let Some(command) = args.strip_prefix('!') {
        return ExCommand::WriteShell {
            command: command.trim().to_string(),
        };
    }
    ExCommand::Write {
        force,
        append: false,
        file: optional_arg(args),
    }
}
