//
// Copyright (c) 2024 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! excmd - run ex commands against a file
//!
//! Commands come from `EXINIT` (separated by `|`), then each `-c`, then
//! standard input, one per line. Output of `:p` and friends goes to
//! stdout; status messages and errors go to stderr.

use clap::Parser;
use excore::{ExOutcome, MemoryBuffer, Session, TextBuffer};
use std::env;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

/// excmd - run ex commands against a file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Suppress status messages
    #[arg(short, long)]
    silent: bool,

    /// Run CMD after loading the file; may be repeated
    #[arg(short = 'c', long = "command", value_name = "CMD")]
    commands: Vec<String>,

    /// Do not read commands from standard input
    #[arg(short = 'n', long)]
    no_stdin: bool,

    /// File to edit
    file: Option<PathBuf>,
}

enum Flow {
    Continue,
    Quit,
}

struct Driver<W: Write> {
    session: Session,
    buf: MemoryBuffer,
    silent: bool,
    failed: bool,
    out: W,
}

impl<W: Write> Driver<W> {
    fn new(silent: bool, out: W) -> Self {
        Driver {
            session: Session::new(),
            buf: MemoryBuffer::new(),
            silent,
            failed: false,
            out,
        }
    }

    fn status(&self, message: &str) {
        if !self.silent {
            eprintln!("{}", message);
        }
    }

    fn open(&mut self, path: PathBuf) {
        match MemoryBuffer::open(&path) {
            Ok(buf) => {
                let lines = if buf.is_empty() { 0 } else { buf.line_count() };
                self.buf = buf;
                self.status(&format!("\"{}\" {} lines", path.display(), lines));
            }
            Err(e) => {
                eprintln!("excmd: {}: {}", path.display(), e);
                self.failed = true;
            }
        }
    }

    fn run_line(&mut self, line: &str) -> io::Result<Flow> {
        match self.session.run(&mut self.buf, line) {
            ExOutcome::Continue => {}
            ExOutcome::Message(text) => self.status(&text),
            ExOutcome::Output(lines) => {
                for line in lines {
                    writeln!(self.out, "{}", line)?;
                }
            }
            ExOutcome::Error(text) => {
                eprintln!("excmd: {}", text);
                self.failed = true;
            }
            ExOutcome::Quit => return Ok(Flow::Quit),
            ExOutcome::Edit(path) => self.open(path),
        }
        Ok(Flow::Continue)
    }

    fn exit_code(mut self) -> ExitCode {
        if let Err(e) = self.out.flush() {
            eprintln!("excmd: {}", e);
            return ExitCode::FAILURE;
        }
        if self.failed {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        }
    }
}

fn script(args: &Args) -> Vec<String> {
    let exinit = env::var("EXINIT").unwrap_or_default();
    exinit
        .split('|')
        .map(str::trim)
        .filter(|cmd| !cmd.is_empty())
        .map(String::from)
        .chain(args.commands.iter().cloned())
        .collect()
}

fn run(args: Args) -> io::Result<ExitCode> {
    let stdout = io::stdout();
    let mut driver = Driver::new(args.silent, stdout.lock());
    if let Some(path) = args.file.clone() {
        driver.open(path);
    }

    for line in script(&args) {
        if let Flow::Quit = driver.run_line(&line)? {
            return Ok(driver.exit_code());
        }
    }

    if !args.no_stdin {
        for line in io::stdin().lock().lines() {
            if let Flow::Quit = driver.run_line(&line?)? {
                break;
            }
        }
    }

    Ok(driver.exit_code())
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("excmd: {}", e);
            ExitCode::FAILURE
        }
    }
}
