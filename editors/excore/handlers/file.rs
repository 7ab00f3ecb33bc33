//
// Copyright (c) 2024 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! File commands: write, read, edit, quit, cd and file status.

use super::{buffer_lines, caret_to_line, insert_lines, insertion_line};
use crate::address::AddressKind;
use crate::buffer::TextBuffer;
use crate::command::ExOutcome;
use crate::error::{ExError, Result};
use crate::range::{resolve_destination, resolve_line_range, DefaultRange};
use crate::regions::{covered_lines, materialize, region_lines, RangeSource};
use crate::session::Session;
use std::env;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Lines and bytes moved by a read or write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileStats {
    lines: usize,
    bytes: usize,
}

impl FileStats {
    fn of(lines: &[String]) -> Self {
        FileStats {
            lines: lines.len(),
            bytes: lines.iter().map(|line| line.len() + 1).sum(),
        }
    }

    fn message(&self, path: &Path) -> String {
        format!(
            "\"{}\" {} lines, {} bytes",
            path.display(),
            self.lines,
            self.bytes
        )
    }
}

/// Write `lines`, each followed by a newline.
fn write_lines(path: &Path, lines: &[String], append: bool) -> Result<FileStats> {
    let file = if append {
        OpenOptions::new().create(true).append(true).open(path)?
    } else {
        File::create(path)?
    };

    let mut writer = BufWriter::new(file);
    for line in lines {
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;

    Ok(FileStats::of(lines))
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

fn home_dir() -> Result<PathBuf> {
    env::var_os("HOME")
        .map(PathBuf::from)
        .ok_or_else(|| ExError::NoSuchDirectory(PathBuf::from("~")))
}

impl Session {
    /// Line that text read by `:r` goes in front of.
    ///
    /// A lone address (including `0`) names the line to read below; a pair
    /// reads below its last line. No range reads below the current line.
    pub(crate) fn read_position(
        &self,
        buf: &dyn TextBuffer,
        source: &mut RangeSource,
    ) -> Result<usize> {
        let ctx = self.search_context();
        let current = buf.line_of(buf.caret()) + 1;
        match source {
            RangeSource::Provided(pending) => Ok(pending
                .drain()
                .into_iter()
                .last()
                .map(|region| region_lines(buf, region).end + 1)
                .unwrap_or(current)),
            RangeSource::Text(range) if !range.is_given() => Ok(current),
            RangeSource::Text(range) => match (&range.left, &range.right) {
                (Some(left), None) if left.kind != AddressKind::AllLines => {
                    Ok(insertion_line(resolve_destination(buf, left, &ctx)?))
                }
                _ => Ok(resolve_line_range(buf, range, DefaultRange::CurrentLine, &ctx)?.end + 1),
            },
        }
    }

    /// `:w`, `:w!`, `:w >>` and `:w file`.
    pub(crate) fn write(
        &mut self,
        buf: &mut dyn TextBuffer,
        source: &mut RangeSource,
        force: bool,
        append: bool,
        file: Option<&str>,
    ) -> Result<ExOutcome> {
        let ctx = self.search_context();
        let regions = materialize(buf, source, DefaultRange::WholeBuffer, false, None, &ctx)?;
        let lines = covered_lines(buf, &regions);
        let partial = lines.len() < buf.line_count();
        let texts = buffer_lines(buf, &lines);
        let own = buf.file_name();

        let (target, shown) = match (file, &own) {
            (Some(name), _) => (self.resolve_path(name), PathBuf::from(name)),
            (None, Some(path)) => (path.clone(), path.clone()),
            (None, None) if append => {
                // `:w >>` without a file name appends to the buffer itself.
                let end = buf.line_count();
                insert_lines(buf, end, &texts);
                return Ok(ExOutcome::Continue);
            }
            (None, None) => return Err(ExError::NoFileName),
        };

        let is_own = own.as_deref().is_some_and(|path| same_file(path, &target));
        let stats = if is_own && !append {
            if buf.is_read_only() && !force {
                return Err(ExError::ReadOnly);
            }
            if partial && !force {
                return Err(ExError::PartialWrite);
            }
            if partial || buf.is_read_only() {
                write_lines(&target, &texts, false)?
            } else {
                buf.save()?;
                FileStats::of(&texts)
            }
        } else if append {
            write_lines(&target, &texts, true)?
        } else {
            if target.exists() && !force {
                return Err(ExError::FileExists(shown));
            }
            if let Some(parent) = target.parent() {
                if !parent.as_os_str().is_empty() && !parent.is_dir() {
                    return Err(ExError::NoSuchDirectory(parent.to_path_buf()));
                }
            }
            write_lines(&target, &texts, false)?
        };

        log::debug!("wrote {} lines to {}", stats.lines, target.display());
        Ok(ExOutcome::Message(stats.message(&shown)))
    }

    /// `:wq`: write the whole buffer, then quit.
    pub(crate) fn write_quit(
        &mut self,
        buf: &mut dyn TextBuffer,
        source: &mut RangeSource,
        force: bool,
        file: Option<&str>,
    ) -> Result<ExOutcome> {
        self.write(buf, source, force, false, file)?;
        Ok(ExOutcome::Quit)
    }

    /// `:x`: write only when modified, then quit.
    pub(crate) fn exit(
        &mut self,
        buf: &mut dyn TextBuffer,
        source: &mut RangeSource,
        force: bool,
    ) -> Result<ExOutcome> {
        if buf.is_dirty() {
            self.write(buf, source, force, false, None)?;
        }
        Ok(ExOutcome::Quit)
    }

    /// `:q`
    pub(crate) fn quit(&mut self, buf: &mut dyn TextBuffer, force: bool) -> Result<ExOutcome> {
        if buf.is_dirty() && !force {
            return Err(ExError::UnsavedChanges);
        }
        Ok(ExOutcome::Quit)
    }

    /// `:e [file]`. Reloading the current file happens in place; any other
    /// file is left to the caller to open.
    pub(crate) fn edit(
        &mut self,
        buf: &mut dyn TextBuffer,
        force: bool,
        file: Option<&str>,
    ) -> Result<ExOutcome> {
        if buf.is_dirty() && !force {
            return Err(ExError::UnsavedChanges);
        }

        let own = buf.file_name();
        if let Some(name) = file {
            let path = self.resolve_path(name);
            let reload = own.as_deref().is_some_and(|own| same_file(own, &path));
            if !reload {
                return Ok(ExOutcome::Edit(path));
            }
        }

        let path = own.ok_or(ExError::NoFileName)?;
        buf.revert()?;
        let lines = if buf.is_empty() { 0 } else { buf.line_count() };
        Ok(ExOutcome::Message(format!(
            "\"{}\" {} lines",
            path.display(),
            lines
        )))
    }

    /// `:r [file]`: insert a file below a line.
    pub(crate) fn read(
        &mut self,
        buf: &mut dyn TextBuffer,
        source: &mut RangeSource,
        file: Option<&str>,
    ) -> Result<ExOutcome> {
        let (path, shown) = match file {
            Some(name) => (self.resolve_path(name), PathBuf::from(name)),
            None => {
                let path = buf.file_name().ok_or(ExError::NoFileName)?;
                (path.clone(), path)
            }
        };
        let before = self.read_position(buf, source)?;

        let text = fs::read_to_string(&path)?;
        let lines: Vec<String> = text.lines().map(String::from).collect();
        if !lines.is_empty() {
            insert_lines(buf, before, &lines);
            caret_to_line(buf, before + lines.len() - 1);
        }
        Ok(ExOutcome::Message(FileStats::of(&lines).message(&shown)))
    }

    /// `:cd [dir]`. No argument means `$HOME`; `%:h` is the directory of
    /// the current file.
    pub(crate) fn cd(
        &mut self,
        buf: &mut dyn TextBuffer,
        force: bool,
        path: Option<&str>,
    ) -> Result<ExOutcome> {
        if buf.is_dirty() && !force {
            return Err(ExError::UnsavedChanges);
        }

        let target = match path {
            None | Some("~") => home_dir()?,
            Some("%:h") => {
                let file = buf.file_name().ok_or(ExError::NoFileName)?;
                match file.parent() {
                    Some(parent) if !parent.as_os_str().is_empty() => {
                        self.resolve_path(&parent.to_string_lossy())
                    }
                    _ => self.cwd.clone(),
                }
            }
            Some(dir) => match dir.strip_prefix("~/") {
                Some(rest) => home_dir()?.join(rest),
                None => self.resolve_path(dir),
            },
        };

        if !target.is_dir() {
            return Err(ExError::NoSuchDirectory(target));
        }
        self.cwd = target.canonicalize()?;
        log::debug!("working directory is now {}", self.cwd.display());
        Ok(ExOutcome::Message(self.cwd.display().to_string()))
    }

    /// `:f`: name, modified state and size of the buffer.
    pub(crate) fn file_info(&self, buf: &dyn TextBuffer) -> ExOutcome {
        let name = buf
            .file_name()
            .map(|path| format!("\"{}\"", path.display()))
            .unwrap_or_else(|| "[No Name]".to_string());
        let mut status = name;
        if buf.is_dirty() {
            status.push_str(" [Modified]");
        }
        if buf.is_read_only() {
            status.push_str(" [readonly]");
        }

        if buf.is_empty() {
            status.push_str(" --No lines in buffer--");
        } else {
            let lines = buf.line_count();
            let current = buf.line_of(buf.caret()) + 1;
            status.push_str(&format!(" {} lines --{}%--", lines, current * 100 / lines));
        }
        ExOutcome::Message(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::MemoryBuffer;
    use crate::error::ErrorKind;
    use tempfile::TempDir;

    fn session_in(dir: &TempDir) -> Session {
        let mut session = Session::new();
        session.set_cwd(dir.path().to_path_buf());
        session
    }

    fn open(dir: &TempDir, name: &str, text: &str) -> MemoryBuffer {
        let path = dir.path().join(name);
        fs::write(&path, text).unwrap();
        MemoryBuffer::open(&path).unwrap()
    }

    #[test]
    fn test_write_own_file() {
        let dir = TempDir::new().unwrap();
        let mut session = session_in(&dir);
        let mut buf = open(&dir, "a.txt", "one\ntwo\n");
        session.execute(&mut buf, "1d").unwrap();
        assert!(buf.is_dirty());

        let outcome = session.execute(&mut buf, "w").unwrap();
        let path = dir.path().join("a.txt");
        assert_eq!(
            outcome,
            ExOutcome::Message(format!("\"{}\" 1 lines, 4 bytes", path.display()))
        );
        assert_eq!(fs::read_to_string(&path).unwrap(), "two\n");
        assert!(!buf.is_dirty());
    }

    #[test]
    fn test_write_partial_needs_force() {
        let dir = TempDir::new().unwrap();
        let mut session = session_in(&dir);
        let mut buf = open(&dir, "a.txt", "1\n2\n3\n");
        let err = session.execute(&mut buf, "1,2w").unwrap_err();
        assert!(matches!(err, ExError::PartialWrite));

        session.execute(&mut buf, "1,2w!").unwrap();
        assert_eq!(
            fs::read_to_string(dir.path().join("a.txt")).unwrap(),
            "1\n2\n"
        );

        // `%` is the whole buffer, not a partial write.
        session.execute(&mut buf, "%w").unwrap();
    }

    #[test]
    fn test_write_other_file() {
        let dir = TempDir::new().unwrap();
        let mut session = session_in(&dir);
        let mut buf = MemoryBuffer::from_text("x\ny");

        let outcome = session.execute(&mut buf, "w out.txt").unwrap();
        assert_eq!(
            outcome,
            ExOutcome::Message("\"out.txt\" 2 lines, 4 bytes".to_string())
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("out.txt")).unwrap(),
            "x\ny\n"
        );

        let err = session.execute(&mut buf, "w out.txt").unwrap_err();
        assert!(matches!(err, ExError::FileExists(_)));
        session.execute(&mut buf, "2w! out.txt").unwrap();
        assert_eq!(fs::read_to_string(dir.path().join("out.txt")).unwrap(), "y\n");

        session.execute(&mut buf, "1w >> out.txt").unwrap();
        assert_eq!(
            fs::read_to_string(dir.path().join("out.txt")).unwrap(),
            "y\nx\n"
        );

        let err = session.execute(&mut buf, "w missing/out.txt").unwrap_err();
        assert!(matches!(err, ExError::NoSuchDirectory(_)));
        assert_eq!(err.kind(), ErrorKind::IoFailure);
    }

    #[test]
    fn test_write_without_name() {
        let mut session = Session::new();
        let mut buf = MemoryBuffer::from_text("a\nb");
        let err = session.execute(&mut buf, "w").unwrap_err();
        assert!(matches!(err, ExError::NoFileName));

        session.execute(&mut buf, "1w >>").unwrap();
        assert_eq!(buf.text(), "a\nb\na");
    }

    #[test]
    fn test_write_read_only() {
        let dir = TempDir::new().unwrap();
        let mut session = session_in(&dir);
        let mut buf = open(&dir, "ro.txt", "a\n");
        buf.set_read_only(true);
        let err = session.execute(&mut buf, "w").unwrap_err();
        assert!(matches!(err, ExError::ReadOnly));
        session.execute(&mut buf, "w!").unwrap();
    }

    #[test]
    fn test_quit_and_exit() {
        let dir = TempDir::new().unwrap();
        let mut session = session_in(&dir);
        let mut buf = open(&dir, "q.txt", "a\nb\n");
        assert_eq!(session.execute(&mut buf, "q").unwrap(), ExOutcome::Quit);

        session.execute(&mut buf, "2d").unwrap();
        let err = session.execute(&mut buf, "q").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsavedChanges);
        assert_eq!(session.execute(&mut buf, "q!").unwrap(), ExOutcome::Quit);

        assert_eq!(session.execute(&mut buf, "x").unwrap(), ExOutcome::Quit);
        assert_eq!(
            fs::read_to_string(dir.path().join("q.txt")).unwrap(),
            "a\n"
        );

        session.execute(&mut buf, "s/a/z/").unwrap();
        assert_eq!(session.execute(&mut buf, "wq").unwrap(), ExOutcome::Quit);
        assert_eq!(
            fs::read_to_string(dir.path().join("q.txt")).unwrap(),
            "z\n"
        );
    }

    #[test]
    fn test_edit() {
        let dir = TempDir::new().unwrap();
        let mut session = session_in(&dir);
        let mut buf = open(&dir, "e.txt", "a\nb\n");

        assert_eq!(
            session.execute(&mut buf, "e other.txt").unwrap(),
            ExOutcome::Edit(dir.path().join("other.txt"))
        );

        session.execute(&mut buf, "1d").unwrap();
        let err = session.execute(&mut buf, "e other.txt").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsavedChanges);

        let outcome = session.execute(&mut buf, "e!").unwrap();
        assert_eq!(
            outcome,
            ExOutcome::Message(format!(
                "\"{}\" 2 lines",
                dir.path().join("e.txt").display()
            ))
        );
        assert_eq!(buf.text(), "a\nb");
        assert!(!buf.is_dirty());

        let mut unnamed = MemoryBuffer::new();
        let err = session.execute(&mut unnamed, "e").unwrap_err();
        assert!(matches!(err, ExError::NoFileName));
    }

    #[test]
    fn test_read() {
        let dir = TempDir::new().unwrap();
        let mut session = session_in(&dir);
        fs::write(dir.path().join("in.txt"), "x\ny\n").unwrap();

        let mut buf = MemoryBuffer::from_text("a\nb");
        let outcome = session.execute(&mut buf, "r in.txt").unwrap();
        assert_eq!(
            outcome,
            ExOutcome::Message("\"in.txt\" 2 lines, 4 bytes".to_string())
        );
        assert_eq!(buf.text(), "a\nx\ny\nb");
        assert_eq!(buf.line_of(buf.caret()), 2);

        session.execute(&mut buf, "0r in.txt").unwrap();
        assert_eq!(buf.text(), "x\ny\na\nx\ny\nb");

        session.execute(&mut buf, "$r in.txt").unwrap();
        assert_eq!(buf.text(), "x\ny\na\nx\ny\nb\nx\ny");

        let mut empty = MemoryBuffer::new();
        session.execute(&mut empty, "r in.txt").unwrap();
        assert_eq!(empty.text(), "x\ny");

        let err = session.execute(&mut buf, "r nope.txt").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IoFailure);
    }

    #[test]
    fn test_global_read_below_last_match() {
        let dir = TempDir::new().unwrap();
        let mut session = session_in(&dir);
        fs::write(dir.path().join("in.txt"), "x\ny\n").unwrap();

        let mut buf = MemoryBuffer::from_text("a\nb\na\nc");
        session.execute(&mut buf, "g/a/r in.txt").unwrap();
        assert_eq!(buf.text(), "a\nb\na\nx\ny\nc");

        session.execute(&mut buf, "g/nomatch/r in.txt").unwrap();
        assert_eq!(buf.text(), "a\nb\na\nx\ny\nc");
    }

    #[test]
    fn test_cd() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        let mut session = session_in(&dir);
        let mut buf = open(&dir, "sub_file.txt", "a\n");

        let canonical = dir.path().canonicalize().unwrap();
        let outcome = session.execute(&mut buf, "cd sub").unwrap();
        assert_eq!(
            outcome,
            ExOutcome::Message(canonical.join("sub").display().to_string())
        );
        assert_eq!(session.cwd(), canonical.join("sub"));

        session.execute(&mut buf, "cd %:h").unwrap();
        assert_eq!(session.cwd(), canonical);

        let err = session.execute(&mut buf, "cd nowhere").unwrap_err();
        assert!(matches!(err, ExError::NoSuchDirectory(_)));

        session.execute(&mut buf, "1d").unwrap();
        let err = session.execute(&mut buf, "cd sub").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsavedChanges);
        session.execute(&mut buf, "cd! sub").unwrap();
    }

    #[test]
    fn test_file_info() {
        let session = Session::new();
        let buf = MemoryBuffer::new();
        assert_eq!(
            session.file_info(&buf),
            ExOutcome::Message("[No Name] --No lines in buffer--".to_string())
        );

        let mut buf = MemoryBuffer::from_text("a\nb\nc\nd");
        buf.set_file_name(Some(PathBuf::from("notes.txt")));
        buf.set_caret(2);
        assert_eq!(
            session.file_info(&buf),
            ExOutcome::Message("\"notes.txt\" 4 lines --50%--".to_string())
        );
        buf.insert(0, "x");
        assert_eq!(
            session.file_info(&buf),
            ExOutcome::Message("\"notes.txt\" [Modified] 4 lines --50%--".to_string())
        );
    }
}
