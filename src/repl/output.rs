//! Stdout rendering for the REPL.
//!
//! Every method flushes, so each block is visible before the next read.

use std::fmt::Display;
use std::io::{self, Write};

/// Width of the turn separator rule, in characters.
pub const SEPARATOR_WIDTH: usize = 62;

/// The horizontal rule printed after every turn.
pub fn separator_rule() -> String {
    format!("─{}─", "─".repeat(SEPARATOR_WIDTH - 2))
}

/// Line-oriented writer for banner, notices, and turn output.
pub(crate) struct Console<W> {
    out: W,
}

impl<W: Write> Console<W> {
    pub(crate) fn new(out: W) -> Self {
        Self { out }
    }

    /// Print one full line.
    pub(crate) fn line(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{text}")?;
        self.out.flush()
    }

    /// Print a streamed response fragment without adding a newline.
    pub(crate) fn fragment(&mut self, text: &str) -> io::Result<()> {
        self.out.write_all(text.as_bytes())?;
        self.out.flush()
    }

    /// Close a successful turn.
    pub(crate) fn end_turn(&mut self) -> io::Result<()> {
        self.separator()
    }

    /// Report a failed turn, then close it like a successful one.
    pub(crate) fn turn_error(&mut self, error: &dyn Display) -> io::Result<()> {
        write!(self.out, "\nAn error occurred: {error}")?;
        self.separator()
    }

    fn separator(&mut self) -> io::Result<()> {
        write!(self.out, "\n\n{}\n\n", separator_rule())?;
        self.out.flush()
    }

    #[cfg(test)]
    pub(crate) fn into_inner(self) -> W {
        self.out
    }
}
