//! Raw frames and the line-to-frame assembler.
//!
//! A frame is every line from an `@@<type>...` header up to, but not
//! including, the bare `@@` line that terminates it. [`FrameAssembler`]
//! groups an unbounded stream of lines into [`RawFrame`]s.

mod assembler;
#[cfg(test)]
mod assembler_tests;

pub use assembler::{AssemblerState, Assembly, FrameAssembler};

use crate::protocol::FRAME_MARKER;

/// Whether `line` opens a new frame.
#[must_use]
pub fn is_header(line: &str) -> bool { line.starts_with(FRAME_MARKER) && line != FRAME_MARKER }

/// Whether `line` is the bare frame terminator.
#[must_use]
pub fn is_terminator(line: &str) -> bool { line == FRAME_MARKER }

/// The lines of one logical message, header first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawFrame {
    lines: Vec<String>,
}

impl RawFrame {
    /// Wrap accumulated lines.
    #[must_use]
    pub fn new(lines: Vec<String>) -> Self { Self { lines } }

    /// Header line, when the frame starts with one.
    #[must_use]
    pub fn header(&self) -> Option<&str> {
        self.lines
            .first()
            .map(String::as_str)
            .filter(|line| is_header(line))
    }

    /// Lines following the header, or every line for a headerless frame.
    #[must_use]
    pub fn body(&self) -> &[String] {
        let skip = usize::from(self.header().is_some());
        &self.lines[skip..]
    }

    /// All lines in arrival order.
    #[must_use]
    pub fn lines(&self) -> &[String] { &self.lines }

    /// Number of lines in the frame.
    #[must_use]
    pub fn len(&self) -> usize { self.lines.len() }

    /// Whether the frame holds no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.lines.is_empty() }

    /// Split into the optional header line and the body lines.
    #[must_use]
    pub fn into_parts(self) -> (Option<String>, Vec<String>) {
        let mut lines = self.lines;
        if lines.first().is_some_and(|line| is_header(line)) {
            let header = lines.remove(0);
            (Some(header), lines)
        } else {
            (None, lines)
        }
    }
}

impl From<Vec<String>> for RawFrame {
    fn from(lines: Vec<String>) -> Self { Self::new(lines) }
}
