//! Two-state machine grouping lines into frames.
//!
//! The assembler is owned by a single task and needs no synchronisation.
//! Transitions:
//!
//! | state          | line          | next           | output                  |
//! |----------------|---------------|----------------|-------------------------|
//! | `Idle`         | header        | `Accumulating` | `Pending`               |
//! | `Idle`         | body line     | `Accumulating` | `Pending`               |
//! | `Idle`         | `@@`          | `Idle`         | `Ignored`               |
//! | `Accumulating` | header        | `Accumulating` | `Abandoned` (if any)    |
//! | `Accumulating` | body line     | `Accumulating` | `Pending`               |
//! | `Accumulating` | `@@`          | `Idle`         | `Complete`              |
//!
//! A header always starts a fresh frame, so a stream that never sends a
//! terminator cannot wedge the assembler.

use std::mem;

use super::{RawFrame, is_header, is_terminator};

/// Assembler state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum AssemblerState {
    /// No frame in progress.
    #[default]
    Idle,
    /// Lines of the current frame so far.
    Accumulating(Vec<String>),
}

/// Outcome of feeding one line to a [`FrameAssembler`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Assembly {
    /// The line was buffered; no frame is ready yet.
    Pending,
    /// The line terminated a frame.
    Complete(RawFrame),
    /// A new header arrived before the previous frame was terminated. The
    /// new header has been buffered; the unterminated lines are returned.
    Abandoned(RawFrame),
    /// A terminator arrived with no frame in progress.
    Ignored,
}

/// Groups consecutive lines into [`RawFrame`]s.
///
/// # Examples
///
/// ```
/// use xymon_channels::frame::{Assembly, FrameAssembler, RawFrame};
///
/// let mut assembler = FrameAssembler::new();
/// assert_eq!(assembler.push("@@idle#1|1.0|10.0.0.1".to_owned()), Assembly::Pending);
/// assert_eq!(assembler.push("body".to_owned()), Assembly::Pending);
/// assert_eq!(
///     assembler.push("@@".to_owned()),
///     Assembly::Complete(RawFrame::new(vec![
///         "@@idle#1|1.0|10.0.0.1".to_owned(),
///         "body".to_owned()
///     ]))
/// );
/// ```
#[derive(Debug, Default)]
pub struct FrameAssembler {
    state: AssemblerState,
}

impl FrameAssembler {
    /// Create an idle assembler.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> &AssemblerState { &self.state }

    /// Feed the next line.
    pub fn push(&mut self, line: String) -> Assembly {
        if is_terminator(&line) {
            return match mem::take(&mut self.state) {
                AssemblerState::Accumulating(lines) => Assembly::Complete(RawFrame::new(lines)),
                AssemblerState::Idle => Assembly::Ignored,
            };
        }

        if is_header(&line) {
            let previous = mem::replace(&mut self.state, AssemblerState::Accumulating(vec![line]));
            return match previous {
                AssemblerState::Accumulating(lines) if !lines.is_empty() => {
                    Assembly::Abandoned(RawFrame::new(lines))
                }
                _ => Assembly::Pending,
            };
        }

        match &mut self.state {
            AssemblerState::Accumulating(lines) => lines.push(line),
            AssemblerState::Idle => self.state = AssemblerState::Accumulating(vec![line]),
        }
        Assembly::Pending
    }

    /// Take the unterminated frame, if any, returning to `Idle`.
    ///
    /// Called when the input ends.
    pub fn finish(&mut self) -> Option<RawFrame> {
        match mem::take(&mut self.state) {
            AssemblerState::Accumulating(lines) if !lines.is_empty() => Some(RawFrame::new(lines)),
            _ => None,
        }
    }
}
