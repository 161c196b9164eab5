//! Error types for the line reader.
//!
//! Both variants are fatal for the input stream: once returned, no further
//! lines are read.

use std::io;

use thiserror::Error;

/// Errors raised while reading lines from the input stream.
#[derive(Debug, Error)]
pub enum ReadError {
    /// A line exceeded the configured maximum length.
    #[error("input line exceeds max length of {max} bytes")]
    LineTooLong {
        /// Configured maximum line length.
        max: usize,
    },

    /// The underlying reader failed.
    #[error("failed to read input: {0}")]
    Io(#[from] io::Error),
}
