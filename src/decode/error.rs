//! Error types for header decoding.
//!
//! A [`DecodeError`] always corresponds to exactly one frame that was
//! discarded; decoding of later frames is unaffected.

use std::num::ParseIntError;

use thiserror::Error;

use crate::protocol::MessageType;

/// A `<seconds>.<micros>` column could not be parsed.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TimestampError {
    /// The column has no `.` between seconds and microseconds.
    #[error("malformed timestamp {0:?}: expected <seconds>.<micros>")]
    MissingSeparator(String),
    /// The seconds part is not an integer.
    #[error("malformed timestamp seconds {value:?}: {source}")]
    Seconds {
        /// Offending text.
        value: String,
        /// Integer parse failure.
        source: ParseIntError,
    },
    /// The microseconds part is not an integer.
    #[error("malformed timestamp microseconds {value:?}: {source}")]
    Micros {
        /// Offending text.
        value: String,
        /// Integer parse failure.
        source: ParseIntError,
    },
}

/// Errors produced while decoding a raw frame.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// The frame had no `@@` header line.
    #[error("frame without header line ({lines} lines)")]
    MissingHeader {
        /// Number of lines in the discarded frame.
        lines: usize,
    },

    /// The type token is neither in the protocol table nor a control type.
    #[error("unknown message type {token:?}. Raw header: {header}")]
    UnknownType {
        /// Type token found after `@@`.
        token: String,
        /// Raw header line.
        header: String,
    },

    /// The header has the wrong number of columns for its type.
    #[error(
        "malformed {kind} header: expected {expected} fields, found {found}. Raw header: {header}"
    )]
    FieldCount {
        /// Declared message type.
        kind: MessageType,
        /// Column count required by the protocol table.
        expected: usize,
        /// Column count actually present.
        found: usize,
        /// Raw header line.
        header: String,
    },

    /// A timestamp column failed to parse.
    #[error("{source} in column {column} of {kind} header. Raw header: {header}")]
    Timestamp {
        /// Declared message type.
        kind: MessageType,
        /// Index of the offending column.
        column: usize,
        /// Raw header line.
        header: String,
        /// Parse failure.
        source: TimestampError,
    },
}

impl DecodeError {
    /// Raw header line of the rejected frame, when there was one.
    #[must_use]
    pub fn header(&self) -> Option<&str> {
        match self {
            DecodeError::MissingHeader { .. } => None,
            DecodeError::UnknownType { header, .. }
            | DecodeError::FieldCount { header, .. }
            | DecodeError::Timestamp { header, .. } => Some(header),
        }
    }
}
