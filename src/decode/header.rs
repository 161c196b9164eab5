//! Column access for a split header line.

use std::net::IpAddr;

use super::{DecodeError, TimestampError};
use crate::{
    message::Timestamp,
    protocol::{FIELD_SEPARATOR, FieldCount, MessageType, ProtocolEntry, split_type_token},
};

/// Parse a `<seconds>.<micros>` column.
///
/// # Errors
///
/// Returns a [`TimestampError`] when the separator is missing or either part
/// is not an integer.
pub fn parse_timestamp(text: &str) -> Result<Timestamp, TimestampError> {
    let (seconds, micros) = text
        .split_once('.')
        .ok_or_else(|| TimestampError::MissingSeparator(text.to_owned()))?;
    let seconds = parse_seconds(seconds)?.seconds;
    let micros = micros.parse().map_err(|source| TimestampError::Micros {
        value: micros.to_owned(),
        source,
    })?;
    Ok(Timestamp::new(seconds, micros))
}

/// Parse a seconds-only column.
///
/// # Errors
///
/// Returns [`TimestampError::Seconds`] when the column is not an integer.
pub fn parse_seconds(text: &str) -> Result<Timestamp, TimestampError> {
    text.parse()
        .map(Timestamp::from_seconds)
        .map_err(|source| TimestampError::Seconds {
            value: text.to_owned(),
            source,
        })
}

/// A header line split into columns and classified against the protocol
/// table.
#[derive(Debug)]
pub(crate) struct Header<'a> {
    line: &'a str,
    entry: ProtocolEntry,
    id: Option<&'a str>,
    columns: Vec<&'a str>,
}

impl<'a> Header<'a> {
    /// Split `line` and check its column count against the table entry for
    /// its declared type.
    pub(crate) fn parse(line: &'a str) -> Result<Self, DecodeError> {
        let columns: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
        let (token, id) = split_type_token(columns[0]).unwrap_or((columns[0], None));
        let kind: MessageType = token.parse().map_err(|_| DecodeError::UnknownType {
            token: token.to_owned(),
            header: line.to_owned(),
        })?;
        let entry = kind.entry();
        if let FieldCount::Exact(expected) = entry.field_count
            && !entry.field_count.accepts(columns.len())
        {
            return Err(DecodeError::FieldCount {
                kind,
                expected,
                found: columns.len(),
                header: line.to_owned(),
            });
        }
        Ok(Self {
            line,
            entry,
            id,
            columns,
        })
    }

    pub(crate) fn kind(&self) -> MessageType { self.entry.kind }

    pub(crate) fn id(&self) -> Option<String> { self.id.map(str::to_owned) }

    pub(crate) fn hostname(&self) -> String { self.text(self.entry.hostname) }

    /// Column text; empty when the column is absent.
    pub(crate) fn text(&self, column: usize) -> String {
        self.columns.get(column).copied().unwrap_or_default().to_owned()
    }

    /// Column parsed as an IP address. Placeholders and garbage decode to
    /// `None` rather than failing the frame.
    pub(crate) fn address(&self, column: usize) -> Option<IpAddr> {
        self.columns.get(column)?.parse().ok()
    }

    /// Column parsed as a `0`/non-`0` flag.
    pub(crate) fn flag(&self, column: usize) -> bool {
        self.columns.get(column).is_some_and(|value| *value != "0")
    }

    /// Column parsed as a `<seconds>.<micros>` timestamp.
    pub(crate) fn timestamp(&self, column: usize) -> Result<Timestamp, DecodeError> {
        parse_timestamp(self.columns.get(column).copied().unwrap_or_default())
            .map_err(|source| self.timestamp_error(column, source))
    }

    /// Column parsed as a seconds-only timestamp.
    pub(crate) fn seconds(&self, column: usize) -> Result<Timestamp, DecodeError> {
        parse_seconds(self.columns.get(column).copied().unwrap_or_default())
            .map_err(|source| self.timestamp_error(column, source))
    }

    fn timestamp_error(&self, column: usize, source: TimestampError) -> DecodeError {
        DecodeError::Timestamp {
            kind: self.kind(),
            column,
            header: self.line.to_owned(),
            source,
        }
    }
}
