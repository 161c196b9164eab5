//! Newline-delimited line codec for channel input.
//!
//! [`LineCodec`] splits a byte stream on `\n`, strips an optional trailing
//! `\r`, and yields each line as a `String`. Invalid UTF-8 is replaced
//! lossily; the channel feed is operator text and a stray byte must not stop
//! the stream.
//!
//! A line longer than the configured maximum is a fatal
//! [`ReadError::LineTooLong`]. The read buffer starts small and grows up to
//! that limit, so large check bodies are never truncated.

use bytes::BytesMut;
use tokio_util::codec::Decoder;

pub mod error;

pub use error::ReadError;

/// Smallest line limit a pipeline accepts, so that every header line fits.
///
/// Enforced by [`PipelineConfig::validate`](crate::config::PipelineConfig::validate).
pub const MIN_LINE_LENGTH: usize = 1024;

/// Tokio decoder producing one `String` per input line.
#[derive(Clone, Debug)]
pub struct LineCodec {
    max_length: usize,
    // Bytes of the buffer already scanned for a newline.
    next_index: usize,
}

impl LineCodec {
    /// Construct a codec rejecting lines longer than `max_length` bytes.
    #[must_use]
    pub fn new(max_length: usize) -> Self {
        Self {
            max_length,
            next_index: 0,
        }
    }

    /// Longest line this codec accepts, excluding the line terminator.
    #[must_use]
    pub fn max_length(&self) -> usize { self.max_length }

    fn too_long(&self) -> ReadError {
        ReadError::LineTooLong {
            max: self.max_length,
        }
    }
}

fn into_line(mut bytes: BytesMut) -> String {
    if bytes.last() == Some(&b'\n') {
        bytes.truncate(bytes.len() - 1);
    }
    if bytes.last() == Some(&b'\r') {
        bytes.truncate(bytes.len() - 1);
    }
    match String::from_utf8(bytes.to_vec()) {
        Ok(line) => line,
        Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = ReadError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let scan_from = self.next_index.min(src.len());
        let Some(offset) = src[scan_from..].iter().position(|byte| *byte == b'\n') else {
            // One extra byte leaves room for a trailing `\r`.
            if src.len() > self.max_length.saturating_add(1) {
                return Err(self.too_long());
            }
            self.next_index = src.len();
            return Ok(None);
        };

        let newline = scan_from + offset;
        self.next_index = 0;
        let content = if newline > 0 && src[newline - 1] == b'\r' {
            newline - 1
        } else {
            newline
        };
        if content > self.max_length {
            return Err(self.too_long());
        }
        Ok(Some(into_line(src.split_to(newline + 1))))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(line) = self.decode(src)? {
            return Ok(Some(line));
        }
        if src.is_empty() {
            return Ok(None);
        }
        // Final line without a trailing newline.
        self.next_index = 0;
        let content = if src.last() == Some(&b'\r') {
            src.len() - 1
        } else {
            src.len()
        };
        if content > self.max_length {
            return Err(self.too_long());
        }
        let rest = src.split_to(src.len());
        Ok(Some(into_line(rest)))
    }
}
