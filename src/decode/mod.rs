//! Field decoding for raw channel frames.
//!
//! [`decode_frame`] turns one [`RawFrame`] into a [`Message`]: the header
//! line is split on `|`, its type token is looked up in the protocol table,
//! the column count is checked, and the per-type decoder fills in the
//! [`Details`] variant. Every other line of the frame becomes the body.
//!
//! Decoding is a pure function of the frame contents. A frame either yields a
//! complete message or a single [`DecodeError`]; partially decoded messages
//! are never produced.

pub mod error;
mod header;
#[cfg(test)]
mod tests;

pub use error::{DecodeError, TimestampError};
use header::Header;
pub use header::{parse_seconds, parse_timestamp};

use crate::{
    frame::RawFrame,
    message::{
        AckDetails,
        DataDetails,
        Details,
        EnaDisDetails,
        Message,
        NotifyDetails,
        PageDetails,
        StatusChangeDetails,
        StatusDetails,
    },
    protocol::{
        MessageType,
        SENDER,
        TIMESTAMP,
        ack,
        data,
        droptest,
        enadis,
        notify,
        page,
        renamehost,
        renametest,
        stachg,
        status,
    },
};

type DetailsDecoder = fn(&Header<'_>) -> Result<Details, DecodeError>;

/// Decode a complete frame.
///
/// # Errors
///
/// Returns a [`DecodeError`] when the frame has no header, the type is
/// unknown, the column count does not match the protocol table, or a
/// timestamp column is malformed.
///
/// # Examples
///
/// ```
/// use xymon_channels::{decode::decode_frame, frame::RawFrame, protocol::MessageType};
///
/// let frame = RawFrame::from(vec![
///     "@@notify#12|1700000000.5|10.0.0.1|web01|http|ops/web".to_owned(),
///     "acknowledged by alice".to_owned(),
/// ]);
/// let message = decode_frame(frame).expect("valid notify frame");
/// assert_eq!(message.kind, MessageType::Notify);
/// assert_eq!(message.body, ["acknowledged by alice"]);
/// ```
pub fn decode_frame(frame: RawFrame) -> Result<Message, DecodeError> {
    let lines = frame.len();
    let (header, body) = frame.into_parts();
    let header = header.ok_or(DecodeError::MissingHeader { lines })?;
    let mut message = decode_header(&header)?;
    message.body = body;
    Ok(message)
}

/// Decode a header line into a message with an empty body.
///
/// # Errors
///
/// See [`decode_frame`].
pub fn decode_header(line: &str) -> Result<Message, DecodeError> {
    let header = Header::parse(line)?;
    let kind = header.kind();
    let timestamp = if kind.is_control() {
        header.timestamp(TIMESTAMP).unwrap_or_default()
    } else {
        header.timestamp(TIMESTAMP)?
    };
    let details = details_decoder(kind)(&header)?;
    Ok(Message {
        kind,
        id: header.id(),
        timestamp,
        sender: header.address(SENDER),
        hostname: header.hostname(),
        details,
        body: Vec::new(),
    })
}

fn details_decoder(kind: MessageType) -> DetailsDecoder {
    match kind {
        MessageType::Status => decode_status,
        MessageType::StaChg => decode_status_change,
        MessageType::Page => decode_page,
        MessageType::Ack => decode_ack,
        MessageType::Notify => decode_notify,
        MessageType::EnaDis => decode_enadis,
        MessageType::Data => decode_data,
        MessageType::DropTest => decode_drop_test,
        MessageType::RenameHost => decode_rename_host,
        MessageType::RenameTest => decode_rename_test,
        MessageType::DropHost | MessageType::DropState | MessageType::Notes => decode_host,
        MessageType::Reload
        | MessageType::Shutdown
        | MessageType::Logrotate
        | MessageType::Idle => decode_control,
    }
}

fn decode_status(h: &Header<'_>) -> Result<Details, DecodeError> {
    Ok(Details::Status(StatusDetails {
        origin: h.text(status::ORIGIN),
        test: h.text(status::TEST),
        expire_time: h.timestamp(status::EXPIRE)?,
        color: h.text(status::COLOR),
        old_color: h.text(status::OLD_COLOR),
        last_change: h.seconds(status::LAST_CHANGE)?,
        ack_expire: h.seconds(status::ACK_EXPIRE)?,
        ack_message: h.text(status::ACK_MESSAGE),
        disable_expire: h.seconds(status::DISABLE_EXPIRE)?,
        disable_message: h.text(status::DISABLE_MESSAGE),
        client_message_time: h.seconds(status::CLIENT_MESSAGE_TIME)?,
        class_name: h.text(status::CLASS),
        page: h.text(status::PAGE),
        flapping: h.flag(status::FLAPPING),
        modifiers: h.text(status::MODIFIERS),
    }))
}

fn decode_status_change(h: &Header<'_>) -> Result<Details, DecodeError> {
    Ok(Details::StatusChange(StatusChangeDetails {
        origin: h.text(stachg::ORIGIN),
        test: h.text(stachg::TEST),
        expire_time: h.timestamp(stachg::EXPIRE)?,
        color: h.text(stachg::COLOR),
        old_color: h.text(stachg::OLD_COLOR),
        last_change: h.timestamp(stachg::LAST_CHANGE)?,
        disable_expire: h.timestamp(stachg::DISABLE_EXPIRE)?,
        disable_message: h.text(stachg::DISABLE_MESSAGE),
        downtime_active: h.flag(stachg::DOWNTIME_ACTIVE),
        client_message_time: h.timestamp(stachg::CLIENT_MESSAGE_TIME)?,
        modifiers: h.text(stachg::MODIFIERS),
    }))
}

fn decode_page(h: &Header<'_>) -> Result<Details, DecodeError> {
    Ok(Details::Page(PageDetails {
        test: h.text(page::TEST),
        host_address: h.address(page::HOST_ADDRESS),
        color: h.text(page::COLOR),
        old_color: h.text(page::OLD_COLOR),
        last_change: h.seconds(page::LAST_CHANGE)?,
        page: h.text(page::PAGE),
        os_name: h.text(page::OS_NAME),
        class_name: h.text(page::CLASS),
    }))
}

fn decode_ack(h: &Header<'_>) -> Result<Details, DecodeError> {
    Ok(Details::Ack(AckDetails {
        test: h.text(ack::TEST),
        host_address: h.address(ack::HOST_ADDRESS),
        ack_expire: h.seconds(ack::ACK_EXPIRE)?,
    }))
}

fn decode_notify(h: &Header<'_>) -> Result<Details, DecodeError> {
    Ok(Details::Notify(NotifyDetails {
        test: h.text(notify::TEST),
        page: h.text(notify::PAGE),
    }))
}

fn decode_enadis(h: &Header<'_>) -> Result<Details, DecodeError> {
    Ok(Details::EnaDis(EnaDisDetails {
        test: h.text(enadis::TEST),
        disable_expire: h.timestamp(enadis::DISABLE_EXPIRE)?,
        disable_message: h.text(enadis::DISABLE_MESSAGE),
    }))
}

fn decode_data(h: &Header<'_>) -> Result<Details, DecodeError> {
    Ok(Details::Data(DataDetails {
        origin: h.text(data::ORIGIN),
        test: h.text(data::TEST),
        class_name: h.text(data::CLASS),
        page: h.text(data::PAGE),
    }))
}

fn decode_drop_test(h: &Header<'_>) -> Result<Details, DecodeError> {
    Ok(Details::DropTest {
        test: h.text(droptest::TEST),
    })
}

fn decode_rename_host(h: &Header<'_>) -> Result<Details, DecodeError> {
    Ok(Details::RenameHost {
        new_hostname: h.text(renamehost::NEW_HOSTNAME),
    })
}

fn decode_rename_test(h: &Header<'_>) -> Result<Details, DecodeError> {
    Ok(Details::RenameTest {
        test: h.text(renametest::TEST),
        new_test: h.text(renametest::NEW_TEST),
    })
}

fn decode_host(_: &Header<'_>) -> Result<Details, DecodeError> { Ok(Details::Host) }

fn decode_control(_: &Header<'_>) -> Result<Details, DecodeError> { Ok(Details::Control) }
