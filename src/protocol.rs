//! Static description of the Xymon channel header formats.
//!
//! Every channel message starts with a header line of pipe-delimited columns:
//!
//! ```text
//! @@<type>[#<id>]|<seconds>.<micros>|<sender>|...type-specific columns...
//! ```
//!
//! The [`ProtocolEntry`] table records, per [`MessageType`], the exact number
//! of columns a header must carry. The column → meaning mapping for each type
//! lives in the per-type submodules ([`status`], [`page`], ...), which the
//! decoders in [`crate::decode`] index by name.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Marker that prefixes every header line and, on its own, terminates a frame.
pub const FRAME_MARKER: &str = "@@";

/// Separator between header columns.
pub const FIELD_SEPARATOR: char = '|';

/// Separator between the type name and the message id in column 0.
pub const ID_SEPARATOR: char = '#';

/// Column holding the `<seconds>.<micros>` message timestamp.
pub const TIMESTAMP: usize = 1;

/// Column holding the address of the sender.
pub const SENDER: usize = 2;

/// Every message type carried on the Xymon channels.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    /// `drophost`: forget a host.
    DropHost,
    /// `dropstate`: forget the state of every test on a host.
    DropState,
    /// `droptest`: forget one test on a host.
    DropTest,
    /// `renamehost`: a host was renamed.
    RenameHost,
    /// `renametest`: a test was renamed.
    RenameTest,
    /// `reload`: configuration reload.
    Reload,
    /// `shutdown`: the channel daemon is stopping.
    Shutdown,
    /// `logrotate`: log files were rotated.
    Logrotate,
    /// `idle`: keep-alive with no payload.
    Idle,
    /// `enadis`: a test was enabled or disabled.
    EnaDis,
    /// `data`: client data for a test.
    Data,
    /// `notes`: host notes changed.
    Notes,
    /// `ack`: an alert was acknowledged.
    Ack,
    /// `notify`: free-form notification.
    Notify,
    /// `page`: an alert fired or changed.
    Page,
    /// `stachg`: a status changed color.
    StaChg,
    /// `status`: a status report.
    Status,
}

impl MessageType {
    /// All message types, in protocol table order.
    pub const ALL: [MessageType; 17] = [
        MessageType::DropHost,
        MessageType::DropState,
        MessageType::DropTest,
        MessageType::RenameHost,
        MessageType::RenameTest,
        MessageType::Reload,
        MessageType::Shutdown,
        MessageType::Logrotate,
        MessageType::Idle,
        MessageType::EnaDis,
        MessageType::Data,
        MessageType::Notes,
        MessageType::Ack,
        MessageType::Notify,
        MessageType::Page,
        MessageType::StaChg,
        MessageType::Status,
    ];

    /// Wire name of the type, as it appears after `@@`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            MessageType::DropHost => "drophost",
            MessageType::DropState => "dropstate",
            MessageType::DropTest => "droptest",
            MessageType::RenameHost => "renamehost",
            MessageType::RenameTest => "renametest",
            MessageType::Reload => "reload",
            MessageType::Shutdown => "shutdown",
            MessageType::Logrotate => "logrotate",
            MessageType::Idle => "idle",
            MessageType::EnaDis => "enadis",
            MessageType::Data => "data",
            MessageType::Notes => "notes",
            MessageType::Ack => "ack",
            MessageType::Notify => "notify",
            MessageType::Page => "page",
            MessageType::StaChg => "stachg",
            MessageType::Status => "status",
        }
    }

    /// Control messages carry no monitoring data and are passed through with
    /// only their common fields.
    #[must_use]
    pub fn is_control(self) -> bool {
        matches!(
            self,
            MessageType::Reload | MessageType::Shutdown | MessageType::Logrotate | MessageType::Idle
        )
    }

    /// Protocol table entry for this type.
    #[must_use]
    pub fn entry(self) -> ProtocolEntry {
        let (field_count, hostname) = match self {
            MessageType::Status => (FieldCount::Exact(20), status::HOSTNAME),
            MessageType::StaChg => (FieldCount::Exact(15), stachg::HOSTNAME),
            MessageType::Page => (FieldCount::Exact(16), page::HOSTNAME),
            MessageType::Ack => (FieldCount::Exact(7), ack::HOSTNAME),
            MessageType::Notify => (FieldCount::Exact(6), notify::HOSTNAME),
            MessageType::EnaDis => (FieldCount::Exact(7), enadis::HOSTNAME),
            MessageType::Data => (FieldCount::Exact(8), data::HOSTNAME),
            MessageType::DropTest => (FieldCount::Exact(5), droptest::HOSTNAME),
            MessageType::RenameHost => (FieldCount::Exact(5), renamehost::HOSTNAME),
            MessageType::RenameTest => (FieldCount::Exact(6), renametest::HOSTNAME),
            MessageType::DropHost | MessageType::DropState | MessageType::Notes => {
                (FieldCount::Exact(4), host::HOSTNAME)
            }
            MessageType::Reload
            | MessageType::Shutdown
            | MessageType::Logrotate
            | MessageType::Idle => (FieldCount::Any, host::HOSTNAME),
        };
        ProtocolEntry {
            kind: self,
            field_count,
            hostname,
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// The type token was not a known message type.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown message type {0:?}")]
pub struct UnknownMessageType(pub String);

impl FromStr for MessageType {
    type Err = UnknownMessageType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MessageType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownMessageType(s.to_owned()))
    }
}

/// Number of header columns a type must carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldCount {
    /// The header must have exactly this many columns.
    Exact(usize),
    /// Any column count is accepted (control messages).
    Any,
}

impl FieldCount {
    /// Whether a header with `found` columns satisfies this requirement.
    #[must_use]
    pub fn accepts(self, found: usize) -> bool {
        match self {
            FieldCount::Exact(expected) => expected == found,
            FieldCount::Any => true,
        }
    }
}

/// One row of the protocol table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProtocolEntry {
    /// Message type described by this row.
    pub kind: MessageType,
    /// Required header column count.
    pub field_count: FieldCount,
    /// Column carrying the hostname.
    pub hostname: usize,
}

/// Split column 0 (`@@page#4711/host.example.com`) into the type token and
/// the optional id.
///
/// Returns `None` when the column does not start with [`FRAME_MARKER`].
#[must_use]
pub fn split_type_token(column: &str) -> Option<(&str, Option<&str>)> {
    let token = column.strip_prefix(FRAME_MARKER)?;
    Some(match token.split_once(ID_SEPARATOR) {
        Some((kind, id)) => (kind, Some(id)),
        None => (token, None),
    })
}

/// Columns of headers that carry only the common fields
/// (`drophost`, `dropstate`, `notes` and the control types).
pub mod host {
    /// Host the message refers to.
    pub const HOSTNAME: usize = 3;
}

/// Columns of the `status` channel header.
pub mod status {
    /// Origin reported by the sender.
    pub const ORIGIN: usize = 3;
    /// Host the message refers to.
    pub const HOSTNAME: usize = 4;
    /// Test name.
    pub const TEST: usize = 5;
    /// Status expiry time.
    pub const EXPIRE: usize = 6;
    /// Current color.
    pub const COLOR: usize = 7;
    // 8 carries test flags, which are not decoded.
    /// Color before the latest change.
    pub const OLD_COLOR: usize = 9;
    /// Time of the latest color change.
    pub const LAST_CHANGE: usize = 10;
    /// Acknowledgement expiry time.
    pub const ACK_EXPIRE: usize = 11;
    /// Acknowledgement text.
    pub const ACK_MESSAGE: usize = 12;
    /// Disable expiry time.
    pub const DISABLE_EXPIRE: usize = 13;
    /// Disable reason.
    pub const DISABLE_MESSAGE: usize = 14;
    /// Arrival time of the client data.
    pub const CLIENT_MESSAGE_TIME: usize = 15;
    /// Client class.
    pub const CLASS: usize = 16;
    /// Page path of the host.
    pub const PAGE: usize = 17;
    /// Flapping flag.
    pub const FLAPPING: usize = 18;
    /// Status modifiers.
    pub const MODIFIERS: usize = 19;
}

/// Columns of the `stachg` channel header.
pub mod stachg {
    /// Origin reported by the sender.
    pub const ORIGIN: usize = 3;
    /// Host the message refers to.
    pub const HOSTNAME: usize = 4;
    /// Test name.
    pub const TEST: usize = 5;
    /// Status expiry time.
    pub const EXPIRE: usize = 6;
    /// Current color.
    pub const COLOR: usize = 7;
    /// Color before the latest change.
    pub const OLD_COLOR: usize = 8;
    /// Time of the latest color change.
    pub const LAST_CHANGE: usize = 9;
    /// Disable expiry time.
    pub const DISABLE_EXPIRE: usize = 10;
    /// Disable reason.
    pub const DISABLE_MESSAGE: usize = 11;
    /// Scheduled downtime flag.
    pub const DOWNTIME_ACTIVE: usize = 12;
    /// Arrival time of the client data.
    pub const CLIENT_MESSAGE_TIME: usize = 13;
    /// Status modifiers.
    pub const MODIFIERS: usize = 14;
}

/// Columns of the `page` channel header.
pub mod page {
    /// Host the message refers to.
    pub const HOSTNAME: usize = 3;
    /// Test name.
    pub const TEST: usize = 4;
    /// Host IP address.
    pub const HOST_ADDRESS: usize = 5;
    // 6 carries the alert expiry time, which is not decoded.
    /// Current color.
    pub const COLOR: usize = 7;
    /// Color before the latest change.
    pub const OLD_COLOR: usize = 8;
    /// Time of the latest color change.
    pub const LAST_CHANGE: usize = 9;
    /// Page path of the host.
    pub const PAGE: usize = 10;
    // 11 carries the alert cookie.
    /// Operating system name.
    pub const OS_NAME: usize = 12;
    /// Client class.
    pub const CLASS: usize = 13;
}

/// Columns of the `ack` header on the page channel.
pub mod ack {
    /// Host the message refers to.
    pub const HOSTNAME: usize = 3;
    /// Test name.
    pub const TEST: usize = 4;
    /// Host IP address.
    pub const HOST_ADDRESS: usize = 5;
    /// Acknowledgement expiry time.
    pub const ACK_EXPIRE: usize = 6;
}

/// Columns of the `notify` header on the page channel.
pub mod notify {
    /// Host the message refers to.
    pub const HOSTNAME: usize = 3;
    /// Test name.
    pub const TEST: usize = 4;
    /// Page path of the host.
    pub const PAGE: usize = 5;
}

/// Columns of the `enadis` channel header.
pub mod enadis {
    /// Host the message refers to.
    pub const HOSTNAME: usize = 3;
    /// Test name.
    pub const TEST: usize = 4;
    /// Disable expiry time.
    pub const DISABLE_EXPIRE: usize = 5;
    /// Disable reason.
    pub const DISABLE_MESSAGE: usize = 6;
}

/// Columns of the `data` channel header.
pub mod data {
    /// Origin reported by the sender.
    pub const ORIGIN: usize = 3;
    /// Host the message refers to.
    pub const HOSTNAME: usize = 4;
    /// Test name.
    pub const TEST: usize = 5;
    /// Client class.
    pub const CLASS: usize = 6;
    /// Page path of the host.
    pub const PAGE: usize = 7;
}

/// Columns of the `droptest` header.
pub mod droptest {
    /// Host the message refers to.
    pub const HOSTNAME: usize = 3;
    /// Test name.
    pub const TEST: usize = 4;
}

/// Columns of the `renamehost` header.
pub mod renamehost {
    /// Host the message refers to.
    pub const HOSTNAME: usize = 3;
    /// New host name.
    pub const NEW_HOSTNAME: usize = 4;
}

/// Columns of the `renametest` header.
pub mod renametest {
    /// Host the message refers to.
    pub const HOSTNAME: usize = 3;
    /// Test name.
    pub const TEST: usize = 4;
    /// New test name.
    pub const NEW_TEST: usize = 5;
}
