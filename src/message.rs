//! Decoded channel messages.
//!
//! A [`Message`] carries the columns every header shares (timestamp, sender
//! and hostname), the free-text body and a [`Details`] payload holding the
//! columns specific to its [`MessageType`]. Only the variant matching the
//! declared type is ever populated.

use std::{
    net::IpAddr,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use serde::{Deserialize, Serialize};

use crate::protocol::MessageType;

/// Wall-clock time as carried on the wire: seconds and microseconds since
/// the Unix epoch.
///
/// The default value is the epoch and stands for "not set".
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Timestamp {
    /// Whole seconds since the epoch.
    pub seconds: i64,
    /// Microseconds added to `seconds`.
    pub micros: i64,
}

impl Timestamp {
    /// Build a timestamp from its two wire components.
    #[must_use]
    pub const fn new(seconds: i64, micros: i64) -> Self { Self { seconds, micros } }

    /// Build a timestamp from a seconds-only column.
    #[must_use]
    pub const fn from_seconds(seconds: i64) -> Self { Self::new(seconds, 0) }

    /// Whether this is the zero value.
    #[must_use]
    pub fn is_unset(&self) -> bool { *self == Self::default() }

    /// Convert to a [`SystemTime`].
    ///
    /// Returns `None` when the value cannot be represented.
    #[must_use]
    pub fn to_system_time(&self) -> Option<SystemTime> {
        let total = i128::from(self.seconds) * 1_000_000 + i128::from(self.micros);
        let magnitude = Duration::from_micros(u64::try_from(total.unsigned_abs()).ok()?);
        if total >= 0 {
            UNIX_EPOCH.checked_add(magnitude)
        } else {
            UNIX_EPOCH.checked_sub(magnitude)
        }
    }
}

/// One decoded channel message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Declared message type.
    pub kind: MessageType,
    /// Text following `#` in the type column, usually `<seq>[/<host>]`.
    pub id: Option<String>,
    /// Time the message was generated.
    pub timestamp: Timestamp,
    /// Sender address; `None` when the column was not a valid address.
    pub sender: Option<IpAddr>,
    /// Host the message refers to.
    pub hostname: String,
    /// Columns specific to `kind`.
    pub details: Details,
    /// Non-header lines of the frame, in arrival order.
    pub body: Vec<String>,
}

impl Message {
    /// Test name, for the types that carry one.
    #[must_use]
    pub fn test(&self) -> Option<&str> {
        match &self.details {
            Details::Status(StatusDetails { test, .. })
            | Details::StatusChange(StatusChangeDetails { test, .. })
            | Details::Page(PageDetails { test, .. })
            | Details::Ack(AckDetails { test, .. })
            | Details::Notify(NotifyDetails { test, .. })
            | Details::EnaDis(EnaDisDetails { test, .. })
            | Details::Data(DataDetails { test, .. })
            | Details::DropTest { test }
            | Details::RenameTest { test, .. } => Some(test.as_str()),
            Details::Host | Details::RenameHost { .. } | Details::Control => None,
        }
    }

    /// Current color, for the types that carry one.
    #[must_use]
    pub fn color(&self) -> Option<&str> {
        match &self.details {
            Details::Status(StatusDetails { color, .. })
            | Details::StatusChange(StatusChangeDetails { color, .. })
            | Details::Page(PageDetails { color, .. }) => Some(color.as_str()),
            _ => None,
        }
    }
}

/// Type-specific message columns.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Details {
    /// `status` channel.
    Status(StatusDetails),
    /// `stachg` channel.
    StatusChange(StatusChangeDetails),
    /// `page` messages on the page channel.
    Page(PageDetails),
    /// `ack` messages on the page channel.
    Ack(AckDetails),
    /// `notify` messages on the page channel.
    Notify(NotifyDetails),
    /// `enadis` channel.
    EnaDis(EnaDisDetails),
    /// `data` channel.
    Data(DataDetails),
    /// `droptest`.
    DropTest {
        /// Test whose state is dropped.
        test: String,
    },
    /// `renamehost`.
    RenameHost {
        /// Name the host is known by from now on.
        new_hostname: String,
    },
    /// `renametest`.
    RenameTest {
        /// Current test name.
        test: String,
        /// Name the test is known by from now on.
        new_test: String,
    },
    /// `drophost`, `dropstate` and `notes`: only the common columns.
    Host,
    /// `reload`, `shutdown`, `logrotate` and `idle`.
    Control,
}

/// Columns of a `status` message.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusDetails {
    /// Origin column as reported by the sender.
    pub origin: String,
    /// Test name.
    pub test: String,
    /// When the status goes purple unless refreshed.
    pub expire_time: Timestamp,
    /// Current color.
    pub color: String,
    /// Color before the latest change.
    pub old_color: String,
    /// When the color last changed.
    pub last_change: Timestamp,
    /// When the acknowledgement expires; unset if not acknowledged.
    pub ack_expire: Timestamp,
    /// Acknowledgement text.
    pub ack_message: String,
    /// When the disable expires; unset if not disabled.
    pub disable_expire: Timestamp,
    /// Reason given for disabling.
    pub disable_message: String,
    /// When the client data behind this status arrived.
    pub client_message_time: Timestamp,
    /// Client class.
    pub class_name: String,
    /// Page path of the host.
    pub page: String,
    /// Whether the status is flapping between colors.
    pub flapping: bool,
    /// Active status modifiers.
    pub modifiers: String,
}

/// Columns of a `stachg` message.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChangeDetails {
    /// Origin column as reported by the sender.
    pub origin: String,
    /// Test name.
    pub test: String,
    /// When the status goes purple unless refreshed.
    pub expire_time: Timestamp,
    /// Current color.
    pub color: String,
    /// Color before the latest change.
    pub old_color: String,
    /// When the color last changed.
    pub last_change: Timestamp,
    /// When the disable expires; unset if not disabled.
    pub disable_expire: Timestamp,
    /// Reason given for disabling.
    pub disable_message: String,
    /// Whether the host is in scheduled downtime.
    pub downtime_active: bool,
    /// When the client data behind this status arrived.
    pub client_message_time: Timestamp,
    /// Active status modifiers.
    pub modifiers: String,
}

/// Columns of a `page` message.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageDetails {
    /// Test name.
    pub test: String,
    /// Host address; `None` when the column was not a valid address.
    pub host_address: Option<IpAddr>,
    /// Current color.
    pub color: String,
    /// Color before the latest change.
    pub old_color: String,
    /// When the color last changed.
    pub last_change: Timestamp,
    /// Page path of the host.
    pub page: String,
    /// Operating system of the host.
    pub os_name: String,
    /// Client class.
    pub class_name: String,
}

/// Columns of an `ack` message.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AckDetails {
    /// Test name.
    pub test: String,
    /// Host address; `None` when the column was not a valid address.
    pub host_address: Option<IpAddr>,
    /// When the acknowledgement expires.
    pub ack_expire: Timestamp,
}

/// Columns of a `notify` message.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifyDetails {
    /// Test name.
    pub test: String,
    /// Page path of the host.
    pub page: String,
}

/// Columns of an `enadis` message.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnaDisDetails {
    /// Test name.
    pub test: String,
    /// When the disable expires; unset when re-enabling.
    pub disable_expire: Timestamp,
    /// Reason given for disabling.
    pub disable_message: String,
}

/// Columns of a `data` message.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataDetails {
    /// Origin column as reported by the sender.
    pub origin: String,
    /// Test name.
    pub test: String,
    /// Client class.
    pub class_name: String,
    /// Page path of the host.
    pub page: String,
}
