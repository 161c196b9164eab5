//! Unit tests for header and frame decoding.

use std::net::{IpAddr, Ipv4Addr};

use proptest::prelude::*;
use rstest::rstest;

use super::{DecodeError, TimestampError, decode_frame, decode_header, parse_timestamp};
use crate::{
    frame::RawFrame,
    message::{
        AckDetails,
        DataDetails,
        Details,
        EnaDisDetails,
        PageDetails,
        StatusChangeDetails,
        StatusDetails,
        Timestamp,
    },
    protocol::MessageType,
};

const PAGE_HEADER: &str = "@@page#1|1700000000.0|10.0.0.1|host.example.com|testname|10.0.0.2|0|\
                           red|green|1699999000|mypage|x|linux|svc|0|extra";

const STATUS_HEADER: &str = "@@status#77/web01|1700000000.123456|10.0.0.1|origin.example.com|\
                             web01|cpu|1700001800.0|yellow|flags|green|1699990000|1700003600|\
                             on it|0|nothing disabled|1699999999|linux|ops/web|1|mods";

const STACHG_HEADER: &str = "@@stachg#9|1700000000.5|10.0.0.1|origin|web01|disk|1700001800.0|\
                             red|yellow|1699990000.0|1700009000.0|maintenance|1|1699999999.25|m";

fn frame(lines: &[&str]) -> RawFrame {
    RawFrame::new(lines.iter().map(|line| (*line).to_owned()).collect())
}

fn ipv4(a: u8, b: u8, c: u8, d: u8) -> Option<IpAddr> {
    Some(IpAddr::V4(Ipv4Addr::new(a, b, c, d)))
}

#[test]
fn page_frame_decodes_documented_columns() {
    let message = decode_frame(frame(&[PAGE_HEADER, "body line 1"])).expect("valid page frame");

    assert_eq!(message.kind, MessageType::Page);
    assert_eq!(message.id.as_deref(), Some("1"));
    assert_eq!(message.timestamp, Timestamp::new(1_700_000_000, 0));
    assert_eq!(message.sender, ipv4(10, 0, 0, 1));
    assert_eq!(message.hostname, "host.example.com");
    assert_eq!(
        message.details,
        Details::Page(PageDetails {
            test: "testname".to_owned(),
            host_address: ipv4(10, 0, 0, 2),
            color: "red".to_owned(),
            old_color: "green".to_owned(),
            last_change: Timestamp::from_seconds(1_699_999_000),
            page: "mypage".to_owned(),
            os_name: "linux".to_owned(),
            class_name: "svc".to_owned(),
        })
    );
    assert_eq!(message.body, ["body line 1"]);
    assert_eq!(message.test(), Some("testname"));
    assert_eq!(message.color(), Some("red"));
}

#[test]
fn page_alert_expiry_column_is_not_decoded() {
    let header = PAGE_HEADER.replacen("|10.0.0.2|0|", "|10.0.0.2|not-a-time|", 1);
    assert_ne!(header, PAGE_HEADER);

    let with_expiry = decode_header(PAGE_HEADER).expect("valid page header");
    let without_expiry = decode_header(&header).expect("alert expiry column is ignored");

    assert_eq!(without_expiry, with_expiry);
    assert_eq!(without_expiry.timestamp, Timestamp::new(1_700_000_000, 0));
}

#[test]
fn status_frame_decodes_hostname_from_column_four() {
    let message = decode_header(STATUS_HEADER).expect("valid status header");

    assert_eq!(message.kind, MessageType::Status);
    assert_eq!(message.id.as_deref(), Some("77/web01"));
    assert_eq!(message.timestamp, Timestamp::new(1_700_000_000, 123_456));
    assert_eq!(message.hostname, "web01");
    assert_eq!(
        message.details,
        Details::Status(StatusDetails {
            origin: "origin.example.com".to_owned(),
            test: "cpu".to_owned(),
            expire_time: Timestamp::new(1_700_001_800, 0),
            color: "yellow".to_owned(),
            old_color: "green".to_owned(),
            last_change: Timestamp::from_seconds(1_699_990_000),
            ack_expire: Timestamp::from_seconds(1_700_003_600),
            ack_message: "on it".to_owned(),
            disable_expire: Timestamp::from_seconds(0),
            disable_message: "nothing disabled".to_owned(),
            client_message_time: Timestamp::from_seconds(1_699_999_999),
            class_name: "linux".to_owned(),
            page: "ops/web".to_owned(),
            flapping: true,
            modifiers: "mods".to_owned(),
        })
    );
}

#[test]
fn stachg_frame_decodes_composite_timestamps() {
    let message = decode_header(STACHG_HEADER).expect("valid stachg header");

    assert_eq!(
        message.details,
        Details::StatusChange(StatusChangeDetails {
            origin: "origin".to_owned(),
            test: "disk".to_owned(),
            expire_time: Timestamp::new(1_700_001_800, 0),
            color: "red".to_owned(),
            old_color: "yellow".to_owned(),
            last_change: Timestamp::new(1_699_990_000, 0),
            disable_expire: Timestamp::new(1_700_009_000, 0),
            disable_message: "maintenance".to_owned(),
            downtime_active: true,
            client_message_time: Timestamp::new(1_699_999_999, 25),
            modifiers: "m".to_owned(),
        })
    );
}

#[rstest]
#[case(
    "@@ack#5|1700000000.0|10.0.0.1|web01|http|10.0.0.9|1700003600",
    Details::Ack(AckDetails {
        test: "http".to_owned(),
        host_address: ipv4(10, 0, 0, 9),
        ack_expire: Timestamp::from_seconds(1_700_003_600),
    })
)]
#[case(
    "@@enadis#6|1700000000.0|10.0.0.1|web01|conn|1700009000.0|planned work",
    Details::EnaDis(EnaDisDetails {
        test: "conn".to_owned(),
        disable_expire: Timestamp::new(1_700_009_000, 0),
        disable_message: "planned work".to_owned(),
    })
)]
#[case(
    "@@data#7|1700000000.0|10.0.0.1|origin|web01|trends|linux|ops",
    Details::Data(DataDetails {
        origin: "origin".to_owned(),
        test: "trends".to_owned(),
        class_name: "linux".to_owned(),
        page: "ops".to_owned(),
    })
)]
#[case(
    "@@droptest#8|1700000000.0|10.0.0.1|web01|http",
    Details::DropTest { test: "http".to_owned() }
)]
#[case(
    "@@renamehost#9|1700000000.0|10.0.0.1|web01|web02",
    Details::RenameHost { new_hostname: "web02".to_owned() }
)]
#[case(
    "@@renametest#10|1700000000.0|10.0.0.1|web01|http|https",
    Details::RenameTest { test: "http".to_owned(), new_test: "https".to_owned() }
)]
#[case("@@drophost#11|1700000000.0|10.0.0.1|web01", Details::Host)]
#[case("@@notes#12|1700000000.0|10.0.0.1|web01", Details::Host)]
fn type_specific_columns(#[case] header: &str, #[case] expected: Details) {
    let message = decode_header(header).expect("valid header");
    assert_eq!(message.details, expected);
    assert_eq!(message.hostname, "web01");
}

#[rstest]
#[case(MessageType::Page, "@@page#1|1700000000.0|10.0.0.1|host|test")]
#[case(MessageType::Status, "@@status#1|1700000000.0|10.0.0.1|origin|host|test|1.0|red")]
#[case(MessageType::Ack, "@@ack#1|1700000000.0|10.0.0.1|host|test|10.0.0.2|0|extra")]
#[case(MessageType::Notes, "@@notes#1|1700000000.0|10.0.0.1")]
fn wrong_field_count_is_rejected(#[case] kind: MessageType, #[case] header: &str) {
    let err = decode_frame(frame(&[header, "body"])).expect_err("field count must be checked");
    assert!(
        matches!(&err, DecodeError::FieldCount { kind: k, .. } if *k == kind),
        "unexpected error: {err:?}"
    );
    assert_eq!(err.header(), Some(header));
}

#[test]
fn unknown_type_names_the_header() {
    let err = decode_frame(frame(&["@@bogus|1|2"])).expect_err("unknown type");
    assert_eq!(
        err,
        DecodeError::UnknownType {
            token: "bogus".to_owned(),
            header: "@@bogus|1|2".to_owned(),
        }
    );
    assert!(err.to_string().contains("bogus"));
}

#[rstest]
#[case("@@reload")]
#[case("@@shutdown#1|1700000000.0|10.0.0.1")]
#[case("@@logrotate#2|garbage")]
#[case("@@idle#3|1700000000.0|10.0.0.1|xymond|extra|columns")]
fn control_types_decode_without_error(#[case] header: &str) {
    let message = decode_frame(frame(&[header])).expect("control messages never fail");
    assert!(message.kind.is_control());
    assert_eq!(message.details, Details::Control);
}

#[test]
fn control_message_keeps_parseable_common_fields() {
    let message = decode_header("@@idle#3|1700000000.5|10.0.0.1|xymond").expect("idle");
    assert_eq!(message.timestamp, Timestamp::new(1_700_000_000, 5));
    assert_eq!(message.sender, ipv4(10, 0, 0, 1));
    assert_eq!(message.hostname, "xymond");
}

#[rstest]
#[case("@@notify#1|1700000000|10.0.0.1|host|test|page", 1)]
#[case("@@notify#1|abc.0|10.0.0.1|host|test|page", 1)]
#[case("@@notify#1|1700000000.x|10.0.0.1|host|test|page", 1)]
#[case(
    "@@page#1|1700000000.0|10.0.0.1|host|test|10.0.0.2|0|red|green|yesterday|p|x|linux|svc|0|m",
    9
)]
#[case("@@enadis#6|1700000000.0|10.0.0.1|web01|conn|1700009000|msg", 5)]
fn malformed_timestamps_are_rejected(#[case] header: &str, #[case] expected_column: usize) {
    let err = decode_header(header).expect_err("timestamp must be validated");
    assert!(
        matches!(err, DecodeError::Timestamp { column, .. } if column == expected_column),
        "unexpected error: {err:?}"
    );
}

#[rstest]
#[case("1700000000.250", Ok(Timestamp::new(1_700_000_000, 250)))]
#[case("-5.0", Ok(Timestamp::new(-5, 0)))]
#[case("17", Err(TimestampError::MissingSeparator("17".to_owned())))]
fn timestamp_parsing(#[case] text: &str, #[case] expected: Result<Timestamp, TimestampError>) {
    assert_eq!(parse_timestamp(text), expected);
}

#[rstest]
#[case("0.0.0.0", ipv4(0, 0, 0, 0))]
#[case("not-an-address", None)]
#[case("", None)]
fn unparsable_addresses_do_not_fail_decoding(
    #[case] sender: &str,
    #[case] expected: Option<IpAddr>,
) {
    let header = format!("@@notify#1|1700000000.0|{sender}|host|test|page");
    let message = decode_header(&header).expect("addresses are tolerant");
    assert_eq!(message.sender, expected);
}

#[test]
fn headerless_frame_is_rejected() {
    let err = decode_frame(frame(&["orphan", "lines"])).expect_err("no header");
    assert_eq!(err, DecodeError::MissingHeader { lines: 2 });
    assert_eq!(err.header(), None);
}

#[test]
fn ipv6_sender_is_accepted() {
    let message =
        decode_header("@@notify#1|1700000000.0|::1|host|test|page").expect("ipv6 sender");
    assert_eq!(message.sender, Some("::1".parse().expect("valid literal")));
}

proptest! {
    #[test]
    fn body_is_preserved_and_decoding_is_idempotent(
        body in proptest::collection::vec("[^@\\r\\n][^\\r\\n]{0,40}", 0..8)
    ) {
        let mut lines = vec![PAGE_HEADER.to_owned()];
        lines.extend(body.iter().cloned());
        let raw = RawFrame::new(lines);

        let first = decode_frame(raw.clone()).expect("valid page frame");
        let second = decode_frame(raw).expect("valid page frame");

        prop_assert_eq!(&first.body, &body);
        prop_assert_eq!(first, second);
    }
}
