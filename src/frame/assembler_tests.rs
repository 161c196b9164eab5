//! Unit tests for `FrameAssembler`.

use rstest::{fixture, rstest};

use super::{AssemblerState, Assembly, FrameAssembler, RawFrame};

#[fixture]
fn assembler() -> FrameAssembler { FrameAssembler::new() }

fn frame(lines: &[&str]) -> RawFrame {
    RawFrame::new(lines.iter().map(|line| (*line).to_owned()).collect())
}

fn feed(assembler: &mut FrameAssembler, lines: &[&str]) -> Vec<Assembly> {
    lines
        .iter()
        .map(|line| assembler.push((*line).to_owned()))
        .filter(|outcome| *outcome != Assembly::Pending)
        .collect()
}

#[rstest]
fn header_body_terminator_yields_one_frame(mut assembler: FrameAssembler) {
    let outcomes = feed(&mut assembler, &["@@page#1|1.0", "line 1", "line 2", "@@"]);
    assert_eq!(
        outcomes,
        [Assembly::Complete(frame(&["@@page#1|1.0", "line 1", "line 2"]))]
    );
    assert_eq!(assembler.state(), &AssemblerState::Idle);
}

#[rstest]
fn consecutive_frames_are_independent(mut assembler: FrameAssembler) {
    let outcomes = feed(
        &mut assembler,
        &["@@idle#1|1.0", "a", "@@", "@@idle#2|2.0", "b", "@@"],
    );
    assert_eq!(
        outcomes,
        [
            Assembly::Complete(frame(&["@@idle#1|1.0", "a"])),
            Assembly::Complete(frame(&["@@idle#2|2.0", "b"])),
        ]
    );
}

#[rstest]
fn new_header_abandons_unterminated_frame(mut assembler: FrameAssembler) {
    let outcomes = feed(
        &mut assembler,
        &["@@page#1|1.0", "lost", "@@page#2|2.0", "kept", "@@"],
    );
    assert_eq!(
        outcomes,
        [
            Assembly::Abandoned(frame(&["@@page#1|1.0", "lost"])),
            Assembly::Complete(frame(&["@@page#2|2.0", "kept"])),
        ]
    );
}

#[rstest]
fn stray_terminator_is_ignored(mut assembler: FrameAssembler) {
    assert_eq!(assembler.push("@@".to_owned()), Assembly::Ignored);
    assert_eq!(assembler.state(), &AssemblerState::Idle);
}

#[rstest]
fn lines_after_terminator_start_a_headerless_frame(mut assembler: FrameAssembler) {
    let outcomes = feed(&mut assembler, &["@@idle#1|1.0", "@@", "orphan", "@@"]);
    assert_eq!(
        outcomes,
        [
            Assembly::Complete(frame(&["@@idle#1|1.0"])),
            Assembly::Complete(frame(&["orphan"])),
        ]
    );
}

#[rstest]
fn header_after_orphan_lines_abandons_them(mut assembler: FrameAssembler) {
    let outcomes = feed(&mut assembler, &["orphan", "@@idle#1|1.0", "@@"]);
    assert_eq!(
        outcomes,
        [
            Assembly::Abandoned(frame(&["orphan"])),
            Assembly::Complete(frame(&["@@idle#1|1.0"])),
        ]
    );
}

#[rstest]
fn finish_returns_unterminated_frame(mut assembler: FrameAssembler) {
    feed(&mut assembler, &["@@page#1|1.0", "partial"]);
    assert_eq!(assembler.finish(), Some(frame(&["@@page#1|1.0", "partial"])));
    assert_eq!(assembler.finish(), None);
}

#[rstest]
fn empty_lines_are_body_lines(mut assembler: FrameAssembler) {
    let outcomes = feed(&mut assembler, &["@@idle#1|1.0", "", "x", "@@"]);
    assert_eq!(
        outcomes,
        [Assembly::Complete(frame(&["@@idle#1|1.0", "", "x"]))]
    );
}

#[test]
fn raw_frame_splits_header_and_body() {
    let raw = frame(&["@@page#1|1.0", "a", "b"]);
    assert_eq!(raw.header(), Some("@@page#1|1.0"));
    assert_eq!(raw.body(), ["a", "b"]);
    assert_eq!(
        raw.into_parts(),
        (
            Some("@@page#1|1.0".to_owned()),
            vec!["a".to_owned(), "b".to_owned()]
        )
    );
}

#[test]
fn headerless_raw_frame_is_all_body() {
    let raw = frame(&["a", "b"]);
    assert_eq!(raw.header(), None);
    assert_eq!(raw.body(), ["a", "b"]);
}
