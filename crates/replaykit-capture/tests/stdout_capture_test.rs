//! Standard output capture.
//!
//! The test harness itself writes to stdout, so this file holds a single
//! test: nothing else in the binary runs while the descriptor is redirected.

#![cfg(unix)]

use std::io::Write;

use tempfile::TempDir;

use replaykit_assert::{GoldenStore, Verifier};
use replaykit_capture::{StdoutAssertions, StdoutCapture, StdoutGolden};
use replaykit_core::{DiffSettings, GoldenSettings, TestContext};

fn emit(text: &str) {
    let mut out = std::io::stdout();
    out.write_all(text.as_bytes()).unwrap();
    out.flush().unwrap();
}

#[test]
fn test_stdout_capture() {
    // Plain capture, including output larger than a pipe buffer.
    let capture = StdoutCapture::start().unwrap();
    emit("hello\n");
    emit("world");
    let big = "x".repeat(256 * 1024);
    emit(&big);
    let captured = capture.finish().unwrap();
    assert_eq!(captured.len(), "hello\nworld".len() + big.len());
    assert!(captured.starts_with("hello\nworld"));

    // A new capture starts empty.
    let capture = StdoutCapture::start().unwrap();
    emit("inside\n");
    assert_eq!(capture.finish().unwrap(), "inside\n");

    // Dropping an unfinished capture restores stdout.
    drop(StdoutCapture::start().unwrap());

    // Verifier helper.
    let t = TestContext::new("stdout::verify");
    let verify = Verifier::new(&t, &DiffSettings::default());
    let capture = StdoutCapture::start().unwrap();
    emit("line 1\nline 2\n");
    assert!(verify.equal_stdout(capture, "line 1\nline 2\n", ""));

    let capture = StdoutCapture::start().unwrap();
    emit("unexpected\n");
    assert!(!verify.equal_stdout(capture, "expected\n", "stdout"));
    let failures = t.take_failures();
    assert_eq!(failures.len(), 1);
    assert!(failures[0].starts_with("stdout\n"));

    // Golden helper: record, then replay.
    let dir = TempDir::new().unwrap();
    let t = TestContext::new("stdout::golden");

    let recorder = GoldenStore::new(GoldenSettings::update(dir.path()), &DiffSettings::default());
    let capture = StdoutCapture::start().unwrap();
    emit("report v1\n");
    assert!(recorder.match_stdout(&t, capture, ""));
    assert_eq!(
        std::fs::read_to_string(dir.path().join("stdout__golden.golden")).unwrap(),
        "report v1\n"
    );

    let player = GoldenStore::new(GoldenSettings::replay(dir.path()), &DiffSettings::default());
    let capture = StdoutCapture::start().unwrap();
    emit("report v1\n");
    assert!(player.match_stdout(&t, capture, ""));
    t.finish();
}
