//! # replaykit
//!
//! Snapshot-and-replay verification for Rust tests: record now, replay
//! forever, diff on mismatch.
//!
//! This crate ties together:
//! - replaykit-core: errors, configuration, the test failure sink
//! - replaykit-diff: Want / delta / Got diff tables
//! - replaykit-assert: the equality engine and golden files
//! - replaykit-http: the record/replay mock HTTP transport
//! - replaykit-capture: stdout capture, filesystem test fields, test logging
//!
//! ## Example
//!
//! ```no_run
//! use replaykit::prelude::*;
//!
//! #[test]
//! fn listing() {
//!     let t = TestContext::current();
//!     let verify = Verifier::from_env(&t);
//!
//!     let got = vec!["b.txt", "a.txt"];
//!     verify.equal_without_order(&got, &["a.txt", "b.txt"], "listing");
//!
//!     GoldenStore::from_env().match_golden(&t, &got.join("\n"), "");
//!     t.finish();
//! }
//! ```
//!
//! Golden files live in `REPLAYKIT_GOLDEN_DIR` (default `./testdata`) and are
//! rewritten when `REPLAYKIT_UPDATE_GOLDEN=1`; HTTP fixtures likewise follow
//! `REPLAYKIT_MOCK_HTTP_DIR` and `REPLAYKIT_UPDATE_MOCK_HTTP`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub use replaykit_assert::{
    sanitize_name, Comparison, EqualityMode, Failure, Fault, GoldenError, GoldenStore, Outcome,
    Verifier, GOLDEN_SUFFIX,
};
pub use replaykit_capture::{
    init_logging, io_reader, with_test_logger, with_test_logger_filtered, StdoutAssertions,
    StdoutCapture, StdoutGolden, TestField,
};
pub use replaykit_core::{
    atomic_write, message, DiffSettings, DiffStyle, Error, GoldenSettings, Message,
    MockHttpSettings, Result, TestContext, TestReporter, VerifyConfig,
};
pub use replaykit_diff::{diff_lines, make_visible, Delta, DiffRenderer, DiffStats, DiffTable};
pub use replaykit_http::{
    Client, KeyPolicy, MethodUrlKey, MockSession, MockTransport, RequestDigestKey, Transport,
    TransportSlot, UrlKey,
};

/// Everything a test usually needs.
pub mod prelude {
    pub use crate::{
        Client, EqualityMode, GoldenStore, Message, MockTransport, Outcome, StdoutAssertions,
        StdoutCapture, StdoutGolden, TestContext, TestField, TestReporter, Verifier,
    };
}
