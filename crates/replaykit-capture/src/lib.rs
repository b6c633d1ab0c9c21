//! # replaykit-capture
//!
//! Capture utilities feeding replaykit comparisons.
//!
//! This crate provides:
//! - Standard output capture ([`StdoutCapture`]) with stdout assertions
//! - Temporary filesystem test fields ([`TestField`])
//! - Test logging: a harness-aware global subscriber and per-test routing of
//!   log events to a [`TestReporter`](replaykit_core::TestReporter)
//!
//! ## Architecture
//!
//! This is Layer 3 in the architecture - it depends on replaykit-core and
//! replaykit-assert, and hands captured text and trees to their comparisons.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod field;
pub mod logging;
pub mod stdout;

// Re-export commonly used types
pub use field::{io_reader, TestField};
pub use logging::{init as init_logging, with_test_logger, with_test_logger_filtered};
pub use stdout::{StdoutAssertions, StdoutCapture, StdoutGolden};
