//! # replaykit-core
//!
//! Core types for replaykit.
//!
//! This crate contains all fundamental types with **no internal dependencies**
//! on other replaykit crates. It provides:
//!
//! - Error types
//! - Atomic fixture writes
//! - Configuration (update switches, fixture roots, diff rendering)
//! - The test failure sink and test identity ([`TestReporter`], [`TestContext`])
//! - Caller-supplied failure messages ([`Message`])
//!
//! ## Architecture
//!
//! This is Layer 0 in the architecture - all other crates depend on this one,
//! but this crate has no dependencies on other replaykit crates.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod atomic;
pub mod config;
pub mod error;
pub mod message;
pub mod reporter;

// Re-export commonly used types
pub use atomic::atomic_write;
pub use config::{DiffSettings, DiffStyle, GoldenSettings, MockHttpSettings, VerifyConfig};
pub use error::{Error, Result};
pub use message::Message;
pub use reporter::{TestContext, TestReporter};
