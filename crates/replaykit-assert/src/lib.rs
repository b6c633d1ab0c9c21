//! # replaykit-assert
//!
//! Comparison primitives for replaykit.
//!
//! This crate provides:
//! - The equality engine ([`Comparison`], [`EqualityMode`])
//! - Failure records with rendered diffs ([`Failure`])
//! - Soft assertions reporting to the running test ([`Verifier`])
//! - Fault capture for code expected to panic ([`Outcome`])
//! - The golden file store ([`GoldenStore`])
//!
//! ## Architecture
//!
//! This is Layer 2 in the architecture - it depends on replaykit-core and
//! replaykit-diff, and is used by replaykit-capture and the replaykit facade.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod compare;
pub mod failure;
pub mod golden;
pub mod outcome;
pub mod verifier;

// Re-export commonly used types
pub use compare::{Comparison, EqualityMode};
pub use failure::Failure;
pub use golden::{sanitize_name, GoldenError, GoldenStore, GOLDEN_SUFFIX};
pub use outcome::{Fault, Outcome};
pub use verifier::Verifier;
