//! # replaykit-diff
//!
//! Diff rendering for replaykit failure reports.
//!
//! This crate provides:
//! - Line alignment of expected and actual text (delegated to `similar`)
//! - A three-column Want / delta / Got table
//! - Plain, colorized and non-printable-visible rendering styles
//!
//! ## Architecture
//!
//! This is Layer 1 in the architecture - it depends on replaykit-core and is
//! used by every comparison primitive to explain a mismatch.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod renderer;
pub mod table;
pub mod visible;

// Re-export commonly used types
pub use renderer::{diff_lines, Delta, DiffRenderer, DiffRow, DiffStats};
pub use table::DiffTable;
pub use visible::make_visible;
