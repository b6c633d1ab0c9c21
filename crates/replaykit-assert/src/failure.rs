//! Failure records produced by unequal comparisons.

use std::fmt;

use replaykit_core::Message;
use replaykit_diff::DiffStats;

use crate::compare::EqualityMode;

/// Everything known about a failed comparison.
///
/// Only ever built for an unequal pair.
#[derive(Debug, Clone)]
pub struct Failure {
    /// Equality mode the comparison ran under
    pub mode: EqualityMode,
    /// Normalized actual value
    pub got: String,
    /// Normalized expected value
    pub want: String,
    /// Rendered Want / delta / Got table, when diffs are enabled
    pub diff: Option<String>,
    /// Line-level statistics of the mismatch
    pub stats: DiffStats,
    /// Caller-supplied context
    pub message: Option<Message>,
}

impl Failure {
    /// Full report as handed to the test failure sink.
    pub fn report(&self) -> String {
        let mut out = String::new();

        if let Some(message) = &self.message {
            out.push_str(&message.render());
            out.push('\n');
        }

        match &self.diff {
            Some(diff) => {
                out.push_str(&self.stats.summary());
                out.push('\n');
                out.push_str(diff);
            }
            None => {
                out.push_str(&format!("Want:\n{}\n\nGot :\n{}", self.want, self.got));
            }
        }

        out
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.report())
    }
}

impl std::error::Error for Failure {}
