//! Assertions that report through a [`TestReporter`].
//!
//! Every assertion is soft: a mismatch is reported with `error` and the test
//! keeps running, so several assertions can each report independently. Each
//! assertion also returns whether it passed, for callers that want to stop
//! early.

use std::fmt::Debug;
use std::panic::UnwindSafe;

use serde::Serialize;
use tracing::debug;

use replaykit_core::{DiffSettings, Message, TestReporter, VerifyConfig};
use replaykit_diff::DiffRenderer;

use crate::compare::{Comparison, EqualityMode};
use crate::outcome::Outcome;

/// Runs comparisons and reports mismatches to the running test.
///
/// # Example
///
/// ```
/// use replaykit_assert::Verifier;
/// use replaykit_core::{DiffSettings, TestContext};
///
/// let t = TestContext::new("doc::listing");
/// let verify = Verifier::new(&t, &DiffSettings::default());
///
/// verify.equal_without_order(&["b.txt", "a.txt"], &["a.txt", "b.txt"], "listing");
/// verify.equal_lines("one\ntwo\n", "one\ntwo\n", "");
/// t.finish();
/// ```
pub struct Verifier<'a> {
    reporter: &'a dyn TestReporter,
    renderer: DiffRenderer,
}

impl<'a> Verifier<'a> {
    /// Create a verifier rendering diffs per `diff`.
    pub fn new(reporter: &'a dyn TestReporter, diff: &DiffSettings) -> Self {
        Self {
            reporter,
            renderer: DiffRenderer::from_settings(diff),
        }
    }

    /// Create a verifier using the process-wide diff settings.
    pub fn from_env(reporter: &'a dyn TestReporter) -> Self {
        Self::new(reporter, &VerifyConfig::global().diff)
    }

    /// Reporter this verifier reports to.
    pub fn reporter(&self) -> &'a dyn TestReporter {
        self.reporter
    }

    /// Diff renderer used for failure reports.
    pub fn renderer(&self) -> &DiffRenderer {
        &self.renderer
    }

    /// Report a mismatch, if any. Returns whether the comparison passed.
    pub fn verify(&self, comparison: Comparison, message: impl Into<Message>) -> bool {
        let mode = comparison.mode();
        match comparison.check(&self.renderer, Some(message.into())) {
            Ok(()) => true,
            Err(failure) => {
                debug!(test = %self.reporter.name(), ?mode, "Comparison failed");
                self.reporter.error(&failure.report());
                false
            }
        }
    }

    /// Deep structural equality.
    pub fn equal<T>(&self, got: &T, want: &T, message: impl Into<Message>) -> bool
    where
        T: PartialEq + Debug + ?Sized,
    {
        self.verify(Comparison::structural(got, want), message)
    }

    /// Exact string equality.
    pub fn equal_string(&self, got: &str, want: &str, message: impl Into<Message>) -> bool {
        self.verify(Comparison::exact(got, want), message)
    }

    /// String equality with a line-by-line diff on mismatch.
    pub fn equal_lines(&self, got: &str, want: &str, message: impl Into<Message>) -> bool {
        self.verify(Comparison::lines(got, want), message)
    }

    /// Equality of two string sequences whatever their order.
    pub fn equal_without_order<G, W>(&self, got: &[G], want: &[W], message: impl Into<Message>) -> bool
    where
        G: AsRef<str>,
        W: AsRef<str>,
    {
        self.verify(Comparison::unordered(got, want), message)
    }

    /// Equality of the JSON encodings of two values.
    ///
    /// A weak comparison, useful for data built from dynamically typed
    /// parts that differ in type but not in content.
    pub fn equal_as_json<G, W>(&self, got: &G, want: &W, message: impl Into<Message>) -> bool
    where
        G: Serialize + Debug + ?Sized,
        W: Serialize + Debug + ?Sized,
    {
        self.verify(Comparison::json(got, want), message)
    }

    /// Equality of two textual values under a caller-chosen mode.
    pub fn assert_equal(
        &self,
        mode: EqualityMode,
        got: &str,
        want: &str,
        message: impl Into<Message>,
    ) -> bool {
        self.verify(Comparison::text(mode, got, want), message)
    }

    /// Verify that an outcome faulted.
    pub fn faulted<T>(&self, outcome: &Outcome<T>, message: impl Into<Message>) -> bool {
        if outcome.is_faulted() {
            return true;
        }

        let message = message.into();
        let mut report = String::new();
        if !message.is_empty() {
            report.push_str(&message.render());
            report.push('\n');
        }
        report.push_str("func did not panic as expected");
        self.reporter.error(&report);
        false
    }

    /// Run `f` and verify that it panics.
    pub fn panics<T, F>(&self, f: F, message: impl Into<Message>) -> bool
    where
        F: FnOnce() -> T + UnwindSafe,
    {
        self.faulted(&Outcome::catch(f), message)
    }
}
