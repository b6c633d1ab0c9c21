//! Test failure sink and test identity.

use std::sync::Mutex;

use tracing::{debug, error};

/// Sink through which assertions report to the running test.
///
/// `error` marks the test failed and lets it continue, so several
/// assertions can report independently. `fatal` stops the test on the spot.
pub trait TestReporter: Send + Sync {
    /// Qualified name of the running test.
    fn name(&self) -> String;

    /// Attach a log line to the test output.
    fn log(&self, line: &str);

    /// Mark the test failed and keep running.
    fn error(&self, report: &str);

    /// Mark the test failed and abort it.
    fn fatal(&self, report: &str) -> !;
}

/// Stock [`TestReporter`] for `#[test]` functions.
///
/// Soft failures accumulate; they are raised together when the context is
/// [finished](TestContext::finish) or dropped. Fatal failures panic
/// immediately.
///
/// # Example
///
/// ```should_panic
/// use replaykit_core::{TestContext, TestReporter};
///
/// let t = TestContext::new("listing");
/// t.error("first mismatch");
/// t.error("second mismatch");
/// t.finish(); // panics, quoting both mismatches
/// ```
#[derive(Debug)]
pub struct TestContext {
    name: String,
    failures: Mutex<Vec<String>>,
    logs: Mutex<Vec<String>>,
}

impl TestContext {
    /// Create a context for the named test.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            failures: Mutex::new(Vec::new()),
            logs: Mutex::new(Vec::new()),
        }
    }

    /// Create a context named after the running test.
    ///
    /// The test harness runs each test on a thread named after it, so the
    /// thread name is the qualified test name (e.g. `golden::tests::listing`).
    pub fn current() -> Self {
        let name = std::thread::current()
            .name()
            .unwrap_or("unnamed")
            .to_string();
        Self::new(name)
    }

    /// Whether any failure has been reported.
    pub fn failed(&self) -> bool {
        !lock(&self.failures).is_empty()
    }

    /// Reports recorded so far.
    pub fn failures(&self) -> Vec<String> {
        lock(&self.failures).clone()
    }

    /// Drain recorded reports, leaving the context clean.
    pub fn take_failures(&self) -> Vec<String> {
        std::mem::take(&mut *lock(&self.failures))
    }

    /// Log lines recorded so far.
    pub fn logs(&self) -> Vec<String> {
        lock(&self.logs).clone()
    }

    /// End the test, panicking if any failure was reported.
    pub fn finish(self) {
        let failures = self.take_failures();
        if !failures.is_empty() {
            panic!("{}", summary(&self.name, &failures));
        }
    }
}

impl TestReporter for TestContext {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn log(&self, line: &str) {
        let line = line.trim_end_matches('\n');
        println!("{}: {}", self.name, line);
        lock(&self.logs).push(line.to_string());
    }

    fn error(&self, report: &str) {
        error!(test = %self.name, "{}", report);
        lock(&self.failures).push(report.to_string());
    }

    fn fatal(&self, report: &str) -> ! {
        error!(test = %self.name, fatal = true, "{}", report);
        let mut failures = self.take_failures();
        failures.push(report.to_string());
        panic!("{}", summary(&self.name, &failures));
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        if std::thread::panicking() {
            return;
        }
        let failures = self.take_failures();
        if !failures.is_empty() {
            debug!(test = %self.name, count = failures.len(), "Raising soft failures");
            panic!("{}", summary(&self.name, &failures));
        }
    }
}

fn summary(name: &str, failures: &[String]) -> String {
    let mut out = format!("{} failed ({} failure(s)):", name, failures.len());
    for failure in failures {
        out.push_str("\n\n");
        out.push_str(failure);
    }
    out
}

// A poisoned lock only means another assertion panicked mid-report; the
// recorded reports are still meaningful.
fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
