//! Logging setup for tests.
//!
//! [`init`] installs a process-wide subscriber writing through the test
//! harness. [`with_test_logger`] routes the events emitted by one closure to
//! a [`TestReporter`] instead, so they appear among that test's logs.

use std::io;
use std::sync::{Arc, Mutex};

use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

use replaykit_core::TestReporter;

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global test subscriber.
///
/// Returns `false` if a global subscriber was already installed.
pub fn init() -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_test_writer()
        .try_init()
        .is_ok()
}

/// Run `f` with its log events forwarded to `reporter`, filtered by
/// `RUST_LOG` (default `info`).
pub fn with_test_logger<R>(reporter: &dyn TestReporter, f: impl FnOnce() -> R) -> R {
    with_test_logger_filtered(reporter, env_filter(), f)
}

/// Run `f` with its log events forwarded to `reporter`, filtered by
/// `filter`.
///
/// Events are forwarded one line at a time once `f` returns or unwinds.
pub fn with_test_logger_filtered<R>(
    reporter: &dyn TestReporter,
    filter: impl Into<EnvFilter>,
    f: impl FnOnce() -> R,
) -> R {
    let buffer = LineBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(buffer.clone())
        .with_ansi(false)
        .without_time()
        .finish();

    let _forward = Forward { reporter, buffer };
    tracing::subscriber::with_default(subscriber, f)
}

#[derive(Clone, Default)]
struct LineBuffer(Arc<Mutex<Vec<u8>>>);

impl LineBuffer {
    fn take(&self) -> Vec<u8> {
        match self.0.lock() {
            Ok(mut buf) => std::mem::take(&mut *buf),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl io::Write for LineBuffer {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        match self.0.lock() {
            Ok(mut buf) => buf.extend_from_slice(data),
            Err(poisoned) => poisoned.into_inner().extend_from_slice(data),
        }
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LineBuffer {
    type Writer = LineBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

struct Forward<'r> {
    reporter: &'r dyn TestReporter,
    buffer: LineBuffer,
}

impl Drop for Forward<'_> {
    fn drop(&mut self) {
        let logs = self.buffer.take();
        for line in String::from_utf8_lossy(&logs).lines() {
            self.reporter.log(line);
        }
    }
}
