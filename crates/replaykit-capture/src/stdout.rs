//! Standard output capture.
//!
//! [`StdoutCapture::start`] points file descriptor 1 at a pipe drained by a
//! background thread; [`StdoutCapture::finish`] restores the original
//! descriptor, waits for the reader to hit end of file and returns
//! everything written in between. `finish` consumes the capture, so the
//! buffer is handed out exactly once.
//!
//! Only writes reaching the descriptor are seen: `std::io::stdout()`,
//! child processes and C code. Under the libtest harness `print!` output is
//! intercepted before it gets there unless tests run with `--nocapture`.

use std::io::Write;
#[cfg(unix)]
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};
use std::thread::JoinHandle;

use tracing::debug;

use replaykit_assert::{GoldenStore, Verifier};
use replaykit_core::{Error, Message, Result, TestReporter};

type Reader = JoinHandle<std::io::Result<Vec<u8>>>;

/// An active capture of the process standard output.
pub struct StdoutCapture {
    #[cfg(unix)]
    saved: Option<OwnedFd>,
    reader: Option<Reader>,
}

impl StdoutCapture {
    /// Start capturing standard output.
    #[cfg(unix)]
    pub fn start() -> Result<Self> {
        use std::fs::File;

        std::io::stdout().flush()?;

        let mut fds = [0; 2];
        // SAFETY: `fds` has room for the two descriptors `pipe` writes.
        if unsafe { libc::pipe(fds.as_mut_ptr()) } != 0 {
            return Err(capture_error("cannot create pipe"));
        }
        // SAFETY: both descriptors were just returned by `pipe` and are owned
        // by nothing else.
        let (read_end, write_end) =
            unsafe { (File::from_raw_fd(fds[0]), OwnedFd::from_raw_fd(fds[1])) };

        // SAFETY: duplicating the process stdout has no memory effects.
        let saved = unsafe { libc::dup(libc::STDOUT_FILENO) };
        if saved < 0 {
            return Err(capture_error("cannot save stdout"));
        }
        // SAFETY: `saved` is a fresh descriptor owned by nothing else.
        let saved = unsafe { OwnedFd::from_raw_fd(saved) };

        // SAFETY: both descriptors are open; stdout is atomically replaced.
        if unsafe { libc::dup2(write_end.as_raw_fd(), libc::STDOUT_FILENO) } < 0 {
            return Err(capture_error("cannot redirect stdout"));
        }
        // Descriptor 1 is now the only write end left open.
        drop(write_end);

        let reader = std::thread::Builder::new()
            .name("stdout-capture".to_string())
            .spawn(move || {
                let mut read_end = read_end;
                let mut buf = Vec::new();
                std::io::Read::read_to_end(&mut read_end, &mut buf)?;
                Ok(buf)
            });
        let reader = match reader {
            Ok(reader) => reader,
            Err(e) => {
                restore(&saved);
                return Err(Error::Capture(format!("cannot spawn reader: {}", e)));
            }
        };

        debug!("Stdout capture started");
        Ok(Self {
            saved: Some(saved),
            reader: Some(reader),
        })
    }

    /// Start capturing standard output.
    #[cfg(not(unix))]
    pub fn start() -> Result<Self> {
        Err(Error::Capture(
            "stdout capture is not supported on this platform".to_string(),
        ))
    }

    /// Stop capturing and return everything written to standard output.
    ///
    /// Invalid UTF-8 is replaced.
    pub fn finish(mut self) -> Result<String> {
        let bytes = self.stop()?;
        debug!(bytes = bytes.len(), "Stdout capture finished");
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    #[cfg(unix)]
    fn release(&mut self) {
        if let Some(saved) = self.saved.take() {
            restore(&saved);
        }
    }

    #[cfg(not(unix))]
    fn release(&mut self) {}

    fn stop(&mut self) -> Result<Vec<u8>> {
        let _ = std::io::stdout().flush();
        self.release();

        match self.reader.take() {
            Some(reader) => match reader.join() {
                Ok(Ok(bytes)) => Ok(bytes),
                Ok(Err(e)) => Err(Error::Capture(format!("cannot read captured stdout: {}", e))),
                Err(_) => Err(Error::Capture("stdout reader panicked".to_string())),
            },
            None => Ok(Vec::new()),
        }
    }
}

impl Drop for StdoutCapture {
    fn drop(&mut self) {
        if self.reader.is_some() {
            let _ = self.stop();
        }
    }
}

#[cfg(unix)]
fn restore(saved: &OwnedFd) {
    // SAFETY: `saved` is an open descriptor; replacing stdout closes the
    // pipe write end, which lets the reader see end of file.
    unsafe {
        libc::dup2(saved.as_raw_fd(), libc::STDOUT_FILENO);
    }
}

#[cfg(unix)]
fn capture_error(context: &str) -> Error {
    Error::Capture(format!("{}: {}", context, std::io::Error::last_os_error()))
}

fn finish_or_fatal(reporter: &dyn TestReporter, capture: StdoutCapture) -> String {
    match capture.finish() {
        Ok(out) => out,
        Err(e) => reporter.fatal(&format!("cannot capture stdout: {}", e)),
    }
}

/// Assertions on captured standard output.
pub trait StdoutAssertions {
    /// Finish `capture` and compare its output with `want` line by line.
    fn equal_stdout(&self, capture: StdoutCapture, want: &str, message: impl Into<Message>) -> bool;
}

impl StdoutAssertions for Verifier<'_> {
    fn equal_stdout(&self, capture: StdoutCapture, want: &str, message: impl Into<Message>) -> bool {
        let got = finish_or_fatal(self.reporter(), capture);
        self.equal_lines(&got, want, message)
    }
}

/// Golden comparison of captured standard output.
pub trait StdoutGolden {
    /// Finish `capture` and match its output against the golden file of the
    /// running test.
    fn match_stdout(
        &self,
        reporter: &dyn TestReporter,
        capture: StdoutCapture,
        message: impl Into<Message>,
    ) -> bool;
}

impl StdoutGolden for GoldenStore {
    fn match_stdout(
        &self,
        reporter: &dyn TestReporter,
        capture: StdoutCapture,
        message: impl Into<Message>,
    ) -> bool {
        let got = finish_or_fatal(reporter, capture);
        self.match_golden(reporter, &got, message)
    }
}
