//! Tagged outcome of running code that is expected to fault.

use std::any::Any;
use std::fmt;
use std::panic::{self, UnwindSafe};

/// Details of a fault raised by the code under test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    /// Human-readable description of the fault
    pub message: String,
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Whether a piece of code ran to completion or faulted.
///
/// Assertions on faults inspect this tag only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// The code returned normally
    Completed(T),
    /// The code raised an unrecoverable fault
    Faulted(Fault),
}

impl<T> Outcome<T> {
    /// Run `f`, turning a panic into [`Outcome::Faulted`].
    pub fn catch<F>(f: F) -> Self
    where
        F: FnOnce() -> T + UnwindSafe,
    {
        match panic::catch_unwind(f) {
            Ok(value) => Outcome::Completed(value),
            Err(payload) => Outcome::Faulted(Fault {
                message: panic_message(&*payload),
            }),
        }
    }

    /// Map an error-returning computation onto an outcome.
    pub fn from_result<E: fmt::Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Outcome::Completed(value),
            Err(e) => Outcome::Faulted(Fault {
                message: e.to_string(),
            }),
        }
    }

    /// Whether the code faulted.
    pub fn is_faulted(&self) -> bool {
        matches!(self, Outcome::Faulted(_))
    }

    /// The fault, if any.
    pub fn fault(&self) -> Option<&Fault> {
        match self {
            Outcome::Faulted(fault) => Some(fault),
            Outcome::Completed(_) => None,
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
