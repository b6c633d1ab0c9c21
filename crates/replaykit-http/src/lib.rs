//! # replaykit-http
//!
//! Record/replay HTTP mocking for replaykit.
//!
//! This crate provides:
//! - The [`Transport`] seam and a live `reqwest` implementation
//! - An injected [`Client`] whose [`TransportSlot`] mocks bind to
//! - Fixture key policies ([`UrlKey`], [`MethodUrlKey`], [`RequestDigestKey`])
//! - An HTTP/1.x response dump codec
//! - The [`MockTransport`] itself, with a scoped [`MockSession`] guard
//!
//! ## Architecture
//!
//! This is Layer 1 in the architecture - it depends only on replaykit-core.
//!
//! ## Example
//!
//! ```no_run
//! use replaykit_core::MockHttpSettings;
//! use replaykit_http::{Client, MockTransport};
//!
//! # fn main() -> replaykit_core::Result<()> {
//! let client = Client::live()?;
//! let _session = MockTransport::new(MockHttpSettings::replay("testdata"))
//!     .session(client.slot())?;
//!
//! // Served from testdata/example.com/users/page=2.http
//! let response = client.get("https://example.com/users?page=2")?;
//! assert!(response.status().is_success());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod dump;
pub mod key;
pub mod mock;
pub mod transport;

// Re-export commonly used types
pub use client::{same_transport, Client, TransportSlot};
pub use dump::{dump_response, parse_response};
pub use key::{KeyPolicy, MethodUrlKey, RequestDigestKey, UrlKey, FIXTURE_SUFFIX};
pub use mock::{MockSession, MockTransport};
pub use transport::{ReqwestTransport, Transport};
