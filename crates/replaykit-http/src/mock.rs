//! Record/replay mock transport.
//!
//! In replay mode a [`MockTransport`] answers every request from the fixture
//! its [`KeyPolicy`] maps the request to. In record mode it first performs
//! the real request through its upstream, dumps the response to that fixture,
//! then replays from disk like in replay mode, so both modes serve exactly
//! the same bytes.
//!
//! A mock is bound to a client with [`MockTransport::start`] and unbound with
//! [`MockTransport::stop`]. [`MockTransport::session`] pairs the two with a
//! guard that stops the mock when dropped, including during a panic.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use http::{Request, Response};
use tracing::{debug, info, warn};

use replaykit_core::{atomic_write, Error, MockHttpSettings, Result, VerifyConfig};

use crate::client::TransportSlot;
use crate::dump::{dump_response, parse_response};
use crate::key::{KeyPolicy, UrlKey};
use crate::transport::Transport;

struct Binding {
    slot: TransportSlot,
    original: Arc<dyn Transport>,
}

struct Inner {
    settings: MockHttpSettings,
    key: Box<dyn KeyPolicy>,
    upstream: RwLock<Option<Arc<dyn Transport>>>,
    binding: Mutex<Option<Binding>>,
}

/// Transport serving recorded HTTP responses from disk.
///
/// Clones share state; the clone installed in a slot is the mock itself.
#[derive(Clone)]
pub struct MockTransport {
    inner: Arc<Inner>,
}

impl MockTransport {
    /// Create an idle mock using the default [`UrlKey`] policy.
    pub fn new(settings: MockHttpSettings) -> Self {
        Self::with_key(settings, UrlKey)
    }

    /// Create an idle mock using `key` to locate fixtures.
    pub fn with_key(settings: MockHttpSettings, key: impl KeyPolicy + 'static) -> Self {
        Self {
            inner: Arc::new(Inner {
                settings,
                key: Box::new(key),
                upstream: RwLock::new(None),
                binding: Mutex::new(None),
            }),
        }
    }

    /// Create an idle mock from the process-wide configuration.
    pub fn from_env() -> Self {
        Self::new(VerifyConfig::global().mock_http.clone())
    }

    /// Create a mock and start it on `slot`.
    pub fn start_new(settings: MockHttpSettings, slot: &TransportSlot) -> Result<Self> {
        let mock = Self::new(settings);
        mock.start(slot)?;
        Ok(mock)
    }

    /// Record through `upstream` rather than the transport saved by
    /// [`start`](Self::start).
    ///
    /// The upstream is shared by every clone of the mock, including one
    /// already installed in a slot.
    pub fn with_upstream(self, upstream: Arc<dyn Transport>) -> Self {
        {
            let mut current = match self.inner.upstream.write() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            *current = Some(upstream);
        }
        self
    }

    /// Mock settings.
    pub fn settings(&self) -> &MockHttpSettings {
        &self.inner.settings
    }

    /// Whether the mock is currently bound to a slot.
    pub fn is_started(&self) -> bool {
        self.binding().is_some()
    }

    /// Transport saved when the mock was started.
    pub fn saved_original(&self) -> Option<Arc<dyn Transport>> {
        self.binding().as_ref().map(|b| Arc::clone(&b.original))
    }

    /// Fixture path of `request`.
    pub fn fixture_path(&self, request: &Request<Vec<u8>>) -> Result<PathBuf> {
        self.inner.key.fixture_path(&self.inner.settings.dir, request)
    }

    /// Bind the mock to `slot`, saving the transport it replaces.
    ///
    /// Starting a second mock on a slot that already holds a started mock
    /// saves that mock as the original; stop mocks in reverse start order.
    pub fn start(&self, slot: &TransportSlot) -> Result<()> {
        let mut binding = self.binding();
        if binding.is_some() {
            return Err(Error::SessionAlreadyStarted);
        }

        let original = slot.replace(Arc::new(self.clone()));
        *binding = Some(Binding {
            slot: slot.clone(),
            original,
        });
        info!(
            dir = %self.inner.settings.dir.display(),
            update = self.inner.settings.update,
            "Mock HTTP transport started"
        );
        Ok(())
    }

    /// Restore the transport saved by [`start`](Self::start).
    pub fn stop(&self) -> Result<()> {
        let binding = self.binding().take().ok_or(Error::SessionNotStarted)?;
        binding.slot.replace(binding.original);
        info!("Mock HTTP transport stopped");
        Ok(())
    }

    /// Start the mock on `slot` for the lifetime of the returned guard.
    pub fn session(&self, slot: &TransportSlot) -> Result<MockSession> {
        self.start(slot)?;
        Ok(MockSession { mock: self.clone() })
    }

    fn binding(&self) -> MutexGuard<'_, Option<Binding>> {
        match self.inner.binding.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn upstream(&self) -> Result<Arc<dyn Transport>> {
        let explicit = match self.inner.upstream.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        if let Some(upstream) = explicit {
            return Ok(upstream);
        }
        self.saved_original().ok_or_else(|| {
            Error::Transport("no upstream transport to record from: mock is not started".to_string())
        })
    }

    fn record(&self, request: &Request<Vec<u8>>, path: &Path) -> Result<()> {
        // No lock is held while calling out; the upstream may be another mock.
        let upstream = self.upstream()?;
        let response = upstream.round_trip(request).map_err(|e| {
            Error::Transport(format!(
                "cannot update mock http response file {}: {}",
                path.display(),
                e
            ))
        })?;

        atomic_write(path, &dump_response(&response))?;
        info!(
            uri = %request.uri(),
            status = response.status().as_u16(),
            "Recorded HTTP fixture {}",
            path.display()
        );
        Ok(())
    }

    fn replay(&self, path: &Path) -> Result<Response<Vec<u8>>> {
        let data = std::fs::read(path).map_err(|e| Error::read(path, e))?;
        let response = parse_response(path, &data)?;
        debug!("Replayed HTTP fixture {}", path.display());
        Ok(response)
    }
}

impl Transport for MockTransport {
    fn round_trip(&self, request: &Request<Vec<u8>>) -> Result<Response<Vec<u8>>> {
        let path = self.fixture_path(request)?;

        if self.inner.settings.update {
            self.record(request, &path)?;
        }

        self.replay(&path).map_err(|e| {
            warn!(uri = %request.uri(), error = %e, "Cannot mock HTTP response");
            e
        })
    }
}

impl std::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTransport")
            .field("settings", &self.inner.settings)
            .field("key", &self.inner.key)
            .field("started", &self.is_started())
            .finish()
    }
}

/// Guard returned by [`MockTransport::session`]; stops the mock on drop.
#[derive(Debug)]
pub struct MockSession {
    mock: MockTransport,
}

impl MockSession {
    /// The running mock.
    pub fn mock(&self) -> &MockTransport {
        &self.mock
    }
}

impl Drop for MockSession {
    fn drop(&mut self) {
        if let Err(e) = self.mock.stop() {
            warn!("Mock HTTP session already stopped: {}", e);
        }
    }
}
