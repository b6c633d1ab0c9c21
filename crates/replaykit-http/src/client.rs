//! Injected HTTP client.
//!
//! Code under test takes a [`Client`] instead of reaching for a process-wide
//! default. Each client owns a [`TransportSlot`]; a mock transport binds to
//! that slot for the duration of a test and restores it afterwards.

use std::sync::{Arc, RwLock};

use http::{Method, Request, Response};
use tracing::debug;

use replaykit_core::{Error, Result};

use crate::transport::{ReqwestTransport, Transport};

/// Whether two shared transports are the same object.
pub fn same_transport(a: &Arc<dyn Transport>, b: &Arc<dyn Transport>) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}

/// Swappable binding of the transport a client sends through.
///
/// Clones share the binding.
#[derive(Clone)]
pub struct TransportSlot {
    current: Arc<RwLock<Arc<dyn Transport>>>,
}

impl TransportSlot {
    /// Create a slot bound to `transport`.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            current: Arc::new(RwLock::new(transport)),
        }
    }

    /// Transport currently bound.
    pub fn current(&self) -> Arc<dyn Transport> {
        match self.current.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Bind `transport` and return the transport it replaces.
    pub fn replace(&self, transport: Arc<dyn Transport>) -> Arc<dyn Transport> {
        let mut guard = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        std::mem::replace(&mut *guard, transport)
    }

    /// Whether `transport` is the one currently bound.
    pub fn is_bound_to(&self, transport: &Arc<dyn Transport>) -> bool {
        same_transport(&self.current(), transport)
    }
}

impl std::fmt::Debug for TransportSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportSlot").finish_non_exhaustive()
    }
}

/// Blocking HTTP client sending through a [`TransportSlot`].
#[derive(Debug, Clone)]
pub struct Client {
    slot: TransportSlot,
}

impl Client {
    /// Create a client sending through `transport`.
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self {
            slot: TransportSlot::new(Arc::new(transport)),
        }
    }

    /// Create a client sending live requests with `reqwest`.
    pub fn live() -> Result<Self> {
        Ok(Self::new(ReqwestTransport::new()?))
    }

    /// The client's transport binding.
    pub fn slot(&self) -> &TransportSlot {
        &self.slot
    }

    /// Send a request through the currently bound transport.
    pub fn execute(&self, request: &Request<Vec<u8>>) -> Result<Response<Vec<u8>>> {
        debug!(method = %request.method(), uri = %request.uri(), "Executing request");
        self.slot.current().round_trip(request)
    }

    /// Send a `GET` request to `url`.
    pub fn get(&self, url: &str) -> Result<Response<Vec<u8>>> {
        self.execute(&build_request(Method::GET, url, Vec::new())?)
    }

    /// Send a `POST` request to `url` with `body`.
    pub fn post(&self, url: &str, body: impl Into<Vec<u8>>) -> Result<Response<Vec<u8>>> {
        self.execute(&build_request(Method::POST, url, body.into())?)
    }
}

fn build_request(method: Method, url: &str, body: Vec<u8>) -> Result<Request<Vec<u8>>> {
    Request::builder()
        .method(method)
        .uri(url)
        .body(body)
        .map_err(|e| Error::InvalidRequest(format!("{}: {}", url, e)))
}
