//! The transport seam.
//!
//! A [`Transport`] turns one request into one response. Requests and
//! responses are fully buffered `http` values so they can be dumped to disk
//! and compared.

use std::sync::Arc;

use http::{Request, Response};
use tracing::debug;

use replaykit_core::{Error, Result};

/// Performs single HTTP round trips.
pub trait Transport: Send + Sync {
    /// Send `request` and return the complete response.
    fn round_trip(&self, request: &Request<Vec<u8>>) -> Result<Response<Vec<u8>>>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn round_trip(&self, request: &Request<Vec<u8>>) -> Result<Response<Vec<u8>>> {
        (**self).round_trip(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn round_trip(&self, request: &Request<Vec<u8>>) -> Result<Response<Vec<u8>>> {
        (**self).round_trip(request)
    }
}

/// Live transport backed by a blocking `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    /// Create a transport with a default client.
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .build()
            .map_err(|e| Error::Transport(format!("cannot build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Wrap an existing client.
    pub fn with_client(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }
}

impl Transport for ReqwestTransport {
    fn round_trip(&self, request: &Request<Vec<u8>>) -> Result<Response<Vec<u8>>> {
        debug!(method = %request.method(), uri = %request.uri(), "Sending live request");

        let live = self
            .client
            .request(request.method().clone(), request.uri().to_string())
            .headers(request.headers().clone())
            .body(request.body().clone())
            .send()
            .map_err(|e| Error::Transport(format!("{} {}: {}", request.method(), request.uri(), e)))?;

        let status = live.status();
        let version = live.version();
        let headers = live.headers().clone();
        let body = live
            .bytes()
            .map_err(|e| Error::Transport(format!("cannot read response body: {}", e)))?;

        let mut response = Response::new(body.to_vec());
        *response.status_mut() = status;
        *response.version_mut() = version;
        *response.headers_mut() = headers;
        Ok(response)
    }
}
