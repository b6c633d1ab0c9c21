//! Fixture key policies.
//!
//! A [`KeyPolicy`] maps a request to the fixture file holding its recorded
//! response. The mapping must be a pure function of the request: two
//! requests that agree on everything the policy looks at always resolve to
//! the same file.

use std::fmt::Debug;
use std::path::{Path, PathBuf};

use http::Request;
use sha2::{Digest, Sha256};

use replaykit_core::{Error, Result};

/// File suffix of HTTP fixtures.
pub const FIXTURE_SUFFIX: &str = "http";

/// Length of the request digest kept in fixture names, in hex characters.
const DIGEST_LEN: usize = 16;

/// Maps requests to fixture paths under a root directory.
pub trait KeyPolicy: Debug + Send + Sync {
    /// Fixture path of `request` under `root`.
    fn fixture_path(&self, root: &Path, request: &Request<Vec<u8>>) -> Result<PathBuf>;
}

/// `<root>/<host>/<path>/<raw-query>.http`.
///
/// Path segments are percent-decoded; the query is kept raw. The scheme, method and body are ignored, so every method on one endpoint
/// shares a fixture. This is the default policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct UrlKey;

impl KeyPolicy for UrlKey {
    fn fixture_path(&self, root: &Path, request: &Request<Vec<u8>>) -> Result<PathBuf> {
        let dir = endpoint_dir(root, request)?;
        Ok(dir.join(format!("{}.{}", query_stem(request), FIXTURE_SUFFIX)))
    }
}

/// Like [`UrlKey`], with the method added to the file name:
/// `<root>/<host>/<path>/<raw-query>.<METHOD>.http`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MethodUrlKey;

impl KeyPolicy for MethodUrlKey {
    fn fixture_path(&self, root: &Path, request: &Request<Vec<u8>>) -> Result<PathBuf> {
        let dir = endpoint_dir(root, request)?;
        Ok(dir.join(format!(
            "{}.{}.{}",
            query_stem(request),
            request.method(),
            FIXTURE_SUFFIX
        )))
    }
}

/// Like [`MethodUrlKey`], with a digest of the method and body added:
/// `<root>/<host>/<path>/<raw-query>.<METHOD>.<digest>.http`.
///
/// Distinct payloads sent to one endpoint get distinct fixtures.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestDigestKey;

impl RequestDigestKey {
    /// Short hex digest of the request method and body.
    pub fn digest(request: &Request<Vec<u8>>) -> String {
        let mut hasher = Sha256::new();
        hasher.update(request.method().as_str().as_bytes());
        hasher.update(b"\n");
        hasher.update(request.body());
        let mut digest = hex::encode(hasher.finalize());
        digest.truncate(DIGEST_LEN);
        digest
    }
}

impl KeyPolicy for RequestDigestKey {
    fn fixture_path(&self, root: &Path, request: &Request<Vec<u8>>) -> Result<PathBuf> {
        let dir = endpoint_dir(root, request)?;
        Ok(dir.join(format!(
            "{}.{}.{}.{}",
            query_stem(request),
            request.method(),
            Self::digest(request),
            FIXTURE_SUFFIX
        )))
    }
}

// Host (with explicit port) followed by the path segments. Empty, `.` and
// `..` segments are dropped so a request cannot resolve outside `root`.
fn endpoint_dir(root: &Path, request: &Request<Vec<u8>>) -> Result<PathBuf> {
    let uri = request.uri();
    let host = uri
        .host()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| Error::InvalidRequest(format!("request URI has no host: {}", uri)))?;

    let mut dir = root.join(match uri.port_u16() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    });
    for segment in uri.path().split('/') {
        let segment = decode_segment(segment);
        if !matches!(segment.as_str(), "" | "." | "..") {
            dir.push(segment.replace('/', "%2F").replace('\\', "%5C"));
        }
    }
    Ok(dir)
}

// Path segments are stored decoded; invalid UTF-8 is replaced.
fn decode_segment(segment: &str) -> String {
    String::from_utf8_lossy(&urlencoding::decode_binary(segment.as_bytes())).into_owned()
}

// The raw query becomes the file stem; path separators in it are escaped.
fn query_stem(request: &Request<Vec<u8>>) -> String {
    request
        .uri()
        .query()
        .unwrap_or("")
        .replace('/', "%2F")
        .replace('\\', "%5C")
}
