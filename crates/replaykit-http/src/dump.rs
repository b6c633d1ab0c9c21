//! HTTP/1.x response dump codec.
//!
//! Fixtures hold a response exactly as it would appear on the wire: status
//! line, headers, a blank line and the body. Dumps always carry a
//! `Content-Length` matching the stored body and never a
//! `Transfer-Encoding`, so what is written is what is served back.

use std::path::Path;

use http::header::{CONTENT_LENGTH, TRANSFER_ENCODING};
use http::{HeaderName, HeaderValue, Response, StatusCode, Version};
use httparse::Status;

use replaykit_core::{Error, Result};

/// Maximum number of headers accepted in a fixture.
pub const MAX_HEADERS: usize = 64;

/// Serialize a response as an HTTP/1.x message.
pub fn dump_response(response: &Response<Vec<u8>>) -> Vec<u8> {
    let body = response.body();
    let mut out = Vec::with_capacity(body.len() + 256);

    let version = match response.version() {
        Version::HTTP_10 => "HTTP/1.0",
        _ => "HTTP/1.1",
    };
    let status = response.status();
    out.extend_from_slice(
        format!(
            "{} {} {}\r\n",
            version,
            status.as_str(),
            status.canonical_reason().unwrap_or("")
        )
        .as_bytes(),
    );

    for (name, value) in response.headers() {
        if name == CONTENT_LENGTH || name == TRANSFER_ENCODING {
            continue;
        }
        out.extend_from_slice(name.as_str().as_bytes());
        out.extend_from_slice(b": ");
        out.extend_from_slice(value.as_bytes());
        out.extend_from_slice(b"\r\n");
    }
    out.extend_from_slice(format!("{}: {}\r\n\r\n", CONTENT_LENGTH, body.len()).as_bytes());
    out.extend_from_slice(body);
    out
}

/// Parse a response dump read from `path`.
///
/// The body is bounded by `Content-Length` when present, decoded when the
/// dump uses chunked transfer encoding, and runs to the end of the data
/// otherwise.
pub fn parse_response(path: &Path, data: &[u8]) -> Result<Response<Vec<u8>>> {
    let malformed = |reason: String| Error::MalformedResponse {
        path: path.to_path_buf(),
        reason,
    };

    let mut headers = [httparse::EMPTY_HEADER; MAX_HEADERS];
    let mut head = httparse::Response::new(&mut headers);
    let head_len = match head.parse(data) {
        Ok(Status::Complete(len)) => len,
        Ok(Status::Partial) => return Err(malformed("incomplete response head".to_string())),
        Err(e) => return Err(malformed(e.to_string())),
    };

    let version = match head.version {
        Some(0) => Version::HTTP_10,
        _ => Version::HTTP_11,
    };
    let code = head
        .code
        .ok_or_else(|| malformed("missing status code".to_string()))?;
    let status = StatusCode::from_u16(code).map_err(|e| malformed(e.to_string()))?;

    let mut response = Response::new(Vec::new());
    *response.status_mut() = status;
    *response.version_mut() = version;

    for header in head.headers.iter() {
        let name = HeaderName::from_bytes(header.name.as_bytes())
            .map_err(|e| malformed(format!("header {:?}: {}", header.name, e)))?;
        let value = HeaderValue::from_bytes(header.value)
            .map_err(|e| malformed(format!("header {:?}: {}", header.name, e)))?;
        response.headers_mut().append(name, value);
    }

    let rest = &data[head_len..];
    let chunked = response
        .headers()
        .get_all(TRANSFER_ENCODING)
        .iter()
        .any(|v| v.as_bytes().eq_ignore_ascii_case(b"chunked"));

    let body = if chunked {
        let body = decode_chunked(rest).map_err(malformed)?;
        let headers = response.headers_mut();
        headers.remove(TRANSFER_ENCODING);
        headers.insert(CONTENT_LENGTH, HeaderValue::from(body.len()));
        body
    } else if let Some(length) = response.headers().get(CONTENT_LENGTH) {
        let length: usize = length
            .to_str()
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .ok_or_else(|| malformed(format!("invalid Content-Length {:?}", length)))?;
        if rest.len() < length {
            return Err(malformed(format!(
                "body is {} bytes, Content-Length says {}",
                rest.len(),
                length
            )));
        }
        rest[..length].to_vec()
    } else {
        rest.to_vec()
    };

    *response.body_mut() = body;
    Ok(response)
}

fn decode_chunked(mut data: &[u8]) -> std::result::Result<Vec<u8>, String> {
    let mut body = Vec::new();
    loop {
        let (consumed, size) = match httparse::parse_chunk_size(data) {
            Ok(Status::Complete(parsed)) => parsed,
            Ok(Status::Partial) => return Err("truncated chunk size".to_string()),
            Err(_) => return Err("invalid chunk size".to_string()),
        };
        data = &data[consumed..];
        if size == 0 {
            return Ok(body);
        }

        let size = usize::try_from(size).map_err(|_| "chunk too large".to_string())?;
        if data.len() < size {
            return Err(format!("chunk of {} bytes is truncated", size));
        }
        body.extend_from_slice(&data[..size]);
        data = &data[size..];

        data = data
            .strip_prefix(b"\r\n")
            .or_else(|| data.strip_prefix(b"\n"))
            .ok_or_else(|| "missing chunk terminator".to_string())?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::CONTENT_TYPE;

    fn response(status: u16, headers: &[(&str, &str)], body: &str) -> Response<Vec<u8>> {
        let mut builder = Response::builder().status(status);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(body.as_bytes().to_vec()).unwrap()
    }

    #[test]
    fn test_dump_layout() {
        let dumped = dump_response(&response(200, &[("content-type", "text/plain")], "hello"));
        assert_eq!(
            String::from_utf8(dumped).unwrap(),
            "HTTP/1.1 200 OK\r\ncontent-type: text/plain\r\ncontent-length: 5\r\n\r\nhello"
        );
    }

    #[test]
    fn test_dump_normalizes_framing() {
        let dumped = dump_response(&response(
            200,
            &[("transfer-encoding", "chunked"), ("content-length", "999")],
            "abc",
        ));
        let text = String::from_utf8(dumped).unwrap();
        assert!(!text.contains("transfer-encoding"));
        assert!(text.contains("content-length: 3\r\n"));
    }

    #[test]
    fn test_parse_dumped_response() {
        let original = response(404, &[("x-trace", "1"), ("x-trace", "2")], "missing");
        let parsed = parse_response(Path::new("f.http"), &dump_response(&original)).unwrap();

        assert_eq!(parsed.status(), StatusCode::NOT_FOUND);
        assert_eq!(parsed.headers().get_all("x-trace").iter().count(), 2);
        assert_eq!(parsed.body(), b"missing");
        assert_eq!(dump_response(&parsed), dump_response(&original));
    }

    #[test]
    fn test_parse_hand_written_fixture() {
        let fixture = "HTTP/1.0 201 Created\nContent-Type: application/json\n\n{\"id\":7}";
        let parsed = parse_response(Path::new("f.http"), fixture.as_bytes()).unwrap();

        assert_eq!(parsed.version(), Version::HTTP_10);
        assert_eq!(parsed.status(), StatusCode::CREATED);
        assert_eq!(parsed.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(parsed.body(), b"{\"id\":7}");
    }

    #[test]
    fn test_parse_respects_content_length() {
        let fixture = b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nokTRAILING";
        let parsed = parse_response(Path::new("f.http"), fixture).unwrap();
        assert_eq!(parsed.body(), b"ok");
    }

    #[test]
    fn test_parse_chunked_fixture() {
        let fixture =
            b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n4\r\nWiki\r\n5\r\npedia\r\n0\r\n\r\n";
        let parsed = parse_response(Path::new("f.http"), fixture).unwrap();

        assert_eq!(parsed.body(), b"Wikipedia");
        assert!(parsed.headers().get(TRANSFER_ENCODING).is_none());
        assert_eq!(parsed.headers()[CONTENT_LENGTH], "9");
    }

    #[test]
    fn test_parse_errors_carry_path() {
        let cases: [&[u8]; 4] = [
            b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\n",
            b"garbage",
            b"HTTP/1.1 200 OK\r\nContent-Length: 10\r\n\r\nshort",
            b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\nzz\r\n",
        ];
        for data in cases {
            match parse_response(Path::new("fx/a.http"), data) {
                Err(Error::MalformedResponse { path, .. }) => {
                    assert_eq!(path, Path::new("fx/a.http"))
                }
                other => panic!("expected malformed response, got {:?}", other),
            }
        }
    }
}
