//! Record against a live local server, then replay without touching it.

use httpmock::prelude::*;
use tempfile::TempDir;

use replaykit_core::{Error, MockHttpSettings};
use replaykit_http::{Client, MockTransport};

#[test]
fn test_record_then_replay_offline() {
    let fixtures = TempDir::new().unwrap();
    let server = MockServer::start();
    let endpoint = server.mock(|when, then| {
        when.method(GET).path("/users").query_param("page", "2");
        then.status(200)
            .header("content-type", "application/json")
            .body("[{\"id\":1}]");
    });
    let url = server.url("/users?page=2");

    let client = Client::live().unwrap();
    let recorded = {
        let _session = MockTransport::new(MockHttpSettings::record(fixtures.path()))
            .session(client.slot())
            .unwrap();
        client.get(&url).unwrap()
    };
    endpoint.assert_hits(1);

    let fixture = fixtures
        .path()
        .join(server.address().to_string())
        .join("users")
        .join("page=2.http");
    assert!(fixture.exists(), "missing fixture {}", fixture.display());

    let replayed = {
        let _session = MockTransport::new(MockHttpSettings::replay(fixtures.path()))
            .session(client.slot())
            .unwrap();
        client.get(&url).unwrap()
    };

    endpoint.assert_hits(1);
    assert_eq!(replayed.status(), recorded.status());
    assert_eq!(replayed.headers(), recorded.headers());
    assert_eq!(replayed.body(), b"[{\"id\":1}]");
    assert_eq!(replayed.headers()["content-type"], "application/json");
}

#[test]
fn test_replay_unknown_endpoint_is_round_trip_error() {
    let fixtures = TempDir::new().unwrap();
    let client = Client::live().unwrap();
    let _session = MockTransport::new(MockHttpSettings::replay(fixtures.path()))
        .session(client.slot())
        .unwrap();

    let err = client.get("https://example.invalid/nothing").unwrap_err();
    assert!(matches!(err, Error::FixtureNotFound { .. }));
    assert!(err.to_string().contains("example.invalid"));
}
