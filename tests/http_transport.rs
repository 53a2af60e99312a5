use acs_rs::{AcsError, AcsQuery, Client, ClientConfig, GeographyLevel, HttpTransport, Transport};
use httpmock::prelude::*;

const PROFILE: &str = r#"[["NAME","DP03_0001E","state","county"],["Pierce County, Washington","475000","53","053"]]"#;

fn client_for(server: &MockServer) -> Client {
    Client::with_config(ClientConfig {
        base_url: server.base_url(),
        ..Default::default()
    })
    .unwrap()
}

#[test]
fn fetches_and_parses_profile_table() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/2020/acs/acs5/profile")
            .query_param("get", "NAME,DP03_0001E")
            .query_param("for", "county:053")
            .query_param("in", "state:53")
            .query_param("key", "abc");
        then.status(200)
            .header("Content-Type", "application/json")
            .body(PROFILE);
    });

    let mut client = client_for(&server);
    client.api_key = "abc".into();
    let out = client
        .call(
            &AcsQuery::new(["DP03_0001E"])
                .geography(GeographyLevel::County)
                .state("53")
                .county("053"),
        )
        .unwrap();

    mock.assert();
    assert_eq!(out.len(), 1);
    assert_eq!(out.get(0, "DP03_0001E"), Some("475000"));
    assert_eq!(out.get(0, "county"), Some("053"));
}

#[test]
fn server_errors_are_retried_three_times() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/2020/acs/acs5");
        then.status(500).body("internal error");
    });

    let mut client = client_for(&server);
    let err = client
        .call(&AcsQuery::new(["B03002_001E"]).geography(GeographyLevel::State))
        .unwrap_err();

    mock.assert_hits(3);
    assert!(matches!(err, AcsError::RequestExhausted { attempts: 3, .. }));
    assert_eq!(client.calls().len(), 1);
}

#[test]
fn transport_reports_http_status() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/missing");
        then.status(404).body("unknown variable 'DP99_0001E'");
    });

    let transport = HttpTransport::new(&ClientConfig::default()).unwrap();
    let err = transport.get(&server.url("/missing")).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("404"), "{msg}");
    assert!(msg.contains("unknown variable"), "{msg}");
}
