use std::time::Duration;

use pretty_assertions::assert_eq;
use redeem_engine::{
    CredentialSet, ReqwestTransport, SubmitSettings, Transport, TransportError,
};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings_for(server: &MockServer) -> SubmitSettings {
    SubmitSettings::new(format!("{}/api/redeem_submit.php", server.uri()))
}

#[tokio::test]
async fn submits_code_as_form_with_cookie_header() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/redeem_submit.php"))
        .and(header("cookie", "session=abc123"))
        .and(header("x-requested-with", "XMLHttpRequest"))
        .and(body_string_contains("code=GIFT-1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"ok": true, "data": {}}"#))
        .mount(&server)
        .await;

    let mut credentials = CredentialSet::new();
    credentials.insert("session", "abc123");
    let transport = ReqwestTransport::new(&settings_for(&server), &credentials).expect("transport");

    let reply = transport.submit("GIFT-1").await.expect("submit ok");
    assert_eq!(reply.status, 200);
    assert_eq!(reply.body, r#"{"ok": true, "data": {}}"#);
}

#[tokio::test]
async fn works_without_cookies() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/redeem_submit.php"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&server)
        .await;

    let transport =
        ReqwestTransport::new(&settings_for(&server), &CredentialSet::new()).expect("transport");

    // An error status is still a completed exchange.
    let reply = transport.submit("GIFT-2").await.expect("submit ok");
    assert_eq!(reply.status, 401);
    assert_eq!(reply.body, "Unauthorized");
}

#[tokio::test]
async fn slow_endpoint_maps_to_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/redeem_submit.php"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_string("slow"),
        )
        .mount(&server)
        .await;

    let settings = SubmitSettings {
        request_timeout: Duration::from_millis(50),
        ..settings_for(&server)
    };
    let transport = ReqwestTransport::new(&settings, &CredentialSet::new()).expect("transport");

    let err = transport.submit("GIFT-3").await.unwrap_err();
    assert_eq!(err, TransportError::Timeout);
}

#[tokio::test]
async fn unreachable_endpoint_is_a_network_error() {
    // Nothing listens on this port.
    let settings = SubmitSettings::new("http://127.0.0.1:9/api/redeem_submit.php");
    let transport = ReqwestTransport::new(&settings, &CredentialSet::new()).expect("transport");

    let err = transport.submit("GIFT-4").await.unwrap_err();
    assert!(matches!(err, TransportError::Network(_)));
}

#[test]
fn invalid_endpoint_is_rejected_at_construction() {
    let settings = SubmitSettings::new("not a url");
    let err = ReqwestTransport::new(&settings, &CredentialSet::new()).unwrap_err();
    assert!(matches!(err, TransportError::Network(_)));
}
