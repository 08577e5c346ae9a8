// Integration tests for `AlarmSession` command dispatch using wiremock.
//
// The push channel stays closed throughout: the control path must work
// (and reconcile acks) without it.

use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use doorlink_api::channel::ChannelConfig;
use doorlink_api::codec::SystemOp;
use doorlink_api::transport::TransportConfig;
use doorlink_core::{AlarmSession, ArmedState, CoreError, DoorState, StateSink};

struct NullSink;
impl StateSink for NullSink {
    fn render_armed(&mut self, _: ArmedState) {}
    fn render_door(&mut self, _: DoorState) {}
}

async fn setup() -> (MockServer, AlarmSession) {
    let server = MockServer::start().await;
    let base: Url = server.uri().parse().unwrap();
    let session = AlarmSession::new(
        base,
        &TransportConfig::default(),
        ChannelConfig::default(),
        Box::new(NullSink),
    )
    .unwrap();
    (server, session)
}

#[tokio::test]
async fn set_armed_ack_applies_while_channel_is_closed() {
    let (server, session) = setup().await;

    Mock::given(method("POST"))
        .and(path("/status"))
        .and(body_json(json!({ "armed": true })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "armed": true })))
        .mount(&server)
        .await;

    assert_eq!(session.armed().await, ArmedState::Unknown);

    let state = session.set_armed(true).await.unwrap();
    assert_eq!(state, ArmedState::Armed);
    assert_eq!(session.armed().await, ArmedState::Armed);
}

#[tokio::test]
async fn failed_command_leaves_state_untouched() {
    let (server, session) = setup().await;

    Mock::given(method("POST"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = session.set_armed(true).await.unwrap_err();
    assert!(matches!(err, CoreError::Api(_)));
    assert_eq!(session.armed().await, ArmedState::Unknown);
    assert_eq!(session.door().await, DoorState::Unknown);
}

#[tokio::test]
async fn unparsable_ack_leaves_state_untouched() {
    let (server, session) = setup().await;

    Mock::given(method("POST"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    assert!(session.set_armed(true).await.is_err());
    assert_eq!(session.armed().await, ArmedState::Unknown);
}

#[tokio::test]
async fn system_operation_never_mutates_state() {
    let (server, session) = setup().await;

    Mock::given(method("POST"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "armed": true })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/system"))
        .and(body_json(json!({ "operation": "shutdown" })))
        .respond_with(ResponseTemplate::new(200).set_body_string("shutting down"))
        .mount(&server)
        .await;

    session.set_armed(true).await.unwrap();

    let result = session.system_operation(SystemOp::Shutdown).await.unwrap();
    assert_eq!(result, "shutting down");
    assert_eq!(session.armed().await, ArmedState::Armed);
    assert_eq!(session.door().await, DoorState::Unknown);
}

#[tokio::test]
async fn connect_is_a_noop_after_shutdown() {
    let (_server, session) = setup().await;

    session.shutdown();
    assert!(!session.connect());
}

#[tokio::test]
async fn connect_twice_starts_one_channel() {
    let (_server, session) = setup().await;

    assert!(session.connect());
    assert!(!session.connect());

    session.shutdown();
}
