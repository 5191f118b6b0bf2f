#![allow(clippy::unwrap_used)]
// Integration tests for `PlugController` against a mocked phoenix state
// endpoint.

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use alexa_plug_api::{AlexaClient, ControlTarget, Device, Endpoints, Error, SessionConfig};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, Device) {
    let server = MockServer::start().await;
    let config = SessionConfig {
        cookie: Some("session-id=abc123".to_owned().into()),
        amazon_domain: Some("amazon.co.jp".into()),
        endpoints: Endpoints::with_base(&server.uri()),
        log_payloads: Some(true),
        ..SessionConfig::default()
    };
    let client = AlexaClient::with_env(config, |_| None).unwrap();

    Mock::given(method("GET"))
        .and(path("/api/behaviors/entities"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": "E1",
            "displayName": "Plug",
            "description": "",
            "availability": "AVAILABLE",
            "providerData": { "deviceType": "SMARTPLUG" }
        }])))
        .mount(&server)
        .await;

    let device = client.list_devices().await.unwrap().remove(0);
    (server, device)
}

async fn mount_topology(server: &MockServer, appliances: serde_json::Value) {
    let detail = json!({
        "locationDetails": { "locationDetails": { "Default_Location": {
            "amazonBridgeDetails": { "amazonBridgeDetails": {
                "LambdaBridge_AAA/SonarCloudService": {
                    "applianceDetails": { "applianceDetails": appliances }
                }
            }}
        }}}
    });
    Mock::given(method("GET"))
        .and(path("/api/phoenix"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "networkDetail": detail.to_string() })),
        )
        .mount(server)
        .await;
}

fn power_response(value: &str) -> serde_json::Value {
    let power = json!({ "namespace": "Alexa.PowerController", "value": value }).to_string();
    let health =
        json!({ "namespace": "Alexa.EndpointHealth", "value": { "value": "OK" } }).to_string();
    json!({
        "errors": [],
        "deviceStates": [{ "entity": { "entityId": "APP-1" }, "capabilityStates": [health, power] }]
    })
}

fn ok_control_response() -> serde_json::Value {
    json!({ "controlResponses": [{ "entityId": "E1", "code": "SUCCESS" }], "errors": [] })
}

// ── get_state ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_get_state_on() {
    let (server, device) = setup().await;
    mount_topology(&server, json!({ "a": { "entityId": "E1", "applianceId": "APP-1" } })).await;

    Mock::given(method("POST"))
        .and(path("/api/phoenix/state"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "stateRequests": [{ "entityId": "APP-1", "entityType": "APPLIANCE" }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(power_response("ON")))
        .expect(1)
        .mount(&server)
        .await;

    assert!(device.controller().get_state(false).await.unwrap());
}

#[tokio::test]
async fn test_get_state_off() {
    let (server, device) = setup().await;
    mount_topology(&server, json!({ "a": { "entityId": "E1", "applianceId": "APP-1" } })).await;

    Mock::given(method("POST"))
        .and(path("/api/phoenix/state"))
        .respond_with(ResponseTemplate::new(200).set_body_json(power_response("OFF")))
        .mount(&server)
        .await;

    assert!(!device.controller().get_state(false).await.unwrap());
}

#[tokio::test]
async fn test_get_state_reference_fixture() {
    let (server, device) = setup().await;
    mount_topology(&server, json!({ "a": { "entityId": "E1", "applianceId": "APP-1" } })).await;

    Mock::given(method("POST"))
        .and(path("/api/phoenix/state"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errors": [],
            "deviceStates": [{
                "capabilityStates": ["{\"namespace\":\"Alexa.PowerController\",\"value\":\"ON\"}"]
            }]
        })))
        .mount(&server)
        .await;

    assert!(device.controller().get_state(false).await.unwrap());
}

#[tokio::test]
async fn test_get_state_unresolved_entity() {
    let (server, device) = setup().await;
    mount_topology(&server, json!({ "a": { "entityId": "OTHER", "applianceId": "APP-9" } }))
        .await;

    Mock::given(method("POST"))
        .and(path("/api/phoenix/state"))
        .respond_with(ResponseTemplate::new(200).set_body_json(power_response("ON")))
        .expect(0)
        .mount(&server)
        .await;

    let err = device.controller().get_state(false).await.unwrap_err();
    match err {
        Error::UnknownState { help: Some(ref help) } => {
            assert!(help.contains("force"), "unexpected hint: {help}");
        }
        other => panic!("expected UnknownState with hint, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_get_state_record_without_appliance_id_hints_force() {
    let (server, device) = setup().await;
    mount_topology(&server, json!({ "a": { "entityId": "E1" } })).await;

    Mock::given(method("POST"))
        .and(path("/api/phoenix/state"))
        .respond_with(ResponseTemplate::new(200).set_body_json(power_response("ON")))
        .expect(0)
        .mount(&server)
        .await;

    let err = device.controller().get_state(false).await.unwrap_err();
    match err {
        Error::UnknownState { help: Some(ref help) } => {
            assert!(help.contains("getState"), "unexpected hint: {help}");
        }
        other => panic!("expected UnknownState with hint, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_get_state_interaction_failed() {
    let (server, device) = setup().await;
    mount_topology(&server, json!({ "a": { "entityId": "E1", "applianceId": "APP-1" } })).await;

    Mock::given(method("POST"))
        .and(path("/api/phoenix/state"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errors": [{ "code": "ENDPOINT_UNREACHABLE", "message": "Device is offline" }],
            "deviceStates": []
        })))
        .mount(&server)
        .await;

    let err = device.controller().get_state(false).await.unwrap_err();
    match err {
        Error::InteractionFailed { message } => assert_eq!(message, "Device is offline"),
        other => panic!("expected InteractionFailed, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_get_state_entity_id_read_target() {
    let (server, mut device) = setup().await;
    device
        .controller_mut()
        .set_read_target(ControlTarget::EntityId);

    Mock::given(method("GET"))
        .and(path("/api/phoenix"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/phoenix/state"))
        .and(body_json(json!({
            "stateRequests": [{ "entityId": "E1", "entityType": "APPLIANCE" }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(power_response("ON")))
        .expect(1)
        .mount(&server)
        .await;

    assert!(device.controller().get_state(false).await.unwrap());
}

// ── set_state ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_set_state_on_uses_entity_id() {
    let (server, device) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/phoenix/state"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "controlRequests": [{
                "entityId": "E1",
                "entityType": "APPLIANCE",
                "parameters": { "action": "turnOn" }
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_control_response()))
        .expect(1)
        .mount(&server)
        .await;

    device.controller().set_state(true, false).await.unwrap();
}

#[tokio::test]
async fn test_set_state_off() {
    let (server, device) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/phoenix/state"))
        .and(body_json(json!({
            "controlRequests": [{
                "entityId": "E1",
                "entityType": "APPLIANCE",
                "parameters": { "action": "turnOff" }
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_control_response()))
        .expect(1)
        .mount(&server)
        .await;

    device.controller().set_state(false, false).await.unwrap();
}

#[tokio::test]
async fn test_set_state_twice_is_idempotent() {
    let (server, device) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/phoenix/state"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_control_response()))
        .expect(2)
        .mount(&server)
        .await;

    device.controller().set_state(true, false).await.unwrap();
    device.controller().set_state(true, false).await.unwrap();
}

#[tokio::test]
async fn test_set_state_does_not_touch_topology() {
    let (server, device) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/phoenix"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/api/phoenix/state"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_control_response()))
        .mount(&server)
        .await;

    device.controller().set_state(true, true).await.unwrap();
}

#[tokio::test]
async fn test_set_state_interaction_failed() {
    let (server, device) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/phoenix/state"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "controlResponses": [],
            "errors": [
                { "code": "TargetOffline", "message": "The target device is offline" },
                { "message": "ignored" }
            ]
        })))
        .mount(&server)
        .await;

    let err = device.controller().set_state(true, false).await.unwrap_err();
    assert_eq!(err.to_string(), "Interaction failed: The target device is offline");
    match err {
        Error::InteractionFailed { message } => {
            assert_eq!(message, "The target device is offline");
        }
        other => panic!("expected InteractionFailed, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_set_state_appliance_id_write_target() {
    let (server, mut device) = setup().await;
    device
        .controller_mut()
        .set_write_target(ControlTarget::ApplianceId);
    mount_topology(&server, json!({ "a": { "entityId": "E1", "applianceId": "APP-1" } })).await;

    Mock::given(method("PUT"))
        .and(path("/api/phoenix/state"))
        .and(body_json(json!({
            "controlRequests": [{
                "entityId": "APP-1",
                "entityType": "APPLIANCE",
                "parameters": { "action": "turnOn" }
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_control_response()))
        .expect(1)
        .mount(&server)
        .await;

    device.controller().set_state(true, false).await.unwrap();
}

#[tokio::test]
async fn test_set_state_appliance_id_unresolved() {
    let (server, mut device) = setup().await;
    device
        .controller_mut()
        .set_write_target(ControlTarget::ApplianceId);
    mount_topology(&server, json!({})).await;

    let err = device.controller().set_state(true, false).await.unwrap_err();
    assert!(err.is_unknown_state(), "got: {err:?}");
}
