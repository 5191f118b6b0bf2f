// Wire envelopes for the phoenix state endpoint.
//
// Requests are built fresh per call and never retained. In responses, each
// `capabilityStates` entry is itself a JSON-encoded string and needs a
// second decode.

use serde::{Deserialize, Serialize};

pub(crate) const APPLIANCE_ENTITY_TYPE: &str = "APPLIANCE";

/// Power-control capability namespace in state responses.
pub const POWER_CONTROLLER_NAMESPACE: &str = "Alexa.PowerController";

/// The two actions a smart plug accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PowerAction {
    TurnOn,
    TurnOff,
}

impl From<bool> for PowerAction {
    fn from(on: bool) -> Self {
        if on { Self::TurnOn } else { Self::TurnOff }
    }
}

// ── Requests ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ControlRequestEnvelope<'a> {
    pub control_requests: [ControlRequest<'a>; 1],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ControlRequest<'a> {
    pub entity_id: &'a str,
    pub entity_type: &'static str,
    pub parameters: ControlParameters,
}

#[derive(Debug, Serialize)]
pub(crate) struct ControlParameters {
    pub action: PowerAction,
}

impl<'a> ControlRequestEnvelope<'a> {
    pub fn new(entity_id: &'a str, action: PowerAction) -> Self {
        Self {
            control_requests: [ControlRequest {
                entity_id,
                entity_type: APPLIANCE_ENTITY_TYPE,
                parameters: ControlParameters { action },
            }],
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StateRequestEnvelope<'a> {
    pub state_requests: [StateRequest<'a>; 1],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StateRequest<'a> {
    pub entity_id: &'a str,
    pub entity_type: &'static str,
}

impl<'a> StateRequestEnvelope<'a> {
    pub fn new(entity_id: &'a str) -> Self {
        Self {
            state_requests: [StateRequest {
                entity_id,
                entity_type: APPLIANCE_ENTITY_TYPE,
            }],
        }
    }
}

// ── Responses ───────────────────────────────────────────────────────

/// Response to both control (PUT) and state (POST) requests.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PhoenixStateResponse {
    #[serde(default)]
    pub errors: Vec<PhoenixError>,
    #[serde(default)]
    pub device_states: Vec<DeviceState>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PhoenixError {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DeviceState {
    #[serde(default)]
    pub capability_states: Vec<String>,
}

/// One decoded capability state. `value` is a string for power control
/// but can be any JSON for other capabilities.
#[derive(Debug, Deserialize)]
pub(crate) struct CapabilityState {
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub value: serde_json::Value,
}
