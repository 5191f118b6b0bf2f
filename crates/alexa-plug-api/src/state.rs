// Per-device power state control
//
// Reads and writes both go to the phoenix state endpoint. Reads address the
// appliance by its internal appliance id (resolved through the topology);
// writes address it by its public entity id. That asymmetry matches what the
// vendor API has been observed to accept, and each side can be switched via
// `ControlTarget` if that ever changes.

use reqwest::Method;
use tracing::debug;

use crate::client::AlexaClient;
use crate::error::Error;
use crate::models::{
    CapabilityState, ControlRequestEnvelope, POWER_CONTROLLER_NAMESPACE, PhoenixStateResponse,
    PowerAction, StateRequestEnvelope,
};

const GET_STATE_HINT: &str = "passing true on force parameter on getState";
const SET_STATE_HINT: &str = "passing true on force parameter on setState";

/// Which identifier a state request names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlTarget {
    /// The public entity id from the device listing.
    EntityId,
    /// The internal appliance id, resolved through the topology.
    ApplianceId,
}

/// Reads and switches the power state of one smart plug.
#[derive(Debug, Clone)]
pub struct PlugController {
    client: AlexaClient,
    entity_id: String,
    read_target: ControlTarget,
    write_target: ControlTarget,
}

impl PlugController {
    pub(crate) fn new(client: AlexaClient, entity_id: String) -> Self {
        Self {
            client,
            entity_id,
            read_target: ControlTarget::ApplianceId,
            write_target: ControlTarget::EntityId,
        }
    }

    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    pub fn read_target(&self) -> ControlTarget {
        self.read_target
    }

    pub fn write_target(&self) -> ControlTarget {
        self.write_target
    }

    pub fn set_read_target(&mut self, target: ControlTarget) {
        self.read_target = target;
    }

    pub fn set_write_target(&mut self, target: ControlTarget) {
        self.write_target = target;
    }

    /// Switch the plug on or off.
    ///
    /// `PUT /api/phoenix/state` with a single control request. `force` only
    /// matters when writes address the appliance id: it refreshes the
    /// topology before resolving.
    pub async fn set_state(&self, on: bool, force: bool) -> Result<(), Error> {
        let target = self.target_id(self.write_target, force, SET_STATE_HINT).await?;
        let action = PowerAction::from(on);
        let url = self.client.session().state_url()?;
        debug!(entity_id = %self.entity_id, addressed = %target, ?action, "setting state");

        let envelope = ControlRequestEnvelope::new(&target, action);
        let response: PhoenixStateResponse = self
            .client
            .send_json(Method::PUT, url, &envelope, "set_state")
            .await?;

        check_errors(&response)
    }

    /// Read whether the plug is on.
    ///
    /// `POST /api/phoenix/state`. An absent power capability, or any value
    /// other than `ON`, reads as off.
    pub async fn get_state(&self, force: bool) -> Result<bool, Error> {
        let target = self.target_id(self.read_target, force, GET_STATE_HINT).await?;
        let url = self.client.session().state_url()?;
        debug!(entity_id = %self.entity_id, addressed = %target, "reading state");

        let envelope = StateRequestEnvelope::new(&target);
        let response: PhoenixStateResponse = self
            .client
            .send_json(Method::POST, url, &envelope, "get_state")
            .await?;

        check_errors(&response)?;
        power_state(&response)
    }

    async fn target_id(
        &self,
        target: ControlTarget,
        force: bool,
        hint: &'static str,
    ) -> Result<String, Error> {
        match target {
            ControlTarget::EntityId => Ok(self.entity_id.clone()),
            ControlTarget::ApplianceId => self
                .client
                .resolve_appliance_id(&self.entity_id, force)
                .await?
                .ok_or_else(|| Error::unknown_state_with(hint)),
        }
    }
}

/// Fail with the first upstream error message, verbatim.
fn check_errors(response: &PhoenixStateResponse) -> Result<(), Error> {
    match response.errors.first() {
        Some(err) => Err(Error::InteractionFailed {
            message: err.message.clone(),
        }),
        None => Ok(()),
    }
}

fn power_state(response: &PhoenixStateResponse) -> Result<bool, Error> {
    let device = response
        .device_states
        .first()
        .ok_or(Error::UnknownState { help: None })?;

    for raw in &device.capability_states {
        let capability: CapabilityState = serde_json::from_str(raw)?;
        if capability.namespace == POWER_CONTROLLER_NAMESPACE {
            return Ok(capability.value.as_str() == Some("ON"));
        }
    }

    Ok(false)
}
