//! Async client for Alexa smart plugs.
//!
//! - **[`AlexaClient`]** -- one account session. Built from a [`SessionConfig`]
//!   (cookie and Amazon domain, with environment fallbacks), it owns the
//!   [`Transport`] and the [`TopologyCache`].
//! - **[`AlexaClient::list_devices`]** -- the smart plugs on the account, each
//!   a [`Device`] carrying its own [`PlugController`].
//! - **[`AlexaClient::resolve_appliance_id`]** -- maps a public entity id to
//!   the internal appliance id via the cached topology. `Ok(None)` means
//!   "not in this snapshot", distinct from an error.
//! - **[`PlugController`]** -- `get_state` / `set_state` against the phoenix
//!   state endpoint.
//!
//! Payloads are logged at debug level on the `alexa_plug_api::payload`
//! target when payload logging is enabled (see [`session::LOG_ENV`]).

pub mod client;
pub mod devices;
pub mod error;
pub mod models;
pub mod session;
pub mod state;
pub mod topology;
pub mod transport;

pub use client::AlexaClient;
pub use devices::{Availability, Device, SMART_PLUG_DEVICE_TYPE};
pub use error::Error;
pub use models::{POWER_CONTROLLER_NAMESPACE, PowerAction};
pub use session::{Endpoints, SMARTHOME_SKILL_ID, Session, SessionConfig};
pub use state::{ControlTarget, PlugController};
pub use topology::{Appliance, Topology, TopologyCache};
pub use transport::{NetworkRoute, RequestOptions, Transport, TransportConfig, USER_AGENT_SIGNATURE};

/// Tracing target for full request/response payloads.
pub const PAYLOAD_TARGET: &str = "alexa_plug_api::payload";

#[cfg(test)]
mod tests {
    #[test]
    fn payload_target_lives_under_crate_path() {
        assert_eq!(
            super::PAYLOAD_TARGET,
            concat!(env!("CARGO_CRATE_NAME"), "::payload")
        );
    }
}
