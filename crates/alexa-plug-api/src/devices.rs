// Device directory: list account entities and keep the smart plugs.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::client::AlexaClient;
use crate::error::Error;
use crate::state::PlugController;

/// Provider device type reported for smart plugs.
pub const SMART_PLUG_DEVICE_TYPE: &str = "SMARTPLUG";

// ── Wire types ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BehaviorEntity {
    id: String,
    #[serde(default)]
    display_name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    availability: Availability,
    #[serde(default)]
    provider_data: Option<ProviderData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProviderData {
    #[serde(default)]
    device_type: Option<String>,
}

impl BehaviorEntity {
    fn is_smart_plug(&self) -> bool {
        self.provider_data
            .as_ref()
            .and_then(|p| p.device_type.as_deref())
            == Some(SMART_PLUG_DEVICE_TYPE)
    }
}

// ── Domain types ────────────────────────────────────────────────────

/// Availability reported by the entity listing. `AVAILABLE` is the only
/// value seen in practice; anything else decodes as `Unknown`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Availability {
    Available,
    #[default]
    #[serde(other)]
    Unknown,
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Available => f.write_str("AVAILABLE"),
            Self::Unknown => f.write_str("UNKNOWN"),
        }
    }
}

/// A smart plug on the account.
///
/// Identity fields are fixed at listing time. Each device owns the
/// [`PlugController`] used to read and switch it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    id: String,
    display_name: String,
    description: String,
    availability: Availability,
    #[serde(skip)]
    controller: PlugController,
}

impl Device {
    fn new(client: &AlexaClient, entity: BehaviorEntity) -> Self {
        let controller = PlugController::new(client.clone(), entity.id.clone());
        Self {
            id: entity.id,
            display_name: entity.display_name,
            description: entity.description,
            availability: entity.availability,
            controller,
        }
    }

    /// Public entity id.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.display_name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn availability(&self) -> Availability {
        self.availability
    }

    pub fn controller(&self) -> &PlugController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut PlugController {
        &mut self.controller
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name)
    }
}

// ── Client operations ───────────────────────────────────────────────

impl AlexaClient {
    /// List every smart plug on the account.
    ///
    /// `GET /api/behaviors/entities?skillId=...`. Entities of other types are
    /// skipped. Nothing is cached; each call hits the network.
    pub async fn list_devices(&self) -> Result<Vec<Device>, Error> {
        let url = self.session().entities_url()?;
        debug!("listing devices");

        let entities: Vec<BehaviorEntity> = self.get_json(url, "list_devices").await?;
        let total = entities.len();

        let devices: Vec<Device> = entities
            .into_iter()
            .filter(BehaviorEntity::is_smart_plug)
            .filter(|entity| {
                if entity.id.is_empty() {
                    warn!(name = %entity.display_name, "skipping smart plug with empty id");
                    return false;
                }
                true
            })
            .map(|entity| {
                debug!(id = %entity.id, name = %entity.display_name, "found smart plug");
                Device::new(self, entity)
            })
            .collect();

        debug!(total, plugs = devices.len(), "device listing complete");
        Ok(devices)
    }
}
