// Topology snapshot, its cache, and entity → appliance resolution
//
// The phoenix endpoint returns `{"networkDetail": "<json string>"}`; the
// string decodes into a location → bridge → appliance graph. Only one path
// through that graph matters for smart plugs:
//
//   locationDetails.locationDetails["Default_Location"]
//     .amazonBridgeDetails.amazonBridgeDetails["LambdaBridge_AAA/SonarCloudService"]
//     .applianceDetails.applianceDetails

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::client::AlexaClient;
use crate::error::Error;

pub const DEFAULT_LOCATION: &str = "Default_Location";
pub const CLOUD_BRIDGE: &str = "LambdaBridge_AAA/SonarCloudService";

// ── Wire types ──────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PhoenixResponse {
    #[serde(default)]
    network_detail: Option<String>,
}

impl PhoenixResponse {
    /// Decode the embedded `networkDetail` string.
    fn into_topology(self) -> Result<Topology, Error> {
        let detail = self
            .network_detail
            .ok_or(Error::UnknownState { help: None })?;
        Topology::from_network_detail(&detail)
    }
}

/// Decoded network detail. Every level is optional so a shape mismatch
/// surfaces as [`Error::UnknownState`] rather than a decode failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topology {
    #[serde(default)]
    pub location_details: Option<LocationDetails>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationDetails {
    #[serde(default)]
    pub location_details: Option<IndexMap<String, Location>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(default)]
    pub amazon_bridge_details: Option<BridgeDetails>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeDetails {
    #[serde(default)]
    pub amazon_bridge_details: Option<IndexMap<String, Bridge>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bridge {
    #[serde(default)]
    pub appliance_details: Option<ApplianceDetails>,
}

/// Appliance records stay untyped: only `entityId` and `applianceId` are
/// read, and a record with unexpected fields must not spoil its siblings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplianceDetails {
    #[serde(default)]
    pub appliance_details: Option<IndexMap<String, Value>>,
}

/// Borrowed view of one appliance record. `entity_id` is the public id from
/// the device listing, `appliance_id` the one the state endpoint wants.
/// A field that is missing or not a string reads as `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Appliance<'a> {
    pub entity_id: Option<&'a str>,
    pub appliance_id: Option<&'a str>,
}

impl<'a> Appliance<'a> {
    fn from_record(record: &'a Value) -> Self {
        Self {
            entity_id: record.get("entityId").and_then(Value::as_str),
            appliance_id: record.get("applianceId").and_then(Value::as_str),
        }
    }
}

impl Topology {
    /// Decode a `networkDetail` string.
    ///
    /// A document that doesn't fit the expected graph is an unknown state,
    /// not a decode error.
    pub fn from_network_detail(detail: &str) -> Result<Self, Error> {
        serde_json::from_str(detail).map_err(|e| {
            debug!(error = %e, "network detail does not match the topology shape");
            Error::UnknownState { help: None }
        })
    }

    /// Appliance records under the default location's cloud bridge, in
    /// document order, or `None` if any level of the path is missing.
    pub fn appliances(&self) -> Option<impl Iterator<Item = Appliance<'_>>> {
        let records = self
            .location_details
            .as_ref()?
            .location_details
            .as_ref()?
            .get(DEFAULT_LOCATION)?
            .amazon_bridge_details
            .as_ref()?
            .amazon_bridge_details
            .as_ref()?
            .get(CLOUD_BRIDGE)?
            .appliance_details
            .as_ref()?
            .appliance_details
            .as_ref()?;
        Some(records.values().map(Appliance::from_record))
    }

    /// Find the appliance id for a public entity id.
    ///
    /// `Ok(None)` means the topology is well-formed but the first record for
    /// this entity is absent or carries no appliance id; a malformed
    /// topology is an error.
    pub fn find_appliance_id(&self, entity_id: &str) -> Result<Option<&str>, Error> {
        let mut appliances = self
            .appliances()
            .ok_or(Error::UnknownState { help: None })?;

        Ok(appliances
            .find(|a| a.entity_id == Some(entity_id))
            .and_then(|a| a.appliance_id))
    }
}

// ── Cache ───────────────────────────────────────────────────────────

/// Holds the most recent topology snapshot.
///
/// There is no expiry: the snapshot lives until a forced refresh replaces
/// it wholesale. Concurrent forced refreshes race and the last store wins;
/// both snapshots come from the same upstream, so either is acceptable.
/// An id resolved from one snapshot may already be stale by the time it
/// is used.
#[derive(Debug, Default)]
pub struct TopologyCache {
    snapshot: ArcSwapOption<Topology>,
}

impl TopologyCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached snapshot, if one has been fetched.
    pub fn get(&self) -> Option<Arc<Topology>> {
        self.snapshot.load_full()
    }

    pub fn store(&self, topology: Arc<Topology>) {
        self.snapshot.store(Some(topology));
    }

    pub fn is_populated(&self) -> bool {
        self.snapshot.load().is_some()
    }
}

// ── Client operations ───────────────────────────────────────────────

impl AlexaClient {
    /// The account topology.
    ///
    /// With `force = false` the cached snapshot is returned when present;
    /// otherwise (or with `force = true`) it is fetched and cached.
    pub async fn topology(&self, force: bool) -> Result<Arc<Topology>, Error> {
        if !force {
            if let Some(cached) = self.topology_cache().get() {
                debug!("topology cache hit");
                return Ok(cached);
            }
        }

        let topology = Arc::new(self.fetch_topology().await?);
        self.topology_cache().store(Arc::clone(&topology));
        Ok(topology)
    }

    async fn fetch_topology(&self) -> Result<Topology, Error> {
        let url = self.session().topology_url()?;
        debug!("fetching topology");

        let outer: PhoenixResponse = self.get_json(url, "topology").await?;
        if let Some(detail) = outer.network_detail.as_deref() {
            self.log_payload("topology.networkDetail", detail);
        }
        outer.into_topology()
    }

    /// Map a public entity id to its internal appliance id.
    ///
    /// `Ok(None)` means the entity is not in the (possibly cached) topology;
    /// retrying with `force = true` refreshes it first.
    pub async fn resolve_appliance_id(
        &self,
        entity_id: &str,
        force: bool,
    ) -> Result<Option<String>, Error> {
        let topology = self.topology(force).await?;
        let resolved = topology.find_appliance_id(entity_id)?.map(str::to_owned);
        debug!(entity_id, appliance_id = ?resolved, "resolved entity");
        Ok(resolved)
    }
}
