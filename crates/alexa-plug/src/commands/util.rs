//! Shared helpers for command handlers.

use alexa_plug_api::{AlexaClient, Device};

use crate::error::CliError;

/// Find a plug by entity id, then by display name (case-insensitive).
pub async fn find_device(client: &AlexaClient, identifier: &str) -> Result<Device, CliError> {
    let devices = client.list_devices().await?;
    pick_device(devices, identifier)
}

fn pick_device(devices: Vec<Device>, identifier: &str) -> Result<Device, CliError> {
    if let Some(device) = devices.iter().find(|d| d.id() == identifier) {
        return Ok(device.clone());
    }

    let mut matches: Vec<Device> = devices
        .into_iter()
        .filter(|d| d.name().eq_ignore_ascii_case(identifier))
        .collect();

    match matches.len() {
        0 => Err(CliError::DeviceNotFound {
            identifier: identifier.into(),
        }),
        1 => Ok(matches.remove(0)),
        count => Err(CliError::AmbiguousDevice {
            identifier: identifier.into(),
            count,
        }),
    }
}
