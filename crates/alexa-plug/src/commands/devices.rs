//! Device command handlers.

use serde::Serialize;
use tabled::Tabled;

use alexa_plug_api::{AlexaClient, ControlTarget, Device};

use crate::cli::{DevicesArgs, DevicesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Availability")]
    availability: String,
}

impl From<&Device> for DeviceRow {
    fn from(d: &Device) -> Self {
        Self {
            id: d.id().to_owned(),
            name: d.name().to_owned(),
            description: d.description().to_owned(),
            availability: d.availability().to_string(),
        }
    }
}

/// Result of `devices get` / `devices set`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StateReport {
    id: String,
    name: String,
    on: bool,
}

impl StateReport {
    fn new(device: &Device, on: bool) -> Self {
        Self {
            id: device.id().to_owned(),
            name: device.name().to_owned(),
            on,
        }
    }
}

/// Result of `devices resolve`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Resolution {
    entity_id: String,
    appliance_id: String,
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    client: &AlexaClient,
    args: DevicesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = output::should_color(&global.color);

    match args.command {
        DevicesCommand::List => {
            let devices = client.list_devices().await?;
            let out = output::render_list(
                &global.output,
                &devices,
                |d| DeviceRow::from(d),
                |d| d.id().to_owned(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::Get { device, force } => {
            let device = util::find_device(client, &device).await?;
            let on = device.controller().get_state(force).await?;
            print_report(&StateReport::new(&device, on), global, color);
            Ok(())
        }

        DevicesCommand::Set {
            device,
            state,
            force,
            by_appliance_id,
        } => {
            let mut device = util::find_device(client, &device).await?;
            if by_appliance_id {
                device
                    .controller_mut()
                    .set_write_target(ControlTarget::ApplianceId);
            }
            device.controller().set_state(state.is_on(), force).await?;
            tracing::info!(id = device.id(), on = state.is_on(), "state set");
            print_report(&StateReport::new(&device, state.is_on()), global, color);
            Ok(())
        }

        DevicesCommand::Resolve { device, force } => {
            let device = util::find_device(client, &device).await?;
            let appliance_id = client
                .resolve_appliance_id(device.id(), force)
                .await?
                .ok_or_else(|| CliError::Unresolved {
                    entity_id: device.id().to_owned(),
                })?;

            let resolution = Resolution {
                entity_id: device.id().to_owned(),
                appliance_id,
            };
            let out = output::render_single(
                &global.output,
                &resolution,
                |r| {
                    format!(
                        "Entity:    {}\nAppliance: {}",
                        r.entity_id, r.appliance_id
                    )
                },
                |r| r.appliance_id.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}

fn print_report(report: &StateReport, global: &GlobalOpts, color: bool) {
    let out = output::render_single(
        &global.output,
        report,
        |r| {
            format!(
                "ID:    {}\nName:  {}\nPower: {}",
                r.id,
                r.name,
                output::power_label(r.on, color)
            )
        },
        |r| if r.on { "on".into() } else { "off".into() },
    );
    output::print_output(&out, global.quiet);
}
