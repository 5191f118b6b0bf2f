//! Live round trip against one plug: on, verify, wait, off, verify.

use std::time::Duration;

use owo_colors::OwoColorize;

use alexa_plug_api::{AlexaClient, Device};

use crate::cli::{GlobalOpts, SelftestArgs};
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn handle(
    client: &AlexaClient,
    args: SelftestArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = output::should_color(&global.color);
    let device = match args.device {
        Some(ref identifier) => util::find_device(client, identifier).await?,
        None => client
            .list_devices()
            .await?
            .into_iter()
            .next()
            .ok_or(CliError::NoDevices)?,
    };

    step(global, &format!("Testing '{device}' ({})", device.id()));

    let initial = device.controller().get_state(false).await?;
    step(
        global,
        &format!("Initial state: {}", output::power_label(initial, color)),
    );

    switch_and_verify(&device, true, global, color).await?;
    tokio::time::sleep(Duration::from_secs(args.delay)).await;
    switch_and_verify(&device, false, global, color).await?;

    let done = if color {
        "All OK!".green().bold().to_string()
    } else {
        "All OK!".into()
    };
    output::print_output(&done, global.quiet);
    Ok(())
}

async fn switch_and_verify(
    device: &Device,
    on: bool,
    global: &GlobalOpts,
    color: bool,
) -> Result<(), CliError> {
    device.controller().set_state(on, false).await?;
    let actual = device.controller().get_state(false).await?;
    if actual != on {
        return Err(CliError::SelftestFailed {
            expected: label(on),
            actual: label(actual),
        });
    }
    step(
        global,
        &format!("Switched {}", output::power_label(on, color)),
    );
    Ok(())
}

fn label(on: bool) -> &'static str {
    if on { "on" } else { "off" }
}

fn step(global: &GlobalOpts, line: &str) {
    if !global.quiet {
        eprintln!("  {line}");
    }
}
