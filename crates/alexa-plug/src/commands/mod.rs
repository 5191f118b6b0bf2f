//! Command dispatch: routes parsed CLI commands to their handlers.

pub mod config_cmd;
pub mod devices;
pub mod selftest;
mod util;

use alexa_plug_api::AlexaClient;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a session-bound command to its handler.
pub async fn dispatch(
    cmd: Command,
    client: &AlexaClient,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Devices(args) => devices::handle(client, args, global).await,
        Command::Selftest(args) => selftest::handle(client, args, global).await,
        Command::Config(_) | Command::Completions(_) => unreachable!("handled before dispatch"),
    }
}
