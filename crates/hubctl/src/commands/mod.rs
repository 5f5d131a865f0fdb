//! Command dispatch: bridges CLI args -> Hub sessions -> output formatting.

pub mod account;
pub mod config_cmd;
pub mod devices;
pub mod services;
pub mod subdevices;
pub mod util;

use hubctl_core::HubConfig;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a hub-bound command to the appropriate handler.
///
/// Handlers take the config rather than a live [`Hub`](hubctl_core::Hub)
/// because session shape differs per command: one-shot commands zero the
/// poll intervals, watch commands keep them.
pub async fn dispatch(
    cmd: Command,
    config: HubConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Devices(args) => devices::handle(config, args, global).await,
        Command::Subdevices(args) => subdevices::handle(config, args, global).await,
        Command::Services(args) => services::handle(config, args, global).await,
        Command::Account(args) => account::handle(config, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
