//! Command dispatch: bridges CLI args -> `EventClient` calls -> output.

pub mod config_cmd;
pub mod listen;
pub mod request;
pub mod resources;

use unifi_events_core::EventClient;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a controller-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    client: &EventClient,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Listen(args) => listen::handle(client, args, global).await,
        Command::Get(args) => request::get(client, args, global).await,
        Command::Post(args) => request::post(client, args, global).await,
        Command::Delete(args) => request::delete(client, args, global).await,
        Command::Sites => resources::sites(client, global).await,
        Command::SiteStats => resources::site_stats(client, global).await,
        Command::Clients => resources::clients(client, global).await,
        Command::Client(args) => resources::client(client, args, global).await,
        // Handled before a client is built
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
