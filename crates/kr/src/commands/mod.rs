//! Command handlers and dispatch.

pub mod config_cmd;
pub mod graph;
pub mod rssi;
pub mod sources;
pub mod tune;

use tokio_util::sync::CancellationToken;

use kr_core::CoreError;

use crate::cli::{Command, GlobalOpts};
use crate::config::{self, Connection};
use crate::error::CliError;

/// Connect, verify the session, then run a server command.
pub async fn dispatch(
    cmd: Command,
    global: &GlobalOpts,
    cancel: &CancellationToken,
) -> Result<(), CliError> {
    let conn = connect(global).await?;

    match cmd {
        Command::Tune(args) => tune::handle(&conn, &args, global, cancel).await,
        Command::Rssi(args) => rssi::handle(&conn, &args, global, cancel).await,
        Command::Graph(args) => graph::handle(&conn, &args, cancel).await,
        Command::Sources => sources::list_sources(&conn, global).await,
        Command::Interfaces => sources::list_interfaces(&conn, global).await,
        Command::Config(_) | Command::Completions(_) => unreachable!("handled before connecting"),
    }
}

async fn connect(global: &GlobalOpts) -> Result<Connection, CliError> {
    let conn = config::connect(global)?;
    status(
        global,
        &format!("Connecting to Kismet Server {}", conn.client.base_url()),
    );

    kr_core::require_session(&conn.client)
        .await
        .map_err(|e| match e {
            CoreError::InvalidLogin => CliError::InvalidLogin {
                profile: conn.profile_name.clone(),
            },
            other => other.into(),
        })?;

    status(global, "Logged in!");
    Ok(conn)
}

/// Operator-facing progress line on stderr, suppressed by `--quiet`.
pub fn status(global: &GlobalOpts, message: &str) {
    if !global.quiet {
        eprintln!("{message}");
    }
}
