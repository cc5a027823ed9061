//! `kr sources` / `kr interfaces`: registry listings.

use tabled::Tabled;

use kr_api::{Datasource, ProbedInterface};

use crate::cli::GlobalOpts;
use crate::config::Connection;
use crate::error::CliError;
use crate::output;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct SourceRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Interface")]
    interface: String,
    #[tabled(rename = "Hardware")]
    hardware: String,
    #[tabled(rename = "Channel")]
    channel: String,
    #[tabled(rename = "UUID")]
    uuid: String,
}

impl From<&Datasource> for SourceRow {
    fn from(ds: &Datasource) -> Self {
        Self {
            name: ds.name.clone(),
            interface: ds.interface.clone(),
            hardware: ds.hardware.clone(),
            channel: ds.channel.clone(),
            uuid: ds.uuid.clone(),
        }
    }
}

#[derive(Tabled)]
struct InterfaceRow {
    #[tabled(rename = "Interface")]
    interface: String,
    #[tabled(rename = "Hardware")]
    hardware: String,
    #[tabled(rename = "In use by")]
    in_use: String,
}

impl From<&ProbedInterface> for InterfaceRow {
    fn from(i: &ProbedInterface) -> Self {
        let in_use = if i.in_use_uuid.is_empty() || i.in_use_uuid.starts_with("00000000-") {
            "-".into()
        } else {
            i.in_use_uuid.clone()
        };
        Self {
            interface: i.interface.clone(),
            hardware: i.hardware.clone(),
            in_use,
        }
    }
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn list_sources(conn: &Connection, global: &GlobalOpts) -> Result<(), CliError> {
    let sources = conn.client.list_sources().await?;
    let out = output::render_list(
        conn.output,
        &sources,
        |ds| SourceRow::from(ds),
        |ds| ds.name.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn list_interfaces(conn: &Connection, global: &GlobalOpts) -> Result<(), CliError> {
    let interfaces = conn.client.list_interfaces().await?;
    let out = output::render_list(
        conn.output,
        &interfaces,
        |i| InterfaceRow::from(i),
        |i| i.interface.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
