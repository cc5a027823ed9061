// Datasource registry endpoints
//
// Listing, lookup and mutation of Kismet datasources and probed
// interfaces. Mutations are fire-and-forget commands: a 200 means the
// request was accepted, not that the source is already visible.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::client::KismetClient;
use crate::command::Command;
use crate::error::Error;
use crate::response;

pub const ALL_SOURCES_PATH: &str = "datasource/all_sources.json";
pub const LIST_INTERFACES_PATH: &str = "datasource/list_interfaces.json";
pub const ADD_SOURCE_PATH: &str = "datasource/add_source.cmd";

/// A datasource as reported by `all_sources.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Datasource {
    #[serde(rename = "kismet.datasource.name", default)]
    pub name: String,
    #[serde(rename = "kismet.datasource.uuid", default)]
    pub uuid: String,
    #[serde(rename = "kismet.datasource.hardware", default)]
    pub hardware: String,
    #[serde(rename = "kismet.datasource.interface", default)]
    pub interface: String,
    #[serde(rename = "kismet.datasource.channel", default)]
    pub channel: String,
}

/// An interface the server has probed, from `list_interfaces.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProbedInterface {
    #[serde(rename = "kismet.datasource.probed.interface", default)]
    pub interface: String,
    #[serde(rename = "kismet.datasource.probed.hardware", default)]
    pub hardware: String,
    /// UUID of the datasource using this interface, if any.
    #[serde(rename = "kismet.datasource.probed.in_use_uuid", default)]
    pub in_use_uuid: String,
}

/// Exact name match against a source listing.
pub fn contains_source(sources: &[Datasource], name: &str) -> bool {
    sources.iter().any(|s| s.name == name)
}

/// Exact probed-interface match against an interface listing.
pub fn contains_interface(interfaces: &[ProbedInterface], name: &str) -> bool {
    interfaces.iter().any(|i| i.interface == name)
}

/// `datasource/by-uuid/{uuid}/set_channel.cmd`
pub fn set_channel_path(uuid: &str) -> String {
    format!("datasource/by-uuid/{uuid}/set_channel.cmd")
}

impl KismetClient {
    /// GET a JSON collection, requiring a 200.
    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.endpoint(path)?;
        let uri = url.to_string();
        let resp = self.get(url).await?;
        response::expect_ok(&uri, resp.status())?;
        let body = response::read_body(&uri, resp).await?;
        response::decode_json(&uri, &body)
    }

    /// List all datasources.
    ///
    /// `GET /datasource/all_sources.json`
    pub async fn list_sources(&self) -> Result<Vec<Datasource>, Error> {
        debug!("listing datasources");
        self.get_json(ALL_SOURCES_PATH).await
    }

    /// List interfaces the server can turn into datasources.
    ///
    /// `GET /datasource/list_interfaces.json`
    pub async fn list_interfaces(&self) -> Result<Vec<ProbedInterface>, Error> {
        debug!("listing interfaces");
        self.get_json(LIST_INTERFACES_PATH).await
    }

    /// Whether a datasource named `name` exists. Failures read as `false`.
    pub async fn has_source(&self, name: &str) -> bool {
        match self.list_sources().await {
            Ok(sources) => contains_source(&sources, name),
            Err(e) => {
                warn!(name, error = %e, "datasource lookup failed");
                false
            }
        }
    }

    /// Whether a probed interface named `name` exists. Failures read as `false`.
    pub async fn has_interface(&self, name: &str) -> bool {
        match self.list_interfaces().await {
            Ok(interfaces) => contains_interface(&interfaces, name),
            Err(e) => {
                warn!(name, error = %e, "interface lookup failed");
                false
            }
        }
    }

    /// Ask the server to open `definition` as a new datasource.
    ///
    /// `POST /datasource/add_source.cmd` with `{"definition": "..."}`.
    /// The new source's UUID is only discoverable by listing again.
    pub async fn add_source(&self, definition: &str) -> Result<(), Error> {
        let url = self.endpoint(ADD_SOURCE_PATH)?;
        debug!(definition, "adding datasource");
        self.post_command(url, &Command::add_source(definition))
            .await
    }

    /// Tune a datasource to `channel`. The channel string is passed through as-is.
    ///
    /// `POST /datasource/by-uuid/{uuid}/set_channel.cmd` with `{"channel": "..."}`
    pub async fn set_channel(&self, uuid: &str, channel: &str) -> Result<(), Error> {
        let url = self.endpoint(&set_channel_path(uuid))?;
        debug!(uuid, channel, "setting channel");
        self.post_command(url, &Command::set_channel(channel)).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn datasource_decodes_dotted_fields() {
        let raw = json!({
            "kismet.datasource.name": "wlan0",
            "kismet.datasource.uuid": "5fe308bd-0000-0000-0000-00c0ca9a1b2c",
            "kismet.datasource.hardware": "rt2800usb",
            "kismet.datasource.running": 1
        });
        let ds: Datasource = serde_json::from_value(raw).unwrap();
        assert_eq!(ds.name, "wlan0");
        assert_eq!(ds.hardware, "rt2800usb");
        assert!(ds.channel.is_empty());
    }

    #[test]
    fn contains_source_is_exact() {
        let sources = vec![Datasource {
            name: "wlan0".into(),
            ..Datasource::default()
        }];
        assert!(contains_source(&sources, "wlan0"));
        assert!(!contains_source(&sources, "wlan"));
        assert!(!contains_source(&sources, "WLAN0"));
        assert!(!contains_source(&[], "wlan0"));
    }

    #[test]
    fn contains_interface_matches_probed_name() {
        let interfaces = vec![ProbedInterface {
            interface: "wlx00c0ca".into(),
            ..ProbedInterface::default()
        }];
        assert!(contains_interface(&interfaces, "wlx00c0ca"));
        assert!(!contains_interface(&interfaces, "wlan0"));
    }

    #[test]
    fn set_channel_path_embeds_uuid() {
        assert_eq!(
            set_channel_path("abc"),
            "datasource/by-uuid/abc/set_channel.cmd"
        );
    }
}
