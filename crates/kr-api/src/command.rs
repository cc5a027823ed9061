// Kismet command protocol
//
// Every Kismet `.cmd` / field-query POST carries its command object as a
// JSON string inside a form field named `json`, not as a raw JSON body.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::client::KismetClient;
use crate::error::Error;
use crate::response;

/// Name of the single form field carrying the serialized command.
pub const FORM_FIELD: &str = "json";

/// A command object sent to Kismet.
///
/// Each variant serializes to exactly the object the server expects,
/// e.g. `SetChannel` becomes `{"channel": "6"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Command {
    /// `{"definition": "<interface>"}` for `add_source.cmd`.
    AddSource { definition: String },
    /// `{"channel": "<channel>"}` for `set_channel.cmd`.
    SetChannel { channel: String },
    /// `{"fields": ["<path>", ...]}` for device queries.
    DeviceFieldsQuery { fields: Vec<String> },
}

impl Command {
    pub fn add_source(definition: impl Into<String>) -> Self {
        Self::AddSource {
            definition: definition.into(),
        }
    }

    pub fn set_channel(channel: impl Into<String>) -> Self {
        Self::SetChannel {
            channel: channel.into(),
        }
    }

    pub fn device_fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::DeviceFieldsQuery {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// The command as JSON text.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("command serialization should not fail")
    }

    /// The form body: one `json` field holding [`Command::to_json`].
    pub fn form(&self) -> [(&'static str, String); 1] {
        [(FORM_FIELD, self.to_json())]
    }
}

impl KismetClient {
    /// POST a command and discard the reply body.
    ///
    /// Fails with [`Error::CommandFailed`] on any status other than 200.
    pub async fn post_command(&self, url: Url, command: &Command) -> Result<(), Error> {
        let _resp = self.send_command(url, command).await?;
        Ok(())
    }

    /// POST a command and decode the JSON reply.
    pub async fn post_command_json<T: DeserializeOwned>(
        &self,
        url: Url,
        command: &Command,
    ) -> Result<T, Error> {
        let uri = url.to_string();
        let resp = self.send_command(url, command).await?;
        let body = response::read_body(&uri, resp).await?;
        response::decode_json(&uri, &body)
    }

    async fn send_command(&self, url: Url, command: &Command) -> Result<reqwest::Response, Error> {
        debug!(%url, command = %command.to_json(), "sending command");
        let uri = url.to_string();
        let form = command.form();
        let resp = self.post(url, Some(form.as_slice())).await?;

        let status = resp.status();
        if !response::as_bool(status) {
            return Err(Error::CommandFailed {
                uri,
                status: status.as_u16(),
            });
        }
        Ok(resp)
    }
}
