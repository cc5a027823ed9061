// Device telemetry queries
//
// Field queries against `/devices/by-mac/{mac}/devices.json`. Kismet
// answers with an array whose first element carries each requested field
// under the last component of its path.

use serde_json::Value;
use tracing::debug;

use crate::client::KismetClient;
use crate::command::Command;
use crate::error::Error;
use crate::response;

/// Instantaneous signal of a device.
pub const LAST_SIGNAL_FIELD: &str = "kismet.device.base.signal/kismet.common.signal.last_signal";
pub const LAST_SIGNAL_KEY: &str = "kismet.common.signal.last_signal";

/// One-minute RRD history of a device's signal.
pub const MINUTE_VEC_FIELD: &str =
    "kismet.device.base.signal/kismet.common.signal.signal_rrd/kismet.common.rrd.minute_vec";
pub const MINUTE_VEC_KEY: &str = "kismet.common.rrd.minute_vec";

/// `devices/by-mac/{mac}/devices.json`
pub fn device_path(mac: &str) -> String {
    format!("devices/by-mac/{mac}/devices.json")
}

impl KismetClient {
    /// Query `fields` for the device with `mac` and return element 0 of the reply.
    pub async fn device_fields(&self, mac: &str, fields: &[&str]) -> Result<Value, Error> {
        let url = self.endpoint(&device_path(mac))?;
        let uri = url.to_string();
        debug!(mac, ?fields, "querying device fields");

        let reply: Value = self
            .post_command_json(url, &Command::device_fields(fields.iter().copied()))
            .await?;
        response::first_element(&uri, &reply).cloned()
    }

    /// Current signal of a device in dBm.
    pub async fn last_signal(&self, mac: &str) -> Result<i64, Error> {
        let device = self.device_fields(mac, &[LAST_SIGNAL_FIELD]).await?;
        let uri = self.endpoint(&device_path(mac))?.to_string();
        let value = response::field(&uri, &device, LAST_SIGNAL_KEY)?;
        value.as_i64().ok_or_else(|| Error::UnexpectedShape {
            uri,
            detail: format!("'{LAST_SIGNAL_KEY}' is not an integer: {value}"),
        })
    }

    /// Raw one-minute signal history of a device. Zero entries mean no sample.
    pub async fn minute_history(&self, mac: &str) -> Result<Vec<i64>, Error> {
        let device = self.device_fields(mac, &[MINUTE_VEC_FIELD]).await?;
        let uri = self.endpoint(&device_path(mac))?.to_string();
        let value = response::field(&uri, &device, MINUTE_VEC_KEY)?;
        serde_json::from_value(value.clone()).map_err(|e| Error::UnexpectedShape {
            uri,
            detail: format!("'{MINUTE_VEC_KEY}' is not an integer array: {e}"),
        })
    }
}
