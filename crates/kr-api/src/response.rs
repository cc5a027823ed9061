// Response decoding
//
// Maps HTTP status and body text into typed results. Kept free of the
// client so every rule here is checkable without a server.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::Error;

/// `true` iff the status is 200. Used where failure is an expected outcome.
pub fn as_bool(status: StatusCode) -> bool {
    status == StatusCode::OK
}

/// Succeed on 200, otherwise [`Error::HttpStatus`].
pub fn expect_ok(uri: &str, status: StatusCode) -> Result<(), Error> {
    if as_bool(status) {
        Ok(())
    } else {
        Err(Error::HttpStatus {
            uri: uri.to_owned(),
            status: status.as_u16(),
        })
    }
}

/// Parse a body as JSON into `T`.
///
/// Malformed JSON is a [`Error::Decode`]; well-formed JSON that doesn't
/// fit `T` is an [`Error::UnexpectedShape`].
pub fn decode_json<T: DeserializeOwned>(uri: &str, body: &str) -> Result<T, Error> {
    serde_json::from_str(body).map_err(|e| {
        if e.is_data() {
            Error::UnexpectedShape {
                uri: uri.to_owned(),
                detail: e.to_string(),
            }
        } else {
            let preview: String = body.chars().take(200).collect();
            Error::Decode {
                uri: uri.to_owned(),
                message: format!("{e} (body preview: {preview:?})"),
                body: body.to_owned(),
            }
        }
    })
}

/// Element 0 of a JSON array.
pub fn first_element<'a>(uri: &str, value: &'a Value) -> Result<&'a Value, Error> {
    match value {
        Value::Array(items) => items.first().ok_or_else(|| Error::UnexpectedShape {
            uri: uri.to_owned(),
            detail: "empty array".into(),
        }),
        other => Err(Error::UnexpectedShape {
            uri: uri.to_owned(),
            detail: format!("expected an array, got {}", kind(other)),
        }),
    }
}

/// A named field of a JSON object.
pub fn field<'a>(uri: &str, value: &'a Value, key: &str) -> Result<&'a Value, Error> {
    value.get(key).ok_or_else(|| Error::UnexpectedShape {
        uri: uri.to_owned(),
        detail: format!("missing field '{key}'"),
    })
}

/// Read the body text, mapping read failures to transport errors.
pub(crate) async fn read_body(uri: &str, resp: reqwest::Response) -> Result<String, Error> {
    resp.text().await.map_err(|e| Error::Transport {
        uri: uri.to_owned(),
        source: e,
    })
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
