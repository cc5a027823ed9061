// Session credentials and liveness checks
//
// Kismet accepts HTTP basic auth on every request and answers with a
// session cookie; the client presents both. Liveness is never cached --
// callers ask the server again via `check_session`.

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};

use crate::client::KismetClient;
use crate::response;

/// Fixed liveness endpoint.
pub const CHECK_SESSION_PATH: &str = "session/check_session";

/// Username/password pair presented on every request.
///
/// Either part may be empty; Kismet servers without auth accept that.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: SecretString) -> Self {
        Self {
            username: username.into(),
            password,
        }
    }

    /// Empty username and password.
    pub fn anonymous() -> Self {
        Self::new(String::new(), SecretString::from(String::new()))
    }

    pub fn password(&self) -> &SecretString {
        &self.password
    }

    pub(crate) fn expose_password(&self) -> &str {
        self.password.expose_secret()
    }
}

impl KismetClient {
    /// Check whether the current credentials hold a valid session.
    ///
    /// `GET /session/check_session` -- `true` iff the server answers 200.
    /// Transport failures are logged and reported as `false`; this never
    /// errors and does not mutate the client.
    pub async fn check_session(&self) -> bool {
        let url = match self.endpoint(CHECK_SESSION_PATH) {
            Ok(url) => url,
            Err(e) => {
                warn!(error = %e, "cannot build session check URL");
                return false;
            }
        };

        match self.get(url).await {
            Ok(resp) => {
                let valid = response::as_bool(resp.status());
                debug!(valid, status = %resp.status(), "session check");
                valid
            }
            Err(e) => {
                warn!(error = %e, "session check failed");
                false
            }
        }
    }
}
