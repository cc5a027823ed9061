// Kismet REST HTTP client
//
// Wraps `reqwest::Client` with Kismet URL construction, basic auth on every
// request, and the GET retry-on-timeout loop. Endpoint groups (session,
// datasources, devices) are implemented as inherent methods in separate
// files to keep this module focused on transport mechanics.

use std::time::Instant;

use tracing::{debug, trace, warn};
use url::Url;

use crate::error::Error;
use crate::session::Credentials;
use crate::transport::TransportConfig;

/// Kismet's default REST port.
pub const DEFAULT_PORT: u16 = 2501;

/// Build the base URI for a Kismet server: `http://{host}:{port}`.
pub fn server_url(host: &str, port: u16) -> Result<Url, Error> {
    Ok(Url::parse(&format!("http://{host}:{port}"))?)
}

/// Explicit client context for one Kismet server.
///
/// Carries the HTTP client (with its cookie jar), the server base URI, the
/// credentials presented on every request and the transport settings. It is
/// passed by reference to every operation; nothing about the session lives
/// in process-wide state.
pub struct KismetClient {
    http: reqwest::Client,
    base_url: Url,
    credentials: Credentials,
    transport: TransportConfig,
}

impl KismetClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// If the config doesn't already include a cookie jar, one is created
    /// so the session cookie Kismet hands out is replayed on later calls.
    pub fn new(
        base_url: Url,
        credentials: Credentials,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let config = if transport.cookie_jar.is_some() {
            transport.clone()
        } else {
            transport.clone().with_cookie_jar()
        };
        let http = config.build_client()?;
        Ok(Self {
            http,
            base_url,
            credentials,
            transport: config,
        })
    }

    /// Create a client around a pre-built `reqwest::Client`.
    ///
    /// The `transport` settings still drive the retry budget; the timeout
    /// is whatever `http` was built with.
    pub fn with_client(
        http: reqwest::Client,
        base_url: Url,
        credentials: Credentials,
        transport: TransportConfig,
    ) -> Self {
        Self {
            http,
            base_url,
            credentials,
            transport,
        }
    }

    /// The server base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build a full URL for a server-relative path: `{base}/{path}`.
    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder.basic_auth(
            &self.credentials.username,
            Some(self.credentials.expose_password()),
        )
    }

    fn timeout_secs(&self) -> u64 {
        self.transport.timeout.as_secs()
    }

    /// Send a GET request, retrying only on timeout.
    ///
    /// Makes at most `retries + 1` attempts. Any non-timeout failure is
    /// returned immediately; exhausting the budget yields
    /// [`Error::TooManyTimeouts`].
    pub async fn get(&self, url: Url) -> Result<reqwest::Response, Error> {
        let max_attempts = self.transport.max_attempts();
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            debug!(%url, attempt, "GET");

            let start = Instant::now();
            let result = self.authorize(self.http.get(url.clone())).send().await;

            match result {
                Ok(resp) => {
                    trace!(elapsed = ?start.elapsed(), status = %resp.status(), "GET completed");
                    return Ok(resp);
                }
                Err(e) if e.is_timeout() => {
                    let timeout = Error::Timeout {
                        uri: url.to_string(),
                        timeout_secs: self.timeout_secs(),
                    };
                    warn!(attempt, max_attempts, "{timeout}");
                    if attempt >= max_attempts {
                        return Err(Error::TooManyTimeouts {
                            uri: url.to_string(),
                            attempts: attempt,
                        });
                    }
                }
                Err(e) => {
                    return Err(Error::Transport {
                        uri: url.to_string(),
                        source: e,
                    });
                }
            }
        }
    }

    /// Send a single POST attempt with a form body.
    ///
    /// `None` is sent as an empty payload. POSTs are never retried; a
    /// timeout here is reported as [`Error::Transport`].
    pub async fn post(
        &self,
        url: Url,
        form: Option<&[(&str, String)]>,
    ) -> Result<reqwest::Response, Error> {
        debug!(%url, "POST");

        let builder = self.authorize(self.http.post(url.clone()));
        let builder = match form {
            Some(fields) => builder.form(fields),
            None => builder.body(""),
        };

        let start = Instant::now();
        let resp = builder.send().await.map_err(|e| Error::Transport {
            uri: url.to_string(),
            source: e,
        })?;
        trace!(elapsed = ?start.elapsed(), status = %resp.status(), "POST completed");

        Ok(resp)
    }
}
