use thiserror::Error;

/// Top-level error type for the `kr-api` crate.
///
/// Covers every failure mode of talking to a Kismet server: transport,
/// status checks, command envelopes and JSON decoding. `kr-core` wraps
/// these and the CLI maps them into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// A single attempt timed out. Retried by GET, never surfaced by it.
    #[error("HTTP request to {uri} timed out after {timeout_secs}s")]
    Timeout { uri: String, timeout_secs: u64 },

    /// Every GET attempt timed out.
    #[error("Too many timeouts ({attempts}) for HTTP GET {uri}")]
    TooManyTimeouts { uri: String, attempts: u32 },

    /// Any other transport failure (connection refused, DNS failure, POST timeout, etc.)
    #[error("HTTP request to {uri} failed: {source}")]
    Transport {
        uri: String,
        #[source]
        source: reqwest::Error,
    },

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The underlying HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    // ── Status ──────────────────────────────────────────────────────
    /// Non-200 status on a GET that requires success.
    #[error("HTTP GET failed for {uri} with status {status}")]
    HttpStatus { uri: String, status: u16 },

    /// Non-200 status on a command POST.
    #[error("Kismet command failed for {uri} with status {status}")]
    CommandFailed { uri: String, status: u16 },

    // ── Data ────────────────────────────────────────────────────────
    /// Body was not valid JSON, with the raw body for debugging.
    #[error("Invalid JSON from {uri}: {message}")]
    Decode {
        uri: String,
        message: String,
        body: String,
    },

    /// JSON was valid but lacked an expected element or field.
    #[error("Unexpected response shape from {uri}: {detail}")]
    UnexpectedShape { uri: String, detail: String },
}

impl Error {
    /// Returns `true` for the timeout variants.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::TooManyTimeouts { .. } => true,
            Self::Transport { source, .. } => source.is_timeout(),
            _ => false,
        }
    }

    /// The HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } | Self::CommandFailed { status, .. } => Some(*status),
            _ => None,
        }
    }
}
