//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError`, `kr_api::Error` and `ConfigError` into user-facing
//! errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use kr_config::ConfigError;
use kr_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach Kismet at {uri}")]
    #[diagnostic(
        code(kr::connection_failed),
        help(
            "Check that the Kismet server is running and reachable.\n\
             Set the host with -s/--server and the port with --port."
        )
    )]
    ConnectionFailed {
        uri: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Request to {uri} timed out ({attempts} attempt(s))")]
    #[diagnostic(
        code(kr::timeout),
        help("Increase --timeout or --retries, or check server responsiveness.")
    )]
    Timeout { uri: String, attempts: u32 },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Invalid login")]
    #[diagnostic(
        code(kr::invalid_login),
        help(
            "Kismet rejected the credentials for profile '{profile}'.\n\
             Pass -u USER with -P PASSWORD or -p, or set KR_PASSWORD."
        )
    )]
    InvalidLogin { profile: String },

    // ── Server responses ─────────────────────────────────────────────
    #[error("Kismet returned HTTP {status} for {uri}")]
    #[diagnostic(code(kr::http_status))]
    HttpStatus { uri: String, status: u16 },

    #[error("Kismet rejected command {uri} (HTTP {status})")]
    #[diagnostic(
        code(kr::command_rejected),
        help("Run with -vv to see the command that was sent.")
    )]
    CommandRejected { uri: String, status: u16 },

    #[error("Unexpected response from {uri}: {detail}")]
    #[diagnostic(
        code(kr::decode),
        help("The server may be running an incompatible Kismet version.")
    )]
    Decode { uri: String, detail: String },

    // ── Reconciliation ───────────────────────────────────────────────
    #[error("No sources configured, exiting")]
    #[diagnostic(
        code(kr::no_sources),
        help(
            "None of the names matched a datasource or probed interface.\n\
             Run: kr sources, or kr interfaces"
        )
    )]
    NoSources,

    #[error("Datasources did not appear within {waited_secs}s: {names}")]
    #[diagnostic(
        code(kr::provisioning_timeout),
        help("Raise --provision-timeout, or check the Kismet log for capture errors.")
    )]
    ProvisioningTimeout { names: String, waited_secs: u64 },

    #[error("Failed to tune data source {name}")]
    #[diagnostic(
        code(kr::tune_failed),
        help("Pass --isolate to keep tuning the remaining sources.")
    )]
    TuneFailed {
        name: String,
        #[source]
        source: kr_api::Error,
    },

    #[error("Some data sources could not be tuned: {names}")]
    #[diagnostic(
        code(kr::partial_tune),
        help("The other sources were tuned. Run with -v for per-request details.")
    )]
    PartialTune { names: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(kr::validation))]
    Validation { field: String, reason: String },

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(kr::profile_not_found),
        help("Available profiles: {available}\nConfig file: {path}")
    )]
    ProfileNotFound {
        name: String,
        available: String,
        path: String,
    },

    #[error(transparent)]
    #[diagnostic(code(kr::config))]
    Config(ConfigError),

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(code(kr::io))]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── kr_api::Error → CliError ─────────────────────────────────────────

impl From<kr_api::Error> for CliError {
    fn from(err: kr_api::Error) -> Self {
        match err {
            kr_api::Error::Timeout { uri, .. } => Self::Timeout { uri, attempts: 1 },
            kr_api::Error::TooManyTimeouts { uri, attempts } => Self::Timeout { uri, attempts },
            kr_api::Error::Transport { uri, source } if source.is_timeout() => {
                Self::Timeout { uri, attempts: 1 }
            }
            kr_api::Error::Transport { uri, source } => Self::ConnectionFailed {
                uri,
                source: Box::new(source),
            },
            kr_api::Error::InvalidUrl(e) => Self::Validation {
                field: "server".into(),
                reason: e.to_string(),
            },
            kr_api::Error::ClientBuild(source) => Self::ConnectionFailed {
                uri: String::new(),
                source: Box::new(source),
            },
            kr_api::Error::HttpStatus { uri, status } => Self::HttpStatus { uri, status },
            kr_api::Error::CommandFailed { uri, status } => Self::CommandRejected { uri, status },
            kr_api::Error::Decode { uri, message, .. } => Self::Decode {
                uri,
                detail: message,
            },
            kr_api::Error::UnexpectedShape { uri, detail } => Self::Decode { uri, detail },
        }
    }
}

// ── CoreError → CliError ─────────────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidLogin => Self::InvalidLogin {
                profile: "current".into(),
            },
            CoreError::NoSourcesConfigured => Self::NoSources,
            CoreError::ProvisioningTimeout { names, waited_secs } => Self::ProvisioningTimeout {
                names: names.join(", "),
                waited_secs,
            },
            CoreError::SetChannel { name, source } => Self::TuneFailed { name, source },
            CoreError::Api(e) => e.into(),
        }
    }
}

// ── ConfigError → CliError ───────────────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config(other),
        }
    }
}
