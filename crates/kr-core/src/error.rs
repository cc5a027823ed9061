// ── Core error types ──
//
// Workflow-level failures from kr-core. Transport and decoding problems
// arrive wrapped from `kr_api::Error`; the rest are conditions only the
// workflows can detect.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Session ──────────────────────────────────────────────────────
    #[error("Invalid login")]
    InvalidLogin,

    // ── Reconciliation ───────────────────────────────────────────────
    #[error("No sources configured")]
    NoSourcesConfigured,

    #[error("Datasources not visible after {waited_secs}s: {}", names.join(", "))]
    ProvisioningTimeout { names: Vec<String>, waited_secs: u64 },

    #[error("Failed to tune data source {name}: {source}")]
    SetChannel {
        name: String,
        #[source]
        source: kr_api::Error,
    },

    // ── API errors ───────────────────────────────────────────────────
    #[error(transparent)]
    Api(#[from] kr_api::Error),
}
