//! Workflows on top of `kr-api`.
//!
//! - **[`tune_sources`]**: reconciles a desired set of datasource names
//!   against the server, adding probed interfaces as needed, and tunes
//!   the result to one channel, returning a per-source [`TuneReport`].
//!
//! - **[`Poller`]**: cooperative polling loop over one device's signal
//!   fields, stopped by a `CancellationToken`.
//!
//! - **[`require_session`]**: the fail-fast login check every command
//!   runs before doing anything else.

pub mod error;
pub mod poller;
pub mod reconcile;
pub mod session;

pub use error::CoreError;
pub use poller::{NO_DATA_FLOOR_DBM, PollSummary, Poller, Probe, Sample, substitute_no_data};
pub use reconcile::{
    FailurePolicy, SourceInfo, SourceOrigin, SourceOutcome, TuneOptions, TuneReport, TuneStatus,
    tune_sources,
};
pub use session::require_session;
