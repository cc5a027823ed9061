// ── Datasource reconciliation ──
//
// Brings the server's datasource set in line with a list of desired source
// names, then tunes every resolved source to one channel. Each name ends up
// with exactly one outcome in the returned report, in input order.

use std::time::Duration;

use indexmap::{IndexMap, IndexSet};
use kr_api::KismetClient;
use serde::Serialize;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::CoreError;

/// How a desired name became part of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceOrigin {
    /// A datasource with this name already existed.
    Existing,
    /// A probed interface with this name was added as a datasource.
    Added,
}

/// Working record for one accepted source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceInfo {
    pub name: String,
    pub origin: SourceOrigin,
    pub uuid: Option<String>,
    pub hardware: Option<String>,
}

impl SourceInfo {
    fn new(name: &str, origin: SourceOrigin) -> Self {
        Self {
            name: name.to_owned(),
            origin,
            uuid: None,
            hardware: None,
        }
    }

    /// A non-empty UUID has been discovered.
    pub fn is_resolved(&self) -> bool {
        self.uuid.as_deref().is_some_and(|u| !u.is_empty())
    }
}

/// What happens when a channel command fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop at the first failure and return it.
    #[default]
    AbortOnError,
    /// Record the failure for that source and keep tuning the rest.
    Isolate,
}

#[derive(Debug, Clone)]
pub struct TuneOptions {
    pub policy: FailurePolicy,
    /// Wait this long for added sources to appear in the listing.
    /// `None` lists once and reports stragglers as unresolved.
    pub provision_timeout: Option<Duration>,
    /// Delay between listings while waiting.
    pub provision_poll: Duration,
    /// Checked between requests; a request already sent always completes.
    pub cancel: CancellationToken,
}

impl Default for TuneOptions {
    fn default() -> Self {
        Self {
            policy: FailurePolicy::AbortOnError,
            provision_timeout: None,
            provision_poll: Duration::from_millis(500),
            cancel: CancellationToken::new(),
        }
    }
}

/// Final state of one desired name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TuneStatus {
    Tuned { uuid: String, hardware: String },
    /// Neither a datasource nor an interface.
    Skipped,
    /// Accepted, but no UUID was discovered, so no channel command was sent.
    Unresolved,
    Failed { uuid: String, error: String },
    /// The run was cancelled before a channel command was sent.
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceOutcome {
    pub name: String,
    pub origin: Option<SourceOrigin>,
    #[serde(flatten)]
    pub status: TuneStatus,
}

/// Per-source results of a tuning run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TuneReport {
    pub channel: String,
    pub outcomes: Vec<SourceOutcome>,
}

impl TuneReport {
    pub fn tuned(&self) -> impl Iterator<Item = &SourceOutcome> {
        self.with(|s| matches!(s, TuneStatus::Tuned { .. }))
    }

    pub fn failed(&self) -> impl Iterator<Item = &SourceOutcome> {
        self.with(|s| matches!(s, TuneStatus::Failed { .. }))
    }

    pub fn skipped(&self) -> impl Iterator<Item = &SourceOutcome> {
        self.with(|s| matches!(s, TuneStatus::Skipped))
    }

    pub fn unresolved(&self) -> impl Iterator<Item = &SourceOutcome> {
        self.with(|s| matches!(s, TuneStatus::Unresolved))
    }

    pub fn cancelled(&self) -> impl Iterator<Item = &SourceOutcome> {
        self.with(|s| matches!(s, TuneStatus::Cancelled))
    }

    fn with(&self, pred: fn(&TuneStatus) -> bool) -> impl Iterator<Item = &SourceOutcome> {
        self.outcomes.iter().filter(move |o| pred(&o.status))
    }
}

/// Reconcile `desired` source names and tune them to `channel`.
///
/// Per name, in input order (duplicates collapse onto the first):
/// an existing datasource is accepted as-is; otherwise a probed interface
/// of that name is added as a datasource; otherwise the name is skipped.
/// No accepted names is fatal ([`CoreError::NoSourcesConfigured`]) and no
/// command is sent. The datasource list is then fetched to learn each
/// accepted source's UUID, and every resolved source gets a channel
/// command.
///
/// `options.cancel` is observed between requests. Once it fires, names not
/// yet tuned are reported as [`TuneStatus::Cancelled`].
pub async fn tune_sources(
    client: &KismetClient,
    desired: &[String],
    channel: &str,
    options: &TuneOptions,
) -> Result<TuneReport, CoreError> {
    let cancel = &options.cancel;
    let names: IndexSet<&str> = desired.iter().map(String::as_str).collect();
    if names.len() < desired.len() {
        debug!("duplicate source names ignored");
    }

    let mut plan: IndexMap<String, Option<SourceInfo>> = IndexMap::new();
    for &name in &names {
        if cancel.is_cancelled() {
            break;
        }
        let entry = classify(client, name).await?;
        plan.insert(name.to_owned(), entry);
    }

    if !cancel.is_cancelled() {
        if plan.values().all(Option::is_none) {
            return Err(CoreError::NoSourcesConfigured);
        }
        resolve(client, &mut plan, options).await?;
    }

    let mut outcomes = Vec::with_capacity(names.len());
    for name in names {
        let (origin, status) = match plan.get(name) {
            None => (None, TuneStatus::Cancelled),
            Some(None) => (None, TuneStatus::Skipped),
            Some(Some(info)) if cancel.is_cancelled() => {
                (Some(info.origin), TuneStatus::Cancelled)
            }
            Some(Some(info)) => (
                Some(info.origin),
                apply_channel(client, info, channel, options.policy).await?,
            ),
        };
        outcomes.push(SourceOutcome {
            name: name.to_owned(),
            origin,
            status,
        });
    }

    if cancel.is_cancelled() {
        info!("tuning interrupted");
    }

    Ok(TuneReport {
        channel: channel.to_owned(),
        outcomes,
    })
}

/// Decide how one name enters the run, adding it as a datasource if needed.
async fn classify(client: &KismetClient, name: &str) -> Result<Option<SourceInfo>, CoreError> {
    if client.has_source(name).await {
        info!(name, "source found");
        return Ok(Some(SourceInfo::new(name, SourceOrigin::Existing)));
    }

    info!(name, "source not found, checking for interface");
    if !client.has_interface(name).await {
        warn!(name, "no source or interface with this name, ignoring");
        return Ok(None);
    }

    info!(name, "interface found, adding as a datasource");
    client.add_source(name).await?;
    Ok(Some(SourceInfo::new(name, SourceOrigin::Added)))
}

/// Fill UUID and hardware for accepted entries from the datasource list.
async fn resolve(
    client: &KismetClient,
    plan: &mut IndexMap<String, Option<SourceInfo>>,
    options: &TuneOptions,
) -> Result<(), CoreError> {
    let started = Instant::now();

    loop {
        let sources = client.list_sources().await?;
        for ds in &sources {
            if let Some(Some(info)) = plan.get_mut(&ds.name) {
                info.uuid = Some(ds.uuid.clone());
                info.hardware = Some(ds.hardware.clone());
            }
        }

        let pending = unresolved_names(plan);
        if pending.is_empty() {
            return Ok(());
        }

        let Some(timeout) = options.provision_timeout else {
            debug!(?pending, "sources still unresolved, not waiting");
            return Ok(());
        };

        if started.elapsed() >= timeout {
            return Err(CoreError::ProvisioningTimeout {
                names: pending,
                waited_secs: timeout.as_secs(),
            });
        }

        debug!(?pending, "waiting for added sources to appear");
        tokio::select! {
            biased;
            () = options.cancel.cancelled() => return Ok(()),
            () = tokio::time::sleep(options.provision_poll) => {}
        }
    }
}

fn unresolved_names(plan: &IndexMap<String, Option<SourceInfo>>) -> Vec<String> {
    plan.values()
        .flatten()
        .filter(|info| !info.is_resolved())
        .map(|info| info.name.clone())
        .collect()
}

async fn apply_channel(
    client: &KismetClient,
    info: &SourceInfo,
    channel: &str,
    policy: FailurePolicy,
) -> Result<TuneStatus, CoreError> {
    let Some(uuid) = info.uuid.clone().filter(|u| !u.is_empty()) else {
        warn!(name = %info.name, "no UUID for source, not tuning");
        return Ok(TuneStatus::Unresolved);
    };

    info!(name = %info.name, channel, "tuning data source");
    match client.set_channel(&uuid, channel).await {
        Ok(()) => Ok(TuneStatus::Tuned {
            uuid,
            hardware: info.hardware.clone().unwrap_or_default(),
        }),
        Err(e) => match policy {
            FailurePolicy::AbortOnError => Err(CoreError::SetChannel {
                name: info.name.clone(),
                source: e,
            }),
            FailurePolicy::Isolate => {
                warn!(name = %info.name, error = %e, "channel command failed, continuing");
                Ok(TuneStatus::Failed {
                    uuid,
                    error: e.to_string(),
                })
            }
        },
    }
}
