// ── Device signal polling ──
//
// Fetches one device's signal at a fixed cadence and hands each sample to
// a caller-supplied sink. The stop token is only observed between
// iterations, never raced against an in-flight request.

use std::ops::ControlFlow;
use std::time::Duration;

use kr_api::KismetClient;
use serde::Serialize;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::CoreError;

/// Display value substituted for history slots without a sample.
pub const NO_DATA_FLOOR_DBM: i64 = -100;

/// Cadence of the live readout.
pub const LIVE_CADENCE: Duration = Duration::from_millis(100);

/// Cadence of the history graph.
pub const HISTORY_CADENCE: Duration = Duration::from_secs(1);

/// Which signal field to poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    /// Instantaneous signal.
    LastSignal,
    /// One-minute RRD history.
    MinuteHistory,
}

impl Probe {
    pub fn default_cadence(self) -> Duration {
        match self {
            Self::LastSignal => LIVE_CADENCE,
            Self::MinuteHistory => HISTORY_CADENCE,
        }
    }
}

/// One poll result, ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Sample {
    LastSignal(i64),
    /// History with empty slots already replaced by [`NO_DATA_FLOOR_DBM`].
    History(Vec<i64>),
}

/// Replace zero ("no sample") history entries with the display floor.
pub fn substitute_no_data(raw: &[i64]) -> Vec<i64> {
    raw.iter()
        .map(|&v| if v == 0 { NO_DATA_FLOOR_DBM } else { v })
        .collect()
}

/// Fetch and transform a single sample.
pub async fn fetch_sample(
    client: &KismetClient,
    mac: &str,
    probe: Probe,
) -> Result<Sample, CoreError> {
    let sample = match probe {
        Probe::LastSignal => Sample::LastSignal(client.last_signal(mac).await?),
        Probe::MinuteHistory => {
            Sample::History(substitute_no_data(&client.minute_history(mac).await?))
        }
    };
    Ok(sample)
}

/// Counters reported when a poll loop ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollSummary {
    pub samples: u64,
    pub session_failures: u64,
}

/// Polls one device until stopped.
pub struct Poller<'a> {
    client: &'a KismetClient,
    mac: String,
    probe: Probe,
    cadence: Duration,
}

impl<'a> Poller<'a> {
    pub fn new(client: &'a KismetClient, mac: impl Into<String>, probe: Probe) -> Self {
        Self {
            client,
            mac: mac.into(),
            probe,
            cadence: probe.default_cadence(),
        }
    }

    pub fn with_cadence(mut self, cadence: Duration) -> Self {
        self.cadence = cadence;
        self
    }

    /// Run until `cancel` fires or `sink` breaks.
    ///
    /// Each iteration re-checks the session (a failed check is logged, not
    /// fatal), fetches a sample and passes it to `sink` along with the
    /// counters so far. Fetch errors end the loop with that error.
    pub async fn run<F>(
        &self,
        cancel: &CancellationToken,
        mut sink: F,
    ) -> Result<PollSummary, CoreError>
    where
        F: FnMut(&Sample, &PollSummary) -> ControlFlow<()>,
    {
        let mut summary = PollSummary::default();
        let mut interval = tokio::time::interval(self.cadence);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                _ = interval.tick() => {}
            }

            if !self.client.check_session().await {
                summary.session_failures += 1;
                warn!(mac = %self.mac, "Session check failed");
            }

            let sample = fetch_sample(self.client, &self.mac, self.probe).await?;
            summary.samples += 1;

            if sink(&sample, &summary).is_break() {
                break;
            }
        }

        debug!(mac = %self.mac, samples = summary.samples, "poll loop stopped");
        Ok(summary)
    }
}
