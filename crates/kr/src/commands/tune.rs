//! `kr tune`: reconcile datasources and tune them to one channel.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use kr_core::{FailurePolicy, SourceOrigin, TuneOptions, TuneReport, TuneStatus};

use crate::cli::{GlobalOpts, TuneArgs};
use crate::config::Connection;
use crate::error::CliError;
use crate::output;

use super::status;

pub async fn handle(
    conn: &Connection,
    args: &TuneArgs,
    global: &GlobalOpts,
    cancel: &CancellationToken,
) -> Result<(), CliError> {
    let options = options(args, cancel);
    let report =
        kr_core::tune_sources(&conn.client, &args.sources, &args.channel, &options).await?;

    let out = output::render_single(conn.output, &report, progress_lines);
    output::print_output(&out, global.quiet);
    if report.cancelled().next().is_some() {
        status(global, "Interrupted");
    }

    let failed: Vec<&str> = report.failed().map(|o| o.name.as_str()).collect();
    if failed.is_empty() {
        Ok(())
    } else {
        Err(CliError::PartialTune {
            names: failed.join(", "),
        })
    }
}

fn options(args: &TuneArgs, cancel: &CancellationToken) -> TuneOptions {
    TuneOptions {
        policy: if args.isolate {
            FailurePolicy::Isolate
        } else {
            FailurePolicy::AbortOnError
        },
        provision_timeout: (args.provision_timeout > 0)
            .then(|| Duration::from_secs(args.provision_timeout)),
        cancel: cancel.clone(),
        ..TuneOptions::default()
    }
}

/// One human-readable line per source, in input order.
fn progress_lines(report: &TuneReport) -> String {
    report
        .outcomes
        .iter()
        .map(|o| {
            let found = match o.origin {
                Some(SourceOrigin::Existing) => format!("Source {} found. ", o.name),
                Some(SourceOrigin::Added) => {
                    format!("Interface {} found, added as a datasource. ", o.name)
                }
                None => String::new(),
            };
            let result = match &o.status {
                TuneStatus::Tuned { .. } => {
                    format!("Tuned data source {} to channel {}", o.name, report.channel)
                }
                TuneStatus::Skipped => format!("No interface named {}, ignoring", o.name),
                TuneStatus::Unresolved => {
                    format!("No UUID for data source {}, not tuned", o.name)
                }
                TuneStatus::Failed { error, .. } => {
                    format!("Failed to tune data source {}: {error}", o.name)
                }
                TuneStatus::Cancelled => format!("Interrupted, data source {} not tuned", o.name),
            };
            format!("{found}{result}")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
