//! `kr rssi`: live signal readout with a colored bar.

use std::fmt::Write as _;
use std::io::{self, Write};
use std::ops::ControlFlow;

use owo_colors::{AnsiColors, OwoColorize};
use tokio_util::sync::CancellationToken;

use kr_core::{Poller, Probe, Sample};

use crate::cli::{DeviceArgs, GlobalOpts, OutputFormat};
use crate::config::Connection;
use crate::error::CliError;
use crate::output;

/// Cells in the bar.
const BAR_WIDTH: usize = 40;

/// Signal mapped to an empty / full bar, in dBm.
const RSSI_MIN: i64 = -100;
const RSSI_MAX: i64 = 0;

/// Band colors, weakest first; each covers a fifth of the bar.
const BANDS: [AnsiColors; 5] = [
    AnsiColors::BrightMagenta,
    AnsiColors::BrightBlue,
    AnsiColors::BrightGreen,
    AnsiColors::BrightYellow,
    AnsiColors::BrightRed,
];

pub async fn handle(
    conn: &Connection,
    args: &DeviceArgs,
    global: &GlobalOpts,
    cancel: &CancellationToken,
) -> Result<(), CliError> {
    let color = output::should_color(global.color);
    let live = conn.output == OutputFormat::Table;
    let mut stdout = io::stdout();

    let result = Poller::new(&conn.client, &args.mac, Probe::LastSignal)
        .run(cancel, |sample, _| {
            let Sample::LastSignal(dbm) = *sample else {
                return ControlFlow::Continue(());
            };
            let line = if live {
                format!("\r{} {dbm} dBm {}", args.mac, render_bar(percent(dbm), color))
            } else {
                format!("{}\n", render_sample(conn.output, &args.mac, dbm))
            };
            // A closed stdout ends the readout.
            match stdout.write_all(line.as_bytes()).and_then(|()| stdout.flush()) {
                Ok(()) => ControlFlow::Continue(()),
                Err(_) => ControlFlow::Break(()),
            }
        })
        .await;

    if live {
        println!();
    }
    let summary = result?;
    tracing::debug!(
        samples = summary.samples,
        session_failures = summary.session_failures,
        "rssi stopped"
    );
    Ok(())
}

/// Position of `dbm` between [`RSSI_MIN`] and [`RSSI_MAX`], clamped to 0-100.
#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
pub fn percent(dbm: i64) -> f64 {
    let span = (RSSI_MAX - RSSI_MIN) as f64;
    (((dbm - RSSI_MIN) as f64) / span * 100.0).clamp(0.0, 100.0)
}

/// Number of filled cells for a percentage.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::as_conversions
)]
fn filled_cells(percent: f64) -> usize {
    ((BAR_WIDTH as f64) * percent / 100.0).floor() as usize
}

fn band_index(cell: usize) -> usize {
    (cell * BANDS.len() / BAR_WIDTH).min(BANDS.len() - 1)
}

/// `[=====     ]`, each `=` colored by the band it falls in.
pub fn render_bar(percent: f64, color: bool) -> String {
    let filled = filled_cells(percent);
    let mut bar = String::with_capacity(BAR_WIDTH * 12);
    bar.push('[');
    for cell in 0..BAR_WIDTH {
        if cell < filled {
            if color {
                let _ = write!(bar, "{}", "=".color(BANDS[band_index(cell)]).bold());
            } else {
                bar.push('=');
            }
        } else {
            bar.push(' ');
        }
    }
    bar.push(']');
    bar
}

fn render_sample(format: OutputFormat, mac: &str, dbm: i64) -> String {
    #[derive(serde::Serialize)]
    struct Reading<'a> {
        mac: &'a str,
        signal_dbm: i64,
    }

    // One record per line for structured formats.
    let format = match format {
        OutputFormat::Json => OutputFormat::JsonCompact,
        other => other,
    };
    output::render_single(
        format,
        &Reading {
            mac,
            signal_dbm: dbm,
        },
        |r| r.signal_dbm.to_string(),
    )
}
