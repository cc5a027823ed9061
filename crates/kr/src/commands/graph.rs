//! `kr graph`: full-screen chart of a device's one-minute signal history.
//!
//! The poller draws each sample synchronously. A background task reads
//! terminal events and stops the poller on `q`, `Esc` or `Ctrl-C` (raw
//! mode swallows SIGINT, so Ctrl-C arrives as a key). Log output is paused
//! while the screen is up; session check failures show in the help line.

use std::io::{self, Stdout, stdout};
use std::ops::ControlFlow;

use crossterm::{
    ExecutableCommand, cursor,
    event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, Block, BorderType, Borders, Chart, Dataset, GraphType, Paragraph},
};
use tokio_util::sync::CancellationToken;

use kr_core::{NO_DATA_FLOOR_DBM, Poller, Probe, Sample};

use crate::cli::DeviceArgs;
use crate::config::Connection;
use crate::error::CliError;
use crate::logging::{self, PausedStderr};

const LINE: Color = Color::Rgb(225, 53, 255);
const TITLE: Color = Color::Rgb(128, 255, 234);
const MUTED: Color = Color::Rgb(98, 114, 164);
const WARN: Color = Color::Rgb(241, 250, 140);

/// Width of the x axis: one minute of RRD slots.
const X_SPAN: f64 = 60.0;

pub async fn handle(
    conn: &Connection,
    args: &DeviceArgs,
    cancel: &CancellationToken,
) -> Result<(), CliError> {
    let stop = cancel.child_token();
    let keys = spawn_key_listener(stop.clone());

    let mut screen = Screen::enter()?;
    screen.terminal.draw(|f| render(f, &args.mac, &[], 0))?;

    let mut draw_error = None;
    let result = Poller::new(&conn.client, &args.mac, Probe::MinuteHistory)
        .run(&stop, |sample, counts| {
            let Sample::History(history) = sample else {
                return ControlFlow::Continue(());
            };
            let failures = counts.session_failures;
            match screen.terminal.draw(|f| render(f, &args.mac, history, failures)) {
                Ok(_) => ControlFlow::Continue(()),
                Err(e) => {
                    draw_error = Some(e);
                    ControlFlow::Break(())
                }
            }
        })
        .await;

    stop.cancel();
    drop(screen);
    let _ = keys.await;

    if let Some(e) = draw_error {
        return Err(e.into());
    }
    result?;
    Ok(())
}

// ── Terminal lifecycle ──────────────────────────────────────────────

/// Alternate screen + raw mode for as long as it lives.
struct Screen {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    // Dropped after the terminal is restored.
    _logs: PausedStderr,
}

impl Screen {
    fn enter() -> io::Result<Self> {
        let logs = logging::pause_stderr();
        terminal::enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;
        stdout().execute(cursor::Hide)?;
        let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
        terminal.clear()?;
        Ok(Self {
            terminal,
            _logs: logs,
        })
    }
}

impl Drop for Screen {
    fn drop(&mut self) {
        // Best-effort restoration
        let _ = stdout().execute(cursor::Show);
        let _ = stdout().execute(LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

// ── Input ───────────────────────────────────────────────────────────

fn is_quit(key: &KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

fn spawn_key_listener(stop: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut events = EventStream::new();
        loop {
            tokio::select! {
                () = stop.cancelled() => break,
                event = events.next() => match event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press && is_quit(&key) => {
                        stop.cancel();
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(_)) | None => break,
                },
            }
        }
    })
}

// ── Rendering ───────────────────────────────────────────────────────

/// Spread `history` evenly across [0, 60].
#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
fn points(history: &[i64]) -> Vec<(f64, f64)> {
    let step = if history.len() > 1 {
        X_SPAN / (history.len() - 1) as f64
    } else {
        0.0
    };
    history
        .iter()
        .enumerate()
        .map(|(i, &dbm)| (i as f64 * step, dbm as f64))
        .collect()
}

#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
fn render(frame: &mut Frame, mac: &str, history: &[i64], session_failures: u64) {
    let [chart_area, help_area] =
        Layout::vertical([Constraint::Min(3), Constraint::Length(1)]).areas(frame.area());

    let data = points(history);
    let dataset = Dataset::default()
        .name("dBm")
        .marker(Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(LINE))
        .data(&data);

    let block = Block::default()
        .title(format!(" RSSI for {mac} "))
        .title_style(Style::default().fg(TITLE).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(MUTED));

    let floor = NO_DATA_FLOOR_DBM as f64;
    let axis_style = Style::default().fg(MUTED);
    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .title("RRD Samples")
                .style(axis_style)
                .bounds([0.0, X_SPAN])
                .labels(["0", "30", "60"].map(|l| Span::styled(l, axis_style))),
        )
        .y_axis(
            Axis::default()
                .title("dBm")
                .style(axis_style)
                .bounds([floor, 0.0])
                .labels(["-100", "-50", "0"].map(|l| Span::styled(l, axis_style))),
        );
    frame.render_widget(chart, chart_area);

    let last = history
        .last()
        .map_or_else(|| "waiting for data".to_owned(), |dbm| format!("last {dbm} dBm"));
    let mut help = vec![Span::styled(format!(" {last} "), Style::default().fg(TITLE))];
    if session_failures > 0 {
        help.push(Span::styled(
            format!(" session check failed {session_failures}x "),
            Style::default().fg(WARN),
        ));
    }
    help.push(Span::styled(" q/Esc quit ", axis_style));
    let help = Line::from(help);
    frame.render_widget(Paragraph::new(help), help_area);
}
