//! Clap derive structures for the `kr` CLI.
//!
//! Only clap and clap_complete are used here so build.rs can include this
//! file to render man pages.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// kr -- tune Kismet datasources and watch device signal strength
#[derive(Debug, Parser)]
#[command(
    name = "kr",
    version,
    about = "Tune Kismet datasources and watch device signal strength",
    long_about = "Talks to a Kismet server's REST interface.\n\n\
        Every command checks the session first and exits with status 1 on\n\
        an invalid login.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// User name to log into Kismet with
    #[arg(short = 'u', long = "user", global = true)]
    pub user: Option<String>,

    /// Prompt for the password
    #[arg(short = 'p', long = "ask-password", global = true)]
    pub ask_password: bool,

    /// Password to log into Kismet with
    #[arg(short = 'P', long, global = true)]
    pub password: Option<String>,

    /// IP or hostname of the Kismet server [default: localhost]
    #[arg(short = 's', long, env = "KR_SERVER", global = true)]
    pub server: Option<String>,

    /// Kismet REST port [default: 2501]
    #[arg(long, env = "KR_PORT", global = true)]
    pub port: Option<u16>,

    /// Config profile to use
    #[arg(long, env = "KR_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Request timeout in seconds
    #[arg(long, env = "KR_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Extra GET attempts after a timeout
    #[arg(long, env = "KR_RETRIES", global = true)]
    pub retries: Option<u32>,

    /// Output format [default: table]
    #[arg(long, short = 'o', env = "KR_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one name per line
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Color when stdout is a terminal
    Auto,
    Always,
    Never,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Tune one or more datasources to a channel
    Tune(TuneArgs),

    /// Live signal readout for one device
    Rssi(DeviceArgs),

    /// Chart a device's one-minute signal history
    Graph(DeviceArgs),

    /// List datasources
    #[command(alias = "ds")]
    Sources,

    /// List interfaces the server has probed
    #[command(alias = "ifaces")]
    Interfaces,

    /// Inspect CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct TuneArgs {
    /// Channel to tune to, passed to Kismet as-is (e.g. 6, 36HT40+)
    #[arg(short = 'c', long)]
    pub channel: String,

    /// Datasources or interfaces to tune
    #[arg(value_name = "SRC", required = true)]
    pub sources: Vec<String>,

    /// Keep tuning the remaining sources when one fails
    #[arg(long)]
    pub isolate: bool,

    /// Seconds to wait for added interfaces to show up as datasources (0 disables)
    #[arg(long, value_name = "SECS", default_value_t = 10)]
    pub provision_timeout: u64,
}

#[derive(Debug, Args)]
pub struct DeviceArgs {
    /// MAC address of the device to monitor
    #[arg(short = 'm', long)]
    pub mac: String,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file location
    Path,
    /// Print the effective configuration (passwords masked)
    Show,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
