//! CLI configuration: a thin layer over `kr_config` that applies
//! `GlobalOpts` flag overrides and builds the `KismetClient`.

use std::time::Duration;

use secrecy::SecretString;

use kr_api::{Credentials, KismetClient, TransportConfig};
use kr_config::{Config, ConfigError, Profile};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;

pub use kr_config::{config_path, load_config};

/// Everything a connected command needs.
pub struct Connection {
    pub client: KismetClient,
    pub profile_name: String,
    pub output: OutputFormat,
}

/// Load config, falling back to defaults when the file can't be read.
pub fn load_config_or_warn() -> Config {
    load_config().unwrap_or_else(|e| {
        tracing::warn!(error = %e, path = %config_path().display(), "ignoring unreadable config");
        Config::default()
    })
}

/// Resolve the active profile, failing with the list of known profiles.
pub fn active_profile(global: &GlobalOpts, config: &Config) -> Result<(String, Profile), CliError> {
    let name = config.profile_name(global.profile.as_deref());
    match config.profile(&name) {
        Ok(profile) => Ok((name, profile)),
        Err(ConfigError::UnknownProfile { profile }) => {
            let mut available: Vec<&str> = config.profiles.keys().map(String::as_str).collect();
            available.sort_unstable();
            Err(CliError::ProfileNotFound {
                name: profile,
                available: if available.is_empty() {
                    "(none)".into()
                } else {
                    available.join(", ")
                },
                path: config_path().display().to_string(),
            })
        }
        Err(e) => Err(e.into()),
    }
}

/// Output format: flag, then `defaults.output`, then table.
pub fn output_format(global: &GlobalOpts, config: &Config) -> OutputFormat {
    use clap::ValueEnum;

    global.output.unwrap_or_else(|| {
        OutputFormat::from_str(&config.defaults.output, true).unwrap_or(OutputFormat::Table)
    })
}

/// Build the transport settings: flag > profile > defaults.
pub fn transport(global: &GlobalOpts, profile: &Profile, config: &Config) -> TransportConfig {
    let timeout = global
        .timeout
        .or(profile.timeout)
        .unwrap_or(config.defaults.timeout);
    let retries = global
        .retries
        .or(profile.retries)
        .unwrap_or(config.defaults.retries);

    TransportConfig::default()
        .with_cookie_jar()
        .with_timeout(Duration::from_secs(timeout))
        .with_retries(retries)
}

/// Resolve credentials: flags and prompt first, then the profile chain.
pub fn credentials(
    global: &GlobalOpts,
    profile: &Profile,
    profile_name: &str,
) -> Result<Credentials, CliError> {
    let username = global
        .user
        .clone()
        .unwrap_or_else(|| kr_config::resolve_username(profile));

    let password = if let Some(ref pw) = global.password {
        SecretString::from(pw.clone())
    } else if global.ask_password {
        SecretString::from(rpassword::prompt_password("Password: ")?)
    } else {
        kr_config::resolve_password(profile, profile_name)
    };

    Ok(Credentials::new(username, password))
}

/// Load config, apply overrides and build the client.
pub fn connect(global: &GlobalOpts) -> Result<Connection, CliError> {
    let config = load_config_or_warn();
    let (profile_name, profile) = active_profile(global, &config)?;

    let server = global.server.as_deref().unwrap_or(&profile.server);
    let port = global.port.unwrap_or(profile.port);
    let base_url = kr_config::profile_url(server, port)?;

    let credentials = credentials(global, &profile, &profile_name)?;
    let transport = transport(global, &profile, &config);
    let output = output_format(global, &config);

    tracing::debug!(
        profile = %profile_name,
        server = %base_url,
        timeout = ?transport.timeout,
        retries = transport.retries,
        "resolved connection"
    );

    let client = KismetClient::new(base_url, credentials, &transport)?;
    Ok(Connection {
        client,
        profile_name,
        output,
    })
}
