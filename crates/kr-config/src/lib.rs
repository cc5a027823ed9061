//! Shared configuration for the kr tools.
//!
//! TOML profiles, `KR_` environment overlay, and credential resolution
//! (env + keyring + plaintext). The CLI layers its flag overrides on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use kr_api::DEFAULT_PORT;

/// Keyring service name for stored passwords.
pub const KEYRING_SERVICE: &str = "kr";

/// Environment variable consulted for the password after `password_env`.
pub const PASSWORD_ENV: &str = "KR_PASSWORD";

/// Environment variable consulted for the username when no profile sets one.
pub const USERNAME_ENV: &str = "KR_USERNAME";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{profile}' is not defined")]
    UnknownProfile { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when `--profile` is not given.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named server profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Extra GET attempts after a timeout.
    #[serde(default = "default_retries")]
    pub retries: u32,

    #[serde(default = "default_output")]
    pub output: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            retries: default_retries(),
            output: default_output(),
        }
    }
}

fn default_timeout() -> u64 {
    5
}
fn default_retries() -> u32 {
    1
}
fn default_output() -> String {
    "table".into()
}

/// A named Kismet server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    #[serde(default = "default_server")]
    pub server: String,

    #[serde(default = "default_port")]
    pub port: u16,

    pub username: Option<String>,

    /// Plaintext password. Prefer the keyring or `password_env`.
    pub password: Option<String>,

    /// Name of an environment variable holding the password.
    pub password_env: Option<String>,

    pub timeout: Option<u64>,

    pub retries: Option<u32>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            server: default_server(),
            port: default_port(),
            username: None,
            password: None,
            password_env: None,
            timeout: None,
            retries: None,
        }
    }
}

fn default_server() -> String {
    "localhost".into()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Config {
    /// `override_name`, else `default_profile`, else `"default"`.
    pub fn profile_name(&self, override_name: Option<&str>) -> String {
        override_name
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into())
    }

    /// Look up a profile. An undefined `"default"` profile is the built-in one.
    pub fn profile(&self, name: &str) -> Result<Profile, ConfigError> {
        match self.profiles.get(name) {
            Some(profile) => Ok(profile.clone()),
            None if name == "default" => Ok(Profile::default()),
            None => Err(ConfigError::UnknownProfile {
                profile: name.into(),
            }),
        }
    }

    /// Copy with plaintext passwords masked.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let profiles = self
            .profiles
            .iter()
            .map(|(name, profile)| {
                let mut profile = profile.clone();
                if profile.password.is_some() {
                    profile.password = Some("********".into());
                }
                (name.clone(), profile)
            })
            .collect();
        Self {
            default_profile: self.default_profile.clone(),
            defaults: self.defaults.clone(),
            profiles,
        }
    }

    /// Render as TOML with plaintext passwords masked.
    pub fn to_redacted_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(&self.redacted())?)
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "kr", "kr").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("kr");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file path + environment. A missing file is not an error.
///
/// Nested keys come from `KR_` variables split on `__`, e.g.
/// `KR_DEFAULTS__TIMEOUT=10` or `KR_PROFILES__LAB__SERVER=10.0.0.5`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("KR_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Profile translation ─────────────────────────────────────────────

/// Validate `server`/`port` and build the `http://server:port/` base URL.
pub fn profile_url(server: &str, port: u16) -> Result<Url, ConfigError> {
    if server.trim().is_empty() {
        return Err(ConfigError::Validation {
            field: "server".into(),
            reason: "must not be empty".into(),
        });
    }
    kr_api::server_url(server, port).map_err(|e| ConfigError::Validation {
        field: "server".into(),
        reason: format!("'{server}': {e}"),
    })
}

// ── Credential resolution (without CLI flags) ───────────────────────

/// Username from the profile, then `KR_USERNAME`, else empty.
pub fn resolve_username(profile: &Profile) -> String {
    username_chain(profile, |name| std::env::var(name).ok())
}

/// Password from the profile's `password_env`, `KR_PASSWORD`, the system
/// keyring (`kr`, `<profile>/password`), then plaintext. Empty when none is set.
pub fn resolve_password(profile: &Profile, profile_name: &str) -> SecretString {
    password_chain(
        profile,
        profile_name,
        |name| std::env::var(name).ok(),
        keyring_password,
    )
}

fn keyring_password(profile_name: &str) -> Option<String> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/password"))
        .ok()?
        .get_password()
        .ok()
}

fn username_chain(profile: &Profile, env: impl Fn(&str) -> Option<String>) -> String {
    profile
        .username
        .clone()
        .or_else(|| env(USERNAME_ENV))
        .unwrap_or_default()
}

fn password_chain(
    profile: &Profile,
    profile_name: &str,
    env: impl Fn(&str) -> Option<String>,
    keyring: impl Fn(&str) -> Option<String>,
) -> SecretString {
    // 1. Profile's password_env
    if let Some(pw) = profile.password_env.as_deref().and_then(&env) {
        return SecretString::from(pw);
    }

    // 2. KR_PASSWORD
    if let Some(pw) = env(PASSWORD_ENV) {
        return SecretString::from(pw);
    }

    // 3. System keyring
    if let Some(pw) = keyring(profile_name) {
        return SecretString::from(pw);
    }

    // 4. Plaintext in config
    SecretString::from(profile.password.clone().unwrap_or_default())
}
