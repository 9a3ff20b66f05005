//! Configuration for nestly.
//!
//! One TOML file merged with `NESTLY_*` environment variables, the
//! persisted "last selected device", credential lookup (env + keyring),
//! and translation to `nestly_core::TransportConfig`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use nestly_core::{TlsVersion, TransportConfig};

/// Keyring service name; the entry user is the account email.
pub const KEYRING_SERVICE: &str = "nestly";

const ENV_PREFIX: &str = "NESTLY_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

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

// ── Config ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Account email. Used for the keyring lookup and as the prompt default.
    pub email: Option<String>,

    /// Where the session file lives. Defaults to the platform cache dir.
    pub cache_dir: Option<PathBuf>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Pin the TLS protocol version ("1.0" .. "1.3").
    pub tls_version: Option<String>,

    #[serde(default = "default_login_url")]
    pub login_url: String,

    /// Default output format.
    #[serde(default = "default_output")]
    pub output: String,

    /// Device id of the last thermostat the user picked.
    pub last_device: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            email: None,
            cache_dir: None,
            timeout: default_timeout(),
            tls_version: None,
            login_url: default_login_url(),
            output: default_output(),
            last_device: None,
        }
    }
}

fn default_timeout() -> u64 {
    10
}
fn default_login_url() -> String {
    nestly_core::DEFAULT_LOGIN_URL.into()
}
fn default_output() -> String {
    "alfred".into()
}

impl Config {
    /// Build the HTTP transport settings this config describes.
    pub fn transport_config(&self) -> Result<TransportConfig, ConfigError> {
        let login_url = self
            .login_url
            .parse::<url::Url>()
            .map_err(|e| ConfigError::Validation {
                field: "login_url".into(),
                reason: format!("{e}: {}", self.login_url),
            })?;

        let tls_version = self
            .tls_version
            .as_deref()
            .map(str::parse::<TlsVersion>)
            .transpose()
            .map_err(|e| ConfigError::Validation {
                field: "tls_version".into(),
                reason: e.to_string(),
            })?;

        Ok(TransportConfig::default()
            .with_timeout(Duration::from_secs(self.timeout))
            .with_tls_version(tls_version)
            .with_login_url(login_url))
    }

    /// The session directory: the configured override or the platform cache dir.
    pub fn resolved_cache_dir(&self) -> PathBuf {
        self.cache_dir.clone().unwrap_or_else(default_cache_dir)
    }
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "nestly", "nestly")
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || home_fallback(".config").join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

pub fn default_cache_dir() -> PathBuf {
    project_dirs().map_or_else(
        || home_fallback(".cache"),
        |dirs| dirs.cache_dir().to_path_buf(),
    )
}

fn home_fallback(kind: &str) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(kind);
    p.push("nestly");
    p
}

// ── Loading / saving ────────────────────────────────────────────────

/// Load the config from `path` + environment. A missing file is fine.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let config: Config = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).ignore(&["password"]))
        .extract()?;
    Ok(config)
}

/// Serialize config to TOML and write it to `path`.
pub fn save_config_to(path: &Path, cfg: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, toml::to_string_pretty(cfg)?)?;
    Ok(())
}

/// Remember `device_id` as the selected thermostat.
///
/// Reads the file alone (no env overlay) so environment overrides are
/// never written back.
pub fn set_last_device(path: &Path, device_id: &str) -> Result<(), ConfigError> {
    let mut cfg: Config = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .extract()?;
    cfg.last_device = Some(device_id.to_owned());
    save_config_to(path, &cfg)
}

// ── Credentials ─────────────────────────────────────────────────────

/// Email from `NESTLY_EMAIL` or the config file.
pub fn resolve_email(cfg: &Config) -> Option<String> {
    std::env::var(format!("{ENV_PREFIX}EMAIL"))
        .ok()
        .filter(|e| !e.is_empty())
        .or_else(|| cfg.email.clone())
}

/// Password for `email`: `NESTLY_PASSWORD`, then the system keyring.
/// `None` means the caller has to ask.
pub fn resolve_password(email: &str) -> Option<SecretString> {
    // 1. Env var
    if let Some(pw) = std::env::var(format!("{ENV_PREFIX}PASSWORD"))
        .ok()
        .filter(|pw| !pw.is_empty())
    {
        return Some(SecretString::from(pw));
    }

    // 2. Keyring
    keyring::Entry::new(KEYRING_SERVICE, email)
        .and_then(|entry| entry.get_password())
        .ok()
        .map(SecretString::from)
}
