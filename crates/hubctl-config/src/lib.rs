//! Shared configuration for hubctl.
//!
//! TOML profiles, figment layering (defaults → file → `HUBCTL_*`
//! environment), and translation to `hubctl_core::HubConfig`. The CLI
//! adds flag-aware wrappers on top; the admin API carries no
//! authentication, so there is nothing secret to resolve here.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use hubctl_core::{HubConfig, TlsVerification};

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

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration shared by every hubctl binary.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named hub profiles.
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

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Base poll interval for device/subdevice/service stores.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Tightened interval while a fast-poll hold is active.
    #[serde(default = "default_fast_poll_interval")]
    pub fast_poll_interval_secs: u64,

    /// Poll interval for followed log feeds.
    #[serde(default = "default_log_poll_interval")]
    pub log_poll_interval_secs: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout_secs: default_timeout(),
            poll_interval_secs: default_poll_interval(),
            fast_poll_interval_secs: default_fast_poll_interval(),
            log_poll_interval_secs: default_log_poll_interval(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_poll_interval() -> u64 {
    10
}
fn default_fast_poll_interval() -> u64 {
    2
}
fn default_log_poll_interval() -> u64 {
    10
}

/// A named hub profile.
#[derive(Debug, Deserialize, Serialize)]
pub struct Profile {
    /// Hub base URL (e.g., "http://homeassistant.local:2002").
    pub hub: String,

    /// Skip TLS certificate verification.
    pub insecure: Option<bool>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override request timeout.
    pub timeout_secs: Option<u64>,

    /// Override the base poll interval (0 disables periodic polling).
    pub poll_interval_secs: Option<u64>,

    /// Override the fast poll interval.
    pub fast_poll_interval_secs: Option<u64>,

    /// Override the log feed poll interval.
    pub log_poll_interval_secs: Option<u64>,
}

impl Profile {
    /// A profile pointing at `hub` with everything else defaulted.
    pub fn new(hub: impl Into<String>) -> Self {
        Self {
            hub: hub.into(),
            insecure: None,
            ca_cert: None,
            timeout_secs: None,
            poll_interval_secs: None,
            fast_poll_interval_secs: None,
            log_poll_interval_secs: None,
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path.
///
/// `HUBCTL_CONFIG` overrides; otherwise XDG / platform conventions via
/// `ProjectDirs`.
pub fn config_path() -> PathBuf {
    if let Ok(path) = std::env::var("HUBCTL_CONFIG") {
        return PathBuf::from(path);
    }
    ProjectDirs::from("com", "hubctl", "hubctl").map_or_else(
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
    p.push("hubctl");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the full Config from a specific file + environment.
///
/// Layering, lowest to highest: built-in defaults, the TOML file,
/// `HUBCTL_*` environment variables (`__` separates nesting, so
/// `HUBCTL_DEFAULTS__OUTPUT=json` sets `defaults.output`).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("HUBCTL_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

/// Serialize config to TOML and write it to `path`.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Profile resolution ──────────────────────────────────────────────

/// Resolve the active profile name.
///
/// An explicit choice (flag or `HUBCTL_PROFILE`, already merged by the
/// caller) wins, then the config's `default_profile`, then "default".
pub fn active_profile_name(explicit: Option<&str>, config: &Config) -> String {
    explicit
        .map(str::to_owned)
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Build a `HubConfig` from a profile -- no CLI flag overrides.
///
/// This is the single boundary where config types cross into core
/// types. Unset profile fields fall back to `defaults`.
pub fn profile_to_hub_config(
    profile: &Profile,
    defaults: &Defaults,
) -> Result<HubConfig, ConfigError> {
    let url: url::Url = profile.hub.parse().map_err(|_| ConfigError::Validation {
        field: "hub".into(),
        reason: format!("invalid URL: {}", profile.hub),
    })?;

    let tls = if profile.insecure.unwrap_or(false) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    Ok(HubConfig {
        url,
        tls,
        timeout: Duration::from_secs(profile.timeout_secs.unwrap_or(defaults.timeout_secs)),
        poll_interval_secs: profile
            .poll_interval_secs
            .unwrap_or(defaults.poll_interval_secs),
        fast_poll_interval_secs: profile
            .fast_poll_interval_secs
            .unwrap_or(defaults.fast_poll_interval_secs),
        log_poll_interval_secs: profile
            .log_poll_interval_secs
            .unwrap_or(defaults.log_poll_interval_secs),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    fn extract(toml: &str) -> Config {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::string(toml))
            .extract()
            .unwrap()
    }

    #[test]
    fn defaults_fill_unset_fields() {
        let cfg = extract(
            r#"
            [profiles.home]
            hub = "http://hub.local:2002"
        "#,
        );

        assert_eq!(cfg.defaults.output, "table");
        assert_eq!(cfg.defaults.poll_interval_secs, 10);
        assert_eq!(cfg.defaults.fast_poll_interval_secs, 2);
        assert_eq!(cfg.default_profile.as_deref(), Some("default"));
        assert!(cfg.profiles.contains_key("home"));
    }

    #[test]
    fn profile_overrides_beat_defaults() {
        let cfg = extract(
            r#"
            [profiles.home]
            hub = "http://hub.local:2002"
            timeout_secs = 5
            poll_interval_secs = 0
        "#,
        );

        let hub = profile_to_hub_config(&cfg.profiles["home"], &cfg.defaults).unwrap();
        assert_eq!(hub.timeout, Duration::from_secs(5));
        assert_eq!(hub.poll_interval_secs, 0);
        assert_eq!(hub.fast_poll_interval_secs, 2);
    }

    #[test]
    fn insecure_wins_over_ca_cert() {
        let mut profile = Profile::new("https://hub.local:2002");
        profile.insecure = Some(true);
        profile.ca_cert = Some("/etc/ssl/hub.pem".into());

        let hub = profile_to_hub_config(&profile, &Defaults::default()).unwrap();
        assert_eq!(hub.tls, TlsVerification::DangerAcceptInvalid);
    }

    #[test]
    fn ca_cert_selects_custom_ca() {
        let mut profile = Profile::new("https://hub.local:2002");
        profile.ca_cert = Some("/etc/ssl/hub.pem".into());

        let hub = profile_to_hub_config(&profile, &Defaults::default()).unwrap();
        assert_eq!(
            hub.tls,
            TlsVerification::CustomCa(PathBuf::from("/etc/ssl/hub.pem"))
        );
    }

    #[test]
    fn invalid_hub_url_is_rejected() {
        let profile = Profile::new("not a url");

        let err = profile_to_hub_config(&profile, &Defaults::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { field, .. } if field == "hub"));
    }

    #[test]
    fn save_writes_parseable_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let cfg = Config {
            default_profile: Some("home".into()),
            profiles: HashMap::from([("home".into(), Profile::new("http://hub.local:2002"))]),
            ..Config::default()
        };
        save_config_to(&cfg, &path).unwrap();

        let reloaded: Config = toml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(reloaded.default_profile.as_deref(), Some("home"));
        assert_eq!(reloaded.profiles["home"].hub, "http://hub.local:2002");
    }

    #[test]
    fn active_profile_name_precedence() {
        let cfg = Config {
            default_profile: Some("home".into()),
            ..Config::default()
        };
        assert_eq!(active_profile_name(Some("office"), &cfg), "office");
        assert_eq!(active_profile_name(None, &cfg), "home");

        let cfg = Config {
            default_profile: None,
            ..Config::default()
        };
        assert_eq!(active_profile_name(None, &cfg), "default");
    }
}
