//! CLI-owned configuration: TOML file, environment, and CLI-flag
//! resolution into a `TransportConfig` + base URL.
//!
//! Core never sees these types -- it receives pre-built settings.

use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use url::Url;

use doorlink_api::transport::{TlsMode, TransportConfig};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── TOML config ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Appliance base URL.
    pub appliance: Option<String>,

    /// Accept self-signed TLS certificates.
    #[serde(default)]
    pub insecure: bool,

    /// Custom CA certificate (PEM) for the appliance.
    #[serde(default)]
    pub ca_cert: Option<PathBuf>,

    /// HTTP timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            appliance: None,
            insecure: false,
            ca_cert: None,
            timeout: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    10
}

/// `$XDG_CONFIG_HOME/doorlink/config.toml` (platform equivalent).
pub fn config_path() -> PathBuf {
    ProjectDirs::from("io", "doorlink", "doorlink")
        .map(|dirs| dirs.config_dir().join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("doorlink.toml"))
}

/// Load config from file and environment; missing file means defaults.
pub fn load() -> Config {
    Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(config_path()))
        .merge(Env::prefixed("DOORLINK_"))
        .extract()
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to load config, using defaults");
            Config::default()
        })
}

// ── Resolution ───────────────────────────────────────────────────────

/// Fully resolved settings for building a session.
#[derive(Debug)]
pub struct Settings {
    pub base_url: Url,
    pub transport: TransportConfig,
}

/// Resolve settings from config file + environment + CLI overrides,
/// CLI flags winning.
pub fn resolve(global: &GlobalOpts) -> Result<Settings, CliError> {
    let cfg = load();
    resolve_with(global, cfg)
}

fn resolve_with(global: &GlobalOpts, cfg: Config) -> Result<Settings, CliError> {
    let url_str = global
        .appliance
        .clone()
        .or(cfg.appliance)
        .ok_or_else(|| CliError::NoAppliance {
            path: config_path().display().to_string(),
        })?;

    let base_url: Url = url_str
        .parse()
        .map_err(|_| CliError::InvalidUrl { url: url_str.clone() })?;

    let tls = if global.insecure || cfg.insecure {
        TlsMode::DangerAcceptInvalid
    } else if let Some(path) = cfg.ca_cert {
        TlsMode::CustomCa(path)
    } else {
        TlsMode::System
    };

    let timeout = Duration::from_secs(global.timeout.unwrap_or(cfg.timeout));

    Ok(Settings {
        base_url,
        transport: TransportConfig { tls, timeout },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn global(appliance: Option<&str>) -> GlobalOpts {
        GlobalOpts {
            appliance: appliance.map(String::from),
            insecure: false,
            timeout: None,
            yes: false,
            verbose: 0,
        }
    }

    #[test]
    fn cli_flag_wins_over_config() {
        let cfg = Config {
            appliance: Some("http://from-config:8080".into()),
            ..Config::default()
        };
        let settings = resolve_with(&global(Some("http://from-flag:8080")), cfg).unwrap();
        assert_eq!(settings.base_url.as_str(), "http://from-flag:8080/");
    }

    #[test]
    fn missing_appliance_is_an_error() {
        let err = resolve_with(&global(None), Config::default()).unwrap_err();
        assert!(matches!(err, CliError::NoAppliance { .. }));
    }

    #[test]
    fn invalid_url_is_rejected() {
        let err = resolve_with(&global(Some("not a url")), Config::default()).unwrap_err();
        assert!(matches!(err, CliError::InvalidUrl { .. }));
    }

    #[test]
    fn insecure_flag_selects_permissive_tls() {
        let mut g = global(Some("https://alarm.local"));
        g.insecure = true;
        let settings = resolve_with(&g, Config::default()).unwrap();
        assert!(matches!(
            settings.transport.tls,
            TlsMode::DangerAcceptInvalid
        ));
    }

    #[test]
    fn default_timeout_applies() {
        let settings =
            resolve_with(&global(Some("http://alarm.local:8080")), Config::default()).unwrap();
        assert_eq!(settings.transport.timeout, Duration::from_secs(10));
    }
}
