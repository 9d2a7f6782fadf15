use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{LogAlertError, Result};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Region used in both console deep links.
    pub region: String,
    /// Human-facing name of the monitored system, shown in notifications.
    pub system_name: String,
    /// Destination event bus identifier carried on every publish entry.
    pub event_bus_name: String,
    /// PutEvents endpoint the HTTP bus client posts to, if any.
    pub bus_endpoint: Option<String>,
    pub publish_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            region: "us-east-1".to_string(),
            system_name: "unknown".to_string(),
            event_bus_name: "default".to_string(),
            bus_endpoint: None,
            publish_timeout: Duration::from_secs(5),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut cfg = Self::default();
        let config_path = config_file_path();
        if let Some(file_overrides) = load_file_overrides(&config_path)? {
            apply_overrides(&mut cfg, file_overrides, "config file")?;
        }
        let env_overrides = load_env_overrides();
        apply_overrides(&mut cfg, env_overrides, "environment")?;
        Ok(cfg)
    }

    pub fn from_env() -> Result<Self> {
        let mut cfg = Self::default();
        let env_overrides = load_env_overrides();
        apply_overrides(&mut cfg, env_overrides, "environment")?;
        Ok(cfg)
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigOverrides {
    region: Option<String>,
    system_name: Option<String>,
    event_bus_name: Option<String>,
    bus_endpoint: Option<String>,
    publish_timeout: Option<String>,
}

fn config_file_path() -> PathBuf {
    if let Ok(path) = env::var("LOGALERT_CONFIG") {
        return PathBuf::from(path);
    }

    let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
    let config_home = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(home).join(".config"));
    config_home.join("logalert/config.toml")
}

fn load_file_overrides(path: &PathBuf) -> Result<Option<ConfigOverrides>> {
    if !path.exists() {
        return Ok(None);
    }

    let raw = fs::read_to_string(path)
        .map_err(|e| LogAlertError::Config(format!("failed reading {}: {e}", path.display())))?;
    let parsed: ConfigOverrides = toml::from_str(&raw)
        .map_err(|e| LogAlertError::Config(format!("failed parsing {}: {e}", path.display())))?;
    Ok(Some(parsed))
}

fn load_env_overrides() -> ConfigOverrides {
    ConfigOverrides {
        region: env::var("LOGALERT_REGION").ok(),
        system_name: env::var("LOGALERT_SYSTEM_NAME").ok(),
        event_bus_name: env::var("LOGALERT_EVENT_BUS_NAME").ok(),
        bus_endpoint: env::var("LOGALERT_BUS_ENDPOINT").ok(),
        publish_timeout: env::var("LOGALERT_PUBLISH_TIMEOUT").ok(),
    }
}

fn apply_overrides(cfg: &mut Config, overrides: ConfigOverrides, source: &str) -> Result<()> {
    if let Some(v) = overrides.region {
        cfg.region = v;
    }
    if let Some(v) = overrides.system_name {
        cfg.system_name = v;
    }
    if let Some(v) = overrides.event_bus_name {
        cfg.event_bus_name = v;
    }
    if let Some(v) = overrides.bus_endpoint {
        cfg.bus_endpoint = Some(v);
    }
    if let Some(v) = overrides.publish_timeout {
        cfg.publish_timeout = humantime::parse_duration(&v).map_err(|e| {
            LogAlertError::Config(format!("bad publish_timeout in {source}: {e} (value={v})"))
        })?;
    }
    Ok(())
}
