// Daemon configuration
// Layered: optional TOML file from the project config dir, overridden by
// NETSHARE_* environment variables.

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct DaemonConfig {
    /// Privileged helper binary invoked for escalated operations.
    pub helper_path: String,
    /// Environment variables the helper may inherit.
    pub env_allowlist: Vec<String>,
    /// Helper execution deadline in milliseconds.
    pub helper_timeout_ms: u64,
    /// "pretty" or "json".
    pub log_format: String,
    /// When set, mirror logs into daily-rotated files in this directory.
    pub log_dir: Option<String>,
    /// Tethering targets to bring up at start and tear down at shutdown
    /// ("usb", "bluetooth", "ethernet", "wifi-legacy").
    pub targets: Vec<String>,
    /// Ask the platform to show the provisioning UI.
    pub show_ui: bool,
}

impl DaemonConfig {
    /// Default config file location, e.g.
    /// `~/.config/netshare/daemon.toml` on Linux.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "netshare").map(|dirs| dirs.config_dir().join("daemon.toml"))
    }

    pub fn load() -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("helper_path", "/usr/libexec/netshare-helper")?
            .set_default("env_allowlist", vec!["PATH", "HOME", "USER"])?
            .set_default("helper_timeout_ms", 30_000_i64)?
            .set_default("log_format", "pretty")?
            .set_default("targets", Vec::<String>::new())?
            .set_default("show_ui", false)?;

        if let Some(path) = Self::default_path() {
            builder = builder.add_source(File::from(path).required(false));
        }

        builder
            .add_source(Environment::with_prefix("NETSHARE").separator("__"))
            .build()
            .context("building configuration")?
            .try_deserialize()
            .context("deserializing configuration")
    }
}
