//! Emulator settings

use std::ffi::OsString;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use vhal_proto::DEBUG_SOCKET_PORT;
use vhal_server::ServerConfig;

/// Emulator settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Address the debug socket listens on
    pub bind_address: String,
    /// Debug socket port
    pub port: u16,
    /// How often the server checks for shutdown while waiting for a harness
    pub accept_poll_ms: u64,
    /// Log filter used when RUST_LOG is not set
    pub log_filter: Option<String>,
    /// JSON catalog replacing the built-in vehicle
    pub catalog_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: DEBUG_SOCKET_PORT,
            accept_poll_ms: 100,
            log_filter: None,
            catalog_path: None,
        }
    }
}

impl Settings {
    /// Get the XDG config directory for the emulator
    /// Uses $XDG_CONFIG_HOME/vhal-emulator, falls back to ~/.config/vhal-emulator
    fn config_dir() -> Option<PathBuf> {
        config_dir_from(std::env::var_os("XDG_CONFIG_HOME"), dirs::home_dir())
    }

    /// Settings file to read: the explicit path if given, else the XDG location
    pub fn resolve_path(explicit: Option<PathBuf>) -> Option<PathBuf> {
        explicit.or_else(|| Self::config_dir().map(|p| p.join("settings.json")))
    }

    /// Load settings
    ///
    /// A missing file yields the defaults; an unreadable or invalid one is
    /// an error.
    pub fn load(explicit: Option<PathBuf>) -> anyhow::Result<Self> {
        match Self::resolve_path(explicit) {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load settings from a specific file
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e).with_context(|| format!("failed to read {}", path.display())),
        };
        serde_json::from_str(&json).with_context(|| format!("invalid settings in {}", path.display()))
    }

    /// Server configuration described by these settings
    pub fn server_config(&self) -> anyhow::Result<ServerConfig> {
        let ip: IpAddr = self
            .bind_address
            .parse()
            .with_context(|| format!("invalid bind address '{}'", self.bind_address))?;

        Ok(ServerConfig::new(SocketAddr::new(ip, self.port))
            .with_accept_poll(Duration::from_millis(self.accept_poll_ms.max(1))))
    }
}

fn config_dir_from(xdg_config_home: Option<OsString>, home: Option<PathBuf>) -> Option<PathBuf> {
    // Relative XDG paths are ignored per the base directory spec
    if let Some(xdg) = xdg_config_home.map(PathBuf::from) {
        if xdg.is_absolute() {
            return Some(xdg.join("vhal-emulator"));
        }
    }
    home.map(|h| h.join(".config").join("vhal-emulator"))
}
