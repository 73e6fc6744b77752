//! # Server Settings
//!
//! Settings for the demo binary, layered lowest to highest:
//!
//! 1. Defaults
//! 2. Optional TOML file (`--config inertia.toml`)
//! 3. `INERTIA_*` environment variables
//! 4. Command-line flags
//!
//! ```toml
//! host = "0.0.0.0"
//! port = 3000
//! root_view = "views/app.html"
//! container_id = "app"
//! asset_version = "2024-06-01"
//! ssr_url = "http://127.0.0.1:13714"
//! ssr_timeout_ms = 2000
//! encrypt_history = true
//! ```

use inertia_core::{InertiaError, VersionSource};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::adapter::render::DEFAULT_CONTAINER_ID;
use crate::adapter::ssr::DEFAULT_SSR_TIMEOUT;

/// Default bind host.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default bind port.
pub const DEFAULT_PORT: u16 = 3000;

// =============================================================================
// SETTINGS
// =============================================================================

/// Resolved settings for `inertia-axum serve`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// HTML shell file; the built-in shell is used when unset.
    pub root_view: Option<PathBuf>,
    pub container_id: String,
    /// Fixed asset version. Wins over `manifest`.
    pub asset_version: Option<String>,
    /// Build manifest to fingerprint into the asset version.
    pub manifest: Option<PathBuf>,
    /// SSR server base URL; SSR is off when unset.
    pub ssr_url: Option<String>,
    pub ssr_timeout_ms: u64,
    pub encrypt_history: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            root_view: None,
            container_id: DEFAULT_CONTAINER_ID.to_string(),
            asset_version: None,
            manifest: None,
            ssr_url: None,
            ssr_timeout_ms: u64::try_from(DEFAULT_SSR_TIMEOUT.as_millis()).unwrap_or(5000),
            encrypt_history: false,
        }
    }
}

impl ServerSettings {
    /// Parse settings from TOML source. Missing keys keep their defaults.
    pub fn from_toml(source: &str) -> Result<Self, InertiaError> {
        toml::from_str(source).map_err(|e| InertiaError::Config(format!("invalid settings: {}", e)))
    }

    /// Load settings from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, InertiaError> {
        let source = std::fs::read_to_string(path).map_err(|e| {
            InertiaError::Io(format!("cannot read settings '{}': {}", path.display(), e))
        })?;
        Self::from_toml(&source)
    }

    /// Apply `INERTIA_*` variables from the process environment.
    pub fn apply_env(&mut self) -> Result<(), InertiaError> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Apply `INERTIA_*` variables from `lookup`.
    ///
    /// Empty values are ignored.
    pub fn apply_env_from(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), InertiaError> {
        let var = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(host) = var("INERTIA_HOST") {
            self.host = host;
        }
        if let Some(port) = var("INERTIA_PORT") {
            self.port = parse_env("INERTIA_PORT", &port)?;
        }
        if let Some(path) = var("INERTIA_ROOT_VIEW") {
            self.root_view = Some(PathBuf::from(path));
        }
        if let Some(id) = var("INERTIA_CONTAINER_ID") {
            self.container_id = id;
        }
        if let Some(version) = var("INERTIA_ASSET_VERSION") {
            self.asset_version = Some(version);
        }
        if let Some(path) = var("INERTIA_MANIFEST") {
            self.manifest = Some(PathBuf::from(path));
        }
        if let Some(url) = var("INERTIA_SSR_URL") {
            self.ssr_url = Some(url);
        }
        if let Some(ms) = var("INERTIA_SSR_TIMEOUT_MS") {
            self.ssr_timeout_ms = parse_env("INERTIA_SSR_TIMEOUT_MS", &ms)?;
        }
        if let Some(flag) = var("INERTIA_ENCRYPT_HISTORY") {
            self.encrypt_history = parse_env("INERTIA_ENCRYPT_HISTORY", &flag)?;
        }
        Ok(())
    }

    /// `host:port` to bind.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn ssr_timeout(&self) -> Duration {
        Duration::from_millis(self.ssr_timeout_ms)
    }

    /// Asset version: fixed string, then manifest fingerprint, then default.
    pub fn version_source(&self) -> Result<VersionSource, InertiaError> {
        if let Some(version) = &self.asset_version {
            return Ok(VersionSource::fixed(version.clone()));
        }
        match &self.manifest {
            Some(path) => VersionSource::from_manifest(path),
            None => Ok(VersionSource::default()),
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, InertiaError> {
    raw.trim()
        .parse()
        .map_err(|_| InertiaError::Config(format!("{} has an invalid value: '{}'", key, raw)))
}

// =============================================================================
// TESTS
// =============================================================================
