//! Config file discovery and loading
//!
//! The first location that exists wins:
//! 1. `--config <path>` (always used, even if missing, so typos surface as errors)
//! 2. `$HEATWATCH_CONFIG`
//! 3. `./heatwatch.toml`
//! 4. `$XDG_CONFIG_HOME/heatwatch/heatwatch.toml` (or `~/.config/heatwatch/`)
//! 5. `/etc/heatwatch/heatwatch.toml`
//!
//! Values from the file are merged under CLI flags and env vars by the binary.

use std::env;
use std::fmt;
use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use log::debug;
use serde::de::DeserializeOwned;

use crate::APP_NAME;

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    Flag(PathBuf),
    Environment(PathBuf),
    WorkingDir(PathBuf),
    UserConfig(PathBuf),
    System(PathBuf),
    Defaults,
}

impl ConfigSource {
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            ConfigSource::Flag(p)
            | ConfigSource::Environment(p)
            | ConfigSource::WorkingDir(p)
            | ConfigSource::UserConfig(p)
            | ConfigSource::System(p) => Some(p),
            ConfigSource::Defaults => None,
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.path() {
            Some(p) => write!(f, "{}", p.display()),
            None => write!(f, "(defaults)"),
        }
    }
}

/// Locate the config file for `filename`, honoring an explicit path first.
pub fn find_config_file(explicit: Option<&str>, env_var: &str, filename: &str) -> ConfigSource {
    if let Some(path) = explicit {
        return ConfigSource::Flag(PathBuf::from(path));
    }

    if let Some(path) = env::var_os(env_var).map(PathBuf::from) {
        if path.exists() {
            return ConfigSource::Environment(path);
        }
        debug!("{} points at {}, which does not exist", env_var, path.display());
    }

    let candidates: [(PathBuf, fn(PathBuf) -> ConfigSource); 3] = [
        (PathBuf::from(filename), ConfigSource::WorkingDir),
        (get_xdg_config_dir().join(filename), ConfigSource::UserConfig),
        (
            PathBuf::from("/etc").join(APP_NAME).join(filename),
            ConfigSource::System,
        ),
    ];

    candidates
        .into_iter()
        .find(|(path, _)| path.exists())
        .map(|(path, source)| source(path))
        .unwrap_or(ConfigSource::Defaults)
}

/// `$XDG_CONFIG_HOME/heatwatch`, falling back to `~/.config/heatwatch`
pub fn get_xdg_config_dir() -> PathBuf {
    let base = env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
        .unwrap_or_else(|| PathBuf::from(".config"));
    base.join(APP_NAME)
}

/// Parse the TOML file behind `source`, or return `T::default()` when there is none.
pub fn load_config<T: DeserializeOwned + Default>(source: &ConfigSource) -> anyhow::Result<T> {
    let Some(path) = source.path() else {
        return Ok(T::default());
    };
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("invalid config file {}", path.display()))
}
