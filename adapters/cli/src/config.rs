//! Optional TOML configuration file.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::Deserialize;
use tileworld_system_replay::ReplayOptions;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info";

/// Settings read from the configuration file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Config {
    /// Replay limits.
    pub(crate) replay: ReplayOptions,
    /// Log output.
    pub(crate) log: LogConfig,
}

/// `[log]` table.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct LogConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    pub(crate) filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_FILTER.to_owned(),
        }
    }
}

/// Loads the configuration file, or the defaults when no path is given.
pub(crate) fn load(path: Option<&Path>) -> Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    parse(&contents).with_context(|| format!("invalid config file {}", path.display()))
}

fn parse(contents: &str) -> Result<Config> {
    toml::from_str(contents).context("failed to parse config toml contents")
}

/// Installs the global log subscriber writing to stderr.
pub(crate) fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
