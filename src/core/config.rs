//! Dashboard configuration: TOML file + env var overrides + defaults.

#![allow(missing_docs)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::errors::{Result, SniffError};

/// Default refresh cadence in milliseconds.
const DEFAULT_REFRESH_MS: u64 = 1000;

/// Dashboard runtime configuration.
///
/// Precedence, lowest to highest: built-in defaults, TOML config file,
/// `SNIFFTOP_*` environment variables, CLI flags (applied by the binary
/// after [`DashboardConfig::load`]).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DashboardConfig {
    /// Interval between refresh ticks, in milliseconds.
    pub refresh_ms: u64,
    /// When true, report snapshots accumulate totals since startup instead of
    /// resetting the accumulation window on every pull.
    pub cumulative: bool,
    /// Optional file for tracing diagnostics. The dashboard owns the
    /// terminal, so diagnostics never go to stdout/stderr while it runs.
    pub log_file: Option<PathBuf>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            refresh_ms: DEFAULT_REFRESH_MS,
            cumulative: false,
            log_file: None,
        }
    }
}

impl DashboardConfig {
    /// Load configuration from an optional TOML file, then apply env
    /// overrides and validate.
    ///
    /// An explicitly passed path that does not exist is an error; with no
    /// explicit path, missing files silently fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut cfg = match path {
            Some(p) if p.exists() => {
                let raw = fs::read_to_string(p).map_err(|source| SniffError::Io {
                    path: p.to_path_buf(),
                    source,
                })?;
                toml::from_str::<Self>(&raw)?
            }
            Some(p) => {
                return Err(SniffError::MissingConfig {
                    path: p.to_path_buf(),
                });
            }
            None => Self::default(),
        };

        cfg.apply_env_overrides()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Refresh cadence as a [`Duration`].
    #[must_use]
    pub const fn refresh(&self) -> Duration {
        Duration::from_millis(self.refresh_ms)
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        set_env_u64("SNIFFTOP_REFRESH_MS", &mut self.refresh_ms)?;
        set_env_bool("SNIFFTOP_CUMULATIVE", &mut self.cumulative)?;
        if let Some(path) = env::var_os("SNIFFTOP_LOG_FILE") {
            self.log_file = Some(PathBuf::from(path));
        }
        Ok(())
    }

    /// Reject configurations the event loop cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.refresh_ms == 0 {
            return Err(SniffError::InvalidConfig {
                details: "refresh_ms must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

fn set_env_u64(key: &'static str, target: &mut u64) -> Result<()> {
    if let Ok(raw) = env::var(key) {
        *target = raw.parse().map_err(|_| SniffError::ConfigParse {
            context: key,
            details: format!("expected integer, got {raw:?}"),
        })?;
    }
    Ok(())
}

fn set_env_bool(key: &'static str, target: &mut bool) -> Result<()> {
    if let Ok(raw) = env::var(key) {
        *target = match raw.as_str() {
            "1" | "true" | "yes" => true,
            "0" | "false" | "no" => false,
            other => {
                return Err(SniffError::ConfigParse {
                    context: key,
                    details: format!("expected boolean, got {other:?}"),
                });
            }
        };
    }
    Ok(())
}
