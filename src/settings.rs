//! Dashboard configuration.
//!
//! Settings come from an optional TOML file plus `LOADWATCH_*` environment
//! overrides, e.g. `LOADWATCH_CONNECT=localhost:8082`.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::toast::ToastTimings;

/// Runtime settings with serde-supplied defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Stream endpoint (`host:port`). Usually supplied via `--connect`.
    pub connect: Option<String>,
    /// Longest quiet period before the connection counts as stale.
    /// The server heartbeats every 10 seconds.
    pub ping_interval_secs: u64,
    /// Delay between transport reconnect attempts.
    pub retry_secs: u64,
    /// How long a toast stays fully visible.
    pub toast_show_ms: u64,
    /// How long a toast fades before removal.
    pub toast_fade_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            connect: None,
            ping_interval_secs: 10,
            retry_secs: 3,
            toast_show_ms: 2500,
            toast_fade_ms: 500,
        }
    }
}

impl Settings {
    /// Load settings from an optional file and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        let config = builder
            .add_source(Environment::with_prefix("LOADWATCH"))
            .build()?;
        Ok(config.try_deserialize()?)
    }

    /// Staleness window derived from the heartbeat interval.
    ///
    /// Two missed heartbeats count as a connectivity concern.
    pub fn stale_window(&self) -> Duration {
        Duration::from_secs(self.ping_interval_secs * 2)
    }

    /// Reconnect delay.
    pub fn retry(&self) -> Duration {
        Duration::from_secs(self.retry_secs)
    }

    /// Toast lifecycle timings.
    pub fn toast_timings(&self) -> ToastTimings {
        ToastTimings {
            showing: Duration::from_millis(self.toast_show_ms),
            fading: Duration::from_millis(self.toast_fade_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_the_server_contract() {
        let settings = Settings::default();
        assert_eq!(settings.ping_interval_secs, 10);
        assert_eq!(settings.stale_window(), Duration::from_secs(20));
        assert_eq!(settings.toast_timings(), ToastTimings::default());
    }

    #[test]
    fn loads_overrides_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "connect = \"localhost:9999\"").unwrap();
        writeln!(file, "toast_show_ms = 1000").unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.connect.as_deref(), Some("localhost:9999"));
        assert_eq!(settings.toast_show_ms, 1000);
        // Unspecified fields keep their defaults.
        assert_eq!(settings.retry_secs, 3);
    }
}
