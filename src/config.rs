use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub polling: PollingConfig,
    pub panels: PanelsConfig,
    pub chart: ChartConfig,
    pub stream: StreamConfig,
    pub ui: UiConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub rest_base_url: String,
    pub ws_url: String,
    pub strategy_id: String,
    pub request_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            rest_base_url: "http://127.0.0.1:8080".to_string(),
            ws_url: "ws://127.0.0.1:8080/trades".to_string(),
            strategy_id: "contrarian1".to_string(),
            request_timeout_ms: 5_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    pub trades_interval_ms: u64,
    pub bids_interval_ms: u64,
    pub asks_interval_ms: u64,
    pub config_interval_ms: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            trades_interval_ms: 1_000,
            bids_interval_ms: 500,
            asks_interval_ms: 500,
            config_interval_ms: 2_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PanelsConfig {
    pub trades_size: usize,
    pub bids_size: usize,
    pub asks_size: usize,
}

impl Default for PanelsConfig {
    fn default() -> Self {
        Self {
            trades_size: 10,
            bids_size: 10,
            asks_size: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub capacity: usize,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self { capacity: 100 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    pub reconnect_delay_ms: u64,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            reconnect_delay_ms: 2_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub refresh_rate_ms: u64,
    pub max_log_messages: usize,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            refresh_rate_ms: 100,
            max_log_messages: 200,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: "stpc-dashboard.log".to_string(),
        }
    }
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl PollingConfig {
    pub fn trades_interval(&self) -> Duration {
        Duration::from_millis(self.trades_interval_ms)
    }

    pub fn bids_interval(&self) -> Duration {
        Duration::from_millis(self.bids_interval_ms)
    }

    pub fn asks_interval(&self) -> Duration {
        Duration::from_millis(self.asks_interval_ms)
    }

    pub fn config_interval(&self) -> Duration {
        Duration::from_millis(self.config_interval_ms)
    }
}

impl StreamConfig {
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }
}

impl Config {
    /// Loads `.env`, then the TOML file at `path` (built-in defaults when the
    /// file does not exist), then `STPC_*` environment overrides, and
    /// validates the result. The flag tells whether the file was found.
    pub fn load(path: &Path) -> Result<(Self, bool)> {
        dotenvy::dotenv().ok();

        let (mut config, found) = if path.exists() {
            let config_str = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let config: Config = toml::from_str(&config_str)
                .with_context(|| format!("failed to parse {}", path.display()))?;
            (config, true)
        } else {
            (Config::default(), false)
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok((config, found))
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s).context("failed to parse config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("STPC_REST_BASE_URL") {
            self.server.rest_base_url = v;
        }
        if let Some(v) = lookup("STPC_WS_URL") {
            self.server.ws_url = v;
        }
        if let Some(v) = lookup("STPC_STRATEGY_ID") {
            self.server.strategy_id = v;
        }
    }

    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.server.rest_base_url)
            .with_context(|| format!("server.rest_base_url '{}' is invalid", self.server.rest_base_url))?;
        if self.server.strategy_id.trim().is_empty() {
            bail!("server.strategy_id must not be empty");
        }
        if self.server.request_timeout_ms == 0 {
            bail!("server.request_timeout_ms must be > 0");
        }

        let intervals = [
            ("polling.trades_interval_ms", self.polling.trades_interval_ms),
            ("polling.bids_interval_ms", self.polling.bids_interval_ms),
            ("polling.asks_interval_ms", self.polling.asks_interval_ms),
            ("polling.config_interval_ms", self.polling.config_interval_ms),
            ("stream.reconnect_delay_ms", self.stream.reconnect_delay_ms),
            ("ui.refresh_rate_ms", self.ui.refresh_rate_ms),
        ];
        for (name, value) in intervals {
            if value == 0 {
                bail!("{} must be > 0", name);
            }
        }

        let sizes = [
            ("panels.trades_size", self.panels.trades_size),
            ("panels.bids_size", self.panels.bids_size),
            ("panels.asks_size", self.panels.asks_size),
            ("chart.capacity", self.chart.capacity),
        ];
        for (name, value) in sizes {
            if value == 0 {
                bail!("{} must be >= 1", name);
            }
        }
        // ws_url is not checked here: an unusable stream endpoint only
        // disables the chart's live feed.
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_dashboard_constants() {
        let config = Config::default();
        assert_eq!(config.polling.trades_interval(), Duration::from_millis(1_000));
        assert_eq!(config.polling.bids_interval(), Duration::from_millis(500));
        assert_eq!(config.polling.asks_interval(), Duration::from_millis(500));
        assert_eq!(config.polling.config_interval(), Duration::from_millis(2_000));
        assert_eq!(config.stream.reconnect_delay(), Duration::from_millis(2_000));
        assert_eq!(config.chart.capacity, 100);
        assert_eq!(config.server.strategy_id, "contrarian1");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn env_overrides_replace_server_fields() {
        let mut config = Config::default();
        config.apply_env_overrides(|key| match key {
            "STPC_STRATEGY_ID" => Some("contrarian2".to_string()),
            "STPC_WS_URL" => Some("ws://example:9000/trades".to_string()),
            _ => None,
        });
        assert_eq!(config.server.strategy_id, "contrarian2");
        assert_eq!(config.server.ws_url, "ws://example:9000/trades");
        assert_eq!(config.server.rest_base_url, "http://127.0.0.1:8080");
    }
}
