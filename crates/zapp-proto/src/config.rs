use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::platform;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

/// Where the backend daemon lives and how long to wait for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Pause after the last keystroke before a search is issued.
    #[serde(default = "default_debounce_ms")]
    pub search_debounce_ms: u64,
    /// Queries shorter than this fall back to the unfiltered channel list.
    #[serde(default = "default_min_chars")]
    pub search_min_chars: usize,
    /// Virtual page size bounding the Home/End focus jumps.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Items moved per Ctrl-u / Ctrl-d step.
    #[serde(default = "default_scroll_step")]
    pub scroll_step: usize,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            search_debounce_ms: default_debounce_ms(),
            search_min_chars: default_min_chars(),
            page_size: default_page_size(),
            scroll_step: default_scroll_step(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:8777".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_debounce_ms() -> u64 {
    400
}

fn default_min_chars() -> usize {
    3
}

fn default_page_size() -> usize {
    200
}

fn default_scroll_step() -> usize {
    10
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(&config_path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> std::path::PathBuf {
        platform::config_dir().join("config.toml")
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.backend.request_timeout_secs)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.ui.search_debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.backend.base_url, "http://127.0.0.1:8777");
        assert_eq!(config.ui.search_debounce_ms, 400);
        assert_eq!(config.ui.search_min_chars, 3);
        assert_eq!(config.ui.page_size, 200);
        assert_eq!(config.ui.scroll_step, 10);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config = toml::from_str("[ui]\nsearch_debounce_ms = 250\n").unwrap();
        assert_eq!(config.ui.search_debounce_ms, 250);
        assert_eq!(config.ui.search_min_chars, 3);
        assert_eq!(config.backend.request_timeout_secs, 10);
    }
}
