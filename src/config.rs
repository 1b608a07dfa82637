use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

const ENV_FILE: &str = ".env";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub catalog: CatalogConfig,
    pub row: RowConfig,
    #[serde(default)]
    pub debug: DebugConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    pub api_base: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,
}

fn default_request_timeout() -> u64 { 8000 }

#[derive(Debug, Deserialize, Clone)]
pub struct RowConfig {
    pub title: String,
    pub items_file: String,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_auto_continue_delay")]
    pub auto_continue_delay_ms: u64,
    #[serde(default = "default_scroll_threshold")]
    pub scroll_threshold: f64,
}

fn default_batch_size() -> usize { 6 }
fn default_auto_continue_delay() -> u64 { 1000 }
fn default_scroll_threshold() -> f64 { 0.6 }

impl Default for RowConfig {
    fn default() -> Self {
        Self {
            title: "Trending Now".to_string(),
            items_file: "items.json".to_string(),
            batch_size: default_batch_size(),
            auto_continue_delay_ms: default_auto_continue_delay(),
            scroll_threshold: default_scroll_threshold(),
        }
    }
}

impl RowConfig {
    pub fn auto_continue_delay(&self) -> Duration {
        Duration::from_millis(self.auto_continue_delay_ms)
    }

    fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            anyhow::bail!("row.batch_size must be at least 1");
        }
        if !(self.scroll_threshold > 0.0 && self.scroll_threshold < 1.0) {
            anyhow::bail!(
                "row.scroll_threshold must be between 0 and 1 (exclusive), got {}",
                self.scroll_threshold
            );
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DebugConfig {
    #[serde(default)]
    pub overlay: bool,
    /// Log every per-item verdict at info instead of debug.
    #[serde(default)]
    pub trace_lookups: bool,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .with_context(|| "Failed to parse config TOML")?;
        config.row.validate()?;
        Ok(config)
    }

    /// Load .env file into process environment. Real env vars take precedence.
    pub fn load_env_file() {
        let path = Path::new(ENV_FILE);
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return,
        };
        // Strip BOM if present (common on Windows-created files)
        let content = content.strip_prefix('\u{feff}').unwrap_or(&content);
        for line in content.lines() {
            let line = line.trim().trim_matches('\r');
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim();
                let value = value.trim().trim_matches('"').trim_matches('\'');
                if std::env::var(key).is_err() {
                    std::env::set_var(key, value);
                }
            }
        }
    }

    /// Optional bearer token for the details proxy.
    pub fn catalog_api_token() -> Option<String> {
        match std::env::var("CATALOG_API_TOKEN") {
            Ok(token) if !token.trim().is_empty() => Some(sanitize_key(&token)),
            _ => None,
        }
    }
}

/// Strip carriage returns, BOM, and other invisible chars from a key value.
fn sanitize_key(raw: &str) -> String {
    raw.replace(['\r', '\u{feff}', '\u{200b}'], "")
        .trim()
        .to_string()
}
