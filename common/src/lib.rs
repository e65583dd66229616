/*!
common/src/lib.rs

Shared configuration types for zennscope.

This file provides:
- Config data structures (deserialized from TOML), every section with defaults
- An async loader merging a default config file with an optional override file
*/

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Feed retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Base URL for topic feeds; the feed URL is `<base_url>/<topic>/feed`
    pub base_url: String,
    /// Fixed URL of the trending feed
    pub trending_url: String,
    pub timeout_seconds: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: "https://zenn.dev/topics".to_string(),
            trending_url: "https://zenn.dev/feed".to_string(),
            timeout_seconds: 30,
        }
    }
}

/// Article page fetching configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapingConfig {
    pub timeout_seconds: u64,
    pub user_agent: String,
}

impl Default for ScrapingConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            user_agent: "zennscope/0.1.0".to_string(),
        }
    }
}

/// Summarization backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// "remote" (OpenAI-compatible chat completions) or "extractive" (no network)
    pub adapter: String,
    pub api_url: String,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    pub model: String,
    pub timeout_seconds: u64,
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            adapter: "remote".to_string(),
            api_url: "https://api.openai.com/v1/chat/completions".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            model: "gpt-4o-mini".to_string(),
            timeout_seconds: 30,
            temperature: 0.1,
        }
    }
}

/// Pipeline defaults and limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    /// "today", "week" or "month"
    pub default_period: String,
    pub default_articles: usize,
    /// Upper bound accepted from tool callers
    pub max_articles: usize,
    /// Target summary length in characters
    pub summary_length: usize,
    /// Order fetched articles by like count (descending, stable)
    pub sort_by_popularity: bool,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            default_period: "week".to_string(),
            default_articles: 10,
            max_articles: 50,
            summary_length: 300,
            sort_by_popularity: true,
        }
    }
}

/// Report output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Directory used when the CLI saves a report without an explicit path
    pub output_dir: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: "reports".to_string(),
        }
    }
}

/// HTTP tool server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

/// Top-level application configuration (deserialized from config.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub feed: FeedConfig,
    pub scraping: ScrapingConfig,
    pub llm: LlmConfig,
    pub summary: SummaryConfig,
    pub report: ReportConfig,
    pub server: ServerConfig,
}

impl Config {
    /// Load configuration from a TOML file asynchronously.
    ///
    /// Example:
    ///   let cfg = Config::from_file("config.toml").await?;
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = tokio::fs::read_to_string(path.as_ref())
            .await
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let cfg: Config = toml::from_str(&data).context("Failed to parse TOML configuration")?;
        Ok(cfg)
    }

    /// Load configuration with an optional default file and an optional override file.
    /// If both are present, they are merged (override takes precedence). Missing keys
    /// fall back to the built-in defaults.
    pub async fn load_with_defaults(default_path: Option<&Path>, override_path: Option<&Path>) -> Result<Self> {
        let mut config_value = toml::Value::Table(toml::map::Map::new());

        for path in [default_path, override_path].into_iter().flatten() {
            if !path.exists() {
                continue;
            }
            let data = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            let val: toml::Value = toml::from_str(&data)
                .with_context(|| format!("Failed to parse configuration: {}", path.display()))?;
            merge_toml(&mut config_value, val);
        }

        let cfg: Config = config_value
            .try_into()
            .context("Failed to parse merged configuration")?;
        Ok(cfg)
    }
}

fn merge_toml(a: &mut toml::Value, b: toml::Value) {
    match (a, b) {
        (toml::Value::Table(a_map), toml::Value::Table(b_map)) => {
            for (k, v) in b_map {
                if let Some(a_val) = a_map.get_mut(&k) {
                    merge_toml(a_val, v);
                } else {
                    a_map.insert(k, v);
                }
            }
        }
        (a_val, b_val) => *a_val = b_val,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn defaults_match_zenn() {
        let cfg = Config::default();
        assert_eq!(cfg.feed.base_url, "https://zenn.dev/topics");
        assert_eq!(cfg.feed.timeout_seconds, 30);
        assert_eq!(cfg.summary.default_articles, 10);
        assert_eq!(cfg.summary.max_articles, 50);
        assert_eq!(cfg.summary.default_period, "week");
        assert_eq!(cfg.llm.adapter, "remote");
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let toml = r#"
            [feed]
            timeout_seconds = 5

            [llm]
            adapter = "extractive"
        "#;

        let cfg: Config = toml::from_str(toml).expect("parse config");
        assert_eq!(cfg.feed.timeout_seconds, 5);
        assert_eq!(cfg.feed.trending_url, "https://zenn.dev/feed");
        assert_eq!(cfg.llm.adapter, "extractive");
        assert_eq!(cfg.llm.model, "gpt-4o-mini");
        assert_eq!(cfg.server.port, 8000);
    }

    #[tokio::test]
    async fn override_file_takes_precedence() {
        let dir = tempfile::tempdir().expect("tempdir");
        let default_path = dir.path().join("config.default.toml");
        let override_path = dir.path().join("config.toml");

        fs::write(
            &default_path,
            "[summary]\ndefault_articles = 5\nsummary_length = 200\n",
        )
        .expect("write default");
        fs::write(&override_path, "[summary]\ndefault_articles = 3\n").expect("write override");

        let cfg = Config::load_with_defaults(Some(&default_path), Some(&override_path))
            .await
            .expect("load config");
        assert_eq!(cfg.summary.default_articles, 3);
        assert_eq!(cfg.summary.summary_length, 200);
        assert_eq!(cfg.summary.max_articles, 50);
    }

    #[tokio::test]
    async fn missing_files_yield_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("nope.toml");

        let cfg = Config::load_with_defaults(Some(&missing), None)
            .await
            .expect("load config");
        assert_eq!(cfg.feed.base_url, "https://zenn.dev/topics");
    }

    #[tokio::test]
    async fn from_file_reports_parse_errors() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("broken.toml");
        fs::write(&path, "[feed\nbase_url = ").expect("write");

        let err = Config::from_file(&path).await.unwrap_err();
        assert!(err.to_string().contains("Failed to parse TOML configuration"));
    }
}
