use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub site: SiteConfig,
    pub storage: StorageConfig,
    pub pacing: PacingConfig,
    pub retry: RetryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub name: String,
    pub base_url: String,
    /// Catalog page path template; `{id}` is replaced with the book ID.
    pub page_path: String,
    pub user_agent: Option<String>,
    pub selectors: SelectorsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorsConfig {
    pub title: String,
    pub cover: String,
    pub book_file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub library_path: String,
    /// Fallback extensions for asset URLs without a usable suffix.
    pub default_cover_ext: String,
    pub default_book_ext: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    /// Base delay between consecutive catalog requests.
    pub delay_ms: u64,
    /// Upper bound of the uniform random jitter added to the base delay.
    pub jitter_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries after the initial attempt, for transient failures only.
    pub max_retries: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_multiplier: f64,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// A missing config file falls back to the built-in tululu.org profile.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: "Tululu".to_string(),
            base_url: "https://tululu.org".to_string(),
            page_path: "/b{id}/".to_string(),
            user_agent: Some("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".to_string()),
            selectors: SelectorsConfig::default(),
        }
    }
}

impl Default for SelectorsConfig {
    fn default() -> Self {
        Self {
            title: "#content h1".to_string(),
            cover: "#content img".to_string(),
            book_file: r#"a[href*="txt.php"]"#.to_string(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            library_path: "./library".to_string(),
            default_cover_ext: "jpg".to_string(),
            default_book_ext: "txt".to_string(),
        }
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            delay_ms: 1000,
            jitter_ms: 500,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 500,
            max_delay_ms: 10_000,
            backoff_multiplier: 2.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_profile_targets_tululu() {
        let config = Config::default();
        assert_eq!(config.site.base_url, "https://tululu.org");
        assert_eq!(config.site.page_path, "/b{id}/");
        assert_eq!(config.storage.default_book_ext, "txt");
        assert_eq!(config.retry.max_retries, 3);
    }

    #[test]
    fn partial_toml_keeps_defaults_for_missing_sections() {
        let config: Config = toml::from_str(
            r#"
            [pacing]
            delay_ms = 5
            jitter_ms = 0
            "#,
        )
        .unwrap();

        assert_eq!(config.pacing.delay_ms, 5);
        assert_eq!(config.pacing.jitter_ms, 0);
        assert_eq!(config.site.base_url, "https://tululu.org");
        assert_eq!(config.retry.initial_delay_ms, 500);
    }

    #[test]
    fn load_or_default_without_file_uses_builtin_profile() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(dir.path().join("missing.toml")).unwrap();
        assert_eq!(config.site.name, "Tululu");
    }

    #[test]
    fn load_rejects_malformed_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "not [valid toml").unwrap();
        assert!(Config::load(&path).is_err());
    }
}
