//! Application-level configuration loading: catalog endpoint, board rules and asset hosting.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use reqwest::Url;
use serde::Deserialize;
use serde_with::{DurationMilliSeconds, DurationSeconds, serde_as};
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "CREATURE_MEMORY_CONFIG_PATH";

const DEFAULT_CATALOG_URL: &str = "https://pokeapi.co/api/v2/pokemon";
const DEFAULT_CATALOG_SIZE: u32 = 151;
const DEFAULT_CARD_COUNT: usize = 12;
/// Upper bound for per-session card count overrides.
pub const MAX_CARD_COUNT: usize = 40;
const DEFAULT_MAX_SESSIONS: usize = 1_024;
const DEFAULT_SESSION_IDLE_TIMEOUT_SECS: u64 = 600;

#[serde_as]
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Remote creature catalog.
    pub catalog: CatalogConfig,
    /// Default board rules.
    pub board: BoardSettings,
    /// Static bundle and browser security policy.
    pub assets: AssetsConfig,
    /// Upper bound on concurrently hosted sessions.
    pub max_sessions: usize,
    /// Sessions without event subscribers and without requests for this long are dropped.
    #[serde_as(as = "DurationSeconds<u64>")]
    #[serde(rename = "session_idle_timeout_secs")]
    pub session_idle_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            catalog: CatalogConfig::default(),
            board: BoardSettings::default(),
            assets: AssetsConfig::default(),
            max_sessions: DEFAULT_MAX_SESSIONS,
            session_idle_timeout: Duration::from_secs(DEFAULT_SESSION_IDLE_TIMEOUT_SECS),
        }
    }
}

#[serde_as]
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
/// Where creatures are read from.
pub struct CatalogConfig {
    /// Endpoint serving `{base_url}/{id}`.
    pub base_url: String,
    /// Number of creatures addressable as `[1, size]`.
    pub size: u32,
    /// Per-request timeout.
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "request_timeout_ms")]
    pub request_timeout: Duration,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_CATALOG_URL.into(),
            size: DEFAULT_CATALOG_SIZE,
            request_timeout: Duration::from_millis(8_000),
        }
    }
}

#[serde_as]
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
/// Rules applied to every board.
pub struct BoardSettings {
    /// Number of cards on the grid; always even.
    pub card_count: usize,
    /// How long a mismatched pair stays face up.
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "mismatch_delay_ms")]
    pub mismatch_delay: Duration,
    /// Pause between the final match and the completion notification.
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "completion_delay_ms")]
    pub completion_delay: Duration,
}

impl Default for BoardSettings {
    fn default() -> Self {
        Self {
            card_count: DEFAULT_CARD_COUNT,
            mismatch_delay: Duration::from_millis(1_000),
            completion_delay: Duration::from_millis(500),
        }
    }
}

impl BoardSettings {
    /// Number of pairs a full board holds.
    pub fn total_pairs(&self) -> usize {
        self.card_count / 2
    }

    /// Same settings with a different card count.
    pub fn with_card_count(self, card_count: usize) -> Self {
        Self { card_count, ..self }
    }
}

/// Whether `card_count` can form a board.
pub fn is_valid_card_count(card_count: usize) -> bool {
    card_count >= 2 && card_count <= MAX_CARD_COUNT && card_count % 2 == 0
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
/// Static single-page bundle and the browser security policy served with it.
pub struct AssetsConfig {
    /// Directory holding `index.html` and the bundle.
    pub static_dir: PathBuf,
    /// Origins allowed to serve card artwork.
    pub image_origins: Vec<String>,
    /// Stylesheet origins besides `'self'`.
    pub style_origins: Vec<String>,
    /// Font origins besides `'self'`.
    pub font_origins: Vec<String>,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            static_dir: PathBuf::from("static"),
            image_origins: vec!["https://raw.githubusercontent.com".into()],
            style_origins: vec!["https://fonts.googleapis.com".into()],
            font_origins: vec!["https://fonts.gstatic.com".into()],
        }
    }
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(config) => {
                    info!(
                        path = %path.display(),
                        catalog = %config.catalog.base_url,
                        card_count = config.board.card_count,
                        "loaded configuration"
                    );
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Parse a JSON document, replacing unusable values with defaults.
    pub fn from_json(contents: &str) -> serde_json::Result<Self> {
        let mut config: Self = serde_json::from_str(contents)?;

        if !is_valid_card_count(config.board.card_count) {
            warn!(
                card_count = config.board.card_count,
                max = MAX_CARD_COUNT,
                "card count must be even and at most the maximum; using default"
            );
            config.board.card_count = DEFAULT_CARD_COUNT;
        }
        if config.session_idle_timeout.is_zero() {
            warn!("session idle timeout must be positive; using default");
            config.session_idle_timeout = Duration::from_secs(DEFAULT_SESSION_IDLE_TIMEOUT_SECS);
        }
        if config.catalog.size == 0 {
            warn!("catalog size must be positive; using default");
            config.catalog.size = DEFAULT_CATALOG_SIZE;
        }

        Ok(config)
    }

    /// Content-Security-Policy restricting the page to its own origin, the catalog,
    /// and the configured artwork, style and font origins.
    pub fn content_security_policy(&self) -> String {
        let catalog_origin = Url::parse(&self.catalog.base_url)
            .map(|url| url.origin().ascii_serialization())
            .unwrap_or_default();
        let join = |origins: &[String]| {
            origins
                .iter()
                .fold(String::from("'self'"), |acc, origin| acc + " " + origin)
        };

        format!(
            "default-src 'self'; connect-src 'self' {catalog_origin}; img-src {} data:; style-src {}; font-src {}; frame-ancestors 'none'",
            join(&self.assets.image_origins),
            join(&self.assets.style_origins),
            join(&self.assets.font_origins),
        )
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = AppConfig::from_json("{}").unwrap();
        assert_eq!(config.catalog.base_url, DEFAULT_CATALOG_URL);
        assert_eq!(config.catalog.size, 151);
        assert_eq!(config.board.card_count, 12);
        assert_eq!(config.board.total_pairs(), 6);
        assert_eq!(config.board.mismatch_delay, Duration::from_millis(1_000));
    }

    #[test]
    fn durations_are_read_as_milliseconds() {
        let config = AppConfig::from_json(
            r#"{ "board": { "mismatch_delay_ms": 250, "completion_delay_ms": 40 },
                 "catalog": { "request_timeout_ms": 1500, "size": 898 } }"#,
        )
        .unwrap();
        assert_eq!(config.board.mismatch_delay, Duration::from_millis(250));
        assert_eq!(config.board.completion_delay, Duration::from_millis(40));
        assert_eq!(config.catalog.request_timeout, Duration::from_millis(1_500));
        assert_eq!(config.catalog.size, 898);
    }

    #[test]
    fn idle_timeout_is_read_as_seconds() {
        let config = AppConfig::from_json(r#"{ "session_idle_timeout_secs": 90 }"#).unwrap();
        assert_eq!(config.session_idle_timeout, Duration::from_secs(90));
        let config = AppConfig::from_json(r#"{ "session_idle_timeout_secs": 0 }"#).unwrap();
        assert_eq!(config.session_idle_timeout, Duration::from_secs(600));
    }

    #[test]
    fn odd_card_count_falls_back_to_default() {
        let config = AppConfig::from_json(r#"{ "board": { "card_count": 7 } }"#).unwrap();
        assert_eq!(config.board.card_count, DEFAULT_CARD_COUNT);
    }

    #[test]
    fn card_count_bounds() {
        assert!(is_valid_card_count(2));
        assert!(is_valid_card_count(MAX_CARD_COUNT));
        assert!(!is_valid_card_count(0));
        assert!(!is_valid_card_count(3));
        assert!(!is_valid_card_count(MAX_CARD_COUNT + 2));
    }

    #[test]
    fn csp_allows_catalog_origin_only() {
        let config = AppConfig::default();
        let csp = config.content_security_policy();
        assert!(csp.contains("connect-src 'self' https://pokeapi.co;"));
        assert!(csp.contains("img-src 'self' https://raw.githubusercontent.com data:"));
        assert!(csp.contains("font-src 'self' https://fonts.gstatic.com"));
        assert!(csp.contains("frame-ancestors 'none'"));
    }
}
