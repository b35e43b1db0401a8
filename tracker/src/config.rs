use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::CollectError;

pub const DEFAULT_ENDPOINT: &str = "https://leetcode.com/graphql";
pub const DEFAULT_OUTPUT: &str = "public/data.json";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Everything the collector needs for one run.
#[derive(Debug, Clone)]
pub struct Config {
    pub username: String,
    pub endpoint: String,
    pub output: PathBuf,
    pub timeout: Duration,
}

impl Config {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Read `RANK_*` variables. Missing ones fall back to defaults; the
    /// username is checked later by [`Config::validate`] so that a CLI flag
    /// can still fill it in.
    pub fn from_env() -> Self {
        let username = std::env::var("RANK_USERNAME").unwrap_or_default();
        let endpoint =
            std::env::var("RANK_GRAPHQL_ENDPOINT").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
        let output = std::env::var("RANK_DATA_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_OUTPUT));
        let timeout = parse_setting(
            "RANK_HTTP_TIMEOUT_SECS",
            std::env::var("RANK_HTTP_TIMEOUT_SECS").ok(),
            DEFAULT_TIMEOUT_SECS,
        );

        Self {
            username,
            endpoint,
            output,
            timeout: Duration::from_secs(timeout),
        }
    }

    pub fn validate(&self) -> Result<(), CollectError> {
        if self.username.trim().is_empty() {
            return Err(CollectError::Config(
                "username must not be empty (set RANK_USERNAME or pass --username)".to_string(),
            ));
        }
        if self.endpoint.trim().is_empty() {
            return Err(CollectError::Config("endpoint must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Settings for the static page and the web server.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub site_dir: PathBuf,
    pub port: u16,
    pub chart_window: usize,
}

impl SiteConfig {
    pub fn from_env() -> Self {
        let site_dir = std::env::var("RANK_SITE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("public"));
        let port = parse_setting("PORT", std::env::var("PORT").ok(), 3001u16);

        Self {
            site_dir,
            port,
            chart_window: crate::presenter::CHART_WINDOW,
        }
    }

    pub fn data_file(&self) -> PathBuf {
        self.site_dir.join("data.json")
    }
}

/// Parse an optional setting, warning and using `default` when the value is
/// present but unreadable.
fn parse_setting<T>(name: &str, raw: Option<String>, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match raw {
        None => default,
        Some(raw) => match raw.trim().parse::<T>() {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("ignoring {}={:?} ({}), using {}", name, raw, e, default);
                default
            }
        },
    }
}
