//! Stream configuration
//!
//! The connection manager takes a [`StreamConfig`] explicitly; reading the
//! environment is left to the binary via [`StreamConfig::from_env`].

use crate::error::ConfigError;
use reqwest::Url;
use std::time::Duration;

/// Endpoint used when `CHAT_STREAM_URL` is not set
pub const DEFAULT_STREAM_URL: &str = "https://api-dev.withallo.com/v1/demo/interview/conversation";

const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_millis(5000);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// SSE endpoint
    pub url: Url,
    /// Let the transport retry after a stream error instead of staying down
    pub auto_reconnect: bool,
    /// Delay between automatic retries
    pub retry_interval: Duration,
    /// Connect again when the host application returns to the foreground
    pub reconnect_on_foreground: bool,
    /// TCP/TLS connect timeout; the stream itself has no overall timeout
    pub connect_timeout: Duration,
}

impl StreamConfig {
    /// Config for `url` with every policy switch off
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`] if `url` does not parse or is not http(s).
    pub fn new(url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            url: parse_url(url)?,
            auto_reconnect: false,
            retry_interval: DEFAULT_RETRY_INTERVAL,
            reconnect_on_foreground: false,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        })
    }

    #[must_use]
    pub fn with_auto_reconnect(mut self, enabled: bool) -> Self {
        self.auto_reconnect = enabled;
        self
    }

    #[must_use]
    pub fn with_retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = interval;
        self
    }

    #[must_use]
    pub fn with_reconnect_on_foreground(mut self, enabled: bool) -> Self {
        self.reconnect_on_foreground = enabled;
        self
    }

    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Load from `CHAT_STREAM_*` environment variables
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] naming the first variable that fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let url = lookup("CHAT_STREAM_URL")
            .unwrap_or_else(|| DEFAULT_STREAM_URL.to_string());
        let mut config = Self::new(&url)?;

        if let Some(raw) = lookup("CHAT_STREAM_AUTO_RECONNECT") {
            config.auto_reconnect = parse_bool("CHAT_STREAM_AUTO_RECONNECT", &raw)?;
        }
        if let Some(raw) = lookup("CHAT_STREAM_RETRY_MS") {
            config.retry_interval = parse_millis("CHAT_STREAM_RETRY_MS", &raw)?;
        }
        if let Some(raw) = lookup("CHAT_STREAM_RECONNECT_ON_FOREGROUND") {
            config.reconnect_on_foreground =
                parse_bool("CHAT_STREAM_RECONNECT_ON_FOREGROUND", &raw)?;
        }
        if let Some(raw) = lookup("CHAT_STREAM_CONNECT_TIMEOUT_MS") {
            config.connect_timeout = parse_millis("CHAT_STREAM_CONNECT_TIMEOUT_MS", &raw)?;
        }

        Ok(config)
    }
}

fn parse_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidUrl {
        value: raw.to_string(),
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::InvalidUrl {
            value: raw.to_string(),
            reason: format!("unsupported scheme '{other}'"),
        }),
    }
}

fn parse_bool(var: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            var,
            value: raw.to_string(),
        }),
    }
}

fn parse_millis(var: &'static str, raw: &str) -> Result<Duration, ConfigError> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|_| ConfigError::InvalidNumber {
            var,
            value: raw.to_string(),
        })
}
