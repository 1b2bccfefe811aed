use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:5004";
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 3;
pub const DEFAULT_MAX_POLLS: u32 = 200;
pub const DEFAULT_POLL_RETRIES: usize = 2;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_url: String,
    pub poll_interval: Duration,
    /// `None` polls until a terminal status or cancellation.
    pub max_polls: Option<u32>,
    pub poll_retries: usize,
    pub http_timeout: Duration,
    pub token_file: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let max_polls = parse_var("BOOKSUM_MAX_POLLS", DEFAULT_MAX_POLLS)?;

        Ok(Self {
            api_url: env::var("BOOKSUM_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            poll_interval: Duration::from_secs(parse_var(
                "BOOKSUM_POLL_INTERVAL_SECS",
                DEFAULT_POLL_INTERVAL_SECS,
            )?),
            max_polls: (max_polls > 0).then_some(max_polls),
            poll_retries: parse_var("BOOKSUM_POLL_RETRIES", DEFAULT_POLL_RETRIES)?,
            http_timeout: Duration::from_secs(parse_var(
                "BOOKSUM_HTTP_TIMEOUT_SECS",
                DEFAULT_HTTP_TIMEOUT_SECS,
            )?),
            token_file: env::var("BOOKSUM_TOKEN_FILE").ok().map(PathBuf::from),
        })
    }

    #[must_use]
    pub fn poller_config(&self) -> PollerConfig {
        PollerConfig {
            poll_interval: self.poll_interval,
            max_polls: self.max_polls,
            poll_retries: self.poll_retries,
            ..PollerConfig::default()
        }
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T, String>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| format!("{name}: {e}")),
        Err(_) => Ok(default),
    }
}

/// Timing knobs for one `TaskPoller`.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    pub poll_interval: Duration,
    pub max_polls: Option<u32>,
    pub poll_retries: usize,
    pub retry_base: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            max_polls: Some(DEFAULT_MAX_POLLS),
            poll_retries: DEFAULT_POLL_RETRIES,
            retry_base: Duration::from_millis(250),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poller_config_follows_app_config() {
        let config = AppConfig {
            api_url: DEFAULT_API_URL.to_string(),
            poll_interval: Duration::from_secs(7),
            max_polls: None,
            poll_retries: 0,
            http_timeout: Duration::from_secs(5),
            token_file: None,
        };

        let poller = config.poller_config();
        assert_eq!(poller.poll_interval, Duration::from_secs(7));
        assert_eq!(poller.max_polls, None);
        assert_eq!(poller.poll_retries, 0);
        assert_eq!(poller.retry_base, PollerConfig::default().retry_base);
    }

    #[test]
    fn test_parse_var_falls_back_to_default_when_unset() {
        let value: u64 = parse_var("BOOKSUM_TEST_SURELY_UNSET_VARIABLE", 42).unwrap();
        assert_eq!(value, 42);
    }
}
