//! Configuration management for vturls.
//!
//! Settings are layered: built-in defaults, then `VTURLS_*` environment
//! variables, then command-line flags. The only mandatory setting is a
//! non-empty list of API credentials; everything else tunes the network
//! behaviour of the rotating executor.

use std::time::Duration;

use reqwest::Url;

use crate::retry::RetryConfig;

/// Default VirusTotal v2 domain report endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://www.virustotal.com/vtapi/v2/domain/report";

/// Main configuration structure for vturls.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// API credentials in rotation order
    pub credentials: Vec<String>,

    /// Network operation settings
    pub network: NetworkConfig,

    /// Batch processing settings
    pub batch: BatchConfig,
}

/// Network-related configuration options
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Domain report endpoint
    pub endpoint: String,

    /// Timeout for a single HTTP request
    pub request_timeout: Duration,

    /// Absolute time budget for one lookup across all credentials
    pub retry_deadline: Duration,

    /// Pause after every full cycle through the credential pool
    pub cycle_pause: Duration,

    /// User agent sent with every request
    pub user_agent: String,
}

/// Batch processing configuration
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Proactively advance the credential pool after this many lookups (0 = never)
    pub rotate_every: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            request_timeout: Duration::from_secs(30),
            retry_deadline: Duration::from_secs(60),
            cycle_pause: Duration::from_secs(1),
            user_agent: format!("{}/{}", crate::NAME, crate::VERSION),
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { rotate_every: 5 }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(keys) = std::env::var("VTURLS_API_KEYS") {
            config.credentials = parse_credentials(&keys);
        }

        if let Ok(endpoint) = std::env::var("VTURLS_ENDPOINT")
            && !endpoint.trim().is_empty()
        {
            config.network.endpoint = endpoint.trim().to_string();
        }

        if let Ok(timeout) = std::env::var("VTURLS_REQUEST_TIMEOUT_SECS")
            && let Ok(secs) = timeout.parse::<u64>()
        {
            config.network.request_timeout = Duration::from_secs(secs);
        }

        if let Ok(deadline) = std::env::var("VTURLS_RETRY_DEADLINE_SECS")
            && let Ok(secs) = deadline.parse::<u64>()
        {
            config.network.retry_deadline = Duration::from_secs(secs);
        }

        if let Ok(pause) = std::env::var("VTURLS_CYCLE_PAUSE_MS")
            && let Ok(ms) = pause.parse::<u64>()
        {
            config.network.cycle_pause = Duration::from_millis(ms);
        }

        if let Ok(every) = std::env::var("VTURLS_ROTATE_EVERY")
            && let Ok(n) = every.parse::<usize>()
        {
            config.batch.rotate_every = n;
        }

        config
    }

    /// Merge with CLI arguments, giving CLI precedence
    pub fn merge_with_cli(&mut self, cli: &crate::cli::Cli) {
        if let Some(ref tokens) = cli.tokens {
            self.credentials = parse_credentials(tokens);
        }

        if let Some(ref endpoint) = cli.endpoint {
            self.network.endpoint = endpoint.clone();
        }

        if let Some(every) = cli.rotate_every {
            self.batch.rotate_every = every;
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.credentials.is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "credentials".to_string(),
            });
        }

        if self.network.request_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "network.request_timeout".to_string(),
                value: "0".to_string(),
                reason: "Timeout must be greater than 0".to_string(),
            });
        }

        if self.network.retry_deadline.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "network.retry_deadline".to_string(),
                value: "0".to_string(),
                reason: "Retry deadline must be greater than 0".to_string(),
            });
        }

        self.endpoint_url()?;

        Ok(())
    }

    /// Parsed endpoint URL; only absolute http(s) URLs are accepted.
    pub fn endpoint_url(&self) -> Result<Url, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidValue {
            field: "network.endpoint".to_string(),
            value: self.network.endpoint.clone(),
            reason,
        };

        let url = Url::parse(&self.network.endpoint).map_err(|e| invalid(e.to_string()))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(invalid(format!("unsupported scheme '{}'", other))),
        }
    }

    /// Retry settings for the rotating executor.
    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig {
            deadline: self.network.retry_deadline,
            cycle_pause: self.network.cycle_pause,
        }
    }
}

/// Split a comma-separated credential list, trimming entries and dropping blanks.
pub fn parse_credentials(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
    /// Invalid configuration value
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    /// Missing required configuration
    MissingRequired { field: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidValue {
                field,
                value,
                reason,
            } => {
                write!(f, "Invalid value '{}' for '{}': {}", value, field, reason)
            }
            ConfigError::MissingRequired { field } => {
                write!(f, "Missing required configuration field: {}", field)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::env;

    fn with_keys(keys: &[&str]) -> Config {
        Config {
            credentials: keys.iter().map(|k| k.to_string()).collect(),
            ..Config::default()
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.network.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.network.request_timeout, Duration::from_secs(30));
        assert_eq!(config.network.retry_deadline, Duration::from_secs(60));
        assert_eq!(config.network.cycle_pause, Duration::from_secs(1));
        assert_eq!(config.batch.rotate_every, 5);
        assert!(config.credentials.is_empty());
    }

    #[test]
    fn test_parse_credentials() {
        assert_eq!(parse_credentials("a, b,,c ,"), vec!["a", "b", "c"]);
        assert!(parse_credentials("").is_empty());
        assert!(parse_credentials(" , ,").is_empty());
    }

    #[test]
    fn test_config_validation() {
        assert!(matches!(
            Config::default().validate(),
            Err(ConfigError::MissingRequired { .. })
        ));

        let mut config = with_keys(&["k1"]);
        assert!(config.validate().is_ok());

        config.network.request_timeout = Duration::ZERO;
        assert!(config.validate().is_err());

        config.network.request_timeout = Duration::from_secs(30);
        config.network.retry_deadline = Duration::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_endpoint_validation() {
        let mut config = with_keys(&["k1"]);
        config.network.endpoint = "not a url".to_string();
        assert!(config.validate().is_err());

        config.network.endpoint = "ftp://example.com/report".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("unsupported scheme"));

        config.network.endpoint = "http://127.0.0.1:8080/vtapi/v2/domain/report".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_loading() {
        unsafe {
            env::set_var("VTURLS_API_KEYS", "one,two");
            env::set_var("VTURLS_RETRY_DEADLINE_SECS", "15");
            env::set_var("VTURLS_CYCLE_PAUSE_MS", "250");
            env::set_var("VTURLS_ROTATE_EVERY", "not-a-number");
        }

        let config = Config::from_env();
        assert_eq!(config.credentials, vec!["one", "two"]);
        assert_eq!(config.network.retry_deadline, Duration::from_secs(15));
        assert_eq!(config.network.cycle_pause, Duration::from_millis(250));
        assert_eq!(config.batch.rotate_every, 5);

        unsafe {
            env::remove_var("VTURLS_API_KEYS");
            env::remove_var("VTURLS_RETRY_DEADLINE_SECS");
            env::remove_var("VTURLS_CYCLE_PAUSE_MS");
            env::remove_var("VTURLS_ROTATE_EVERY");
        }
    }

    #[test]
    fn test_cli_takes_precedence() {
        let mut config = with_keys(&["from-env"]);
        let cli = crate::cli::Cli::parse_from([
            "vturls",
            "-t",
            "cli1,cli2",
            "--rotate-every",
            "0",
            "example.com",
        ]);
        config.merge_with_cli(&cli);
        assert_eq!(config.credentials, vec!["cli1", "cli2"]);
        assert_eq!(config.batch.rotate_every, 0);
        assert_eq!(config.network.endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_retry_config_mapping() {
        let mut config = with_keys(&["k"]);
        config.network.retry_deadline = Duration::from_secs(5);
        config.network.cycle_pause = Duration::from_millis(10);
        let retry = config.retry_config();
        assert_eq!(retry.deadline, Duration::from_secs(5));
        assert_eq!(retry.cycle_pause, Duration::from_millis(10));
    }
}
