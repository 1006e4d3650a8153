use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_aux::prelude::deserialize_vec_from_string_or_vec;

use crate::client::RetryPolicy;

/// Harness configuration loaded from multiple sources.
///
/// Configuration is loaded in priority order (lowest to highest):
/// 1. Struct defaults
/// 2. config.yaml file (if exists)
/// 3. Environment variables with BOOKS_ prefix (always wins)
///
/// Loaded once at startup and passed by reference afterwards.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub api: ApiConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub performance: PerformanceConfig,
    #[serde(default)]
    pub generator: GeneratorConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub reports: ReportsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Base URL of the Books service, without the `/api/...` suffix.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API version path segment.
    #[serde(default = "default_api_version")]
    pub version: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ApiConfig {
    /// Collection endpoint, e.g. `https://host/api/v1/Books`.
    #[must_use]
    pub fn books_url(&self) -> String {
        format!(
            "{}/api/{}/Books",
            self.base_url.trim_end_matches('/'),
            self.version
        )
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetryConfig {
    /// Total attempts per request, including the first one.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the first retry, in milliseconds.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Upper bound for any single backoff delay, in milliseconds.
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Growth factor applied per attempt.
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Status codes treated as transient.
    /// Accepts either an array or comma-separated string (`"500,502,503"`).
    #[serde(
        default = "default_retry_statuses",
        deserialize_with = "deserialize_statuses"
    )]
    pub retry_statuses: Vec<u16>,
}

impl RetryConfig {
    /// Build the retry policy used by the client decorator.
    #[must_use]
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            base_delay: Duration::from_millis(self.base_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
            multiplier: self.backoff_multiplier,
            retry_statuses: self.retry_statuses.clone(),
        }
    }
}

/// Deserialize status codes from comma-separated string or array.
fn deserialize_statuses<'de, D>(deserializer: D) -> Result<Vec<u16>, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_vec_from_string_or_vec(deserializer)
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PerformanceConfig {
    /// Maximum acceptable elapsed time for a nominal request, in milliseconds.
    #[serde(default = "default_response_time_limit_ms")]
    pub response_time_limit_ms: u64,
}

impl PerformanceConfig {
    #[must_use]
    pub const fn response_time_limit(&self) -> Duration {
        Duration::from_millis(self.response_time_limit_ms)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GeneratorConfig {
    /// Seed for generated test data. A random seed is picked (and logged)
    /// when unset, so any run can be replayed.
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level filter (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReportsConfig {
    /// Directory for the JSON run report and generated data files.
    #[serde(default = "default_reports_dir")]
    pub dir: String,
}

fn default_base_url() -> String {
    "https://fakerestapi.azurewebsites.net".to_string()
}

fn default_api_version() -> String {
    "v1".to_string()
}

// These functions cannot be const because serde uses function pointers for defaults
#[allow(clippy::missing_const_for_fn)]
fn default_timeout_secs() -> u64 {
    30
}

#[allow(clippy::missing_const_for_fn)]
fn default_max_attempts() -> u32 {
    3
}

#[allow(clippy::missing_const_for_fn)]
fn default_base_delay_ms() -> u64 {
    1_000
}

#[allow(clippy::missing_const_for_fn)]
fn default_max_delay_ms() -> u64 {
    10_000
}

#[allow(clippy::missing_const_for_fn)]
fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_retry_statuses() -> Vec<u16> {
    vec![429, 500, 502, 503, 504]
}

#[allow(clippy::missing_const_for_fn)]
fn default_response_time_limit_ms() -> u64 {
    5_000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_reports_dir() -> String {
    "reports".to_string()
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
            retry_statuses: default_retry_statuses(),
        }
    }
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            response_time_limit_ms: default_response_time_limit_ms(),
        }
    }
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            dir: default_reports_dir(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: default_base_url(),
                version: default_api_version(),
                timeout_secs: default_timeout_secs(),
            },
            retry: RetryConfig::default(),
            performance: PerformanceConfig::default(),
            generator: GeneratorConfig::default(),
            logging: LoggingConfig {
                level: default_log_level(),
            },
            reports: ReportsConfig::default(),
        }
    }
}

/// Configuration loading and validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Figment(#[from] Box<figment::Error>),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl Config {
    /// Load configuration from all sources.
    ///
    /// Sources are merged in priority order:
    /// 1. Struct defaults (lowest)
    /// 2. config.yaml file (if exists)
    /// 3. Environment variables with BOOKS_ prefix (highest)
    ///
    /// # Errors
    /// Returns an error if configuration cannot be loaded or is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config.yaml")
    }

    /// Load configuration with a custom YAML file path.
    ///
    /// # Errors
    /// Returns an error if configuration cannot be loaded or is invalid.
    pub fn load_from(yaml_path: &str) -> Result<Self, ConfigError> {
        let config: Self = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Yaml::file(yaml_path))
            .merge(Env::prefixed("BOOKS_").split("__"))
            .extract()?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    /// Returns an error if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base_url = &self.api.base_url;
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConfigError::Validation(format!(
                "api.base_url must start with http:// or https://, got: '{base_url}'"
            )));
        }

        if self.api.version.is_empty() {
            return Err(ConfigError::Validation("api.version cannot be empty".into()));
        }

        if self.api.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "api.timeout_secs cannot be 0".into(),
            ));
        }

        if self.retry.max_attempts == 0 {
            return Err(ConfigError::Validation(
                "retry.max_attempts must be at least 1".into(),
            ));
        }

        if !self.retry.backoff_multiplier.is_finite() || self.retry.backoff_multiplier < 1.0 {
            return Err(ConfigError::Validation(format!(
                "retry.backoff_multiplier must be >= 1.0, got: {}",
                self.retry.backoff_multiplier
            )));
        }

        if self.retry.max_delay_ms < self.retry.base_delay_ms {
            return Err(ConfigError::Validation(
                "retry.max_delay_ms cannot be smaller than retry.base_delay_ms".into(),
            ));
        }

        for status in &self.retry.retry_statuses {
            if !(100..=599).contains(status) {
                return Err(ConfigError::Validation(format!(
                    "retry.retry_statuses contains invalid status code {status}"
                )));
            }
        }

        if self.performance.response_time_limit_ms == 0 {
            return Err(ConfigError::Validation(
                "performance.response_time_limit_ms cannot be 0".into(),
            ));
        }

        let level = self.logging.level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::Validation(format!(
                "logging.level must be one of {LOG_LEVELS:?}, got: '{}'",
                self.logging.level
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "https://fakerestapi.azurewebsites.net");
        assert_eq!(config.api.version, "v1");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.retry_statuses, vec![429, 500, 502, 503, 504]);
        assert_eq!(config.performance.response_time_limit_ms, 5_000);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.reports.dir, "reports");
        assert!(config.generator.seed.is_none());
    }

    #[test]
    fn test_validation_accepts_defaults() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_books_url() {
        let config = Config::default();
        assert_eq!(
            config.api.books_url(),
            "https://fakerestapi.azurewebsites.net/api/v1/Books"
        );
    }

    #[test]
    fn test_books_url_trims_trailing_slash() {
        let mut config = Config::default();
        config.api.base_url = "http://localhost:8080/".into();
        assert_eq!(config.api.books_url(), "http://localhost:8080/api/v1/Books");
    }

    #[test]
    fn test_retry_policy_from_config() {
        let config = RetryConfig {
            max_attempts: 5,
            base_delay_ms: 10,
            max_delay_ms: 80,
            backoff_multiplier: 3.0,
            retry_statuses: vec![503],
        };
        let policy = config.policy();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.base_delay, Duration::from_millis(10));
        assert_eq!(policy.max_delay, Duration::from_millis(80));
        assert_eq!(policy.retry_statuses, vec![503]);
    }

    #[test]
    fn test_validation_rejects_bad_base_url() {
        let mut config = Config::default();
        config.api.base_url = "fakerestapi.azurewebsites.net".into();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("api.base_url"));
    }

    #[test]
    fn test_retry_statuses_deserialize_comma_separated_string() {
        // Simulate what figment does with env var
        let json = r#"{"retry_statuses": "500,503"}"#;
        let config: RetryConfig = serde_json::from_str(json).expect("should parse");
        assert_eq!(config.retry_statuses, vec![500, 503]);
    }

    #[test]
    fn test_retry_statuses_deserialize_array() {
        let json = r#"{"retry_statuses": [502, 504]}"#;
        let config: RetryConfig = serde_json::from_str(json).expect("should parse");
        assert_eq!(config.retry_statuses, vec![502, 504]);
        assert_eq!(config.max_attempts, 3);
    }

    #[test]
    fn test_load_merges_yaml_and_env() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "harness.yaml",
                r"
api:
  base_url: http://localhost:5000
  timeout_secs: 5
logging:
  level: debug
",
            )?;
            jail.set_env("BOOKS_RETRY__MAX_ATTEMPTS", "7");
            jail.set_env("BOOKS_API__TIMEOUT_SECS", "9");
            jail.set_env("BOOKS_GENERATOR__SEED", "42");

            let config = Config::load_from("harness.yaml").expect("config should load");
            assert_eq!(config.api.base_url, "http://localhost:5000");
            assert_eq!(config.api.timeout_secs, 9);
            assert_eq!(config.retry.max_attempts, 7);
            assert_eq!(config.generator.seed, Some(42));
            assert_eq!(config.logging.level, "debug");
            Ok(())
        });
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        figment::Jail::expect_with(|_jail| {
            let config = Config::load_from("missing.yaml").expect("config should load");
            assert_eq!(config.api.version, "v1");
            Ok(())
        });
    }

    #[test]
    fn test_load_rejects_invalid_env_value() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("BOOKS_API__BASE_URL", "ftp://example.com");
            let result = Config::load_from("missing.yaml");
            assert!(matches!(result, Err(ConfigError::Validation(_))));
            Ok(())
        });
    }

    // Table-driven boundary tests for validation rules

    #[test]
    fn timeout_boundaries() {
        let cases = [
            (0u64, false, "zero timeout"),
            (1, true, "minimum valid"),
            (30, true, "default value"),
            (600, true, "long timeout"),
        ];

        for (timeout, should_pass, desc) in cases {
            let mut config = Config::default();
            config.api.timeout_secs = timeout;
            let result = config.validate();
            assert_eq!(result.is_ok(), should_pass, "case '{}': {:?}", desc, result);
        }
    }

    #[test]
    fn max_attempts_boundaries() {
        let cases = [
            (0u32, false, "zero attempts"),
            (1, true, "single attempt, no retries"),
            (3, true, "default value"),
            (10, true, "high value"),
        ];

        for (attempts, should_pass, desc) in cases {
            let mut config = Config::default();
            config.retry.max_attempts = attempts;
            let result = config.validate();
            assert_eq!(result.is_ok(), should_pass, "case '{}': {:?}", desc, result);
        }
    }

    #[test]
    fn backoff_multiplier_boundaries() {
        let cases = [
            (0.5f64, false, "shrinking backoff"),
            (1.0, true, "constant backoff"),
            (2.0, true, "default value"),
            (f64::NAN, false, "not a number"),
            (f64::INFINITY, false, "infinite"),
        ];

        for (multiplier, should_pass, desc) in cases {
            let mut config = Config::default();
            config.retry.backoff_multiplier = multiplier;
            let result = config.validate();
            assert_eq!(result.is_ok(), should_pass, "case '{}': {:?}", desc, result);
        }
    }

    #[test]
    fn retry_status_boundaries() {
        let cases = [
            (vec![], true, "no retryable statuses"),
            (vec![500], true, "single 5xx"),
            (vec![100, 599], true, "range edges"),
            (vec![99], false, "below range"),
            (vec![600], false, "above range"),
        ];

        for (statuses, should_pass, desc) in cases {
            let mut config = Config::default();
            config.retry.retry_statuses = statuses;
            let result = config.validate();
            assert_eq!(result.is_ok(), should_pass, "case '{}': {:?}", desc, result);
        }
    }

    #[test]
    fn log_level_boundaries() {
        let cases = [
            ("info", true, "default"),
            ("DEBUG", true, "uppercase"),
            ("Warn", true, "mixed case"),
            ("WARNING", false, "python-style alias"),
            ("", false, "empty string"),
            ("verbose", false, "unknown level"),
        ];

        for (level, should_pass, desc) in cases {
            let mut config = Config::default();
            config.logging.level = level.into();
            let result = config.validate();
            assert_eq!(result.is_ok(), should_pass, "case '{}': {:?}", desc, result);
        }
    }
}
