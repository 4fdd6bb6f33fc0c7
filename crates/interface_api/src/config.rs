//! API configuration

use serde::Deserialize;

use domain_intake::RestSubmissionConfig;

/// API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Log level
    pub log_level: String,
    /// Base URL of the claims backend
    pub submission_base_url: String,
    /// Bearer token for the claims backend
    #[serde(default)]
    pub submission_token: Option<String>,
    /// Timeout for a single claim submission
    pub submission_timeout_secs: u64,
    /// Wizards untouched for this long are closed
    pub session_idle_timeout_secs: u64,
    /// How often idle wizards are looked for
    pub session_sweep_interval_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_level: "info".to_string(),
            submission_base_url: "http://localhost:9090/api".to_string(),
            submission_token: None,
            submission_timeout_secs: 30,
            session_idle_timeout_secs: 1800,
            session_sweep_interval_secs: 60,
        }
    }
}

impl ApiConfig {
    /// Loads configuration from `INTAKE_`-prefixed environment variables
    ///
    /// Unset keys keep their default value.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let defaults = Self::default();
        config::Config::builder()
            .set_default("host", defaults.host)?
            .set_default("port", i64::from(defaults.port))?
            .set_default("log_level", defaults.log_level)?
            .set_default("submission_base_url", defaults.submission_base_url)?
            .set_default("submission_timeout_secs", defaults.submission_timeout_secs as i64)?
            .set_default("session_idle_timeout_secs", defaults.session_idle_timeout_secs as i64)?
            .set_default("session_sweep_interval_secs", defaults.session_sweep_interval_secs as i64)?
            .add_source(config::Environment::with_prefix("INTAKE").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Settings for the REST submission adapter
    pub fn submission_config(&self) -> RestSubmissionConfig {
        RestSubmissionConfig {
            base_url: self.submission_base_url.clone(),
            bearer_token: self.submission_token.clone(),
            timeout_secs: self.submission_timeout_secs,
            ..Default::default()
        }
    }
}
