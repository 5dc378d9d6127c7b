//! Backend configuration
//!
//! Defaults for the backend URL and API key are taken from `LIFTBOOK_BACKEND_URL` and
//! `LIFTBOOK_API_KEY` at build time.

#[allow(async_fn_in_trait)]
pub trait ConfigService {
    async fn get_config(&self) -> Result<Config, String>;
    async fn set_config(&self, config: Config) -> Result<(), ConfigError>;
}

#[allow(async_fn_in_trait)]
pub trait ConfigRepository {
    async fn read_config(&self) -> Result<Config, String>;
    async fn write_config(&self, config: Config) -> Result<(), String>;
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub backend_url: String,
    pub api_key: String,
    pub image_bucket: String,
    pub backup_bucket: String,
    pub request_timeout_ms: u32,
    /// Number of runs of a workout save before a transient failure is reported.
    pub save_attempts: usize,
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.backend_url.trim();
        if url.is_empty() {
            return Err(ConfigError::MissingBackendUrl);
        }
        if !url.starts_with("https://") && !url.starts_with("http://") {
            return Err(ConfigError::InvalidBackendUrl(url.to_string()));
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.save_attempts == 0 {
            return Err(ConfigError::ZeroSaveAttempts);
        }
        Ok(())
    }

    /// Backend URL without trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.backend_url.trim().trim_end_matches('/')
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: option_env!("LIFTBOOK_BACKEND_URL")
                .unwrap_or_default()
                .to_string(),
            api_key: option_env!("LIFTBOOK_API_KEY")
                .unwrap_or_default()
                .to_string(),
            image_bucket: String::from("exercise-images"),
            backup_bucket: String::from("backups"),
            request_timeout_ms: 10_000,
            save_attempts: 2,
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Backend URL must not be empty")]
    MissingBackendUrl,
    #[error("Backend URL must start with http:// or https:// ({0})")]
    InvalidBackendUrl(String),
    #[error("Request timeout must be greater than zero")]
    ZeroTimeout,
    #[error("Save attempts must be greater than zero")]
    ZeroSaveAttempts,
    #[error("{0}")]
    Storage(String),
}
