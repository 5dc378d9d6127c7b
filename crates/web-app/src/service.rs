use std::collections::VecDeque;

use crate::{Config, ConfigError, ConfigRepository, ConfigService, log};

pub struct Service<R> {
    repository: R,
}

impl<R> Service<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }
}

impl<R: log::Repository> log::Service for Service<R> {
    fn get_log_entries(&self) -> Result<VecDeque<log::Entry>, log::Error> {
        self.repository.read_entries()
    }

    fn add_log_entry(&self, entry: log::Entry) -> Result<(), log::Error> {
        self.repository.write_entry(entry)
    }
}

impl<R: ConfigRepository> ConfigService for Service<R> {
    async fn get_config(&self) -> Result<Config, String> {
        self.repository.read_config().await
    }

    async fn set_config(&self, config: Config) -> Result<(), ConfigError> {
        config.validate()?;
        self.repository
            .write_config(config)
            .await
            .map_err(ConfigError::Storage)
    }
}
