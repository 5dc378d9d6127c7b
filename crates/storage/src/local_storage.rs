use std::collections::VecDeque;

use gloo_storage::{LocalStorage, Storage as _, errors::StorageError};
use liftbook_web_app::{Config, ConfigRepository, log};
use serde::de::DeserializeOwned;

const KEY_CONFIG: &str = "config";
const KEY_LOG: &str = "log";

fn read_or_default<T: DeserializeOwned + Default>(key: &str) -> Result<T, StorageError> {
    match LocalStorage::get(key) {
        Err(StorageError::KeyNotFound(_)) => Ok(T::default()),
        result => result,
    }
}

pub struct Settings;

impl ConfigRepository for Settings {
    async fn read_config(&self) -> Result<Config, String> {
        read_or_default(KEY_CONFIG).map_err(|err| err.to_string())
    }

    async fn write_config(&self, config: Config) -> Result<(), String> {
        LocalStorage::set(KEY_CONFIG, config).map_err(|err| err.to_string())
    }
}

pub struct Log;

impl log::Repository for Log {
    fn read_entries(&self) -> Result<VecDeque<log::Entry>, log::Error> {
        read_or_default(KEY_LOG).map_err(|err| log::Error::Unknown(err.to_string()))
    }

    fn write_entry(&self, entry: log::Entry) -> Result<(), log::Error> {
        let mut entries = self.read_entries()?;
        log::append(&mut entries, entry);
        LocalStorage::set(KEY_LOG, entries).map_err(|err| log::Error::Unknown(err.to_string()))
    }
}
