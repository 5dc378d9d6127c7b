//! Backup documents
//!
//! A backup is a single JSON document holding all exercise and category rows:
//!
//! ```json
//! { "exercises": [...], "categories": [...], "timestamp": "2024-03-01T12:30:00Z", "version": 1 }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use liftbook_domain as domain;

use crate::rest::{CategoryRow, ExerciseRow, MappingError};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BackupDocument {
    pub exercises: Vec<ExerciseRow>,
    pub categories: Vec<CategoryRow>,
    pub timestamp: DateTime<Utc>,
    pub version: u32,
}

impl From<&domain::Backup> for BackupDocument {
    fn from(value: &domain::Backup) -> Self {
        Self {
            exercises: value.exercises.iter().map(ExerciseRow::from).collect(),
            categories: value.categories.iter().map(CategoryRow::from).collect(),
            timestamp: value.timestamp,
            version: value.version,
        }
    }
}

impl TryFrom<BackupDocument> for domain::Backup {
    type Error = MappingError;

    fn try_from(value: BackupDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            exercises: value
                .exercises
                .into_iter()
                .map(domain::Exercise::try_from)
                .collect::<Result<Vec<_>, _>>()?,
            categories: value
                .categories
                .into_iter()
                .map(domain::Category::try_from)
                .collect::<Result<Vec<_>, _>>()?,
            timestamp: value.timestamp,
            version: value.version,
        })
    }
}

/// Parses and validates a backup document as a whole.
pub fn parse(document: &str) -> Result<domain::Backup, domain::BackupError> {
    let document: BackupDocument = serde_json::from_str(document)
        .map_err(|err| domain::BackupError::Format(err.to_string()))?;
    let backup = domain::Backup::try_from(document)
        .map_err(|err| domain::BackupError::Format(err.to_string()))?;
    backup.validate()?;
    Ok(backup)
}

pub fn to_json(backup: &domain::Backup) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&BackupDocument::from(backup))
}
