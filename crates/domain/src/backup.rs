use std::collections::HashSet;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::{Category, CategoryID, CreateError, Exercise, ExerciseID, ReadError, UpdateError};

pub const BACKUP_VERSION: u32 = 1;

/// Restoring is a merge. The confirmation shown before a restore must say so.
pub const RESTORE_NOTICE: &str = "Exercises and categories from the backup will be added. \
    Entries with the same ID will be overwritten. Nothing that is missing from the backup \
    will be deleted.";

#[allow(async_fn_in_trait)]
pub trait BackupService {
    async fn create_backup(&self) -> Result<BackupInfo, BackupError>;
    /// Lists stored backups, newest first.
    async fn get_backups(&self) -> Result<Vec<BackupInfo>, BackupError>;
    async fn get_backup(&self, name: &str) -> Result<Backup, BackupError>;
    async fn restore_backup(&self, backup: Backup) -> Result<RestoreSummary, BackupError>;
}

#[allow(async_fn_in_trait)]
pub trait BackupRepository {
    async fn write_backup(&self, backup: &Backup) -> Result<BackupInfo, CreateError>;
    async fn read_backups(&self) -> Result<Vec<BackupInfo>, ReadError>;
    async fn read_backup(&self, name: &str) -> Result<Backup, BackupError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Backup {
    pub exercises: Vec<Exercise>,
    pub categories: Vec<Category>,
    pub timestamp: DateTime<Utc>,
    pub version: u32,
}

impl Backup {
    #[must_use]
    pub fn new(exercises: Vec<Exercise>, categories: Vec<Category>, timestamp: DateTime<Utc>) -> Self {
        Self {
            exercises,
            categories,
            timestamp,
            version: BACKUP_VERSION,
        }
    }

    #[must_use]
    pub fn name(&self) -> String {
        format!(
            "backup-{}.json",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
        )
    }

    /// Checks the document as a whole. Nothing may be written if this fails.
    pub fn validate(&self) -> Result<(), BackupError> {
        if self.version != BACKUP_VERSION {
            return Err(BackupError::UnsupportedVersion(self.version));
        }

        let mut category_ids = HashSet::new();
        for category in &self.categories {
            if !category_ids.insert(category.id) {
                return Err(BackupError::Format(format!(
                    "duplicate category {}",
                    category.id
                )));
            }
        }

        let mut exercise_ids = HashSet::new();
        for exercise in &self.exercises {
            if !exercise_ids.insert(exercise.id) {
                return Err(BackupError::Format(format!(
                    "duplicate exercise {}",
                    exercise.id
                )));
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupInfo {
    pub name: String,
    pub created_at: Option<DateTime<Utc>>,
    pub size: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Upsert<T> {
    Insert(T),
    Update(T),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RestorePlan {
    pub categories: Vec<Upsert<Category>>,
    pub exercises: Vec<Upsert<Exercise>>,
}

impl RestorePlan {
    /// Decides per row whether it is inserted or updated, based on the ids currently stored.
    ///
    /// Every category referenced by an exercise must be part of the backup or already stored.
    pub fn new(
        backup: &Backup,
        stored_categories: &[Category],
        stored_exercises: &[Exercise],
    ) -> Result<Self, BackupError> {
        backup.validate()?;

        let stored_category_ids = stored_categories
            .iter()
            .map(|c| c.id)
            .collect::<HashSet<CategoryID>>();
        let stored_exercise_ids = stored_exercises
            .iter()
            .map(|e| e.id)
            .collect::<HashSet<ExerciseID>>();

        for exercise in &backup.exercises {
            if let Some(category) = exercise.category {
                if !stored_category_ids.contains(&category)
                    && !backup.categories.iter().any(|c| c.id == category)
                {
                    return Err(BackupError::Format(format!(
                        "exercise {} references unknown category {category}",
                        exercise.id
                    )));
                }
            }
        }

        Ok(Self {
            categories: backup
                .categories
                .iter()
                .map(|c| {
                    if stored_category_ids.contains(&c.id) {
                        Upsert::Update(c.clone())
                    } else {
                        Upsert::Insert(c.clone())
                    }
                })
                .collect(),
            exercises: backup
                .exercises
                .iter()
                .map(|e| {
                    if stored_exercise_ids.contains(&e.id) {
                        Upsert::Update(e.clone())
                    } else {
                        Upsert::Insert(e.clone())
                    }
                })
                .collect(),
        })
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RestoreSummary {
    pub categories_inserted: usize,
    pub categories_updated: usize,
    pub exercises_inserted: usize,
    pub exercises_updated: usize,
}

#[derive(thiserror::Error, Debug)]
pub enum BackupError {
    #[error("invalid backup: {0}")]
    Format(String),
    #[error("unsupported backup version {0}")]
    UnsupportedVersion(u32),
    #[error(transparent)]
    Read(#[from] ReadError),
    #[error(transparent)]
    Create(#[from] CreateError),
    #[error(transparent)]
    Update(#[from] UpdateError),
}

impl BackupError {
    #[must_use]
    pub fn is_no_connection(&self) -> bool {
        matches!(
            self,
            BackupError::Read(ReadError::Storage(crate::StorageError::NoConnection))
                | BackupError::Create(CreateError::Storage(crate::StorageError::NoConnection))
                | BackupError::Update(UpdateError::Storage(crate::StorageError::NoConnection))
        )
    }
}
