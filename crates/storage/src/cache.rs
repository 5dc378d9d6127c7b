//! Local cache
//!
//! Records are kept in three collections keyed by id. `LocalCache` prefers the persistent
//! store and switches to an in-memory store for the rest of the session once the persistent
//! store turns out to be unavailable.

use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
};

use log::warn;
use serde::{Serialize, de::DeserializeOwned};
use strum::{AsRefStr, EnumIter};
use uuid::Uuid;

use liftbook_domain as domain;

#[derive(AsRefStr, EnumIter, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[strum(serialize_all = "snake_case")]
pub enum Collection {
    Exercises,
    Categories,
    Workouts,
}

/// A value stored in one of the collections.
pub trait Record: Serialize + DeserializeOwned + Clone {
    const COLLECTION: Collection;

    fn id(&self) -> Uuid;
}

#[allow(async_fn_in_trait)]
pub trait CacheStore {
    /// Returns the records in storage order.
    async fn get_all<T: Record>(&self) -> Result<Vec<T>, CacheError>;
    async fn get_by_id<T: Record>(&self, id: Uuid) -> Result<Option<T>, CacheError>;
    async fn put<T: Record>(&self, record: &T) -> Result<(), CacheError>;
    /// Deleting a missing record succeeds.
    async fn delete<T: Record>(&self, id: Uuid) -> Result<(), CacheError>;
    async fn replace_all<T: Record>(&self, records: &[T]) -> Result<(), CacheError>;

    /// Writes `records` only if the collection holds no record yet.
    async fn seed_if_empty<T: Record>(&self, records: &[T]) -> Result<bool, CacheError> {
        if !self.get_all::<T>().await?.is_empty() {
            return Ok(false);
        }
        for record in records {
            self.put(record).await?;
        }
        Ok(true)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum CacheError {
    #[error("local cache unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl From<CacheError> for domain::ReadError {
    fn from(value: CacheError) -> Self {
        domain::ReadError::Other(Box::new(value))
    }
}

impl From<CacheError> for domain::SyncError {
    fn from(value: CacheError) -> Self {
        domain::SyncError::Other(Box::new(value))
    }
}

/// Session-scoped store used when no persistent store is available.
#[derive(Default)]
pub struct MemoryStore {
    collections: RefCell<HashMap<Collection, Vec<(Uuid, serde_json::Value)>>>,
}

impl CacheStore for MemoryStore {
    async fn get_all<T: Record>(&self) -> Result<Vec<T>, CacheError> {
        self.collections
            .borrow()
            .get(&T::COLLECTION)
            .map(|records| {
                records
                    .iter()
                    .map(|(_, value)| serde_json::from_value(value.clone()))
                    .collect::<Result<Vec<T>, _>>()
            })
            .transpose()
            .map(Option::unwrap_or_default)
            .map_err(CacheError::from)
    }

    async fn get_by_id<T: Record>(&self, id: Uuid) -> Result<Option<T>, CacheError> {
        Ok(self
            .collections
            .borrow()
            .get(&T::COLLECTION)
            .and_then(|records| records.iter().find(|(key, _)| *key == id))
            .map(|(_, value)| serde_json::from_value(value.clone()))
            .transpose()?)
    }

    async fn put<T: Record>(&self, record: &T) -> Result<(), CacheError> {
        let value = serde_json::to_value(record)?;
        let mut collections = self.collections.borrow_mut();
        let records = collections.entry(T::COLLECTION).or_default();
        match records.iter_mut().find(|(key, _)| *key == record.id()) {
            Some(entry) => entry.1 = value,
            None => records.push((record.id(), value)),
        }
        Ok(())
    }

    async fn delete<T: Record>(&self, id: Uuid) -> Result<(), CacheError> {
        if let Some(records) = self.collections.borrow_mut().get_mut(&T::COLLECTION) {
            records.retain(|(key, _)| *key != id);
        }
        Ok(())
    }

    async fn replace_all<T: Record>(&self, records: &[T]) -> Result<(), CacheError> {
        let values = records
            .iter()
            .map(|r| Ok((r.id(), serde_json::to_value(r)?)))
            .collect::<Result<Vec<_>, CacheError>>()?;
        self.collections
            .borrow_mut()
            .insert(T::COLLECTION, values);
        Ok(())
    }
}

macro_rules! with_fallback {
    ($self: ident, $method: ident $(::<$ty: ty>)?, $($arg:expr),*) => {{
        if !$self.degraded.get() {
            match $self.primary.$method$(::<$ty>)?($($arg),*).await {
                Err(CacheError::Unavailable(reason)) => $self.degrade(&reason),
                result => return result,
            }
        }
        $self.fallback.$method$(::<$ty>)?($($arg),*).await
    }};
}

/// Persistent store with an in-memory fallback.
pub struct LocalCache<P: CacheStore> {
    primary: P,
    fallback: MemoryStore,
    degraded: Cell<bool>,
}

impl<P: CacheStore> LocalCache<P> {
    #[must_use]
    pub fn new(primary: P) -> Self {
        Self {
            primary,
            fallback: MemoryStore::default(),
            degraded: Cell::new(false),
        }
    }

    /// Whether records are only kept in memory.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.degraded.get()
    }

    fn degrade(&self, reason: &str) {
        warn!("{reason}, keeping cached data in memory for this session");
        self.degraded.set(true);
    }
}

impl<P: CacheStore> CacheStore for LocalCache<P> {
    async fn get_all<T: Record>(&self) -> Result<Vec<T>, CacheError> {
        with_fallback!(self, get_all,)
    }

    async fn get_by_id<T: Record>(&self, id: Uuid) -> Result<Option<T>, CacheError> {
        with_fallback!(self, get_by_id, id)
    }

    async fn put<T: Record>(&self, record: &T) -> Result<(), CacheError> {
        with_fallback!(self, put, record)
    }

    async fn delete<T: Record>(&self, id: Uuid) -> Result<(), CacheError> {
        with_fallback!(self, delete::<T>, id)
    }

    async fn replace_all<T: Record>(&self, records: &[T]) -> Result<(), CacheError> {
        with_fallback!(self, replace_all, records)
    }
}
