use indexed_db_futures::{
    KeyPath, database::Database, error::OpenDbError, prelude::*, transaction::TransactionMode,
};
use log::debug;
use strum::IntoEnumIterator;
use uuid::Uuid;

use crate::cache::{CacheError, CacheStore, Collection, Record};

const DATABASE: &str = "liftbook";

/// Persistent local cache in the browser's IndexedDB.
#[derive(Clone)]
pub struct IndexedDB;

impl IndexedDB {
    async fn open(&self) -> Result<Database, OpenDbError> {
        Database::open(DATABASE)
            .with_version(1u8)
            .with_on_blocked(|event| {
                debug!("upgrade of database blocked: {event:?}");
                Ok(())
            })
            .with_on_upgrade_needed(|event, db| {
                #[allow(clippy::single_match)]
                match (event.old_version(), event.new_version()) {
                    (0.0, Some(1.0)) => {
                        for collection in Collection::iter() {
                            db.create_object_store(collection.as_ref())
                                .with_key_path(KeyPath::One("id"))
                                .build()?;
                        }
                    }
                    _ => {}
                }
                Ok(())
            })
            .await
    }

    pub async fn clear(&self) -> Result<(), CacheError> {
        async {
            let db = self.open().await?;
            for collection in Collection::iter() {
                let transaction = db
                    .transaction(collection.as_ref())
                    .with_mode(TransactionMode::Readwrite)
                    .build()?;
                let store = transaction.object_store(collection.as_ref())?;
                store.clear()?.await?;
                transaction.commit().await?;
            }
            Ok(())
        }
        .await
        .map_err(unavailable)
    }
}

impl CacheStore for IndexedDB {
    async fn get_all<T: Record>(&self) -> Result<Vec<T>, CacheError> {
        let values = async {
            let db = self.open().await?;
            let transaction = db
                .transaction(T::COLLECTION.as_ref())
                .with_mode(TransactionMode::Readonly)
                .build()?;
            let store = transaction.object_store(T::COLLECTION.as_ref())?;
            let mut values: Vec<serde_json::Value> = vec![];
            for value in store.get_all().serde()?.await? {
                values.push(value?);
            }
            Ok(values)
        }
        .await
        .map_err(unavailable)?;

        Ok(values
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<T>, _>>()?)
    }

    async fn get_by_id<T: Record>(&self, id: Uuid) -> Result<Option<T>, CacheError> {
        let value = async {
            let db = self.open().await?;
            let transaction = db
                .transaction(T::COLLECTION.as_ref())
                .with_mode(TransactionMode::Readonly)
                .build()?;
            let store = transaction.object_store(T::COLLECTION.as_ref())?;
            let value: Option<serde_json::Value> = store.get(id.to_string()).serde()?.await?;
            Ok(value)
        }
        .await
        .map_err(unavailable)?;

        Ok(value.map(serde_json::from_value).transpose()?)
    }

    async fn put<T: Record>(&self, record: &T) -> Result<(), CacheError> {
        async {
            let db = self.open().await?;
            let transaction = db
                .transaction(T::COLLECTION.as_ref())
                .with_mode(TransactionMode::Readwrite)
                .build()?;
            let store = transaction.object_store(T::COLLECTION.as_ref())?;
            store.put(record).serde()?.await?;
            transaction.commit().await?;
            Ok(())
        }
        .await
        .map_err(unavailable)
    }

    async fn delete<T: Record>(&self, id: Uuid) -> Result<(), CacheError> {
        async {
            let db = self.open().await?;
            let transaction = db
                .transaction(T::COLLECTION.as_ref())
                .with_mode(TransactionMode::Readwrite)
                .build()?;
            let store = transaction.object_store(T::COLLECTION.as_ref())?;
            store.delete(id.to_string()).serde()?.await?;
            transaction.commit().await?;
            Ok(())
        }
        .await
        .map_err(unavailable)
    }

    async fn replace_all<T: Record>(&self, records: &[T]) -> Result<(), CacheError> {
        async {
            let db = self.open().await?;
            let transaction = db
                .transaction(T::COLLECTION.as_ref())
                .with_mode(TransactionMode::Readwrite)
                .build()?;
            let store = transaction.object_store(T::COLLECTION.as_ref())?;
            store.clear()?;
            for record in records {
                store.put(record).serde()?.await?;
            }
            transaction.commit().await?;
            Ok(())
        }
        .await
        .map_err(unavailable)
    }
}

/// Records are decoded separately, so only a failure of the database itself ends up here.
fn unavailable(err: Box<dyn std::error::Error>) -> CacheError {
    CacheError::Unavailable(err.to_string())
}
