//! Cached REST
//!
//! The `REST` server acts as the authoritative data source. Successful reads and writes are
//! mirrored into the local cache, which answers reads while the server is unreachable. The
//! cache is best-effort: failing to update it never fails an operation.

use chrono::NaiveDate;
use log::{debug, error};
use uuid::Uuid;

use liftbook_domain::{
    self as domain, BackupRepository as _, CategoryRepository as _, ExerciseRepository as _,
    ImageRepository as _, WorkoutRepository as _,
};
use liftbook_web_app::Config;

use crate::cache::{CacheStore, Collection, LocalCache, Record};
use crate::indexed_db::IndexedDB;
use crate::rest::{
    CategoryRow, ExerciseRow, GlooNetSendRequest, MappingError, REST, SendRequest, WorkoutRow,
};
use crate::seed;

macro_rules! sync {
    ($self: ident, $read: expr, $row: ty, $name: literal) => {{
        let result = $read.await?;
        let rows = result.iter().map(<$row>::from).collect::<Vec<_>>();
        if let Err(err) = $self.cache.replace_all(&rows).await {
            error!("failed to write {} into local cache: {err}", $name);
        }
        Ok(result)
    }};
}

macro_rules! write_through {
    ($self: ident, $write: expr, $row: ty, $name: literal) => {{
        let result = $write.await?;
        if let Err(err) = $self.cache.put(&<$row>::from(&result)).await {
            error!("failed to write {} into local cache: {err}", $name);
        }
        Ok(result)
    }};
}

macro_rules! delete {
    ($self: ident, $delete: expr, $row: ty, $name: literal) => {{
        let id = $delete.await?;
        if let Err(err) = $self.cache.delete::<$row>(*id).await {
            error!("failed to remove {} from local cache: {err}", $name);
        }
        Ok(id)
    }};
}

macro_rules! seed {
    ($self: ident, $records: expr, $row: ty, $name: literal) => {{
        let rows = $records.iter().map(<$row>::from).collect::<Vec<_>>();
        match $self.cache.seed_if_empty(&rows).await {
            Ok(true) => debug!("seeded local cache with {} {}", rows.len(), $name),
            Ok(false) => {}
            Err(err) => error!("failed to seed {} into local cache: {err}", $name),
        }
    }};
}

#[derive(Clone)]
pub struct CachedREST<S: SendRequest, C: CacheStore = LocalCache<IndexedDB>> {
    pub rest: REST<S>,
    pub cache: C,
}

impl CachedREST<GlooNetSendRequest> {
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            rest: REST::new(config),
            cache: LocalCache::new(IndexedDB),
        }
    }
}

impl<S: SendRequest, C: CacheStore> CachedREST<S, C> {
    /// Wraps the repository in a service that retries saves as often as configured.
    #[must_use]
    pub fn into_service(self) -> domain::Service<Self> {
        let save_attempts = self.rest.config.save_attempts;
        domain::Service::new(self).with_save_attempts(save_attempts)
    }

    /// Seeds every empty collection of the local cache.
    pub async fn initialize(&self, today: NaiveDate) {
        seed!(self, seed::categories(), CategoryRow, "categories");
        seed!(self, seed::exercises(), ExerciseRow, "exercises");
        seed!(self, seed::workouts(today), WorkoutRow, "workouts");
    }

    async fn read_cached<R, T>(&self) -> Result<Vec<T>, domain::ReadError>
    where
        R: Record,
        T: TryFrom<R, Error = MappingError>,
    {
        Ok(self
            .cache
            .get_all::<R>()
            .await?
            .into_iter()
            .map(T::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }

    /// Falls back to the local cache if the server cannot be reached.
    async fn read_all<R, T>(
        &self,
        result: Result<Vec<T>, domain::ReadError>,
        name: &str,
    ) -> Result<Vec<T>, domain::ReadError>
    where
        R: Record,
        T: TryFrom<R, Error = MappingError>,
    {
        match result {
            Err(domain::ReadError::Storage(err)) => {
                debug!("reading {name} from local cache: {err}");
                self.read_cached::<R, T>().await.map_err(|cache_err| {
                    error!("failed to read {name} from local cache: {cache_err}");
                    domain::ReadError::Storage(err)
                })
            }
            result => result,
        }
    }

    async fn cache_workouts(&self, workouts: &[domain::Workout]) {
        for workout in workouts {
            if let Err(err) = self.cache.put(&WorkoutRow::from(workout)).await {
                error!("failed to write workout into local cache: {err}");
            }
        }
    }
}

impl Record for ExerciseRow {
    const COLLECTION: Collection = Collection::Exercises;

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Record for CategoryRow {
    const COLLECTION: Collection = Collection::Categories;

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Record for WorkoutRow {
    const COLLECTION: Collection = Collection::Workouts;

    fn id(&self) -> Uuid {
        self.id
    }
}

impl<S: SendRequest, C: CacheStore> domain::ExerciseRepository for CachedREST<S, C> {
    async fn sync_exercises(&self) -> Result<Vec<domain::Exercise>, domain::SyncError> {
        sync!(self, self.rest.sync_exercises(), ExerciseRow, "exercises")
    }

    async fn read_exercises(&self) -> Result<Vec<domain::Exercise>, domain::ReadError> {
        let result = self.rest.read_exercises().await;
        if let Ok(ref exercises) = result {
            let rows = exercises.iter().map(ExerciseRow::from).collect::<Vec<_>>();
            if let Err(err) = self.cache.replace_all(&rows).await {
                error!("failed to write exercises into local cache: {err}");
            }
        }
        self.read_all::<ExerciseRow, _>(result, "exercises").await
    }

    async fn create_exercise(
        &self,
        exercise: domain::Exercise,
    ) -> Result<domain::Exercise, domain::CreateError> {
        write_through!(self, self.rest.create_exercise(exercise), ExerciseRow, "exercise")
    }

    async fn replace_exercise(
        &self,
        exercise: domain::Exercise,
    ) -> Result<domain::Exercise, domain::UpdateError> {
        write_through!(self, self.rest.replace_exercise(exercise), ExerciseRow, "exercise")
    }

    async fn delete_exercise(
        &self,
        id: domain::ExerciseID,
    ) -> Result<domain::ExerciseID, domain::DeleteError> {
        delete!(self, self.rest.delete_exercise(id), ExerciseRow, "exercise")
    }
}

impl<S: SendRequest, C: CacheStore> domain::CategoryRepository for CachedREST<S, C> {
    async fn sync_categories(&self) -> Result<Vec<domain::Category>, domain::SyncError> {
        sync!(self, self.rest.sync_categories(), CategoryRow, "categories")
    }

    async fn read_categories(&self) -> Result<Vec<domain::Category>, domain::ReadError> {
        let result = self.rest.read_categories().await;
        if let Ok(ref categories) = result {
            let rows = categories.iter().map(CategoryRow::from).collect::<Vec<_>>();
            if let Err(err) = self.cache.replace_all(&rows).await {
                error!("failed to write categories into local cache: {err}");
            }
        }
        self.read_all::<CategoryRow, _>(result, "categories").await
    }

    async fn create_category(
        &self,
        category: domain::Category,
    ) -> Result<domain::Category, domain::CreateError> {
        write_through!(self, self.rest.create_category(category), CategoryRow, "category")
    }

    async fn replace_category(
        &self,
        category: domain::Category,
    ) -> Result<domain::Category, domain::UpdateError> {
        write_through!(self, self.rest.replace_category(category), CategoryRow, "category")
    }

    async fn count_exercises_in_category(
        &self,
        id: domain::CategoryID,
    ) -> Result<usize, domain::ReadError> {
        self.rest.count_exercises_in_category(id).await
    }

    async fn delete_category(
        &self,
        id: domain::CategoryID,
    ) -> Result<domain::CategoryID, domain::DeleteError> {
        delete!(self, self.rest.delete_category(id), CategoryRow, "category")
    }
}

impl<S: SendRequest, C: CacheStore> domain::WorkoutRepository for CachedREST<S, C> {
    async fn sync_workouts(&self) -> Result<Vec<domain::Workout>, domain::SyncError> {
        sync!(self, self.rest.sync_workouts(), WorkoutRow, "workouts")
    }

    async fn read_workouts(
        &self,
        query: &domain::WorkoutQuery,
    ) -> Result<Vec<domain::Workout>, domain::ReadError> {
        let result = self.rest.read_workouts(query).await;
        if let Ok(ref workouts) = result {
            self.cache_workouts(workouts).await;
        }
        self.read_all::<WorkoutRow, _>(result, "workouts")
            .await
            .map(|workouts| query.apply(workouts))
    }

    async fn read_workout(
        &self,
        id: domain::WorkoutID,
    ) -> Result<domain::Workout, domain::ReadError> {
        match self.rest.read_workout(id).await {
            Ok(workout) => {
                self.cache_workouts(std::slice::from_ref(&workout)).await;
                Ok(workout)
            }
            Err(domain::ReadError::Storage(err)) => {
                debug!("reading workout {id} from local cache: {err}");
                match self.cache.get_by_id::<WorkoutRow>(*id).await {
                    Ok(Some(row)) => Ok(domain::Workout::try_from(row)?),
                    Ok(None) => Err(domain::ReadError::Storage(err)),
                    Err(cache_err) => {
                        error!("failed to read workout {id} from local cache: {cache_err}");
                        Err(domain::ReadError::Storage(err))
                    }
                }
            }
            Err(err) => Err(err),
        }
    }

    async fn read_workout_exercises(
        &self,
        id: domain::WorkoutID,
    ) -> Result<Vec<domain::WorkoutExercise>, domain::ReadError> {
        self.rest.read_workout_exercises(id).await
    }

    async fn create_workout(
        &self,
        workout: domain::Workout,
    ) -> Result<domain::Workout, domain::CreateError> {
        write_through!(self, self.rest.create_workout(workout), WorkoutRow, "workout")
    }

    async fn apply_mutation(&self, mutation: &domain::Mutation) -> Result<(), domain::UpdateError> {
        self.rest.apply_mutation(mutation).await
    }

    async fn modify_workout(
        &self,
        workout: &domain::Workout,
        mutations: &[domain::Mutation],
    ) -> Result<(), domain::UpdateError> {
        let result = self.rest.modify_workout(workout, mutations).await;
        let cached = match result {
            Ok(()) => self.cache.put(&WorkoutRow::from(workout)).await,
            Err(_) => self.cache.delete::<WorkoutRow>(*workout.id).await,
        };
        if let Err(err) = cached {
            error!("failed to update workout {} in local cache: {err}", workout.id);
        }
        result
    }

    async fn delete_workout(
        &self,
        id: domain::WorkoutID,
    ) -> Result<domain::WorkoutID, domain::DeleteError> {
        delete!(self, self.rest.delete_workout(id), WorkoutRow, "workout")
    }
}

impl<S: SendRequest, C: CacheStore> domain::ImageRepository for CachedREST<S, C> {
    async fn upload_image(
        &self,
        image: domain::Image,
    ) -> Result<domain::StoredImage, domain::StorageError> {
        self.rest.upload_image(image).await
    }
}

impl<S: SendRequest, C: CacheStore> domain::BackupRepository for CachedREST<S, C> {
    async fn write_backup(
        &self,
        backup: &domain::Backup,
    ) -> Result<domain::BackupInfo, domain::CreateError> {
        self.rest.write_backup(backup).await
    }

    async fn read_backups(&self) -> Result<Vec<domain::BackupInfo>, domain::ReadError> {
        self.rest.read_backups().await
    }

    async fn read_backup(&self, name: &str) -> Result<domain::Backup, domain::BackupError> {
        self.rest.read_backup(name).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    mod wasm {
        use std::{cell::RefCell, collections::VecDeque};

        use gloo_net::http::{Method, Request, Response};
        use pretty_assertions::assert_eq;
        use serde_json::json;
        use wasm_bindgen_test::wasm_bindgen_test;

        use liftbook_domain::UpdateError;

        use crate::cache::MemoryStore;
        use crate::tests::data::{CATEGORY, EXERCISE, EXERCISES, WORKOUT, WORKOUT_2, WORKOUTS};

        use super::*;

        #[wasm_bindgen_test]
        async fn test_read_exercises() {
            let cached_rest = cached_rest_with_responses([Response::builder()
                .status(200)
                .json(&EXERCISES.iter().map(ExerciseRow::from).collect::<Vec<_>>())]);

            assert_eq!(
                cached_rest.read_exercises().await.unwrap(),
                EXERCISES.clone()
            );

            {
                let requests = cached_rest.rest.sender.requests.borrow();
                assert_eq!(requests[0].method(), Method::GET);
                assert!(
                    requests[0]
                        .url()
                        .starts_with("https://backend.test/rest/v1/exercises?")
                );
                assert_eq!(requests[0].headers().get("apikey"), Some(String::from("key")));
            }

            assert_eq!(
                cached_rest.read_exercises().await.unwrap(),
                EXERCISES.clone()
            );
        }

        #[wasm_bindgen_test]
        async fn test_read_exercises_no_connection() {
            let cached_rest = cached_rest_with_responses([]);

            assert_eq!(cached_rest.read_exercises().await.unwrap(), vec![]);
        }

        #[wasm_bindgen_test]
        async fn test_read_exercises_server_error() {
            let cached_rest = cached_rest_with_responses([Response::builder()
                .status(500)
                .body(Some("internal error"))]);
            cached_rest
                .cache
                .put(&ExerciseRow::from(&*EXERCISE))
                .await
                .unwrap();

            assert_eq!(
                cached_rest.read_exercises().await.unwrap(),
                vec![EXERCISE.clone()]
            );
        }

        #[wasm_bindgen_test]
        async fn test_read_workouts_no_connection() {
            let cached_rest = cached_rest_with_responses([]);
            cached_rest
                .cache
                .replace_all(&WORKOUTS.iter().map(WorkoutRow::from).collect::<Vec<_>>())
                .await
                .unwrap();

            assert_eq!(
                cached_rest
                    .read_workouts(&domain::WorkoutQuery::All)
                    .await
                    .unwrap(),
                vec![WORKOUT.clone()]
            );
            assert_eq!(
                cached_rest
                    .read_workouts(&domain::WorkoutQuery::On(WORKOUT_2.date))
                    .await
                    .unwrap(),
                vec![]
            );
        }

        #[wasm_bindgen_test]
        async fn test_read_workout() {
            let cached_rest = cached_rest_with_responses([Response::builder()
                .status(200)
                .json(&[WorkoutRow::from(&*WORKOUT)])]);

            assert_eq!(
                cached_rest.read_workout(WORKOUT.id).await.unwrap(),
                WORKOUT.clone()
            );
            assert_eq!(
                cached_rest.read_workout(WORKOUT.id).await.unwrap(),
                WORKOUT.clone()
            );
            assert!(matches!(
                cached_rest.read_workout(WORKOUT_2.id).await,
                Err(domain::ReadError::Storage(
                    domain::StorageError::NoConnection
                ))
            ));
        }

        #[wasm_bindgen_test]
        async fn test_read_workout_not_found() {
            let cached_rest =
                cached_rest_with_responses([Response::builder().status(200).json(&json!([]))]);

            assert!(matches!(
                cached_rest.read_workout(WORKOUT.id).await,
                Err(domain::ReadError::NotFound)
            ));
        }

        #[wasm_bindgen_test]
        async fn test_create_category() {
            let cached_rest = cached_rest_with_responses([Response::builder()
                .status(201)
                .json(&[CategoryRow::from(&*CATEGORY)])]);

            assert_eq!(
                cached_rest.create_category(CATEGORY.clone()).await.unwrap(),
                CATEGORY.clone()
            );

            {
                let requests = cached_rest.rest.sender.requests.borrow();
                assert_eq!(requests[0].method(), Method::POST);
                assert_eq!(
                    requests[0].headers().get("Prefer"),
                    Some(String::from("return=representation"))
                );
            }
            assert_eq!(
                cached_rest.cache.get_all::<CategoryRow>().await.unwrap(),
                vec![CategoryRow::from(&*CATEGORY)]
            );
        }

        #[wasm_bindgen_test]
        async fn test_create_category_conflict() {
            let cached_rest =
                cached_rest_with_responses([Response::builder().status(409).body(Some("duplicate"))]);

            assert!(matches!(
                cached_rest.create_category(CATEGORY.clone()).await,
                Err(domain::CreateError::Conflict)
            ));
            assert_eq!(
                cached_rest.cache.get_all::<CategoryRow>().await.unwrap(),
                vec![]
            );
        }

        #[wasm_bindgen_test]
        async fn test_delete_exercise() {
            let cached_rest = cached_rest_with_responses([Response::builder()
                .status(204)
                .body::<Option<&str>>(None)]);
            cached_rest
                .cache
                .put(&ExerciseRow::from(&*EXERCISE))
                .await
                .unwrap();

            assert!(matches!(
                cached_rest.delete_exercise(EXERCISE.id).await,
                Ok(id) if id == EXERCISE.id
            ));
            assert_eq!(
                cached_rest.cache.get_all::<ExerciseRow>().await.unwrap(),
                vec![]
            );
        }

        #[wasm_bindgen_test]
        async fn test_delete_exercise_no_connection() {
            let cached_rest = cached_rest_with_responses([]);
            cached_rest
                .cache
                .put(&ExerciseRow::from(&*EXERCISE))
                .await
                .unwrap();

            assert!(matches!(
                cached_rest.delete_exercise(EXERCISE.id).await,
                Err(domain::DeleteError::Storage(
                    domain::StorageError::NoConnection
                ))
            ));
            assert_eq!(
                cached_rest.cache.get_all::<ExerciseRow>().await.unwrap(),
                vec![ExerciseRow::from(&*EXERCISE)]
            );
        }

        #[wasm_bindgen_test]
        async fn test_create_workout() {
            let cached_rest = cached_rest_with_responses([
                Response::builder().status(201).body::<Option<&str>>(None),
                Response::builder().status(201).body::<Option<&str>>(None),
                Response::builder().status(201).body::<Option<&str>>(None),
            ]);

            assert_eq!(
                cached_rest.create_workout(WORKOUT.clone()).await.unwrap(),
                WORKOUT.clone()
            );

            let urls = cached_rest.rest.sender.urls();
            assert_eq!(urls.len(), 3);
            assert!(urls[0].contains("/rest/v1/workouts"));
            assert!(urls[1].contains("/rest/v1/workout_exercises"));
            assert!(urls[2].contains("/rest/v1/exercise_sets"));
            assert_eq!(
                cached_rest
                    .cache
                    .get_by_id::<WorkoutRow>(*WORKOUT.id)
                    .await
                    .unwrap(),
                Some(WorkoutRow::from(&*WORKOUT))
            );
        }

        #[wasm_bindgen_test]
        async fn test_create_workout_removes_incomplete_rows() {
            let cached_rest = cached_rest_with_responses([
                Response::builder().status(201).body::<Option<&str>>(None),
                Response::builder().status(500).body(Some("insert failed")),
                Response::builder().status(204).body::<Option<&str>>(None),
            ]);

            assert!(matches!(
                cached_rest.create_workout(WORKOUT.clone()).await,
                Err(domain::CreateError::Storage(domain::StorageError::Other(_)))
            ));

            {
                let requests = cached_rest.rest.sender.requests.borrow();
                assert_eq!(requests.len(), 3);
                assert_eq!(requests[2].method(), Method::DELETE);
                assert!(requests[2].url().contains("/rest/v1/workouts?id=eq."));
            }
            assert_eq!(
                cached_rest
                    .cache
                    .get_by_id::<WorkoutRow>(*WORKOUT.id)
                    .await
                    .unwrap(),
                None
            );
        }

        #[wasm_bindgen_test]
        async fn test_modify_workout() {
            let cached_rest = cached_rest_with_responses([
                Response::builder().status(204).body::<Option<&str>>(None),
                Response::builder().status(204).body::<Option<&str>>(None),
            ]);
            let mut workout = WORKOUT.clone();
            workout.exercises[0].sets[1].weight = Some(domain::Weight::new(60.0).unwrap());
            let mutations = domain::plan_update(&WORKOUT.exercises, &workout);

            cached_rest.modify_workout(&workout, &mutations).await.unwrap();

            {
                let requests = cached_rest.rest.sender.requests.borrow();
                assert_eq!(
                    requests.iter().map(Request::method).collect::<Vec<_>>(),
                    vec![Method::PATCH, Method::PATCH]
                );
                assert!(requests[1].url().contains("/rest/v1/exercise_sets?id=eq."));
            }
            assert_eq!(
                cached_rest
                    .cache
                    .get_by_id::<WorkoutRow>(*WORKOUT.id)
                    .await
                    .unwrap(),
                Some(WorkoutRow::from(&workout))
            );
        }

        #[wasm_bindgen_test]
        async fn test_modify_workout_partially_applied() {
            let cached_rest = cached_rest_with_responses([Response::builder()
                .status(204)
                .body::<Option<&str>>(None)]);
            cached_rest
                .cache
                .put(&WorkoutRow::from(&*WORKOUT))
                .await
                .unwrap();
            let mut workout = WORKOUT.clone();
            workout.exercises[0].sets[1].weight = Some(domain::Weight::new(60.0).unwrap());
            let mutations = domain::plan_update(&WORKOUT.exercises, &workout);

            assert!(matches!(
                cached_rest.modify_workout(&workout, &mutations).await,
                Err(UpdateError::PartiallyApplied {
                    applied: 1,
                    total: 2,
                    ..
                })
            ));
            assert_eq!(
                cached_rest
                    .cache
                    .get_by_id::<WorkoutRow>(*WORKOUT.id)
                    .await
                    .unwrap(),
                None
            );
        }

        #[wasm_bindgen_test]
        async fn test_modify_workout_remove_exercise() {
            let cached_rest = cached_rest_with_responses(
                [(); 4].map(|()| Response::builder().status(204).body::<Option<&str>>(None)),
            );
            let mut workout = WORKOUT.clone();
            let removed = workout.exercises.remove(0);
            workout.renumber();
            let mutations = domain::plan_update(&WORKOUT.exercises, &workout);

            assert!(matches!(
                cached_rest.modify_workout(&workout, &mutations).await,
                Err(UpdateError::PartiallyApplied {
                    applied: 4,
                    total: 5,
                    ..
                })
            ));
            let requests = cached_rest.rest.sender.requests.borrow();
            assert_eq!(
                requests.iter().map(Request::method).collect::<Vec<_>>(),
                vec![
                    Method::PATCH,
                    Method::PATCH,
                    Method::DELETE,
                    Method::DELETE,
                    Method::DELETE
                ]
            );
            assert!(requests[2].url().contains(&format!(
                "/rest/v1/exercise_sets?id=eq.{}",
                removed.sets[0].id
            )));
            assert!(requests[4].url().contains(&format!(
                "/rest/v1/workout_exercises?id=eq.{}",
                removed.id
            )));
        }

        #[wasm_bindgen_test]
        async fn test_initialize() {
            let cached_rest = cached_rest_with_responses([]);
            cached_rest
                .cache
                .put(&CategoryRow::from(&*CATEGORY))
                .await
                .unwrap();
            let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();

            cached_rest.initialize(today).await;
            cached_rest.initialize(today).await;

            assert_eq!(
                cached_rest.cache.get_all::<CategoryRow>().await.unwrap(),
                vec![CategoryRow::from(&*CATEGORY)]
            );
            assert_eq!(
                cached_rest.read_exercises().await.unwrap(),
                seed::exercises()
            );
            assert_eq!(
                cached_rest
                    .read_workouts(&domain::WorkoutQuery::On(today))
                    .await
                    .unwrap()
                    .len(),
                1
            );
        }

        #[wasm_bindgen_test]
        fn test_into_service() {
            let mut cached_rest = cached_rest_with_responses([]);
            cached_rest.rest.config.save_attempts = 4;

            assert_eq!(cached_rest.into_service().save_attempts(), 4);
        }

        fn cached_rest_with_responses<const N: usize>(
            responses: [Result<Response, gloo_net::Error>; N],
        ) -> CachedREST<MockSendRequest, MemoryStore> {
            CachedREST {
                rest: REST {
                    sender: MockSendRequest {
                        requests: RefCell::new(vec![]),
                        responses: RefCell::new(responses.into_iter().collect()),
                    },
                    config: Config {
                        backend_url: String::from("https://backend.test/"),
                        api_key: String::from("key"),
                        ..Config::default()
                    },
                },
                cache: MemoryStore::default(),
            }
        }

        struct MockSendRequest {
            requests: RefCell<Vec<Request>>,
            responses: RefCell<VecDeque<Result<Response, gloo_net::Error>>>,
        }

        impl MockSendRequest {
            fn urls(&self) -> Vec<String> {
                self.requests.borrow().iter().map(Request::url).collect()
            }
        }

        impl SendRequest for MockSendRequest {
            async fn send_request(&self, request: Request) -> Result<Response, gloo_net::Error> {
                self.requests.borrow_mut().push(request);
                self.responses
                    .borrow_mut()
                    .pop_front()
                    .unwrap_or(Err(gloo_net::Error::GlooError("no response".to_string())))
            }
        }
    }
}
