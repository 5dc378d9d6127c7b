//! REST
//!
//! Access to the hosted relational store (PostgREST conventions) and its object storage
//! buckets. Rows are exchanged as typed DTOs and mapped into domain entities right at this
//! boundary.

use std::pin::pin;

use chrono::{DateTime, NaiveDate, Utc};
use futures_util::future::{Either, select};
use gloo_net::http::{Method, Request, RequestBuilder, Response};
use gloo_timers::future::TimeoutFuture;
use log::{error, warn};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::json;
use uuid::Uuid;

use liftbook_domain::{
    self as domain, CategoryRepository as _, ExerciseRepository as _, WorkoutRepository as _,
};
use liftbook_web_app::Config;

/// Columns of a workout including its exercises and sets.
pub const WORKOUT_SELECT: &str = "id,name,description,date,completed,progress,archived,\
    workout_exercises(id,workout_id,exercise_id,order_index,\
    exercise:exercises(id,name,description,category,image_url),\
    exercise_sets(id,workout_exercise_id,set_number,weight,target_reps,actual_reps,completed,notes))";

#[allow(async_fn_in_trait)]
pub trait SendRequest {
    async fn send_request(&self, request: Request) -> Result<Response, gloo_net::Error>;
}

#[derive(Clone)]
pub struct GlooNetSendRequest {
    pub timeout_ms: u32,
}

impl SendRequest for GlooNetSendRequest {
    async fn send_request(&self, request: Request) -> Result<Response, gloo_net::Error> {
        let response = pin!(request.send());
        let timeout = pin!(TimeoutFuture::new(self.timeout_ms));
        match select(response, timeout).await {
            Either::Left((result, _)) => result,
            Either::Right(((), _)) => Err(gloo_net::Error::GlooError(format!(
                "request timed out after {} ms",
                self.timeout_ms
            ))),
        }
    }
}

#[derive(Clone)]
pub struct REST<S: SendRequest> {
    pub sender: S,
    pub config: Config,
}

impl REST<GlooNetSendRequest> {
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            sender: GlooNetSendRequest {
                timeout_ms: config.request_timeout_ms,
            },
            config,
        }
    }
}

impl<S: SendRequest> REST<S> {
    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.config.api_key)
            .header("Authorization", &format!("Bearer {}", self.config.api_key))
    }

    fn table(&self, method: Method, table: &str) -> RequestBuilder {
        self.authorize(
            RequestBuilder::new(&format!("{}/rest/v1/{table}", self.config.base_url()))
                .method(method),
        )
    }

    fn object(&self, method: Method, path: &str) -> RequestBuilder {
        self.authorize(
            RequestBuilder::new(&format!(
                "{}/storage/v1/object/{path}",
                self.config.base_url()
            ))
            .method(method),
        )
    }

    #[must_use]
    pub fn public_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{bucket}/{path}",
            self.config.base_url()
        )
    }

    async fn send(&self, request: Result<Request, gloo_net::Error>) -> Result<Response, RestError> {
        let request = request.map_err(RestError::Request)?;
        let response = self
            .sender
            .send_request(request)
            .await
            .map_err(|err| RestError::NoConnection(err.to_string()))?;
        match response.status() {
            200..=299 => Ok(response),
            404 => Err(RestError::NotFound),
            409 => Err(RestError::Conflict),
            status => Err(RestError::Status {
                status,
                message: response.text().await.unwrap_or_default(),
            }),
        }
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        request: Result<Request, gloo_net::Error>,
    ) -> Result<T, RestError> {
        self.send(request)
            .await?
            .json::<T>()
            .await
            .map_err(RestError::Deserialize)
    }

    async fn fetch_no_content(
        &self,
        request: Result<Request, gloo_net::Error>,
    ) -> Result<(), RestError> {
        self.send(request).await?;
        Ok(())
    }

    async fn fetch_one<R, T>(&self, request: Result<Request, gloo_net::Error>) -> Result<T, RestError>
    where
        R: DeserializeOwned,
        T: TryFrom<R, Error = MappingError>,
    {
        let rows: Vec<R> = self.fetch(request).await?;
        Ok(T::try_from(rows.into_iter().next().ok_or(RestError::NotFound)?)?)
    }

    async fn fetch_all<R, T>(
        &self,
        request: Result<Request, gloo_net::Error>,
    ) -> Result<Vec<T>, RestError>
    where
        R: DeserializeOwned,
        T: TryFrom<R, Error = MappingError>,
    {
        let rows: Vec<R> = self.fetch(request).await?;
        Ok(rows
            .into_iter()
            .map(T::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn insert_children(&self, rows: &WorkoutRows) -> Result<(), RestError> {
        if !rows.workout_exercises.is_empty() {
            self.fetch_no_content(
                self.table(Method::POST, "workout_exercises")
                    .json(&rows.workout_exercises),
            )
            .await?;
        }
        if !rows.exercise_sets.is_empty() {
            self.fetch_no_content(
                self.table(Method::POST, "exercise_sets")
                    .json(&rows.exercise_sets),
            )
            .await?;
        }
        Ok(())
    }
}

impl<S: SendRequest> domain::ExerciseRepository for REST<S> {
    async fn sync_exercises(&self) -> Result<Vec<domain::Exercise>, domain::SyncError> {
        Ok(self.read_exercises().await?)
    }

    async fn read_exercises(&self) -> Result<Vec<domain::Exercise>, domain::ReadError> {
        Ok(self
            .fetch_all::<ExerciseRow, _>(
                self.table(Method::GET, "exercises")
                    .query([("select", "*"), ("order", "name.asc")])
                    .build(),
            )
            .await?)
    }

    async fn create_exercise(
        &self,
        exercise: domain::Exercise,
    ) -> Result<domain::Exercise, domain::CreateError> {
        Ok(self
            .fetch_one::<ExerciseRow, _>(
                self.table(Method::POST, "exercises")
                    .header("Prefer", "return=representation")
                    .json(&ExerciseRow::from(&exercise)),
            )
            .await?)
    }

    async fn replace_exercise(
        &self,
        exercise: domain::Exercise,
    ) -> Result<domain::Exercise, domain::UpdateError> {
        Ok(self
            .fetch_one::<ExerciseRow, _>(
                self.table(Method::PATCH, "exercises")
                    .query([("id", format!("eq.{}", exercise.id))])
                    .header("Prefer", "return=representation")
                    .json(&ExerciseRow::from(&exercise)),
            )
            .await?)
    }

    async fn delete_exercise(
        &self,
        id: domain::ExerciseID,
    ) -> Result<domain::ExerciseID, domain::DeleteError> {
        self.fetch_no_content(
            self.table(Method::DELETE, "exercises")
                .query([("id", format!("eq.{id}"))])
                .build(),
        )
        .await?;
        Ok(id)
    }
}

impl<S: SendRequest> domain::CategoryRepository for REST<S> {
    async fn sync_categories(&self) -> Result<Vec<domain::Category>, domain::SyncError> {
        Ok(self.read_categories().await?)
    }

    async fn read_categories(&self) -> Result<Vec<domain::Category>, domain::ReadError> {
        Ok(self
            .fetch_all::<CategoryRow, _>(
                self.table(Method::GET, "categories")
                    .query([("select", "*"), ("order", "name.asc")])
                    .build(),
            )
            .await?)
    }

    async fn create_category(
        &self,
        category: domain::Category,
    ) -> Result<domain::Category, domain::CreateError> {
        Ok(self
            .fetch_one::<CategoryRow, _>(
                self.table(Method::POST, "categories")
                    .header("Prefer", "return=representation")
                    .json(&CategoryRow::from(&category)),
            )
            .await?)
    }

    async fn replace_category(
        &self,
        category: domain::Category,
    ) -> Result<domain::Category, domain::UpdateError> {
        Ok(self
            .fetch_one::<CategoryRow, _>(
                self.table(Method::PATCH, "categories")
                    .query([("id", format!("eq.{}", category.id))])
                    .header("Prefer", "return=representation")
                    .json(&CategoryRow::from(&category)),
            )
            .await?)
    }

    async fn count_exercises_in_category(
        &self,
        id: domain::CategoryID,
    ) -> Result<usize, domain::ReadError> {
        let rows: Vec<IdRow> = self
            .fetch(
                self.table(Method::GET, "exercises")
                    .query([("select", "id".to_string()), ("category", format!("eq.{id}"))])
                    .build(),
            )
            .await?;
        Ok(rows.len())
    }

    async fn delete_category(
        &self,
        id: domain::CategoryID,
    ) -> Result<domain::CategoryID, domain::DeleteError> {
        self.fetch_no_content(
            self.table(Method::DELETE, "categories")
                .query([("id", format!("eq.{id}"))])
                .build(),
        )
        .await?;
        Ok(id)
    }
}

impl<S: SendRequest> domain::WorkoutRepository for REST<S> {
    async fn sync_workouts(&self) -> Result<Vec<domain::Workout>, domain::SyncError> {
        Ok(self.read_workouts(&domain::WorkoutQuery::All).await?)
    }

    async fn read_workouts(
        &self,
        query: &domain::WorkoutQuery,
    ) -> Result<Vec<domain::Workout>, domain::ReadError> {
        let params = workout_query_params(query);
        Ok(self
            .fetch_all::<WorkoutRow, _>(
                self.table(Method::GET, "workouts")
                    .query(params.iter().map(|(k, v)| (*k, v)))
                    .build(),
            )
            .await?)
    }

    async fn read_workout(
        &self,
        id: domain::WorkoutID,
    ) -> Result<domain::Workout, domain::ReadError> {
        let params = workout_params(id);
        Ok(self
            .fetch_one::<WorkoutRow, _>(
                self.table(Method::GET, "workouts")
                    .query(params.iter().map(|(k, v)| (*k, v)))
                    .build(),
            )
            .await?)
    }

    async fn read_workout_exercises(
        &self,
        id: domain::WorkoutID,
    ) -> Result<Vec<domain::WorkoutExercise>, domain::ReadError> {
        Ok(self.read_workout(id).await?.exercises)
    }

    async fn create_workout(
        &self,
        workout: domain::Workout,
    ) -> Result<domain::Workout, domain::CreateError> {
        let rows = to_rows(&workout);

        self.fetch_no_content(self.table(Method::POST, "workouts").json(&rows.workout))
            .await?;

        if let Err(err) = self.insert_children(&rows).await {
            warn!(
                "failed to create workout {}, removing incomplete rows: {err}",
                workout.id
            );
            if let Err(rollback_err) = self
                .fetch_no_content(
                    self.table(Method::DELETE, "workouts")
                        .query([("id", format!("eq.{}", workout.id))])
                        .build(),
                )
                .await
            {
                error!(
                    "failed to remove incomplete workout {}: {rollback_err}",
                    workout.id
                );
            }
            return Err(err.into());
        }

        Ok(workout)
    }

    async fn apply_mutation(&self, mutation: &domain::Mutation) -> Result<(), domain::UpdateError> {
        let request = match mutation {
            domain::Mutation::UpdateWorkout(fields) => self
                .table(Method::PATCH, "workouts")
                .query([("id", format!("eq.{}", fields.id))])
                .json(&WorkoutRecord::from(fields)),
            domain::Mutation::InsertWorkoutExercise {
                id,
                workout_id,
                exercise_id,
                order,
            } => self
                .table(Method::POST, "workout_exercises")
                .json(&WorkoutExerciseRecord {
                    id: **id,
                    workout_id: **workout_id,
                    exercise_id: **exercise_id,
                    order_index: *order,
                }),
            domain::Mutation::UpdateWorkoutExerciseOrder { id, order } => self
                .table(Method::PATCH, "workout_exercises")
                .query([("id", format!("eq.{id}"))])
                .json(&json!({ "order_index": order })),
            domain::Mutation::DeleteWorkoutExercise { id } => self
                .table(Method::DELETE, "workout_exercises")
                .query([("id", format!("eq.{id}"))])
                .build(),
            domain::Mutation::InsertSet {
                workout_exercise_id,
                set,
            } => self
                .table(Method::POST, "exercise_sets")
                .json(&ExerciseSetRow::new(*workout_exercise_id, set)),
            domain::Mutation::UpdateSet { set } => self
                .table(Method::PATCH, "exercise_sets")
                .query([("id", format!("eq.{}", set.id))])
                .json(&SetChanges::from(set)),
            domain::Mutation::DeleteSet { id } => self
                .table(Method::DELETE, "exercise_sets")
                .query([("id", format!("eq.{id}"))])
                .build(),
        };
        Ok(self.fetch_no_content(request).await?)
    }

    async fn delete_workout(
        &self,
        id: domain::WorkoutID,
    ) -> Result<domain::WorkoutID, domain::DeleteError> {
        self.fetch_no_content(
            self.table(Method::DELETE, "workouts")
                .query([("id", format!("eq.{id}"))])
                .build(),
        )
        .await?;
        Ok(id)
    }
}

impl<S: SendRequest> domain::ImageRepository for REST<S> {
    async fn upload_image(
        &self,
        image: domain::Image,
    ) -> Result<domain::StoredImage, domain::StorageError> {
        let bucket = &self.config.image_bucket;
        let path = format!("{}.{}", Uuid::new_v4(), image.extension());
        self.fetch_no_content(
            self.object(Method::POST, &format!("{bucket}/{path}"))
                .header("Content-Type", &image.content_type)
                .header("x-upsert", "true")
                .body(js_sys::Uint8Array::from(&image.data[..])),
        )
        .await?;
        Ok(domain::StoredImage {
            url: self.public_url(bucket, &path),
            path,
        })
    }
}

impl<S: SendRequest> domain::BackupRepository for REST<S> {
    async fn write_backup(
        &self,
        backup: &domain::Backup,
    ) -> Result<domain::BackupInfo, domain::CreateError> {
        let name = backup.name();
        let document = crate::backup::to_json(backup)
            .map_err(|err| domain::CreateError::Other(Box::new(err)))?;
        let size = document.len() as u64;
        self.fetch_no_content(
            self.object(
                Method::POST,
                &format!("{}/{name}", self.config.backup_bucket),
            )
            .header("Content-Type", "application/json")
            .body(document),
        )
        .await?;
        Ok(domain::BackupInfo {
            name,
            created_at: Some(backup.timestamp),
            size: Some(size),
        })
    }

    async fn read_backups(&self) -> Result<Vec<domain::BackupInfo>, domain::ReadError> {
        let objects: Vec<StorageObject> = self
            .fetch(
                self.object(
                    Method::POST,
                    &format!("list/{}", self.config.backup_bucket),
                )
                .json(&json!({
                    "prefix": "",
                    "limit": 100,
                    "offset": 0,
                    "sortBy": { "column": "created_at", "order": "desc" },
                })),
            )
            .await?;
        Ok(objects
            .into_iter()
            .filter(|o| o.name.ends_with(".json"))
            .map(domain::BackupInfo::from)
            .collect())
    }

    async fn read_backup(&self, name: &str) -> Result<domain::Backup, domain::BackupError> {
        let response = self
            .send(
                self.object(
                    Method::GET,
                    &format!("{}/{name}", self.config.backup_bucket),
                )
                .build(),
            )
            .await
            .map_err(domain::ReadError::from)?;
        let document = response
            .text()
            .await
            .map_err(|err| domain::ReadError::from(RestError::Deserialize(err)))?;
        crate::backup::parse(&document)
    }
}

/// Query parameters selecting the workouts of `query` with their exercises and sets.
#[must_use]
pub fn workout_query_params(query: &domain::WorkoutQuery) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("select", WORKOUT_SELECT.to_string()),
        ("archived", "not.is.true".to_string()),
    ];
    match query {
        domain::WorkoutQuery::On(date) => params.push(("date", format!("eq.{date}"))),
        domain::WorkoutQuery::Upcoming { today, .. } => {
            params.push(("date", format!("gt.{today}")));
            params.push(("completed", "eq.false".to_string()));
        }
        domain::WorkoutQuery::Recent { today, .. } => {
            params.push(("date", format!("lte.{today}")));
        }
        domain::WorkoutQuery::All => {}
    }
    params.push((
        "order",
        match query.sort_order() {
            domain::SortOrder::Ascending => "date.asc",
            domain::SortOrder::Descending => "date.desc",
        }
        .to_string(),
    ));
    params.extend(nested_order_params());
    if let Some(limit) = query.limit() {
        params.push(("limit", limit.to_string()));
    }
    params
}

/// Query parameters selecting a single workout, archived or not.
#[must_use]
pub fn workout_params(id: domain::WorkoutID) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("select", WORKOUT_SELECT.to_string()),
        ("id", format!("eq.{id}")),
    ];
    params.extend(nested_order_params());
    params
}

fn nested_order_params() -> [(&'static str, String); 2] {
    [
        ("workout_exercises.order", "order_index.asc".to_string()),
        (
            "workout_exercises.exercise_sets.order",
            "set_number.asc".to_string(),
        ),
    ]
}

#[derive(thiserror::Error, Debug)]
pub enum RestError {
    #[error("no connection: {0}")]
    NoConnection(String),
    #[error("not found")]
    NotFound,
    #[error("conflict")]
    Conflict,
    #[error("unexpected response ({status}): {message}")]
    Status { status: u16, message: String },
    #[error("invalid request: {0}")]
    Request(gloo_net::Error),
    #[error("invalid response: {0}")]
    Deserialize(gloo_net::Error),
    #[error(transparent)]
    Mapping(#[from] MappingError),
}

impl From<RestError> for domain::StorageError {
    fn from(value: RestError) -> Self {
        match value {
            RestError::NoConnection(_) => domain::StorageError::NoConnection,
            err => domain::StorageError::Other(Box::new(err)),
        }
    }
}

impl From<RestError> for domain::ReadError {
    fn from(value: RestError) -> Self {
        match value {
            RestError::NotFound => domain::ReadError::NotFound,
            err => domain::StorageError::from(err).into(),
        }
    }
}

impl From<RestError> for domain::SyncError {
    fn from(value: RestError) -> Self {
        domain::StorageError::from(value).into()
    }
}

impl From<RestError> for domain::CreateError {
    fn from(value: RestError) -> Self {
        match value {
            RestError::Conflict => domain::CreateError::Conflict,
            err => domain::StorageError::from(err).into(),
        }
    }
}

impl From<RestError> for domain::UpdateError {
    fn from(value: RestError) -> Self {
        match value {
            RestError::Conflict => domain::UpdateError::Conflict,
            RestError::NotFound => domain::UpdateError::NotFound,
            err => domain::StorageError::from(err).into(),
        }
    }
}

impl From<RestError> for domain::DeleteError {
    fn from(value: RestError) -> Self {
        domain::StorageError::from(value).into()
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum MappingError {
    #[error(transparent)]
    Name(#[from] domain::NameError),
    #[error(transparent)]
    Reps(#[from] domain::RepsError),
    #[error(transparent)]
    Weight(#[from] domain::WeightError),
    #[error(transparent)]
    Progress(#[from] domain::ProgressError),
}

impl From<MappingError> for domain::ReadError {
    fn from(value: MappingError) -> Self {
        domain::ReadError::Other(Box::new(value))
    }
}

#[derive(Deserialize)]
struct IdRow {
    #[allow(dead_code)]
    id: Uuid,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ExerciseRow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<Uuid>,
    pub image_url: Option<String>,
}

impl From<&domain::Exercise> for ExerciseRow {
    fn from(value: &domain::Exercise) -> Self {
        Self {
            id: *value.id,
            name: value.name.to_string(),
            description: non_empty(&value.description),
            category: value.category.map(|id| *id),
            image_url: value.image_url.clone(),
        }
    }
}

impl TryFrom<ExerciseRow> for domain::Exercise {
    type Error = MappingError;

    fn try_from(value: ExerciseRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id.into(),
            name: domain::Name::new(&value.name)?,
            description: value.description.unwrap_or_default(),
            category: value.category.map(domain::CategoryID::from),
            image_url: value.image_url.filter(|url| !url.is_empty()),
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CategoryRow {
    pub id: Uuid,
    pub name: String,
    pub color: Option<String>,
}

impl From<&domain::Category> for CategoryRow {
    fn from(value: &domain::Category) -> Self {
        Self {
            id: *value.id,
            name: value.name.to_string(),
            color: Some(value.color.to_string()),
        }
    }
}

impl TryFrom<CategoryRow> for domain::Category {
    type Error = MappingError;

    fn try_from(value: CategoryRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id.into(),
            name: domain::Name::new(&value.name)?,
            color: domain::Color::from(value.color),
        })
    }
}

/// A workout row joined with its workout exercise rows.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WorkoutRow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub completed: bool,
    pub progress: Option<u8>,
    pub archived: Option<bool>,
    #[serde(default)]
    pub workout_exercises: Vec<WorkoutExerciseRow>,
}

/// A workout exercise row joined with its exercise row and set rows.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WorkoutExerciseRow {
    pub id: Uuid,
    pub workout_id: Uuid,
    pub exercise_id: Uuid,
    pub order_index: u32,
    pub exercise: Option<ExerciseRow>,
    #[serde(default)]
    pub exercise_sets: Vec<ExerciseSetRow>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ExerciseSetRow {
    pub id: Uuid,
    pub workout_exercise_id: Uuid,
    pub set_number: u32,
    pub weight: Option<f32>,
    pub target_reps: u32,
    pub actual_reps: Option<u32>,
    pub completed: bool,
    pub notes: Option<String>,
}

impl ExerciseSetRow {
    #[must_use]
    pub fn new(workout_exercise_id: domain::WorkoutExerciseID, set: &domain::ExerciseSet) -> Self {
        Self {
            id: *set.id,
            workout_exercise_id: *workout_exercise_id,
            set_number: set.set_number,
            weight: set.weight.map(f32::from),
            target_reps: set.target_reps.into(),
            actual_reps: set.actual_reps.map(u32::from),
            completed: set.completed,
            notes: non_empty(&set.notes),
        }
    }
}

/// Values of a set row that an update may change.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SetChanges {
    pub set_number: u32,
    pub weight: Option<f32>,
    pub target_reps: u32,
    pub actual_reps: Option<u32>,
    pub completed: bool,
    pub notes: Option<String>,
}

impl From<&domain::ExerciseSet> for SetChanges {
    fn from(value: &domain::ExerciseSet) -> Self {
        Self {
            set_number: value.set_number,
            weight: value.weight.map(f32::from),
            target_reps: value.target_reps.into(),
            actual_reps: value.actual_reps.map(u32::from),
            completed: value.completed,
            notes: non_empty(&value.notes),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WorkoutRecord {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub completed: bool,
    pub progress: u8,
    pub archived: bool,
}

impl From<&domain::WorkoutFields> for WorkoutRecord {
    fn from(value: &domain::WorkoutFields) -> Self {
        Self {
            id: *value.id,
            name: value.name.to_string(),
            description: non_empty(&value.description),
            date: value.date,
            completed: value.completed,
            progress: value.progress.into(),
            archived: value.archived,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WorkoutExerciseRecord {
    pub id: Uuid,
    pub workout_id: Uuid,
    pub exercise_id: Uuid,
    pub order_index: u32,
}

/// Flat rows of one workout, in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutRows {
    pub workout: WorkoutRecord,
    pub workout_exercises: Vec<WorkoutExerciseRecord>,
    pub exercise_sets: Vec<ExerciseSetRow>,
}

#[must_use]
pub fn to_rows(workout: &domain::Workout) -> WorkoutRows {
    WorkoutRows {
        workout: WorkoutRecord::from(&workout.fields()),
        workout_exercises: workout
            .exercises
            .iter()
            .map(|e| WorkoutExerciseRecord {
                id: *e.id,
                workout_id: *workout.id,
                exercise_id: *e.exercise_id,
                order_index: e.order,
            })
            .collect(),
        exercise_sets: workout
            .exercises
            .iter()
            .flat_map(|e| e.sets.iter().map(|s| ExerciseSetRow::new(e.id, s)))
            .collect(),
    }
}

impl From<&domain::Workout> for WorkoutRow {
    fn from(value: &domain::Workout) -> Self {
        Self {
            id: *value.id,
            name: value.name.to_string(),
            description: non_empty(&value.description),
            date: value.date,
            completed: value.completed,
            progress: Some(value.progress.into()),
            archived: Some(value.archived),
            workout_exercises: value
                .exercises
                .iter()
                .map(|e| WorkoutExerciseRow {
                    id: *e.id,
                    workout_id: *value.id,
                    exercise_id: *e.exercise_id,
                    order_index: e.order,
                    exercise: e.exercise.as_ref().map(ExerciseRow::from),
                    exercise_sets: e
                        .sets
                        .iter()
                        .map(|s| ExerciseSetRow::new(e.id, s))
                        .collect(),
                })
                .collect(),
        }
    }
}

/// Keeps the stored order of exercises and sets.
impl TryFrom<WorkoutRow> for domain::Workout {
    type Error = MappingError;

    fn try_from(value: WorkoutRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id.into(),
            name: domain::Name::new(&value.name)?,
            description: value.description.unwrap_or_default(),
            date: value.date,
            exercises: value
                .workout_exercises
                .into_iter()
                .map(domain::WorkoutExercise::try_from)
                .collect::<Result<Vec<_>, _>>()?,
            completed: value.completed,
            progress: domain::Progress::new(value.progress.unwrap_or_default())?,
            archived: value.archived.unwrap_or_default(),
        })
    }
}

impl TryFrom<WorkoutExerciseRow> for domain::WorkoutExercise {
    type Error = MappingError;

    fn try_from(value: WorkoutExerciseRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id.into(),
            exercise_id: value.exercise_id.into(),
            exercise: value
                .exercise
                .map(domain::Exercise::try_from)
                .transpose()?,
            sets: value
                .exercise_sets
                .into_iter()
                .map(domain::ExerciseSet::try_from)
                .collect::<Result<Vec<_>, _>>()?,
            order: value.order_index,
        })
    }
}

impl TryFrom<ExerciseSetRow> for domain::ExerciseSet {
    type Error = MappingError;

    fn try_from(value: ExerciseSetRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id.into(),
            set_number: value.set_number,
            target_reps: domain::Reps::new(value.target_reps)?,
            actual_reps: value.actual_reps.map(domain::Reps::new).transpose()?,
            weight: value.weight.map(domain::Weight::new).transpose()?,
            completed: value.completed,
            notes: value.notes.unwrap_or_default(),
        })
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct StorageObject {
    pub name: String,
    pub created_at: Option<DateTime<Utc>>,
    pub metadata: Option<StorageObjectMetadata>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct StorageObjectMetadata {
    pub size: Option<u64>,
}

impl From<StorageObject> for domain::BackupInfo {
    fn from(value: StorageObject) -> Self {
        Self {
            name: value.name,
            created_at: value.created_at,
            size: value.metadata.and_then(|m| m.size),
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
