use chrono::{NaiveDate, Utc};
use log::{debug, error, warn};

use crate::{
    Backup, BackupError, BackupInfo, BackupRepository, BackupService, Category, CategoryID,
    CategoryRepository, CategoryService, Color, CreateError, DeleteError, Exercise, ExerciseID,
    ExerciseInput, ExerciseRepository, ExerciseService, Image, ImageRepository, KeyedLocks,
    Mutation, Name, PlanSummary, ReadError, RestorePlan, RestoreSummary, SyncError, UpdateError,
    Upsert, ValidationError, Workout, WorkoutID, WorkoutQuery, WorkoutRepository,
    WorkoutService, plan_update, today,
};

pub const DEFAULT_SAVE_ATTEMPTS: usize = 2;

pub struct Service<R> {
    repository: R,
    workout_locks: KeyedLocks<WorkoutID>,
    save_attempts: usize,
}

impl<R> Service<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository,
            workout_locks: KeyedLocks::new(),
            save_attempts: DEFAULT_SAVE_ATTEMPTS,
        }
    }

    /// Sets how often a failed workout save is run, counting the first attempt.
    #[must_use]
    pub fn with_save_attempts(mut self, save_attempts: usize) -> Self {
        self.save_attempts = save_attempts.max(1);
        self
    }

    #[must_use]
    pub fn save_attempts(&self) -> usize {
        self.save_attempts
    }

    #[must_use]
    pub fn repository(&self) -> &R {
        &self.repository
    }
}

impl<R> Service<R>
where
    R: ExerciseRepository + CategoryRepository + WorkoutRepository,
{
    pub async fn sync(&self) -> Result<(), SyncError> {
        self.repository.sync_categories().await?;
        self.repository.sync_exercises().await?;
        self.repository.sync_workouts().await?;
        Ok(())
    }
}

macro_rules! log_on_error {
    ($func: expr, $error: ident, $action: literal, $entity: literal) => {{
        let result = $func.await;
        match result {
            Ok(_) => {}
            Err(ref err) => match err {
                $error::Storage(crate::StorageError::NoConnection) => {
                    debug!("failed to {} {}: {err}", $action, $entity);
                }
                _ => {
                    error!("failed to {} {}: {err}", $action, $entity);
                }
            },
        }
        result
    }};
}

impl<R: ImageRepository> Service<R> {
    /// Uploads an image and returns its public URL. A failed upload is not fatal.
    async fn upload_image(&self, image: Image) -> Option<String> {
        match self.repository.upload_image(image).await {
            Ok(stored) => Some(stored.url),
            Err(err) => {
                warn!("failed to upload image, keeping previous image: {err}");
                None
            }
        }
    }
}

impl<R: ExerciseRepository + ImageRepository> ExerciseService for Service<R> {
    async fn get_exercises(&self) -> Result<Vec<Exercise>, ReadError> {
        log_on_error!(
            self.repository.read_exercises(),
            ReadError,
            "get",
            "exercises"
        )
    }

    async fn get_exercise(&self, id: ExerciseID) -> Result<Exercise, ReadError> {
        log_on_error!(
            async {
                self.repository
                    .read_exercises()
                    .await?
                    .into_iter()
                    .find(|e| e.id == id)
                    .ok_or(ReadError::NotFound)
            },
            ReadError,
            "get",
            "exercise"
        )
    }

    async fn create_exercise(
        &self,
        input: ExerciseInput,
        image: Option<Image>,
    ) -> Result<Exercise, CreateError> {
        log_on_error!(
            async {
                let mut exercise = input.validate(ExerciseID::new())?;
                if let Some(image) = image {
                    exercise.image_url = self.upload_image(image).await.or(exercise.image_url);
                }
                self.repository.create_exercise(exercise).await
            },
            CreateError,
            "create",
            "exercise"
        )
    }

    async fn replace_exercise(
        &self,
        id: ExerciseID,
        input: ExerciseInput,
        image: Option<Image>,
    ) -> Result<Exercise, UpdateError> {
        log_on_error!(
            async {
                let mut exercise = input.validate(id)?;
                if let Some(image) = image {
                    exercise.image_url = self.upload_image(image).await.or(exercise.image_url);
                }
                self.repository.replace_exercise(exercise).await
            },
            UpdateError,
            "replace",
            "exercise"
        )
    }

    async fn delete_exercise(&self, id: ExerciseID) -> Result<ExerciseID, DeleteError> {
        log_on_error!(
            self.repository.delete_exercise(id),
            DeleteError,
            "delete",
            "exercise"
        )
    }
}

impl<R: CategoryRepository> CategoryService for Service<R> {
    async fn get_categories(&self) -> Result<Vec<Category>, ReadError> {
        log_on_error!(
            self.repository.read_categories(),
            ReadError,
            "get",
            "categories"
        )
    }

    async fn create_category(&self, name: &str, color: &str) -> Result<Category, CreateError> {
        log_on_error!(
            async {
                let name = Name::new(name).map_err(ValidationError::from)?;
                self.repository
                    .create_category(Category {
                        id: CategoryID::new(),
                        name,
                        color: Color::new(color),
                    })
                    .await
            },
            CreateError,
            "create",
            "category"
        )
    }

    async fn replace_category(&self, category: Category) -> Result<Category, UpdateError> {
        log_on_error!(
            self.repository.replace_category(category),
            UpdateError,
            "replace",
            "category"
        )
    }

    async fn delete_category(&self, id: CategoryID) -> Result<CategoryID, DeleteError> {
        log_on_error!(
            async {
                let count = self.repository.count_exercises_in_category(id).await?;
                if count > 0 {
                    return Err(DeleteError::InUse(count));
                }
                self.repository.delete_category(id).await
            },
            DeleteError,
            "delete",
            "category"
        )
    }
}

impl<R: WorkoutRepository> Service<R> {
    async fn query_workouts(&self, query: WorkoutQuery) -> Vec<Workout> {
        log_on_error!(
            self.repository.read_workouts(&query),
            ReadError,
            "get",
            "workouts"
        )
        .unwrap_or_default()
    }

    /// Converges the stored workout to `workout`, running the whole reconciliation again
    /// from the current stored state if a transient failure interrupted it. A workout that
    /// was never stored is created.
    async fn save_workout(&self, mut workout: Workout) -> Result<Workout, UpdateError> {
        if workout.id.is_nil() {
            workout.id = WorkoutID::new();
        }
        workout.renumber();

        let lock = self.workout_locks.get(workout.id);
        let _guard = lock.lock().await;

        let mut attempt = 1;
        loop {
            let result = match self.repository.read_workout_exercises(workout.id).await {
                Ok(persisted) => {
                    let mutations = plan_update(&persisted, &workout);
                    debug!(
                        "saving workout {}: {:?}",
                        workout.id,
                        PlanSummary::of(&mutations)
                    );
                    self.repository.modify_workout(&workout, &mutations).await
                }
                Err(ReadError::NotFound) => {
                    debug!("creating workout {} on first save", workout.id);
                    self.repository
                        .create_workout(workout.clone())
                        .await
                        .map(|_| ())
                        .map_err(UpdateError::from)
                }
                Err(err) => Err(err.into()),
            };

            match result {
                Ok(()) => break,
                Err(err) if err.is_transient() && attempt < self.save_attempts => {
                    warn!(
                        "failed to save workout {} (attempt {attempt} of {}), retrying: {err}",
                        workout.id, self.save_attempts
                    );
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }

        match self.repository.read_workout(workout.id).await {
            Ok(saved) => Ok(saved),
            Err(err) => {
                debug!("failed to read saved workout {}: {err}", workout.id);
                Ok(workout)
            }
        }
    }
}

impl<R: WorkoutRepository> WorkoutService for Service<R> {
    async fn get_workouts_on(&self, date: NaiveDate) -> Vec<Workout> {
        self.query_workouts(WorkoutQuery::On(date)).await
    }

    async fn get_workout(&self, id: WorkoutID) -> Option<Workout> {
        match self.repository.read_workout(id).await {
            Ok(workout) => Some(workout),
            Err(ReadError::NotFound) => None,
            Err(ReadError::Storage(crate::StorageError::NoConnection)) => {
                debug!("failed to get workout: no connection");
                None
            }
            Err(err) => {
                error!("failed to get workout: {err}");
                None
            }
        }
    }

    async fn get_todays_workouts(&self) -> Vec<Workout> {
        self.get_workouts_on(today()).await
    }

    async fn get_upcoming_workouts(&self, limit: usize) -> Vec<Workout> {
        self.query_workouts(WorkoutQuery::Upcoming {
            today: today(),
            limit,
        })
        .await
    }

    async fn get_recent_workouts(&self, limit: usize) -> Vec<Workout> {
        self.query_workouts(WorkoutQuery::Recent {
            today: today(),
            limit,
        })
        .await
    }

    async fn get_all_workouts(&self) -> Vec<Workout> {
        self.query_workouts(WorkoutQuery::All).await
    }

    async fn create_workout(&self, mut workout: Workout) -> Result<Workout, CreateError> {
        if workout.id.is_nil() {
            workout.id = WorkoutID::new();
        }
        workout.renumber();
        log_on_error!(
            self.repository.create_workout(workout),
            CreateError,
            "create",
            "workout"
        )
    }

    async fn update_workout(&self, workout: Workout) -> Result<Workout, UpdateError> {
        log_on_error!(
            self.save_workout(workout),
            UpdateError,
            "update",
            "workout"
        )
    }

    async fn archive_workout(&self, id: WorkoutID) -> Result<Workout, UpdateError> {
        log_on_error!(
            async {
                let lock = self.workout_locks.get(id);
                let _guard = lock.lock().await;

                let mut workout = self.repository.read_workout(id).await?;
                workout.archived = true;
                self.repository
                    .modify_workout(&workout, &[Mutation::UpdateWorkout(workout.fields())])
                    .await?;
                Ok::<_, UpdateError>(workout)
            },
            UpdateError,
            "archive",
            "workout"
        )
    }

    async fn delete_workout(&self, id: WorkoutID) -> Result<WorkoutID, DeleteError> {
        log_on_error!(
            async {
                let lock = self.workout_locks.get(id);
                let _guard = lock.lock().await;

                self.repository.delete_workout(id).await
            },
            DeleteError,
            "delete",
            "workout"
        )
    }
}

fn log_backup_error<T>(result: Result<T, BackupError>, action: &str) -> Result<T, BackupError> {
    if let Err(ref err) = result {
        if err.is_no_connection() {
            debug!("failed to {action} backup: {err}");
        } else {
            error!("failed to {action} backup: {err}");
        }
    }
    result
}

impl<R> BackupService for Service<R>
where
    R: BackupRepository + ExerciseRepository + CategoryRepository,
{
    async fn create_backup(&self) -> Result<BackupInfo, BackupError> {
        let result = async {
            let categories = self.repository.read_categories().await?;
            let exercises = self.repository.read_exercises().await?;
            let backup = Backup::new(exercises, categories, Utc::now());
            Ok::<_, BackupError>(self.repository.write_backup(&backup).await?)
        }
        .await;
        log_backup_error(result, "create")
    }

    async fn get_backups(&self) -> Result<Vec<BackupInfo>, BackupError> {
        let result = async {
            let mut backups = self.repository.read_backups().await?;
            backups.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok::<_, BackupError>(backups)
        }
        .await;
        log_backup_error(result, "get")
    }

    async fn get_backup(&self, name: &str) -> Result<Backup, BackupError> {
        log_backup_error(self.repository.read_backup(name).await, "read")
    }

    async fn restore_backup(&self, backup: Backup) -> Result<RestoreSummary, BackupError> {
        let result = async {
            let categories = self.repository.read_categories().await?;
            let exercises = self.repository.read_exercises().await?;
            let plan = RestorePlan::new(&backup, &categories, &exercises)?;

            let mut summary = RestoreSummary::default();

            for upsert in plan.categories {
                match upsert {
                    Upsert::Insert(category) => {
                        match self.repository.create_category(category.clone()).await {
                            Ok(_) => summary.categories_inserted += 1,
                            Err(CreateError::Conflict) => {
                                self.repository.replace_category(category).await?;
                                summary.categories_updated += 1;
                            }
                            Err(err) => return Err(err.into()),
                        }
                    }
                    Upsert::Update(category) => {
                        self.repository.replace_category(category).await?;
                        summary.categories_updated += 1;
                    }
                }
            }

            for upsert in plan.exercises {
                match upsert {
                    Upsert::Insert(exercise) => {
                        match self.repository.create_exercise(exercise.clone()).await {
                            Ok(_) => summary.exercises_inserted += 1,
                            Err(CreateError::Conflict) => {
                                self.repository.replace_exercise(exercise).await?;
                                summary.exercises_updated += 1;
                            }
                            Err(err) => return Err(err.into()),
                        }
                    }
                    Upsert::Update(exercise) => {
                        self.repository.replace_exercise(exercise).await?;
                        summary.exercises_updated += 1;
                    }
                }
            }

            Ok::<_, BackupError>(summary)
        }
        .await;
        log_backup_error(result, "restore")
    }
}
