use chrono::{Local, NaiveDate};
use derive_more::{Display, Into};

use crate::{
    CreateError, DeleteError, Exercise, ExerciseID, Mutation, Name, ReadError, SyncError,
    UpdateError,
};

#[allow(async_fn_in_trait)]
pub trait WorkoutService {
    async fn get_workouts_on(&self, date: NaiveDate) -> Vec<Workout>;
    async fn get_workout(&self, id: WorkoutID) -> Option<Workout>;
    async fn get_todays_workouts(&self) -> Vec<Workout>;
    async fn get_upcoming_workouts(&self, limit: usize) -> Vec<Workout>;
    async fn get_recent_workouts(&self, limit: usize) -> Vec<Workout>;
    async fn get_all_workouts(&self) -> Vec<Workout>;
    async fn create_workout(&self, workout: Workout) -> Result<Workout, CreateError>;
    async fn update_workout(&self, workout: Workout) -> Result<Workout, UpdateError>;
    async fn archive_workout(&self, id: WorkoutID) -> Result<Workout, UpdateError>;
    async fn delete_workout(&self, id: WorkoutID) -> Result<WorkoutID, DeleteError>;
}

#[allow(async_fn_in_trait)]
pub trait WorkoutRepository {
    async fn sync_workouts(&self) -> Result<Vec<Workout>, SyncError>;
    async fn read_workouts(&self, query: &WorkoutQuery) -> Result<Vec<Workout>, ReadError>;
    async fn read_workout(&self, id: WorkoutID) -> Result<Workout, ReadError>;
    /// Reads the exercises of a workout as currently persisted, bypassing any cache.
    async fn read_workout_exercises(
        &self,
        id: WorkoutID,
    ) -> Result<Vec<WorkoutExercise>, ReadError>;
    async fn create_workout(&self, workout: Workout) -> Result<Workout, CreateError>;
    async fn apply_mutation(&self, mutation: &Mutation) -> Result<(), UpdateError>;
    async fn delete_workout(&self, id: WorkoutID) -> Result<WorkoutID, DeleteError>;

    /// Applies the mutations in order and stops at the first failure.
    ///
    /// Mutations applied before the failure stay committed.
    async fn modify_workout(
        &self,
        _workout: &Workout,
        mutations: &[Mutation],
    ) -> Result<(), UpdateError> {
        for (applied, mutation) in mutations.iter().enumerate() {
            if let Err(err) = self.apply_mutation(mutation).await {
                return Err(UpdateError::PartiallyApplied {
                    applied,
                    total: mutations.len(),
                    source: Box::new(err),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Workout {
    pub id: WorkoutID,
    pub name: Name,
    pub description: String,
    pub date: NaiveDate,
    pub exercises: Vec<WorkoutExercise>,
    pub completed: bool,
    pub progress: Progress,
    pub archived: bool,
}

impl Workout {
    #[must_use]
    pub fn new(name: Name, date: NaiveDate) -> Self {
        Self {
            id: WorkoutID::new(),
            name,
            description: String::new(),
            date,
            exercises: vec![],
            completed: false,
            progress: Progress::default(),
            archived: false,
        }
    }

    #[must_use]
    pub fn fields(&self) -> WorkoutFields {
        WorkoutFields {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            date: self.date,
            completed: self.completed,
            progress: self.progress,
            archived: self.archived,
        }
    }

    pub fn add_exercise(&mut self, exercise: &Exercise) -> WorkoutExerciseID {
        let workout_exercise = WorkoutExercise::new(exercise);
        let id = workout_exercise.id;
        self.exercises.push(workout_exercise);
        self.renumber();
        id
    }

    pub fn remove_exercise(&mut self, id: WorkoutExerciseID) -> Option<WorkoutExercise> {
        let idx = self.exercises.iter().position(|e| e.id == id)?;
        let removed = self.exercises.remove(idx);
        self.renumber();
        Some(removed)
    }

    /// Moves the exercise at position `from` to position `to` (both zero-based).
    pub fn move_exercise(&mut self, from: usize, to: usize) {
        if from >= self.exercises.len() || to >= self.exercises.len() {
            return;
        }
        let exercise = self.exercises.remove(from);
        self.exercises.insert(to, exercise);
        self.renumber();
    }

    #[must_use]
    pub fn exercise_mut(&mut self, id: WorkoutExerciseID) -> Option<&mut WorkoutExercise> {
        self.exercises.iter_mut().find(|e| e.id == id)
    }

    /// Rewrites `order` and every `set_number` to match list positions.
    pub fn renumber(&mut self) {
        for (order, exercise) in (1..).zip(self.exercises.iter_mut()) {
            exercise.order = order;
            exercise.renumber_sets();
        }
    }

    #[must_use]
    pub fn is_numbered(&self) -> bool {
        (1..).zip(&self.exercises).all(|(order, e)| e.order == order)
            && self.exercises.iter().all(WorkoutExercise::is_numbered)
    }

    #[must_use]
    pub fn num_sets(&self) -> usize {
        self.exercises.iter().map(|e| e.sets.len()).sum()
    }

    #[must_use]
    pub fn num_completed_sets(&self) -> usize {
        self.exercises
            .iter()
            .flat_map(|e| &e.sets)
            .filter(|s| s.completed)
            .count()
    }

    /// Derives `progress` from the share of completed sets.
    pub fn update_progress(&mut self) {
        let total = self.num_sets();
        self.progress = if total == 0 {
            Progress::default()
        } else {
            #[allow(clippy::cast_possible_truncation)]
            Progress((self.num_completed_sets() * 100 / total) as u8)
        };
    }
}

id!(WorkoutID);

/// Scalar columns of a workout row.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutFields {
    pub id: WorkoutID,
    pub name: Name,
    pub description: String,
    pub date: NaiveDate,
    pub completed: bool,
    pub progress: Progress,
    pub archived: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutExercise {
    pub id: WorkoutExerciseID,
    pub exercise_id: ExerciseID,
    /// Snapshot of the referenced exercise, absent if it can no longer be read.
    pub exercise: Option<Exercise>,
    pub sets: Vec<ExerciseSet>,
    pub order: u32,
}

impl WorkoutExercise {
    #[must_use]
    pub fn new(exercise: &Exercise) -> Self {
        Self {
            id: WorkoutExerciseID::new(),
            exercise_id: exercise.id,
            exercise: Some(exercise.clone()),
            sets: vec![],
            order: 0,
        }
    }

    pub fn add_set(&mut self, target_reps: Reps, weight: Option<Weight>) -> ExerciseSetID {
        let set = ExerciseSet {
            id: ExerciseSetID::new(),
            set_number: 0,
            target_reps,
            actual_reps: None,
            weight,
            completed: false,
            notes: String::new(),
        };
        let id = set.id;
        self.sets.push(set);
        self.renumber_sets();
        id
    }

    pub fn remove_set(&mut self, id: ExerciseSetID) -> Option<ExerciseSet> {
        let idx = self.sets.iter().position(|s| s.id == id)?;
        let removed = self.sets.remove(idx);
        self.renumber_sets();
        Some(removed)
    }

    #[must_use]
    pub fn set_mut(&mut self, id: ExerciseSetID) -> Option<&mut ExerciseSet> {
        self.sets.iter_mut().find(|s| s.id == id)
    }

    pub fn renumber_sets(&mut self) {
        for (set_number, set) in (1..).zip(self.sets.iter_mut()) {
            set.set_number = set_number;
        }
    }

    #[must_use]
    pub fn is_numbered(&self) -> bool {
        (1..).zip(&self.sets).all(|(n, s)| s.set_number == n)
    }
}

id!(WorkoutExerciseID);

#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseSet {
    pub id: ExerciseSetID,
    pub set_number: u32,
    pub target_reps: Reps,
    pub actual_reps: Option<Reps>,
    pub weight: Option<Weight>,
    pub completed: bool,
    pub notes: String,
}

impl ExerciseSet {
    /// Whether the recorded values differ, ignoring identity and position.
    #[must_use]
    pub fn values_differ(&self, other: &ExerciseSet) -> bool {
        self.target_reps != other.target_reps
            || self.actual_reps != other.actual_reps
            || self.weight != other.weight
            || self.completed != other.completed
            || self.notes != other.notes
    }
}

id!(ExerciseSetID);

#[derive(Debug, Default, Display, Clone, Copy, Into, PartialEq, Eq, PartialOrd, Ord)]
pub struct Reps(u32);

impl Reps {
    pub fn new(value: u32) -> Result<Self, RepsError> {
        if !(0..1000).contains(&value) {
            return Err(RepsError::OutOfRange);
        }

        Ok(Self(value))
    }
}

impl TryFrom<&str> for Reps {
    type Error = RepsError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().parse::<u32>() {
            Ok(parsed_value) => Reps::new(parsed_value),
            Err(_) => Err(RepsError::ParseError),
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RepsError {
    #[error("Reps must be in the range 0 to 999")]
    OutOfRange,
    #[error("Reps must be an integer")]
    ParseError,
}

#[derive(Debug, Default, Display, Clone, Copy, Into, PartialEq, PartialOrd)]
pub struct Weight(f32);

impl Weight {
    pub fn new(value: f32) -> Result<Self, WeightError> {
        if !(0.0..1000.0).contains(&value) {
            return Err(WeightError::OutOfRange);
        }

        Ok(Self(value))
    }
}

impl TryFrom<&str> for Weight {
    type Error = WeightError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().replace(',', ".").parse::<f32>() {
            Ok(parsed_value) => Weight::new(parsed_value),
            Err(_) => Err(WeightError::ParseError),
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum WeightError {
    #[error("Weight must be in the range 0.0 to 999.9 kg")]
    OutOfRange,
    #[error("Weight must be a decimal")]
    ParseError,
}

/// Share of completed sets in percent.
#[derive(Debug, Default, Display, Clone, Copy, Into, PartialEq, Eq, PartialOrd, Ord)]
pub struct Progress(u8);

impl Progress {
    pub fn new(value: u8) -> Result<Self, ProgressError> {
        if value > 100 {
            return Err(ProgressError::OutOfRange(value));
        }

        Ok(Self(value))
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ProgressError {
    #[error("Progress must be 100 or less ({0} > 100)")]
    OutOfRange(u8),
}

/// The calendar date of the local wall clock.
#[must_use]
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Selection of non-archived workouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkoutQuery {
    On(NaiveDate),
    /// Incomplete workouts after `today`, earliest first.
    Upcoming { today: NaiveDate, limit: usize },
    /// Workouts on or before `today`, latest first, regardless of completion.
    Recent { today: NaiveDate, limit: usize },
    All,
}

impl WorkoutQuery {
    #[must_use]
    pub fn matches(&self, workout: &Workout) -> bool {
        if workout.archived {
            return false;
        }
        match self {
            WorkoutQuery::On(date) => workout.date == *date,
            WorkoutQuery::Upcoming { today, .. } => workout.date > *today && !workout.completed,
            WorkoutQuery::Recent { today, .. } => workout.date <= *today,
            WorkoutQuery::All => true,
        }
    }

    #[must_use]
    pub fn sort_order(&self) -> SortOrder {
        match self {
            WorkoutQuery::On(_) | WorkoutQuery::Upcoming { .. } => SortOrder::Ascending,
            WorkoutQuery::Recent { .. } | WorkoutQuery::All => SortOrder::Descending,
        }
    }

    #[must_use]
    pub fn limit(&self) -> Option<usize> {
        match self {
            WorkoutQuery::Upcoming { limit, .. } | WorkoutQuery::Recent { limit, .. } => {
                Some(*limit)
            }
            WorkoutQuery::On(_) | WorkoutQuery::All => None,
        }
    }

    /// Filters, sorts and truncates workouts that were not selected by the store.
    #[must_use]
    pub fn apply(&self, workouts: impl IntoIterator<Item = Workout>) -> Vec<Workout> {
        let mut result = workouts
            .into_iter()
            .filter(|w| self.matches(w))
            .collect::<Vec<_>>();
        result.sort_by(|a, b| match self.sort_order() {
            SortOrder::Ascending => a.date.cmp(&b.date),
            SortOrder::Descending => b.date.cmp(&a.date),
        });
        if let Some(limit) = self.limit() {
            result.truncate(limit);
        }
        result
    }
}
