//! Reconciliation of a desired workout against its persisted rows.
//!
//! Rows are matched by natural key: a workout exercise by the exercise it references, a set
//! by its number. The synthetic ids of the desired state are regenerated by the client
//! whenever an exercise or set is added, so they are only used as keys for new rows.
//! Planning is pure; executing the plan is left to the [`WorkoutRepository`].
//!
//! [`WorkoutRepository`]: crate::WorkoutRepository

use std::collections::HashSet;

use crate::{
    ExerciseID, ExerciseSet, ExerciseSetID, Workout, WorkoutExercise, WorkoutExerciseID,
    WorkoutFields, WorkoutID,
};

/// A single row-level write.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    UpdateWorkout(WorkoutFields),
    InsertWorkoutExercise {
        id: WorkoutExerciseID,
        workout_id: WorkoutID,
        exercise_id: ExerciseID,
        order: u32,
    },
    UpdateWorkoutExerciseOrder {
        id: WorkoutExerciseID,
        order: u32,
    },
    /// Planned after the deletion of all its sets.
    DeleteWorkoutExercise {
        id: WorkoutExerciseID,
    },
    InsertSet {
        workout_exercise_id: WorkoutExerciseID,
        set: ExerciseSet,
    },
    UpdateSet {
        set: ExerciseSet,
    },
    DeleteSet {
        id: ExerciseSetID,
    },
}

/// Number of rows a plan touches per table and kind of write.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PlanSummary {
    pub workouts_updated: usize,
    pub workout_exercises_inserted: usize,
    pub workout_exercises_updated: usize,
    pub workout_exercises_deleted: usize,
    pub sets_inserted: usize,
    pub sets_updated: usize,
    pub sets_deleted: usize,
}

impl PlanSummary {
    #[must_use]
    pub fn of(mutations: &[Mutation]) -> Self {
        let mut summary = Self::default();
        for mutation in mutations {
            match mutation {
                Mutation::UpdateWorkout(_) => summary.workouts_updated += 1,
                Mutation::InsertWorkoutExercise { .. } => summary.workout_exercises_inserted += 1,
                Mutation::UpdateWorkoutExerciseOrder { .. } => {
                    summary.workout_exercises_updated += 1;
                }
                Mutation::DeleteWorkoutExercise { .. } => summary.workout_exercises_deleted += 1,
                Mutation::InsertSet { .. } => summary.sets_inserted += 1,
                Mutation::UpdateSet { .. } => summary.sets_updated += 1,
                Mutation::DeleteSet { .. } => summary.sets_deleted += 1,
            }
        }
        summary
    }
}

/// Computes the writes that converge the `persisted` exercises of a workout to `desired`.
///
/// The workout row is always updated. Positions and set numbers are taken from the list
/// positions in `desired`. Unchanged rows produce no writes. If an exercise occurs more
/// than once, occurrences are matched in order. Every mutation is a single row write, so
/// the sets of a removed exercise are deleted one by one before the exercise itself.
#[must_use]
pub fn plan_update(persisted: &[WorkoutExercise], desired: &Workout) -> Vec<Mutation> {
    let mut mutations = vec![Mutation::UpdateWorkout(desired.fields())];

    let taken_exercise_ids = persisted.iter().map(|e| e.id).collect::<HashSet<_>>();
    let taken_set_ids = persisted
        .iter()
        .flat_map(|e| &e.sets)
        .map(|s| s.id)
        .collect::<HashSet<_>>();

    let mut unmatched = persisted.iter().collect::<Vec<_>>();
    unmatched.sort_by_key(|e| e.order);

    for (order, exercise) in (1..).zip(&desired.exercises) {
        if let Some(idx) = unmatched
            .iter()
            .position(|e| e.exercise_id == exercise.exercise_id)
        {
            let existing = unmatched.remove(idx);
            if existing.order != order {
                mutations.push(Mutation::UpdateWorkoutExerciseOrder {
                    id: existing.id,
                    order,
                });
            }
            plan_sets(&mut mutations, existing, &exercise.sets, &taken_set_ids);
        } else {
            let id = if exercise.id.is_nil() || taken_exercise_ids.contains(&exercise.id) {
                WorkoutExerciseID::new()
            } else {
                exercise.id
            };
            mutations.push(Mutation::InsertWorkoutExercise {
                id,
                workout_id: desired.id,
                exercise_id: exercise.exercise_id,
                order,
            });
            for (set_number, set) in (1..).zip(&exercise.sets) {
                mutations.push(Mutation::InsertSet {
                    workout_exercise_id: id,
                    set: new_set(set, set_number, &taken_set_ids),
                });
            }
        }
    }

    for existing in unmatched {
        mutations.extend(
            existing
                .sets
                .iter()
                .map(|set| Mutation::DeleteSet { id: set.id }),
        );
        mutations.push(Mutation::DeleteWorkoutExercise { id: existing.id });
    }

    mutations
}

fn plan_sets(
    mutations: &mut Vec<Mutation>,
    existing: &WorkoutExercise,
    desired: &[ExerciseSet],
    taken_set_ids: &HashSet<ExerciseSetID>,
) {
    let mut matched = HashSet::new();

    for (set_number, set) in (1..).zip(desired) {
        if let Some(current) = existing
            .sets
            .iter()
            .find(|s| s.set_number == set_number && !matched.contains(&s.id))
        {
            matched.insert(current.id);
            if current.values_differ(set) {
                mutations.push(Mutation::UpdateSet {
                    set: ExerciseSet {
                        id: current.id,
                        set_number,
                        ..set.clone()
                    },
                });
            }
        } else {
            mutations.push(Mutation::InsertSet {
                workout_exercise_id: existing.id,
                set: new_set(set, set_number, taken_set_ids),
            });
        }
    }

    for set in &existing.sets {
        if !matched.contains(&set.id) {
            mutations.push(Mutation::DeleteSet { id: set.id });
        }
    }
}

fn new_set(set: &ExerciseSet, set_number: u32, taken_set_ids: &HashSet<ExerciseSetID>) -> ExerciseSet {
    let id = if set.id.is_nil() || taken_set_ids.contains(&set.id) {
        ExerciseSetID::new()
    } else {
        set.id
    };
    ExerciseSet {
        id,
        set_number,
        ..set.clone()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use crate::tests::data::{EXERCISE, EXERCISE_3, WORKOUT};
    use crate::{Reps, Weight};

    use super::*;

    fn set(id: u128, set_number: u32, weight: f32, target_reps: u32) -> ExerciseSet {
        ExerciseSet {
            id: id.into(),
            set_number,
            target_reps: Reps::new(target_reps).unwrap(),
            actual_reps: None,
            weight: Some(Weight::new(weight).unwrap()),
            completed: false,
            notes: String::new(),
        }
    }

    #[test]
    fn test_plan_update_unchanged() {
        let mutations = plan_update(&WORKOUT.exercises, &WORKOUT);

        assert_eq!(mutations, vec![Mutation::UpdateWorkout(WORKOUT.fields())]);
    }

    #[test]
    fn test_plan_update_single_weight_change() {
        let mut desired = WORKOUT.clone();
        desired.exercises[0].sets[1].weight = Some(Weight::new(60.0).unwrap());

        let mutations = plan_update(&WORKOUT.exercises, &desired);

        assert_eq!(
            mutations,
            vec![
                Mutation::UpdateWorkout(desired.fields()),
                Mutation::UpdateSet {
                    set: desired.exercises[0].sets[1].clone()
                },
            ]
        );
    }

    #[test]
    fn test_plan_update_edit_and_append_set() {
        let persisted = vec![WorkoutExercise {
            id: 100.into(),
            exercise_id: EXERCISE.id,
            exercise: Some(EXERCISE.clone()),
            sets: vec![set(1, 1, 50.0, 10), set(2, 2, 55.0, 8)],
            order: 1,
        }];
        let mut desired = WORKOUT.clone();
        desired.exercises = vec![WorkoutExercise {
            // regenerated by the client after loading
            id: 999.into(),
            sets: vec![set(11, 1, 50.0, 10), set(12, 2, 60.0, 8), set(13, 3, 60.0, 6)],
            ..persisted[0].clone()
        }];

        let mutations = plan_update(&persisted, &desired);

        assert_eq!(
            mutations,
            vec![
                Mutation::UpdateWorkout(desired.fields()),
                Mutation::UpdateSet {
                    set: set(2, 2, 60.0, 8)
                },
                Mutation::InsertSet {
                    workout_exercise_id: 100.into(),
                    set: set(13, 3, 60.0, 6)
                },
            ]
        );
        assert_eq!(
            PlanSummary::of(&mutations),
            PlanSummary {
                workouts_updated: 1,
                sets_inserted: 1,
                sets_updated: 1,
                ..PlanSummary::default()
            }
        );
    }

    #[test]
    fn test_plan_update_remove_exercise() {
        let mut desired = WORKOUT.clone();
        let removed = desired.exercises.remove(0);
        desired.renumber();

        let mutations = plan_update(&WORKOUT.exercises, &desired);

        assert_eq!(
            mutations,
            vec![
                Mutation::UpdateWorkout(desired.fields()),
                Mutation::UpdateWorkoutExerciseOrder {
                    id: desired.exercises[0].id,
                    order: 1
                },
                Mutation::DeleteSet {
                    id: removed.sets[0].id
                },
                Mutation::DeleteSet {
                    id: removed.sets[1].id
                },
                Mutation::DeleteWorkoutExercise { id: removed.id },
            ]
        );
    }

    #[test]
    fn test_plan_update_reorder() {
        let mut desired = WORKOUT.clone();
        desired.move_exercise(1, 0);

        let mutations = plan_update(&WORKOUT.exercises, &desired);

        assert_eq!(
            PlanSummary::of(&mutations),
            PlanSummary {
                workouts_updated: 1,
                workout_exercises_updated: 2,
                ..PlanSummary::default()
            }
        );
        assert!(mutations.contains(&Mutation::UpdateWorkoutExerciseOrder {
            id: WORKOUT.exercises[1].id,
            order: 1
        }));
        assert!(mutations.contains(&Mutation::UpdateWorkoutExerciseOrder {
            id: WORKOUT.exercises[0].id,
            order: 2
        }));
    }

    #[test]
    fn test_plan_update_add_exercise() {
        let mut desired = WORKOUT.clone();
        let id = desired.add_exercise(&EXERCISE_3);
        desired
            .exercise_mut(id)
            .unwrap()
            .add_set(Reps::new(12).unwrap(), None);
        let added = desired.exercises[2].clone();

        let mutations = plan_update(&WORKOUT.exercises, &desired);

        assert_eq!(
            mutations,
            vec![
                Mutation::UpdateWorkout(desired.fields()),
                Mutation::InsertWorkoutExercise {
                    id,
                    workout_id: WORKOUT.id,
                    exercise_id: EXERCISE_3.id,
                    order: 3
                },
                Mutation::InsertSet {
                    workout_exercise_id: id,
                    set: added.sets[0].clone()
                },
            ]
        );
    }

    #[test]
    fn test_plan_update_remove_first_set() {
        let mut desired = WORKOUT.clone();
        let first = desired.exercises[0].sets[0].id;
        desired.exercises[0].remove_set(first);

        let mutations = plan_update(&WORKOUT.exercises, &desired);

        let persisted_sets = &WORKOUT.exercises[0].sets;
        assert_eq!(
            mutations,
            vec![
                Mutation::UpdateWorkout(desired.fields()),
                Mutation::UpdateSet {
                    set: ExerciseSet {
                        id: persisted_sets[0].id,
                        set_number: 1,
                        ..persisted_sets[1].clone()
                    }
                },
                Mutation::DeleteSet {
                    id: persisted_sets[1].id
                },
            ]
        );
    }

    #[test]
    fn test_plan_update_replace_exercise_keeping_id() {
        let mut desired = WORKOUT.clone();
        desired.exercises[1].exercise_id = EXERCISE_3.id;
        desired.exercises[1].exercise = Some(EXERCISE_3.clone());

        let mutations = plan_update(&WORKOUT.exercises, &desired);

        let summary = PlanSummary::of(&mutations);
        assert_eq!(summary.workout_exercises_inserted, 1);
        assert_eq!(summary.workout_exercises_deleted, 1);
        assert_eq!(summary.sets_inserted, desired.exercises[1].sets.len());

        let Some(Mutation::InsertWorkoutExercise { id, .. }) = mutations
            .iter()
            .find(|m| matches!(m, Mutation::InsertWorkoutExercise { .. }))
        else {
            panic!("missing insert")
        };
        assert_ne!(*id, WORKOUT.exercises[1].id);
        for mutation in &mutations {
            if let Mutation::InsertSet { set, .. } = mutation {
                assert!(!WORKOUT.exercises[1].sets.iter().any(|s| s.id == set.id));
            }
        }
    }

    #[test]
    fn test_plan_update_duplicate_exercise() {
        let persisted = vec![
            WorkoutExercise {
                id: 100.into(),
                exercise_id: EXERCISE.id,
                exercise: Some(EXERCISE.clone()),
                sets: vec![set(1, 1, 50.0, 10)],
                order: 1,
            },
            WorkoutExercise {
                id: 200.into(),
                exercise_id: EXERCISE.id,
                exercise: Some(EXERCISE.clone()),
                sets: vec![set(2, 1, 20.0, 15)],
                order: 2,
            },
        ];
        let mut desired = WORKOUT.clone();
        desired.exercises = vec![persisted[1].clone()];
        desired.renumber();

        let mutations = plan_update(&persisted, &desired);

        assert_eq!(
            mutations,
            vec![
                Mutation::UpdateWorkout(desired.fields()),
                Mutation::UpdateSet {
                    set: set(1, 1, 20.0, 15)
                },
                Mutation::DeleteSet { id: 2.into() },
                Mutation::DeleteWorkoutExercise { id: 200.into() },
            ]
        );
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(4)]
    fn test_plan_update_nothing_persisted(#[case] num_sets: u32) {
        let mut desired = WORKOUT.clone();
        desired.exercises.truncate(1);
        desired.exercises[0].sets = (1..=num_sets).map(|n| set(n.into(), n, 40.0, 5)).collect();

        let mutations = plan_update(&[], &desired);

        assert_eq!(
            PlanSummary::of(&mutations),
            PlanSummary {
                workouts_updated: 1,
                workout_exercises_inserted: 1,
                sets_inserted: num_sets as usize,
                ..PlanSummary::default()
            }
        );
    }

    #[test]
    fn test_plan_update_remove_all() {
        let mut desired = WORKOUT.clone();
        desired.exercises.clear();

        let mutations = plan_update(&WORKOUT.exercises, &desired);

        let mut expected = vec![Mutation::UpdateWorkout(desired.fields())];
        for exercise in &WORKOUT.exercises {
            expected.extend(
                exercise
                    .sets
                    .iter()
                    .map(|set| Mutation::DeleteSet { id: set.id }),
            );
            expected.push(Mutation::DeleteWorkoutExercise { id: exercise.id });
        }
        assert_eq!(mutations, expected);
    }
}
