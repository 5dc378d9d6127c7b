//! Rows written into an empty local cache on first start.

use chrono::{Days, NaiveDate};

use liftbook_domain as domain;

const CATEGORIES: [(u128, &str, &str); 6] = [
    (0x5eed_0001_0000_0000_0000_0000_0000_0001, "Legs", "bg-red-500"),
    (0x5eed_0001_0000_0000_0000_0000_0000_0002, "Chest", "bg-blue-500"),
    (0x5eed_0001_0000_0000_0000_0000_0000_0003, "Back", "bg-green-500"),
    (0x5eed_0001_0000_0000_0000_0000_0000_0004, "Shoulders", "bg-yellow-500"),
    (0x5eed_0001_0000_0000_0000_0000_0000_0005, "Arms", "bg-purple-500"),
    (0x5eed_0001_0000_0000_0000_0000_0000_0006, "Core", "bg-orange-500"),
];

const EXERCISES: [(u128, &str, &str, u128); 8] = [
    (
        0x5eed_0002_0000_0000_0000_0000_0000_0001,
        "Squat",
        "Barbell back squat to parallel",
        CATEGORIES[0].0,
    ),
    (
        0x5eed_0002_0000_0000_0000_0000_0000_0002,
        "Romanian Deadlift",
        "Hip hinge with slightly bent knees",
        CATEGORIES[0].0,
    ),
    (
        0x5eed_0002_0000_0000_0000_0000_0000_0003,
        "Bench Press",
        "Flat barbell bench press",
        CATEGORIES[1].0,
    ),
    (
        0x5eed_0002_0000_0000_0000_0000_0000_0004,
        "Push-up",
        "",
        CATEGORIES[1].0,
    ),
    (
        0x5eed_0002_0000_0000_0000_0000_0000_0005,
        "Pull-up",
        "Overhand grip, full range of motion",
        CATEGORIES[2].0,
    ),
    (
        0x5eed_0002_0000_0000_0000_0000_0000_0006,
        "Overhead Press",
        "Standing barbell press",
        CATEGORIES[3].0,
    ),
    (
        0x5eed_0002_0000_0000_0000_0000_0000_0007,
        "Biceps Curl",
        "",
        CATEGORIES[4].0,
    ),
    (
        0x5eed_0002_0000_0000_0000_0000_0000_0008,
        "Plank",
        "Hold a straight line from head to heels",
        CATEGORIES[5].0,
    ),
];

#[must_use]
pub fn categories() -> Vec<domain::Category> {
    CATEGORIES
        .iter()
        .filter_map(|&(id, name, color)| {
            Some(domain::Category {
                id: id.into(),
                name: domain::Name::new(name).ok()?,
                color: domain::Color::new(color),
            })
        })
        .collect()
}

#[must_use]
pub fn exercises() -> Vec<domain::Exercise> {
    EXERCISES
        .iter()
        .filter_map(|&(id, name, description, category)| {
            Some(domain::Exercise {
                id: id.into(),
                name: domain::Name::new(name).ok()?,
                description: description.to_string(),
                category: Some(category.into()),
                image_url: None,
            })
        })
        .collect()
}

/// A full body workout on `today` and a leg workout on the day after.
#[must_use]
pub fn workouts(today: NaiveDate) -> Vec<domain::Workout> {
    let exercises = exercises();
    let plan = [
        (
            0x5eed_0003_0000_0000_0000_0000_0000_0001_u128,
            "Full Body",
            today,
            [0, 2, 4],
        ),
        (
            0x5eed_0003_0000_0000_0000_0000_0000_0002_u128,
            "Leg Day",
            today.checked_add_days(Days::new(1)).unwrap_or(today),
            [0, 1, 7],
        ),
    ];

    plan.iter()
        .filter_map(|&(id, name, date, exercise_indices)| {
            let mut workout = domain::Workout::new(domain::Name::new(name).ok()?, date);
            workout.id = id.into();
            for index in exercise_indices {
                let exercise = exercises.get(index)?;
                let workout_exercise_id = workout.add_exercise(exercise);
                let workout_exercise = workout.exercise_mut(workout_exercise_id)?;
                for _ in 0..3 {
                    workout_exercise.add_set(domain::Reps::new(10).ok()?, None);
                }
            }
            Some(workout)
        })
        .collect()
}
