//! Read-only aggregate queries used by the admin reports.

use anyhow::Result;
use chrono::NaiveDate;
use diesel::dsl::count_star;
use diesel::prelude::*;

use crate::db::models::{ExerciseCount, WorkoutCount};
use crate::db::schema::{exercises, workout_exercises, workouts};

/// Number of workouts logged per day, newest day first.
pub fn workout_counts_by_date(conn: &mut SqliteConnection) -> Result<Vec<WorkoutCount>> {
    workouts::table
        .group_by(workouts::workout_date)
        .select((workouts::workout_date, count_star()))
        .order(workouts::workout_date.desc())
        .load::<WorkoutCount>(conn)
        .map_err(Into::into)
}

/// Exercise names ranked by how often they appear in workouts dated on or
/// after `since`. Ties are broken by name.
pub fn top_exercises_since(
    conn: &mut SqliteConnection,
    since: NaiveDate,
    limit: i64,
) -> Result<Vec<ExerciseCount>> {
    workout_exercises::table
        .inner_join(workouts::table)
        .inner_join(exercises::table)
        .filter(workouts::workout_date.ge(since))
        .group_by(exercises::name)
        .select((exercises::name, count_star()))
        .order((count_star().desc(), exercises::name.asc()))
        .limit(limit)
        .load::<ExerciseCount>(conn)
        .map_err(Into::into)
}
