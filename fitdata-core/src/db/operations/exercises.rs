use anyhow::Result;
use diesel::prelude::*;
use log::debug;

use crate::db::models::{
    Exercise, MetricDefinition, MetricExerciseLink, NewExercise, UpdateExercise,
};
use crate::db::schema::{exercises, metric_definitions, metric_exercise_junction};

use super::is_empty_changeset;

// Exercises
pub fn create_exercise(conn: &mut SqliteConnection, new_exercise: &NewExercise) -> Result<Exercise> {
    debug!(
        "Creating exercise {} (global: {})",
        new_exercise.name, new_exercise.is_global
    );
    diesel::insert_into(exercises::table)
        .values(new_exercise)
        .returning(Exercise::as_returning())
        .get_result(conn)
        .map_err(Into::into)
}

pub fn get_exercise(conn: &mut SqliteConnection, exercise_id: i64) -> Result<Option<Exercise>> {
    exercises::table
        .find(exercise_id)
        .select(Exercise::as_select())
        .first(conn)
        .optional()
        .map_err(Into::into)
}

pub fn update_exercise(
    conn: &mut SqliteConnection,
    exercise_id: i64,
    update: &UpdateExercise,
) -> Result<Option<Exercise>> {
    let updated = diesel::update(exercises::table.find(exercise_id))
        .set(update)
        .returning(Exercise::as_returning())
        .get_result(conn)
        .optional();
    match updated {
        Err(e) if is_empty_changeset(&e) => get_exercise(conn, exercise_id),
        other => other.map_err(Into::into),
    }
}

/// Removing an exercise also removes every workout exercise that used it.
pub fn delete_exercise(conn: &mut SqliteConnection, exercise_id: i64) -> Result<usize> {
    diesel::delete(exercises::table.find(exercise_id))
        .execute(conn)
        .map_err(Into::into)
}

pub fn list_exercises_for_user(conn: &mut SqliteConnection, user_id: i64) -> Result<Vec<Exercise>> {
    exercises::table
        .filter(exercises::user_id.eq(user_id))
        .order(exercises::name.asc())
        .select(Exercise::as_select())
        .load(conn)
        .map_err(Into::into)
}

pub fn list_global_exercises(conn: &mut SqliteConnection) -> Result<Vec<Exercise>> {
    exercises::table
        .filter(exercises::is_global.eq(true))
        .order(exercises::name.asc())
        .select(Exercise::as_select())
        .load(conn)
        .map_err(Into::into)
}

/// Global exercises plus the ones `user_id` owns.
pub fn list_visible_exercises(conn: &mut SqliteConnection, user_id: i64) -> Result<Vec<Exercise>> {
    exercises::table
        .filter(exercises::is_global.eq(true).or(exercises::user_id.eq(user_id)))
        .order((exercises::name.asc(), exercises::id.asc()))
        .select(Exercise::as_select())
        .load(conn)
        .map_err(Into::into)
}

/// Looks up an exercise by name among those visible to the user, preferring
/// the user's own, and creates a user-owned one if none exists. Runs as an
/// immediate transaction, so it must not be called inside an open one.
pub fn get_or_create_exercise(
    conn: &mut SqliteConnection,
    user_id: i64,
    exercise_name: &str,
) -> Result<Exercise> {
    conn.immediate_transaction::<_, anyhow::Error, _>(|conn| {
        let existing = exercises::table
            .filter(exercises::name.eq(exercise_name))
            .filter(exercises::is_global.eq(true).or(exercises::user_id.eq(user_id)))
            .order((exercises::is_global.asc(), exercises::id.asc()))
            .select(Exercise::as_select())
            .first(conn)
            .optional()?;

        if let Some(exercise) = existing {
            return Ok(exercise);
        }

        let exercise = diesel::insert_into(exercises::table)
            .values(&NewExercise::owned_by(user_id, exercise_name))
            .returning(Exercise::as_returning())
            .get_result(conn)?;
        debug!("Created exercise {} for user {}", exercise.id, user_id);
        Ok(exercise)
    })
}

// Exercise <-> metric definition links

/// Links are idempotent: linking an already linked pair is a no-op.
/// Returns whether a new link was written.
pub fn link_metric_to_exercise(
    conn: &mut SqliteConnection,
    exercise_id: i64,
    metric_id: i64,
) -> Result<bool> {
    let inserted = diesel::insert_or_ignore_into(metric_exercise_junction::table)
        .values(&MetricExerciseLink {
            exercise_id,
            metric_id,
        })
        .execute(conn)?;
    Ok(inserted > 0)
}

pub fn unlink_metric_from_exercise(
    conn: &mut SqliteConnection,
    exercise_id: i64,
    metric_id: i64,
) -> Result<bool> {
    let deleted = diesel::delete(
        metric_exercise_junction::table
            .filter(metric_exercise_junction::exercise_id.eq(exercise_id))
            .filter(metric_exercise_junction::metric_id.eq(metric_id)),
    )
    .execute(conn)?;
    Ok(deleted > 0)
}

pub fn list_metrics_for_exercise(
    conn: &mut SqliteConnection,
    exercise_id: i64,
) -> Result<Vec<MetricDefinition>> {
    metric_exercise_junction::table
        .inner_join(metric_definitions::table)
        .filter(metric_exercise_junction::exercise_id.eq(exercise_id))
        .order(metric_definitions::id.asc())
        .select(MetricDefinition::as_select())
        .load(conn)
        .map_err(Into::into)
}

pub fn list_exercises_for_metric(
    conn: &mut SqliteConnection,
    metric_id: i64,
) -> Result<Vec<Exercise>> {
    metric_exercise_junction::table
        .inner_join(exercises::table)
        .filter(metric_exercise_junction::metric_id.eq(metric_id))
        .order(exercises::id.asc())
        .select(Exercise::as_select())
        .load(conn)
        .map_err(Into::into)
}
