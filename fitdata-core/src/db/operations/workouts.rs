use anyhow::Result;
use diesel::prelude::*;
use log::debug;

use crate::db::embedding::Embedding;
use crate::db::models::{
    NewWorkout, NewWorkoutExercise, UpdateWorkout, UpdateWorkoutExercise, Workout,
    WorkoutExercise,
};
use crate::db::schema::{workout_exercises, workouts};

use super::is_empty_changeset;

// Workouts
pub fn create_workout(conn: &mut SqliteConnection, new_workout: &NewWorkout) -> Result<Workout> {
    debug!(
        "Creating workout on {} for user {}",
        new_workout.workout_date, new_workout.user_id
    );
    diesel::insert_into(workouts::table)
        .values(new_workout)
        .returning(Workout::as_returning())
        .get_result(conn)
        .map_err(Into::into)
}

pub fn get_workout(conn: &mut SqliteConnection, workout_id: i64) -> Result<Option<Workout>> {
    workouts::table
        .find(workout_id)
        .select(Workout::as_select())
        .first(conn)
        .optional()
        .map_err(Into::into)
}

/// Newest first.
pub fn list_workouts_for_user(conn: &mut SqliteConnection, user_id: i64) -> Result<Vec<Workout>> {
    workouts::table
        .filter(workouts::user_id.eq(user_id))
        .order((workouts::workout_date.desc(), workouts::id.desc()))
        .select(Workout::as_select())
        .load(conn)
        .map_err(Into::into)
}

pub fn update_workout(
    conn: &mut SqliteConnection,
    workout_id: i64,
    update: &UpdateWorkout,
) -> Result<Option<Workout>> {
    let updated = diesel::update(workouts::table.find(workout_id))
        .set(update)
        .returning(Workout::as_returning())
        .get_result(conn)
        .optional();
    match updated {
        Err(e) if is_empty_changeset(&e) => get_workout(conn, workout_id),
        other => other.map_err(Into::into),
    }
}

pub fn set_workout_embedding(
    conn: &mut SqliteConnection,
    workout_id: i64,
    embedding: &Embedding,
) -> Result<bool> {
    let updated = diesel::update(workouts::table.find(workout_id))
        .set(workouts::embeddings.eq(embedding))
        .execute(conn)?;
    Ok(updated > 0)
}

/// Drops the stored vector so the embedding worker regenerates it.
pub fn clear_workout_embedding(conn: &mut SqliteConnection, workout_id: i64) -> Result<bool> {
    let updated = diesel::update(workouts::table.find(workout_id))
        .set(workouts::embeddings.eq(None::<Embedding>))
        .execute(conn)?;
    Ok(updated > 0)
}

pub fn delete_workout(conn: &mut SqliteConnection, workout_id: i64) -> Result<usize> {
    diesel::delete(workouts::table.find(workout_id))
        .execute(conn)
        .map_err(Into::into)
}

// Workout exercises
pub fn create_workout_exercise(
    conn: &mut SqliteConnection,
    new_workout_exercise: &NewWorkoutExercise,
) -> Result<WorkoutExercise> {
    debug!(
        "Adding exercise {} to workout {}",
        new_workout_exercise.exercise_id, new_workout_exercise.workout_id
    );
    diesel::insert_into(workout_exercises::table)
        .values(new_workout_exercise)
        .returning(WorkoutExercise::as_returning())
        .get_result(conn)
        .map_err(Into::into)
}

pub fn get_workout_exercise(
    conn: &mut SqliteConnection,
    workout_exercise_id: i64,
) -> Result<Option<WorkoutExercise>> {
    workout_exercises::table
        .find(workout_exercise_id)
        .select(WorkoutExercise::as_select())
        .first(conn)
        .optional()
        .map_err(Into::into)
}

pub fn list_workout_exercises_for_workout(
    conn: &mut SqliteConnection,
    workout_id: i64,
) -> Result<Vec<WorkoutExercise>> {
    workout_exercises::table
        .filter(workout_exercises::workout_id.eq(workout_id))
        .order(workout_exercises::id.asc())
        .select(WorkoutExercise::as_select())
        .load(conn)
        .map_err(Into::into)
}

pub fn list_workout_exercises_for_exercise(
    conn: &mut SqliteConnection,
    exercise_id: i64,
) -> Result<Vec<WorkoutExercise>> {
    workout_exercises::table
        .filter(workout_exercises::exercise_id.eq(exercise_id))
        .order(workout_exercises::id.asc())
        .select(WorkoutExercise::as_select())
        .load(conn)
        .map_err(Into::into)
}

pub fn update_workout_exercise(
    conn: &mut SqliteConnection,
    workout_exercise_id: i64,
    update: &UpdateWorkoutExercise,
) -> Result<Option<WorkoutExercise>> {
    let updated = diesel::update(workout_exercises::table.find(workout_exercise_id))
        .set(update)
        .returning(WorkoutExercise::as_returning())
        .get_result(conn)
        .optional();
    match updated {
        Err(e) if is_empty_changeset(&e) => get_workout_exercise(conn, workout_exercise_id),
        other => other.map_err(Into::into),
    }
}

pub fn set_workout_exercise_embedding(
    conn: &mut SqliteConnection,
    workout_exercise_id: i64,
    embedding: &Embedding,
) -> Result<bool> {
    let updated = diesel::update(workout_exercises::table.find(workout_exercise_id))
        .set(workout_exercises::embeddings.eq(embedding))
        .execute(conn)?;
    Ok(updated > 0)
}

pub fn clear_workout_exercise_embedding(
    conn: &mut SqliteConnection,
    workout_exercise_id: i64,
) -> Result<bool> {
    let updated = diesel::update(workout_exercises::table.find(workout_exercise_id))
        .set(workout_exercises::embeddings.eq(None::<Embedding>))
        .execute(conn)?;
    Ok(updated > 0)
}

pub fn delete_workout_exercise(
    conn: &mut SqliteConnection,
    workout_exercise_id: i64,
) -> Result<usize> {
    diesel::delete(workout_exercises::table.find(workout_exercise_id))
        .execute(conn)
        .map_err(Into::into)
}
