//! Row types for the tables in [`crate::db::schema`].
//!
//! Each table has a queryable row struct, an insertable `New*` struct and an
//! `Update*` changeset. Nullable columns in a changeset are `Option<Option<_>>`:
//! the outer `None` leaves the column alone, `Some(None)` clears it.

use chrono::NaiveDate;
use diesel::prelude::*;
use serde::Serialize;
use std::fmt;

use crate::db::embedding::Embedding;
use crate::db::schema::{
    entries, entry_metrics, exercises, metric_definitions, metric_exercise_junction, users,
    workout_exercises, workouts,
};

// User models
#[derive(Queryable, Selectable, Identifiable, Serialize, Debug, Clone, PartialEq)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub goal: String,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub google_id: Option<String>,
    pub provider: Option<String>,
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "User #{}: {} <{}> goal={}",
            self.id, self.username, self.email, self.goal
        )?;
        if let Some(google_id) = &self.google_id {
            write!(f, " google_id={}", google_id)?;
        }
        if let Some(provider) = &self.provider {
            write!(f, " provider={}", provider)?;
        }
        Ok(())
    }
}

#[derive(Insertable, Debug, Default)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub goal: String,
    pub password_hash: Option<String>,
    pub google_id: Option<String>,
    pub provider: Option<String>,
}

#[derive(AsChangeset, Debug, Default)]
#[diesel(table_name = users)]
pub struct UpdateUser {
    pub username: Option<String>,
    pub email: Option<String>,
    pub goal: Option<String>,
    pub password_hash: Option<Option<String>>,
    pub google_id: Option<Option<String>>,
    pub provider: Option<Option<String>>,
}

// Exercise models
#[derive(Queryable, Selectable, Identifiable, Associations, Serialize, Debug, Clone, PartialEq)]
#[diesel(belongs_to(User))]
#[diesel(table_name = exercises)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Exercise {
    pub id: i64,
    pub is_global: bool,
    pub name: String,
    pub user_id: Option<i64>,
}

/// Global exercises carry no owner; owned ones always do. The table's CHECK
/// constraint rejects any other combination.
#[derive(Insertable, Debug)]
#[diesel(table_name = exercises)]
pub struct NewExercise {
    pub is_global: bool,
    pub name: String,
    pub user_id: Option<i64>,
}

impl NewExercise {
    pub fn global(name: impl Into<String>) -> Self {
        Self {
            is_global: true,
            name: name.into(),
            user_id: None,
        }
    }

    pub fn owned_by(user_id: i64, name: impl Into<String>) -> Self {
        Self {
            is_global: false,
            name: name.into(),
            user_id: Some(user_id),
        }
    }
}

#[derive(AsChangeset, Debug, Default)]
#[diesel(table_name = exercises)]
pub struct UpdateExercise {
    pub is_global: Option<bool>,
    pub name: Option<String>,
    pub user_id: Option<Option<i64>>,
}

// Metric definition models
#[derive(Queryable, Selectable, Identifiable, Associations, Serialize, Debug, Clone, PartialEq)]
#[diesel(belongs_to(User))]
#[diesel(table_name = metric_definitions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct MetricDefinition {
    pub id: i64,
    pub user_id: Option<i64>,
    pub key: String,
    pub is_global: bool,
    pub display_name: Option<String>,
    /// Free-form tag such as "number" or "text".
    pub value_type: Option<String>,
    pub default_unit: Option<String>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = metric_definitions)]
pub struct NewMetricDefinition {
    pub user_id: Option<i64>,
    pub key: String,
    pub is_global: bool,
    pub display_name: Option<String>,
    pub value_type: Option<String>,
    pub default_unit: Option<String>,
}

impl NewMetricDefinition {
    pub fn global(key: impl Into<String>) -> Self {
        Self {
            user_id: None,
            key: key.into(),
            is_global: true,
            display_name: None,
            value_type: None,
            default_unit: None,
        }
    }

    pub fn owned_by(user_id: i64, key: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id),
            key: key.into(),
            is_global: false,
            display_name: None,
            value_type: None,
            default_unit: None,
        }
    }

    pub fn display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn value_type(mut self, value_type: impl Into<String>) -> Self {
        self.value_type = Some(value_type.into());
        self
    }

    pub fn default_unit(mut self, unit: impl Into<String>) -> Self {
        self.default_unit = Some(unit.into());
        self
    }
}

#[derive(AsChangeset, Debug, Default)]
#[diesel(table_name = metric_definitions)]
pub struct UpdateMetricDefinition {
    pub user_id: Option<Option<i64>>,
    pub key: Option<String>,
    pub is_global: Option<bool>,
    pub display_name: Option<Option<String>>,
    pub value_type: Option<Option<String>>,
    pub default_unit: Option<Option<String>>,
}

// Exercise <-> metric definition junction
#[derive(Queryable, Selectable, Insertable, Debug, Clone, Copy, PartialEq)]
#[diesel(table_name = metric_exercise_junction)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct MetricExerciseLink {
    pub exercise_id: i64,
    pub metric_id: i64,
}

// Workout models
#[derive(Queryable, Selectable, Identifiable, Associations, Serialize, Debug, Clone, PartialEq)]
#[diesel(belongs_to(User))]
#[diesel(table_name = workouts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Workout {
    pub id: i64,
    pub user_id: i64,
    pub workout_date: NaiveDate,
    pub workout_kind: Option<String>,
    #[serde(skip_serializing)]
    pub embeddings: Option<Embedding>,
    pub workout_text: Option<String>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = workouts)]
pub struct NewWorkout {
    pub user_id: i64,
    pub workout_date: NaiveDate,
    pub workout_kind: Option<String>,
    pub embeddings: Option<Embedding>,
    pub workout_text: Option<String>,
}

impl NewWorkout {
    pub fn new(user_id: i64, workout_date: NaiveDate) -> Self {
        Self {
            user_id,
            workout_date,
            workout_kind: None,
            embeddings: None,
            workout_text: None,
        }
    }
}

#[derive(AsChangeset, Debug, Default)]
#[diesel(table_name = workouts)]
pub struct UpdateWorkout {
    pub workout_date: Option<NaiveDate>,
    pub workout_kind: Option<Option<String>>,
    pub embeddings: Option<Option<Embedding>>,
    pub workout_text: Option<Option<String>>,
}

// Workout exercise models
#[derive(Queryable, Selectable, Identifiable, Associations, Serialize, Debug, Clone, PartialEq)]
#[diesel(belongs_to(Exercise))]
#[diesel(belongs_to(Workout))]
#[diesel(table_name = workout_exercises)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct WorkoutExercise {
    pub id: i64,
    pub exercise_id: i64,
    pub workout_id: i64,
    pub note: Option<String>,
    #[serde(skip_serializing)]
    pub embeddings: Option<Embedding>,
    pub exercise_text: Option<String>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = workout_exercises)]
pub struct NewWorkoutExercise {
    pub exercise_id: i64,
    pub workout_id: i64,
    pub note: Option<String>,
    pub embeddings: Option<Embedding>,
    pub exercise_text: Option<String>,
}

impl NewWorkoutExercise {
    pub fn new(workout_id: i64, exercise_id: i64) -> Self {
        Self {
            exercise_id,
            workout_id,
            note: None,
            embeddings: None,
            exercise_text: None,
        }
    }
}

#[derive(AsChangeset, Debug, Default)]
#[diesel(table_name = workout_exercises)]
pub struct UpdateWorkoutExercise {
    pub exercise_id: Option<i64>,
    pub note: Option<Option<String>>,
    pub embeddings: Option<Option<Embedding>>,
    pub exercise_text: Option<Option<String>>,
}

// Entry models
#[derive(Queryable, Selectable, Identifiable, Associations, Serialize, Debug, Clone, PartialEq)]
#[diesel(belongs_to(WorkoutExercise))]
#[diesel(table_name = entries)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Entry {
    pub id: i64,
    pub workout_exercise_id: i64,
    pub entry_index: i64,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = entries)]
pub struct NewEntry {
    pub workout_exercise_id: i64,
    pub entry_index: i64,
}

#[derive(AsChangeset, Debug, Default)]
#[diesel(table_name = entries)]
pub struct UpdateEntry {
    pub entry_index: Option<i64>,
}

// Entry metric models
#[derive(Queryable, Selectable, Identifiable, Associations, Serialize, Debug, Clone, PartialEq)]
#[diesel(belongs_to(Entry))]
#[diesel(belongs_to(MetricDefinition, foreign_key = metric_id))]
#[diesel(table_name = entry_metrics)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct EntryMetric {
    pub id: i64,
    pub entry_id: i64,
    pub metric_id: i64,
    pub value_number: Option<f64>,
    pub value_text: Option<String>,
    pub unit: Option<String>,
}

impl fmt::Display for EntryMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.value_number, &self.value_text) {
            (Some(n), _) => write!(f, "{}", n)?,
            (None, Some(t)) => write!(f, "{}", t)?,
            (None, None) => write!(f, "-")?,
        }
        if let Some(unit) = &self.unit {
            write!(f, " {}", unit)?;
        }
        Ok(())
    }
}

/// Exactly one of `value_number` / `value_text` may be set.
#[derive(Insertable, Debug)]
#[diesel(table_name = entry_metrics)]
pub struct NewEntryMetric {
    pub entry_id: i64,
    pub metric_id: i64,
    pub value_number: Option<f64>,
    pub value_text: Option<String>,
    pub unit: Option<String>,
}

impl NewEntryMetric {
    pub fn number(entry_id: i64, metric_id: i64, value: f64, unit: Option<String>) -> Self {
        Self {
            entry_id,
            metric_id,
            value_number: Some(value),
            value_text: None,
            unit,
        }
    }

    pub fn text(entry_id: i64, metric_id: i64, value: impl Into<String>) -> Self {
        Self {
            entry_id,
            metric_id,
            value_number: None,
            value_text: Some(value.into()),
            unit: None,
        }
    }
}

#[derive(AsChangeset, Debug, Default)]
#[diesel(table_name = entry_metrics)]
pub struct UpdateEntryMetric {
    pub value_number: Option<Option<f64>>,
    pub value_text: Option<Option<String>>,
    pub unit: Option<Option<String>>,
}

/// An entry together with its metrics, keyed by metric definition.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct EntryWithMetrics {
    pub entry: Entry,
    pub metrics: Vec<(String, EntryMetric)>,
}

#[derive(Queryable, Serialize, Debug, Clone, PartialEq)]
pub struct WorkoutCount {
    pub workout_date: NaiveDate,
    pub count: i64,
}

#[derive(Queryable, Serialize, Debug, Clone, PartialEq)]
pub struct ExerciseCount {
    pub exercise_name: String,
    pub count: i64,
}
