use anyhow::Result;
use diesel::prelude::*;
use log::debug;
use std::collections::HashMap;

use crate::db::models::{
    Entry, EntryMetric, EntryWithMetrics, NewEntry, NewEntryMetric, UpdateEntry,
    UpdateEntryMetric,
};
use crate::db::schema::{entries, entry_metrics, metric_definitions};

use super::is_empty_changeset;

// Entries
pub fn create_entry(conn: &mut SqliteConnection, new_entry: &NewEntry) -> Result<Entry> {
    diesel::insert_into(entries::table)
        .values(new_entry)
        .returning(Entry::as_returning())
        .get_result(conn)
        .map_err(Into::into)
}

/// Appends an entry after the last one recorded for this workout exercise.
/// Indexes start at 0. Takes the write lock up front, so it must not be
/// called inside an open transaction.
pub fn add_entry(conn: &mut SqliteConnection, workout_exercise_id: i64) -> Result<Entry> {
    conn.immediate_transaction::<_, anyhow::Error, _>(|conn| {
        let max_index: Option<i64> = entries::table
            .filter(entries::workout_exercise_id.eq(workout_exercise_id))
            .select(diesel::dsl::max(entries::entry_index))
            .first(conn)?;

        let entry_index = max_index.map(|n| n + 1).unwrap_or(0);
        debug!(
            "Adding entry {} to workout exercise {}",
            entry_index, workout_exercise_id
        );

        let entry = diesel::insert_into(entries::table)
            .values(&NewEntry {
                workout_exercise_id,
                entry_index,
            })
            .returning(Entry::as_returning())
            .get_result(conn)?;
        Ok(entry)
    })
}

pub fn get_entry(conn: &mut SqliteConnection, entry_id: i64) -> Result<Option<Entry>> {
    entries::table
        .find(entry_id)
        .select(Entry::as_select())
        .first(conn)
        .optional()
        .map_err(Into::into)
}

/// Ordered by `entry_index`.
pub fn list_entries_for_workout_exercise(
    conn: &mut SqliteConnection,
    workout_exercise_id: i64,
) -> Result<Vec<Entry>> {
    entries::table
        .filter(entries::workout_exercise_id.eq(workout_exercise_id))
        .order(entries::entry_index.asc())
        .select(Entry::as_select())
        .load(conn)
        .map_err(Into::into)
}

pub fn update_entry(
    conn: &mut SqliteConnection,
    entry_id: i64,
    update: &UpdateEntry,
) -> Result<Option<Entry>> {
    let updated = diesel::update(entries::table.find(entry_id))
        .set(update)
        .returning(Entry::as_returning())
        .get_result(conn)
        .optional();
    match updated {
        Err(e) if is_empty_changeset(&e) => get_entry(conn, entry_id),
        other => other.map_err(Into::into),
    }
}

pub fn delete_entry(conn: &mut SqliteConnection, entry_id: i64) -> Result<usize> {
    diesel::delete(entries::table.find(entry_id))
        .execute(conn)
        .map_err(Into::into)
}

/// Entries of a workout exercise in `entry_index` order, each with its
/// metrics paired with the metric key.
pub fn list_entries_with_metrics(
    conn: &mut SqliteConnection,
    workout_exercise_id: i64,
) -> Result<Vec<EntryWithMetrics>> {
    let ordered = list_entries_for_workout_exercise(conn, workout_exercise_id)?;
    if ordered.is_empty() {
        return Ok(Vec::new());
    }

    let rows: Vec<(EntryMetric, String)> = entry_metrics::table
        .inner_join(entries::table)
        .inner_join(metric_definitions::table)
        .filter(entries::workout_exercise_id.eq(workout_exercise_id))
        .order(entry_metrics::id.asc())
        .select((EntryMetric::as_select(), metric_definitions::key))
        .load(conn)?;

    let mut by_entry: HashMap<i64, Vec<(String, EntryMetric)>> = HashMap::new();
    for (metric, key) in rows {
        by_entry.entry(metric.entry_id).or_default().push((key, metric));
    }

    Ok(ordered
        .into_iter()
        .map(|entry| EntryWithMetrics {
            metrics: by_entry.remove(&entry.id).unwrap_or_default(),
            entry,
        })
        .collect())
}

// Entry metrics
pub fn create_entry_metric(
    conn: &mut SqliteConnection,
    new_metric: &NewEntryMetric,
) -> Result<EntryMetric> {
    diesel::insert_into(entry_metrics::table)
        .values(new_metric)
        .returning(EntryMetric::as_returning())
        .get_result(conn)
        .map_err(Into::into)
}

pub fn get_entry_metric(
    conn: &mut SqliteConnection,
    entry_metric_id: i64,
) -> Result<Option<EntryMetric>> {
    entry_metrics::table
        .find(entry_metric_id)
        .select(EntryMetric::as_select())
        .first(conn)
        .optional()
        .map_err(Into::into)
}

pub fn list_entry_metrics_for_entry(
    conn: &mut SqliteConnection,
    entry_id: i64,
) -> Result<Vec<EntryMetric>> {
    entry_metrics::table
        .filter(entry_metrics::entry_id.eq(entry_id))
        .order(entry_metrics::id.asc())
        .select(EntryMetric::as_select())
        .load(conn)
        .map_err(Into::into)
}

pub fn list_entry_metrics_for_metric(
    conn: &mut SqliteConnection,
    metric_id: i64,
) -> Result<Vec<EntryMetric>> {
    entry_metrics::table
        .filter(entry_metrics::metric_id.eq(metric_id))
        .order(entry_metrics::id.asc())
        .select(EntryMetric::as_select())
        .load(conn)
        .map_err(Into::into)
}

pub fn update_entry_metric(
    conn: &mut SqliteConnection,
    entry_metric_id: i64,
    update: &UpdateEntryMetric,
) -> Result<Option<EntryMetric>> {
    let updated = diesel::update(entry_metrics::table.find(entry_metric_id))
        .set(update)
        .returning(EntryMetric::as_returning())
        .get_result(conn)
        .optional();
    match updated {
        Err(e) if is_empty_changeset(&e) => get_entry_metric(conn, entry_metric_id),
        other => other.map_err(Into::into),
    }
}

pub fn delete_entry_metric(conn: &mut SqliteConnection, entry_metric_id: i64) -> Result<usize> {
    diesel::delete(entry_metrics::table.find(entry_metric_id))
        .execute(conn)
        .map_err(Into::into)
}
