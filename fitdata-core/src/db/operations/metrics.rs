use anyhow::Result;
use diesel::prelude::*;
use log::debug;

use crate::db::models::{MetricDefinition, NewMetricDefinition, UpdateMetricDefinition};
use crate::db::schema::metric_definitions;

use super::is_empty_changeset;

pub fn create_metric_definition(
    conn: &mut SqliteConnection,
    new_metric: &NewMetricDefinition,
) -> Result<MetricDefinition> {
    debug!(
        "Creating metric definition {} (global: {})",
        new_metric.key, new_metric.is_global
    );
    diesel::insert_into(metric_definitions::table)
        .values(new_metric)
        .returning(MetricDefinition::as_returning())
        .get_result(conn)
        .map_err(Into::into)
}

pub fn get_metric_definition(
    conn: &mut SqliteConnection,
    metric_id: i64,
) -> Result<Option<MetricDefinition>> {
    metric_definitions::table
        .find(metric_id)
        .select(MetricDefinition::as_select())
        .first(conn)
        .optional()
        .map_err(Into::into)
}

/// Resolves `key` for a user: their own definition wins over a global one.
pub fn find_metric_definition(
    conn: &mut SqliteConnection,
    user_id: i64,
    key: &str,
) -> Result<Option<MetricDefinition>> {
    metric_definitions::table
        .filter(metric_definitions::key.eq(key))
        .filter(
            metric_definitions::is_global
                .eq(true)
                .or(metric_definitions::user_id.eq(user_id)),
        )
        .order((metric_definitions::is_global.asc(), metric_definitions::id.asc()))
        .select(MetricDefinition::as_select())
        .first(conn)
        .optional()
        .map_err(Into::into)
}

pub fn update_metric_definition(
    conn: &mut SqliteConnection,
    metric_id: i64,
    update: &UpdateMetricDefinition,
) -> Result<Option<MetricDefinition>> {
    let updated = diesel::update(metric_definitions::table.find(metric_id))
        .set(update)
        .returning(MetricDefinition::as_returning())
        .get_result(conn)
        .optional();
    match updated {
        Err(e) if is_empty_changeset(&e) => get_metric_definition(conn, metric_id),
        other => other.map_err(Into::into),
    }
}

/// Removing a definition also removes every recorded value of it.
pub fn delete_metric_definition(conn: &mut SqliteConnection, metric_id: i64) -> Result<usize> {
    diesel::delete(metric_definitions::table.find(metric_id))
        .execute(conn)
        .map_err(Into::into)
}

pub fn list_metric_definitions_for_user(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> Result<Vec<MetricDefinition>> {
    metric_definitions::table
        .filter(metric_definitions::user_id.eq(user_id))
        .order(metric_definitions::key.asc())
        .select(MetricDefinition::as_select())
        .load(conn)
        .map_err(Into::into)
}

pub fn list_global_metric_definitions(
    conn: &mut SqliteConnection,
) -> Result<Vec<MetricDefinition>> {
    metric_definitions::table
        .filter(metric_definitions::is_global.eq(true))
        .order(metric_definitions::key.asc())
        .select(MetricDefinition::as_select())
        .load(conn)
        .map_err(Into::into)
}

pub fn list_visible_metric_definitions(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> Result<Vec<MetricDefinition>> {
    metric_definitions::table
        .filter(
            metric_definitions::is_global
                .eq(true)
                .or(metric_definitions::user_id.eq(user_id)),
        )
        .order((metric_definitions::key.asc(), metric_definitions::id.asc()))
        .select(MetricDefinition::as_select())
        .load(conn)
        .map_err(Into::into)
}
