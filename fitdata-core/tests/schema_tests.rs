// Schema constraints: uniqueness, foreign keys, global/owned checks, embeddings.

mod common;

use common::{alice, date, new_user, setup_test_db};
use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;
use diesel::sql_types::Text;
use fitdata::db::constraint_violation;
use fitdata::db::embedding::{EMBEDDING_DIM, Embedding};
use fitdata::db::models::{
    NewEntry, NewEntryMetric, NewExercise, NewMetricDefinition, NewUser, NewWorkout,
    NewWorkoutExercise, UpdateWorkout,
};
use fitdata::db::operations::*;
use fitdata::db::run_migrations;

#[derive(QueryableByName)]
struct TableName {
    #[diesel(sql_type = Text)]
    name: String,
}

fn table_names(conn: &mut SqliteConnection) -> Vec<String> {
    diesel::sql_query(
        "SELECT name FROM sqlite_master
         WHERE type = 'table'
           AND name NOT LIKE 'sqlite_%'
           AND name != '__diesel_schema_migrations'
         ORDER BY name",
    )
    .load::<TableName>(conn)
    .unwrap()
    .into_iter()
    .map(|t| t.name)
    .collect()
}

#[test]
fn test_migrations_create_exactly_the_schema_tables() {
    let db = setup_test_db();
    let mut conn = db.factory.open_session().unwrap();

    assert_eq!(
        table_names(&mut conn),
        vec![
            "entries",
            "entry_metrics",
            "exercises",
            "metric_definitions",
            "metric_exercise_junction",
            "users",
            "workout_exercises",
            "workouts",
        ]
    );
}

#[test]
fn test_migrations_are_idempotent() {
    let db = setup_test_db();
    let mut conn = db.factory.open_session().unwrap();

    run_migrations(&mut conn).unwrap();
    db.factory.migrate().unwrap();

    assert_eq!(table_names(&mut conn).len(), 8);
}

#[test]
fn test_duplicate_email_is_a_unique_violation() {
    let db = setup_test_db();
    let mut conn = db.factory.open_session().unwrap();
    alice(&mut conn);

    let err = create_user(&mut conn, &new_user("alice2", "a@x.com")).unwrap_err();
    assert!(matches!(
        constraint_violation(&err),
        Some(DatabaseErrorKind::UniqueViolation)
    ));
    assert_eq!(list_users(&mut conn).unwrap().len(), 1);
}

#[test]
fn test_duplicate_google_id_is_a_unique_violation() {
    let db = setup_test_db();
    let mut conn = db.factory.open_session().unwrap();

    let with_google = |username: &str, email: &str| NewUser {
        google_id: Some("google-123".to_string()),
        provider: Some("google".to_string()),
        ..new_user(username, email)
    };

    create_user(&mut conn, &with_google("alice", "a@x.com")).unwrap();
    let err = create_user(&mut conn, &with_google("bob", "b@x.com")).unwrap_err();
    assert!(matches!(
        constraint_violation(&err),
        Some(DatabaseErrorKind::UniqueViolation)
    ));
}

#[test]
fn test_users_without_google_id_do_not_collide() {
    let db = setup_test_db();
    let mut conn = db.factory.open_session().unwrap();

    create_user(&mut conn, &new_user("alice", "a@x.com")).unwrap();
    create_user(&mut conn, &new_user("bob", "b@x.com")).unwrap();

    assert_eq!(list_users(&mut conn).unwrap().len(), 2);
}

#[test]
fn test_lookup_by_unique_columns() {
    let db = setup_test_db();
    let mut conn = db.factory.open_session().unwrap();
    let user = create_user(
        &mut conn,
        &NewUser {
            google_id: Some("g-1".to_string()),
            ..new_user("alice", "a@x.com")
        },
    )
    .unwrap();

    assert_eq!(get_user_by_email(&mut conn, "a@x.com").unwrap(), Some(user.clone()));
    assert_eq!(get_user_by_google_id(&mut conn, "g-1").unwrap(), Some(user));
    assert_eq!(get_user_by_email(&mut conn, "nobody@x.com").unwrap(), None);
    assert_eq!(get_user(&mut conn, 9999).unwrap(), None);
}

#[test]
fn test_entry_metric_with_missing_entry_is_a_foreign_key_violation() {
    let db = setup_test_db();
    let mut conn = db.factory.open_session().unwrap();
    let metric =
        create_metric_definition(&mut conn, &NewMetricDefinition::global("weight_kg")).unwrap();

    let err = create_entry_metric(&mut conn, &NewEntryMetric::number(4242, metric.id, 1.0, None))
        .unwrap_err();
    assert!(matches!(
        constraint_violation(&err),
        Some(DatabaseErrorKind::ForeignKeyViolation)
    ));
}

#[test]
fn test_entry_metric_with_missing_metric_is_a_foreign_key_violation() {
    let db = setup_test_db();
    let mut conn = db.factory.open_session().unwrap();
    let user = alice(&mut conn);
    let exercise =
        create_exercise(&mut conn, &NewExercise::owned_by(user.id, "Bench Press")).unwrap();
    let workout = create_workout(&mut conn, &NewWorkout::new(user.id, date(2024, 1, 1))).unwrap();
    let we = create_workout_exercise(
        &mut conn,
        &NewWorkoutExercise::new(workout.id, exercise.id),
    )
    .unwrap();
    let entry = add_entry(&mut conn, we.id).unwrap();

    let err = create_entry_metric(&mut conn, &NewEntryMetric::number(entry.id, 4242, 1.0, None))
        .unwrap_err();
    assert!(matches!(
        constraint_violation(&err),
        Some(DatabaseErrorKind::ForeignKeyViolation)
    ));
}

#[test]
fn test_workout_requires_existing_user() {
    let db = setup_test_db();
    let mut conn = db.factory.open_session().unwrap();

    let err = create_workout(&mut conn, &NewWorkout::new(77, date(2024, 1, 1))).unwrap_err();
    assert!(matches!(
        constraint_violation(&err),
        Some(DatabaseErrorKind::ForeignKeyViolation)
    ));
}

#[test]
fn test_global_rows_cannot_have_an_owner() {
    let db = setup_test_db();
    let mut conn = db.factory.open_session().unwrap();
    let user = alice(&mut conn);

    let global_with_owner = NewExercise {
        is_global: true,
        name: "Squat".to_string(),
        user_id: Some(user.id),
    };
    let err = create_exercise(&mut conn, &global_with_owner).unwrap_err();
    assert!(constraint_violation(&err).is_some());

    let mut metric = NewMetricDefinition::global("reps");
    metric.user_id = Some(user.id);
    let err = create_metric_definition(&mut conn, &metric).unwrap_err();
    assert!(constraint_violation(&err).is_some());
}

#[test]
fn test_owned_rows_must_have_an_owner() {
    let db = setup_test_db();
    let mut conn = db.factory.open_session().unwrap();

    let orphan = NewExercise {
        is_global: false,
        name: "Squat".to_string(),
        user_id: None,
    };
    let err = create_exercise(&mut conn, &orphan).unwrap_err();
    assert!(matches!(
        constraint_violation(&err),
        Some(DatabaseErrorKind::CheckViolation)
    ));

    let mut metric = NewMetricDefinition::global("reps");
    metric.is_global = false;
    let err = create_metric_definition(&mut conn, &metric).unwrap_err();
    assert!(matches!(
        constraint_violation(&err),
        Some(DatabaseErrorKind::CheckViolation)
    ));

    assert!(list_global_exercises(&mut conn).unwrap().is_empty());
    assert!(list_global_metric_definitions(&mut conn).unwrap().is_empty());
}

#[test]
fn test_global_names_are_unique_but_owned_names_may_repeat() {
    let db = setup_test_db();
    let mut conn = db.factory.open_session().unwrap();
    let alice = alice(&mut conn);
    let bob = create_user(&mut conn, &new_user("bob", "b@x.com")).unwrap();

    create_exercise(&mut conn, &NewExercise::global("Deadlift")).unwrap();
    let err = create_exercise(&mut conn, &NewExercise::global("Deadlift")).unwrap_err();
    assert!(matches!(
        constraint_violation(&err),
        Some(DatabaseErrorKind::UniqueViolation)
    ));

    create_exercise(&mut conn, &NewExercise::owned_by(alice.id, "Deadlift")).unwrap();
    create_exercise(&mut conn, &NewExercise::owned_by(bob.id, "Deadlift")).unwrap();
}

#[test]
fn test_entry_index_is_unique_per_workout_exercise() {
    let db = setup_test_db();
    let mut conn = db.factory.open_session().unwrap();
    let user = alice(&mut conn);
    let exercise = create_exercise(&mut conn, &NewExercise::owned_by(user.id, "Row")).unwrap();
    let workout = create_workout(&mut conn, &NewWorkout::new(user.id, date(2024, 1, 1))).unwrap();
    let we = create_workout_exercise(
        &mut conn,
        &NewWorkoutExercise::new(workout.id, exercise.id),
    )
    .unwrap();

    let first = NewEntry {
        workout_exercise_id: we.id,
        entry_index: 0,
    };
    create_entry(&mut conn, &first).unwrap();
    let err = create_entry(&mut conn, &first).unwrap_err();
    assert!(matches!(
        constraint_violation(&err),
        Some(DatabaseErrorKind::UniqueViolation)
    ));
}

#[test]
fn test_entry_metric_holds_exactly_one_value() {
    let db = setup_test_db();
    let mut conn = db.factory.open_session().unwrap();
    let user = alice(&mut conn);
    let exercise = create_exercise(&mut conn, &NewExercise::owned_by(user.id, "Run")).unwrap();
    let workout = create_workout(&mut conn, &NewWorkout::new(user.id, date(2024, 1, 1))).unwrap();
    let we = create_workout_exercise(
        &mut conn,
        &NewWorkoutExercise::new(workout.id, exercise.id),
    )
    .unwrap();
    let entry = add_entry(&mut conn, we.id).unwrap();
    let pace = create_metric_definition(&mut conn, &NewMetricDefinition::global("pace")).unwrap();
    let feel = create_metric_definition(&mut conn, &NewMetricDefinition::global("feel")).unwrap();

    let both = NewEntryMetric {
        value_text: Some("fast".to_string()),
        ..NewEntryMetric::number(entry.id, pace.id, 5.0, None)
    };
    let err = create_entry_metric(&mut conn, &both).unwrap_err();
    assert!(matches!(
        constraint_violation(&err),
        Some(DatabaseErrorKind::CheckViolation)
    ));

    let neither = NewEntryMetric {
        entry_id: entry.id,
        metric_id: pace.id,
        value_number: None,
        value_text: None,
        unit: None,
    };
    let err = create_entry_metric(&mut conn, &neither).unwrap_err();
    assert!(matches!(
        constraint_violation(&err),
        Some(DatabaseErrorKind::CheckViolation)
    ));

    let text = create_entry_metric(&mut conn, &NewEntryMetric::text(entry.id, feel.id, "easy"))
        .unwrap();
    assert_eq!(text.value_text.as_deref(), Some("easy"));
    assert_eq!(text.value_number, None);
}

#[test]
fn test_workout_embedding_round_trips() {
    let db = setup_test_db();
    let mut conn = db.factory.open_session().unwrap();
    let user = alice(&mut conn);

    let values: Vec<f32> = (0..EMBEDDING_DIM).map(|i| i as f32 * 0.001 - 0.5).collect();
    let embedding = Embedding::new(values.clone()).unwrap();
    let workout = create_workout(
        &mut conn,
        &NewWorkout {
            embeddings: Some(embedding),
            workout_text: Some("5x5 bench".to_string()),
            ..NewWorkout::new(user.id, date(2024, 1, 1))
        },
    )
    .unwrap();

    let loaded = get_workout(&mut conn, workout.id).unwrap().unwrap();
    let stored = loaded.embeddings.expect("embedding stored");
    assert_eq!(stored.values().len(), EMBEDDING_DIM);
    assert_eq!(stored.values(), values.as_slice());
}

#[test]
fn test_embeddings_can_be_set_and_cleared() {
    let db = setup_test_db();
    let mut conn = db.factory.open_session().unwrap();
    let user = alice(&mut conn);
    let exercise = create_exercise(&mut conn, &NewExercise::owned_by(user.id, "Curl")).unwrap();
    let workout = create_workout(&mut conn, &NewWorkout::new(user.id, date(2024, 1, 1))).unwrap();
    let we = create_workout_exercise(
        &mut conn,
        &NewWorkoutExercise::new(workout.id, exercise.id),
    )
    .unwrap();
    let embedding = Embedding::new(vec![0.25; EMBEDDING_DIM]).unwrap();

    assert!(set_workout_embedding(&mut conn, workout.id, &embedding).unwrap());
    assert!(set_workout_exercise_embedding(&mut conn, we.id, &embedding).unwrap());
    assert_eq!(
        get_workout_exercise(&mut conn, we.id).unwrap().unwrap().embeddings,
        Some(embedding.clone())
    );

    assert!(clear_workout_embedding(&mut conn, workout.id).unwrap());
    assert!(clear_workout_exercise_embedding(&mut conn, we.id).unwrap());
    assert_eq!(get_workout(&mut conn, workout.id).unwrap().unwrap().embeddings, None);
    assert_eq!(get_workout_exercise(&mut conn, we.id).unwrap().unwrap().embeddings, None);

    assert!(!clear_workout_embedding(&mut conn, 9999).unwrap());
}

#[test]
fn test_malformed_embedding_blob_is_rejected_by_the_schema() {
    let db = setup_test_db();
    let mut conn = db.factory.open_session().unwrap();
    let user = alice(&mut conn);
    let workout = create_workout(&mut conn, &NewWorkout::new(user.id, date(2024, 1, 1))).unwrap();

    let short_blob: Vec<u8> = vec![0u8; 16];
    let result = diesel::sql_query("UPDATE workouts SET embeddings = ? WHERE id = ?")
        .bind::<diesel::sql_types::Binary, _>(short_blob)
        .bind::<diesel::sql_types::BigInt, _>(workout.id)
        .execute(&mut conn);
    assert!(result.is_err());
}

#[test]
fn test_update_returns_none_for_missing_rows() {
    let db = setup_test_db();
    let mut conn = db.factory.open_session().unwrap();
    let user = alice(&mut conn);
    let workout = create_workout(&mut conn, &NewWorkout::new(user.id, date(2024, 1, 1))).unwrap();

    let update = UpdateWorkout {
        workout_kind: Some(Some("push".to_string())),
        ..Default::default()
    };
    let updated = update_workout(&mut conn, workout.id, &update).unwrap().unwrap();
    assert_eq!(updated.workout_kind.as_deref(), Some("push"));
    assert_eq!(updated.workout_date, date(2024, 1, 1));

    assert_eq!(update_workout(&mut conn, 9999, &update).unwrap(), None);
}
