// Kept in sync with migrations/*_create_fitness_schema/up.sql.

diesel::table! {
    entries (id) {
        id -> BigInt,
        workout_exercise_id -> BigInt,
        entry_index -> BigInt,
    }
}

diesel::table! {
    entry_metrics (id) {
        id -> BigInt,
        entry_id -> BigInt,
        metric_id -> BigInt,
        value_number -> Nullable<Double>,
        value_text -> Nullable<Text>,
        unit -> Nullable<Text>,
    }
}

diesel::table! {
    exercises (id) {
        id -> BigInt,
        is_global -> Bool,
        name -> Text,
        user_id -> Nullable<BigInt>,
    }
}

diesel::table! {
    metric_definitions (id) {
        id -> BigInt,
        user_id -> Nullable<BigInt>,
        key -> Text,
        is_global -> Bool,
        display_name -> Nullable<Text>,
        value_type -> Nullable<Text>,
        default_unit -> Nullable<Text>,
    }
}

diesel::table! {
    metric_exercise_junction (exercise_id, metric_id) {
        exercise_id -> BigInt,
        metric_id -> BigInt,
    }
}

diesel::table! {
    users (id) {
        id -> BigInt,
        username -> Text,
        email -> Text,
        goal -> Text,
        password_hash -> Nullable<Text>,
        google_id -> Nullable<Text>,
        provider -> Nullable<Text>,
    }
}

diesel::table! {
    workout_exercises (id) {
        id -> BigInt,
        exercise_id -> BigInt,
        workout_id -> BigInt,
        note -> Nullable<Text>,
        embeddings -> Nullable<Binary>,
        exercise_text -> Nullable<Text>,
    }
}

diesel::table! {
    workouts (id) {
        id -> BigInt,
        user_id -> BigInt,
        workout_date -> Date,
        workout_kind -> Nullable<Text>,
        embeddings -> Nullable<Binary>,
        workout_text -> Nullable<Text>,
    }
}

diesel::joinable!(entries -> workout_exercises (workout_exercise_id));
diesel::joinable!(entry_metrics -> entries (entry_id));
diesel::joinable!(entry_metrics -> metric_definitions (metric_id));
diesel::joinable!(exercises -> users (user_id));
diesel::joinable!(metric_definitions -> users (user_id));
diesel::joinable!(metric_exercise_junction -> exercises (exercise_id));
diesel::joinable!(metric_exercise_junction -> metric_definitions (metric_id));
diesel::joinable!(workout_exercises -> exercises (exercise_id));
diesel::joinable!(workout_exercises -> workouts (workout_id));
diesel::joinable!(workouts -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(
    entries,
    entry_metrics,
    exercises,
    metric_definitions,
    metric_exercise_junction,
    users,
    workout_exercises,
    workouts,
);
