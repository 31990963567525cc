diesel::table! {
    games (id) {
        id -> Uuid,
        #[max_length = 100]
        name -> Varchar,
        description -> Nullable<Text>,
        is_active -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    game_sessions (id) {
        id -> Uuid,
        match_id -> Uuid,
        game_id -> Uuid,
        player_a_id -> Uuid,
        player_b_id -> Uuid,
        #[max_length = 20]
        status -> Varchar,
        player_a_score -> Nullable<Int4>,
        player_b_score -> Nullable<Int4>,
        cooperation_score -> Nullable<Int4>,
        duo_score -> Nullable<Int4>,
        game_state -> Jsonb,
        started_at -> Nullable<Timestamptz>,
        completed_at -> Nullable<Timestamptz>,
        duration_minutes -> Nullable<Int4>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    match_score_aggregates (match_id) {
        match_id -> Uuid,
        games_played -> Int4,
        total_cooperation -> Int4,
        avg_cooperation -> Float8,
        total_duo_score -> Int4,
        last_played_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    user_stats (user_id) {
        user_id -> Uuid,
        games_played -> Int4,
        total_cooperation -> Int4,
        avg_cooperation -> Float8,
        total_play_minutes -> Int4,
        current_streak -> Int4,
        longest_streak -> Int4,
        total_points -> Int4,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    point_transactions (id) {
        id -> Uuid,
        user_id -> Uuid,
        amount -> Int4,
        #[max_length = 50]
        reason -> Varchar,
        reference_id -> Nullable<Uuid>,
        created_at -> Timestamptz,
    }
}

// The matches table is owned by the match service; this service reads it to
// gate session creation on match state.
diesel::table! {
    matches (id) {
        id -> Uuid,
        player_a_id -> Uuid,
        player_b_id -> Uuid,
        #[max_length = 20]
        status -> Varchar,
    }
}

diesel::joinable!(game_sessions -> games (game_id));

diesel::allow_tables_to_appear_in_same_query!(
    games,
    game_sessions,
    match_score_aggregates,
    user_stats,
    point_transactions,
);
