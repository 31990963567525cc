diesel::table! {
    matches (id) {
        id -> Uuid,
        player_a_id -> Uuid,
        player_b_id -> Uuid,
        #[max_length = 20]
        status -> Varchar,
        #[max_length = 10]
        player_a_decision -> Nullable<Varchar>,
        #[max_length = 10]
        player_b_decision -> Nullable<Varchar>,
        compatibility_score -> Float8,
        matched_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    profile_reveals (id) {
        id -> Uuid,
        revealer_id -> Uuid,
        revealed_to_id -> Uuid,
        #[max_length = 10]
        reveal_level -> Varchar,
        is_mutual -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(
    matches,
    profile_reveals,
);
