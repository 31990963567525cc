diesel::table! {
    reports (id) {
        id -> Uuid,
        reporter_id -> Uuid,
        reported_id -> Uuid,
        #[max_length = 50]
        report_type -> Varchar,
        reason -> Text,
        context -> Nullable<Text>,
        #[max_length = 20]
        status -> Varchar,
        resolved_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    moderation_actions (id) {
        id -> Uuid,
        report_id -> Uuid,
        moderator_id -> Uuid,
        target_user_id -> Uuid,
        #[max_length = 10]
        action_type -> Varchar,
        reason -> Text,
        duration_hours -> Nullable<Int4>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    user_suspensions (id) {
        id -> Uuid,
        user_id -> Uuid,
        action_id -> Nullable<Uuid>,
        reason -> Text,
        expires_at -> Nullable<Timestamptz>,
        is_active -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    appeals (id) {
        id -> Uuid,
        user_id -> Uuid,
        suspension_id -> Uuid,
        body -> Text,
        #[max_length = 20]
        status -> Varchar,
        reviewer_id -> Nullable<Uuid>,
        review_notes -> Nullable<Text>,
        reviewed_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    user_accounts (id) {
        id -> Uuid,
        #[max_length = 20]
        status -> Varchar,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(user_suspensions -> moderation_actions (action_id));
diesel::joinable!(appeals -> user_suspensions (suspension_id));

diesel::allow_tables_to_appear_in_same_query!(
    reports,
    moderation_actions,
    user_suspensions,
    appeals,
    user_accounts,
);
