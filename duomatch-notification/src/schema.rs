diesel::table! {
    notifications (id) {
        id -> Uuid,
        user_id -> Uuid,
        #[max_length = 50]
        notification_type -> Varchar,
        #[max_length = 200]
        title -> Varchar,
        body -> Text,
        data -> Nullable<Jsonb>,
        is_read -> Bool,
        created_at -> Timestamptz,
    }
}
