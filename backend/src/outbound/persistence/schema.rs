//! Diesel table definitions. Keep in step with `backend/migrations`.

diesel::table! {
    /// Registered accounts.
    users (id) {
        id -> Uuid,
        /// Lower-cased; unique via `users_email_key`.
        email -> Varchar,
        /// Unique when present via `users_username_key`.
        username -> Nullable<Varchar>,
        /// Argon2id PHC string.
        password_hash -> Text,
        first_name -> Varchar,
        last_name -> Varchar,
        avatar_url -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Shopping lists with their items embedded as a JSON array.
    lists (id) {
        id -> Uuid,
        /// Insertion sequence, breaks `created_at` ties when listing.
        seq -> Int8,
        owner_id -> Uuid,
        name -> Text,
        description -> Text,
        items -> Jsonb,
        shared_with -> Array<Uuid>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
        revision -> Int8,
    }
}

diesel::allow_tables_to_appear_in_same_query!(users, lists);
