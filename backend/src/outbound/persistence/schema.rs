//! Diesel table definitions. Keep in step with `backend/migrations`.

diesel::table! {
    /// Registered users.
    users (id) {
        /// Serial primary key.
        id -> Int4,
        /// Unique, stored trimmed.
        email -> Varchar,
        /// Optional display name.
        name -> Nullable<Varchar>,
    }
}

diesel::table! {
    /// Posts authored by users.
    posts (id) {
        /// Serial primary key.
        id -> Int4,
        /// Non-blank title.
        title -> Varchar,
        /// Optional body.
        content -> Nullable<Text>,
        /// Publication flag.
        published -> Bool,
        /// Author; references `users.id`.
        author_id -> Int4,
    }
}

diesel::joinable!(posts -> users (author_id));
diesel::allow_tables_to_appear_in_same_query!(users, posts);
