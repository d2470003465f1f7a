//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Registered users.
    ///
    /// `email` is unique (`users_email_key`); `password_hash` holds a PHC
    /// string and is only selected by the login and fixture paths.
    users (id) {
        id -> Int8,
        display_name -> Varchar,
        email -> Varchar,
        password_hash -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Events owned by a user.
    ///
    /// `title` is unique (`events_title_key`). Rows are removed with their
    /// author.
    events (id) {
        id -> Int8,
        title -> Varchar,
        content -> Varchar,
        author_id -> Int8,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(events -> users (author_id));

diesel::allow_tables_to_appear_in_same_query!(events, users);

/// Unique constraint guarding event titles.
pub(crate) const EVENTS_TITLE_KEY: &str = "events_title_key";
/// Foreign key from events to their author.
pub(crate) const EVENTS_AUTHOR_FKEY: &str = "events_author_id_fkey";
