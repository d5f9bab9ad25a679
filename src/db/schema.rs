//! Database schema and migrations for fileshelf.
//!
//! Migrations are applied sequentially when the database is first opened or
//! upgraded.

/// Database migrations.
///
/// Each migration is a SQL script that will be executed in order.
/// The schema_version table tracks which migrations have been applied.
pub const MIGRATIONS: &[&str] = &[
    // v1: File records
    r#"
CREATE TABLE files (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,  -- never reused
    file_name     TEXT NOT NULL,
    content_type  TEXT NOT NULL,
    locator       TEXT NOT NULL UNIQUE,               -- storage backend reference
    owner_id      INTEGER NOT NULL CHECK (owner_id > 0)
);

CREATE INDEX idx_files_owner_id ON files(owner_id);
"#,
];
