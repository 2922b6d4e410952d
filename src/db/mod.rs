//! Database module for SQLite persistence.
//!
//! SQLite is the source of truth for all application data.

mod repository;

pub use repository::*;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

/// Initialize the database connection pool and run migrations.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    // Ensure the parent directory exists
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    // Run embedded migrations
    run_migrations(&pool).await?;

    Ok(pool)
}

/// Run database migrations.
async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    // Create tables if they don't exist
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS meta (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            schema_version INTEGER NOT NULL DEFAULT 1,
            revision_id INTEGER NOT NULL DEFAULT 0,
            generated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        INSERT OR IGNORE INTO meta (id, schema_version, revision_id, generated_at)
        VALUES (1, 1, 0, datetime('now'));
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS profiles (
            id TEXT PRIMARY KEY,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            title TEXT NOT NULL,
            father_id TEXT,
            mother_id TEXT,
            email TEXT NOT NULL,
            birth_date TEXT,
            birth_place TEXT,
            current_location TEXT,
            phone TEXT,
            country TEXT,
            photo_url TEXT,
            situation TEXT,
            profession TEXT,
            is_admin INTEGER NOT NULL DEFAULT 0,
            is_patriarch INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            version INTEGER NOT NULL DEFAULT 1
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Indexes for common queries, plus the two uniqueness guarantees the
    // registration flow relies on: one account per email, and at most one
    // patriarch no matter how many registrations race on the first-user check.
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_profiles_created_at ON profiles(created_at);
        CREATE INDEX IF NOT EXISTS idx_profiles_father_id ON profiles(father_id);
        CREATE INDEX IF NOT EXISTS idx_profiles_mother_id ON profiles(mother_id);
        CREATE UNIQUE INDEX IF NOT EXISTS idx_profiles_email ON profiles(email);
        CREATE UNIQUE INDEX IF NOT EXISTS idx_profiles_patriarch
            ON profiles(is_patriarch) WHERE is_patriarch = 1;
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
