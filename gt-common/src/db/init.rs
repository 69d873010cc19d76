//! Database initialization
//!
//! Opens (or creates) the SQLite database and creates the schema. All table
//! creation is idempotent, so startup against an existing database is safe.

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

/// Current schema version recorded in `schema_version`
pub const SCHEMA_VERSION: i64 = 1;

/// Open the database at `db_path`, creating file and schema if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    // WAL journal, foreign keys enforced on every connection
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_millis(5000));

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    create_schema(&pool).await?;

    Ok(pool)
}

/// Open a private in-memory database with the full schema
///
/// The pool holds exactly one connection that is never recycled; every
/// connection to `:memory:` would otherwise see its own empty database.
pub async fn init_memory_database() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create every table and index (idempotent)
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_schema_version_table(pool).await?;
    create_accounts_table(pool).await?;
    create_bans_table(pool).await?;
    create_plants_table(pool).await?;
    create_photos_table(pool).await?;
    create_photo_votes_table(pool).await?;
    create_photo_reports_table(pool).await?;
    Ok(())
}

async fn create_schema_version_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (?, ?)")
        .bind(SCHEMA_VERSION)
        .bind(crate::time::to_millis(&crate::time::now()))
        .execute(pool)
        .await?;

    Ok(())
}

/// Users and admins share one table; the role column is the tag
pub async fn create_accounts_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS accounts (
            id INTEGER PRIMARY KEY CHECK (id >= 0),
            role TEXT NOT NULL DEFAULT 'user' CHECK (role IN ('user', 'admin')),
            created_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// `admin_id` is kept as history and deliberately has no foreign key
pub async fn create_bans_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS bans (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
            admin_id INTEGER NOT NULL,
            expiration_date INTEGER,
            created_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_bans_user ON bans(user_id)")
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn create_plants_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS plants (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            bio TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn create_photos_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS photos (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            plant_id INTEGER NOT NULL REFERENCES plants(id) ON DELETE CASCADE,
            user_id INTEGER NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
            image TEXT NOT NULL,
            upload_date INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_photos_upload_date ON photos(upload_date)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_photos_plant ON photos(plant_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_photos_user ON photos(user_id)")
        .execute(pool)
        .await?;

    Ok(())
}

/// One row per (photo, voter): a user is in at most one vote set
pub async fn create_photo_votes_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS photo_votes (
            photo_id INTEGER NOT NULL REFERENCES photos(id) ON DELETE CASCADE,
            user_id INTEGER NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
            direction INTEGER NOT NULL CHECK (direction IN (1, -1)),
            PRIMARY KEY (photo_id, user_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Reports outlive their photo, so `photo_id` has no foreign key
pub async fn create_photo_reports_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS photo_reports (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            photo_id INTEGER NOT NULL,
            user_id INTEGER NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
            report_text TEXT NOT NULL,
            report_date INTEGER NOT NULL,
            admin_action INTEGER CHECK (admin_action IN (0, 1, 2)),
            admin_id INTEGER,
            handle_date INTEGER
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_photo_reports_date ON photo_reports(report_date)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_photo_reports_admin ON photo_reports(admin_id)")
        .execute(pool)
        .await?;

    Ok(())
}
