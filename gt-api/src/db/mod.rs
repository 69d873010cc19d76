//! Storage engine for the GreenThumb API
//!
//! [`Store`] owns the SQLite connection pool and exposes the persistence
//! operations the route layer calls. It is constructed once at startup and
//! handed to handlers through `AppState`.

mod accounts;
mod bans;
mod photo_reports;
mod photos;
mod plants;

pub use photo_reports::HandledReport;

use gt_common::Result;
use sqlx::SqlitePool;
use std::path::Path;
use tracing::info;

/// Pagination window for list queries
///
/// `start_index >= 0`, `max > 0`. A window running past the end returns the
/// available remainder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub start_index: i64,
    pub max: i64,
}

impl Page {
    pub fn new(start_index: i64, max: i64) -> Self {
        Self { start_index, max }
    }

    /// First `max` records
    pub fn first(max: i64) -> Self {
        Self { start_index: 0, max }
    }
}

/// Photo listing filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoFilter {
    All,
    ByUser(i64),
    ByPlant(i64),
}

impl PhotoFilter {
    fn user_id(&self) -> Option<i64> {
        match self {
            PhotoFilter::ByUser(id) => Some(*id),
            _ => None,
        }
    }

    fn plant_id(&self) -> Option<i64> {
        match self {
            PhotoFilter::ByPlant(id) => Some(*id),
            _ => None,
        }
    }
}

/// Photo report listing filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFilter {
    All,
    Unhandled,
    HandledBy(i64),
}

/// Database-backed storage engine
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Wrap an initialized pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (or create) the database file and its schema
    pub async fn open(db_path: &Path) -> Result<Self> {
        let pool = gt_common::db::init_database(db_path).await?;
        Ok(Self::new(pool))
    }

    /// Private in-memory database, used by tests
    pub async fn in_memory() -> Result<Self> {
        let pool = gt_common::db::init_memory_database().await?;
        Ok(Self::new(pool))
    }

    /// Close all pooled connections
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Database connections closed");
    }
}
