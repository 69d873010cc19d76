//! Ban persistence

use chrono::{DateTime, Utc};
use gt_common::models::Ban;
use gt_common::time;
use gt_common::{Error, Result};
use sqlx::{Executor, Row, Sqlite};
use tracing::info;

use super::Store;

impl Store {
    /// Issue a ban against `user_id`
    ///
    /// Fails with `NotFound` if the user does not exist.
    pub async fn add_ban(
        &self,
        user_id: i64,
        admin_id: i64,
        expiration_date: Option<DateTime<Utc>>,
    ) -> Result<Ban> {
        let mut tx = self.pool.begin().await?;

        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM accounts WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(Error::not_found("User"));
        }

        let ban = insert_ban(&mut *tx, user_id, admin_id, expiration_date).await?;
        tx.commit().await?;

        Ok(ban)
    }
}

/// Insert a ban row and return the created record
pub(crate) async fn insert_ban<'e, E>(
    executor: E,
    user_id: i64,
    admin_id: i64,
    expiration_date: Option<DateTime<Utc>>,
) -> Result<Ban>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"
        INSERT INTO bans (user_id, admin_id, expiration_date, created_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(user_id)
    .bind(admin_id)
    .bind(expiration_date.as_ref().map(time::to_millis))
    .bind(time::to_millis(&time::now()))
    .execute(executor)
    .await?;

    let ban = Ban::new(result.last_insert_rowid(), user_id, admin_id, expiration_date);
    info!(
        ban_id = ban.id,
        user_id, admin_id,
        permanent = ban.is_permanent(),
        "Ban issued"
    );
    Ok(ban)
}

/// All bans of `user_id` in issue order
pub(crate) async fn bans_for_user<'e, E>(executor: E, user_id: i64) -> Result<Vec<Ban>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query(
        r#"
        SELECT id, user_id, admin_id, expiration_date
        FROM bans
        WHERE user_id = ?
        ORDER BY id
        "#,
    )
    .bind(user_id)
    .fetch_all(executor)
    .await?;

    Ok(rows.iter().map(ban_from_row).collect())
}

fn ban_from_row(row: &sqlx::sqlite::SqliteRow) -> Ban {
    let expiration: Option<i64> = row.get("expiration_date");
    Ban::new(
        row.get("id"),
        row.get("user_id"),
        row.get("admin_id"),
        expiration.map(time::from_millis),
    )
}
