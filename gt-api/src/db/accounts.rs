//! Account persistence (users and admins)

use gt_common::models::{Account, Role};
use gt_common::time;
use gt_common::{Error, Result};
use sqlx::Row;
use tracing::info;

use super::bans::bans_for_user;
use super::Store;

impl Store {
    /// Create a regular account with a caller-chosen id
    ///
    /// Fails with `Conflict` if the id is taken.
    pub async fn add_account(&self, id: i64) -> Result<Account> {
        let result = sqlx::query("INSERT INTO accounts (id, role, created_at) VALUES (?, ?, ?)")
            .bind(id)
            .bind(Role::User.as_str())
            .bind(time::to_millis(&time::now()))
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => Ok(Account::new_user(id)),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => Err(
                Error::Conflict(format!("A User with id {} already exists.", id)),
            ),
            Err(e) => Err(e.into()),
        }
    }

    /// Load an account with its ban history
    pub async fn get_account(&self, id: i64) -> Result<Option<Account>> {
        let row = sqlx::query("SELECT id, role FROM accounts WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let role: String = row.get("role");
        Ok(Some(Account {
            id: row.get("id"),
            role: Role::parse(&role)?,
            bans: bans_for_user(&self.pool, id).await?,
        }))
    }

    /// True iff `id` names an existing admin account
    pub async fn check_admin(&self, id: i64) -> Result<bool> {
        let role: Option<String> = sqlx::query_scalar("SELECT role FROM accounts WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(role.as_deref() == Some(Role::Admin.as_str()))
    }

    /// Give an existing account admin privilege; bans are untouched
    ///
    /// Returns `None` if the account does not exist.
    pub async fn promote_to_admin(&self, id: i64) -> Result<Option<Account>> {
        let Some(account) = self.get_account(id).await? else {
            return Ok(None);
        };

        let result = sqlx::query("UPDATE accounts SET role = ? WHERE id = ?")
            .bind(Role::Admin.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        info!(user_id = id, "Account promoted to admin");
        Ok(Some(account.promote()))
    }

    /// Create-or-promote an admin account (startup seeding)
    pub async fn ensure_admin(&self, id: i64) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO accounts (id, role, created_at) VALUES (?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET role = excluded.role
            "#,
        )
        .bind(id)
        .bind(Role::Admin.as_str())
        .bind(time::to_millis(&time::now()))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Delete an account along with its photos, votes, reports and bans
    ///
    /// Returns false if no such account existed.
    pub async fn remove_account(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
