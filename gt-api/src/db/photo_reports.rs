//! Photo report persistence and moderation

use chrono::{DateTime, Utc};
use gt_common::models::{Ban, NewPhotoReport, PhotoReport, ReportAction};
use gt_common::time;
use gt_common::{Error, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Executor, Row, Sqlite};
use tracing::{info, warn};

use super::bans::insert_ban;
use super::{Page, ReportFilter, Store};

/// Outcome of handling a report
#[derive(Debug, Clone, PartialEq)]
pub struct HandledReport {
    pub report: PhotoReport,
    /// Ban issued against the uploader (action 2 only)
    pub ban: Option<Ban>,
}

impl Store {
    /// Store a new, unhandled report
    pub async fn add_photo_report(&self, report: &NewPhotoReport) -> Result<PhotoReport> {
        let report_date = time::now();
        let result = sqlx::query(
            r#"
            INSERT INTO photo_reports (photo_id, user_id, report_text, report_date)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(report.photo_id)
        .bind(report.user_id)
        .bind(&report.report_text)
        .bind(time::to_millis(&report_date))
        .execute(&self.pool)
        .await?;

        Ok(PhotoReport {
            id: result.last_insert_rowid(),
            photo_id: report.photo_id,
            user_id: report.user_id,
            report_text: report.report_text.clone(),
            report_date,
            admin_action: None,
            admin_id: None,
            handle_date: None,
        })
    }

    pub async fn get_photo_report(&self, id: i64) -> Result<Option<PhotoReport>> {
        fetch_report(&self.pool, id).await
    }

    /// Returns false if no such report existed
    pub async fn remove_photo_report(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM photo_reports WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Reports in ascending report-date order
    pub async fn list_photo_reports_by_date(
        &self,
        filter: ReportFilter,
        page: Page,
    ) -> Result<Vec<PhotoReport>> {
        let condition = match filter {
            ReportFilter::All => "1 = 1",
            ReportFilter::Unhandled => "admin_action IS NULL",
            ReportFilter::HandledBy(_) => "admin_action IS NOT NULL AND admin_id = ?",
        };
        let sql = format!(
            r#"
            SELECT id, photo_id, user_id, report_text, report_date, admin_action, admin_id, handle_date
            FROM photo_reports
            WHERE {}
            ORDER BY report_date ASC, id ASC
            LIMIT ? OFFSET ?
            "#,
            condition
        );

        let mut query = sqlx::query(&sql);
        if let ReportFilter::HandledBy(admin_id) = filter {
            query = query.bind(admin_id);
        }
        let rows = query
            .bind(page.max)
            .bind(page.start_index)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(report_from_row).collect()
    }

    /// Apply an admin's disposition to a report
    ///
    /// Runs as one transaction: the state transition, the photo removal
    /// (actions 1 and 2) and the uploader ban (action 2) commit together or
    /// not at all. The guarded claim is the first statement so the
    /// transaction holds the write lock before it reads anything.
    ///
    /// Errors: `NotFound` for an unknown report (or, for action 2, a photo
    /// that no longer exists), `Conflict` if the report was already handled.
    pub async fn handle_photo_report(
        &self,
        report_id: i64,
        action: ReportAction,
        admin_id: i64,
        ban_expiration: Option<DateTime<Utc>>,
    ) -> Result<HandledReport> {
        let mut tx = self.pool.begin().await?;

        let claimed = sqlx::query(
            r#"
            UPDATE photo_reports
            SET admin_action = ?, admin_id = ?, handle_date = ?
            WHERE id = ? AND admin_action IS NULL
            "#,
        )
        .bind(i64::from(action))
        .bind(admin_id)
        .bind(time::to_millis(&time::now()))
        .bind(report_id)
        .execute(&mut *tx)
        .await?;

        if claimed.rows_affected() == 0 {
            return match fetch_report(&mut *tx, report_id).await? {
                None => Err(Error::not_found("PhotoReport")),
                Some(existing) if existing.is_handled() => Err(Error::Conflict(format!(
                    "PhotoReport {} has already been handled.",
                    report_id
                ))),
                Some(_) => Err(Error::Internal(format!(
                    "PhotoReport {} could not be claimed",
                    report_id
                ))),
            };
        }

        let report = fetch_report(&mut *tx, report_id)
            .await?
            .ok_or_else(|| Error::not_found("PhotoReport"))?;

        let mut ban = None;
        if action.removes_photo() {
            let uploader: Option<i64> =
                sqlx::query_scalar("SELECT user_id FROM photos WHERE id = ?")
                    .bind(report.photo_id)
                    .fetch_optional(&mut *tx)
                    .await?;

            match uploader {
                Some(uploader) => {
                    sqlx::query("DELETE FROM photos WHERE id = ?")
                        .bind(report.photo_id)
                        .execute(&mut *tx)
                        .await?;
                    info!(photo_id = report.photo_id, report_id, "Reported photo removed");

                    if action.bans_uploader() {
                        ban = Some(insert_ban(&mut *tx, uploader, admin_id, ban_expiration).await?);
                    }
                }
                None if action.bans_uploader() => return Err(Error::not_found("Photo")),
                None => {
                    warn!(
                        photo_id = report.photo_id,
                        report_id, "Reported photo was already removed"
                    );
                }
            }
        }

        tx.commit().await?;

        info!(report_id, admin_id, action = i64::from(action), "Photo report handled");

        Ok(HandledReport { report, ban })
    }
}

async fn fetch_report<'e, E>(executor: E, id: i64) -> Result<Option<PhotoReport>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query(
        r#"
        SELECT id, photo_id, user_id, report_text, report_date, admin_action, admin_id, handle_date
        FROM photo_reports
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    row.as_ref().map(report_from_row).transpose()
}

fn report_from_row(row: &SqliteRow) -> Result<PhotoReport> {
    let admin_action: Option<i64> = row.get("admin_action");
    let handle_date: Option<i64> = row.get("handle_date");

    Ok(PhotoReport {
        id: row.get("id"),
        photo_id: row.get("photo_id"),
        user_id: row.get("user_id"),
        report_text: row.get("report_text"),
        report_date: time::from_millis(row.get("report_date")),
        admin_action: admin_action.map(ReportAction::try_from).transpose()?,
        admin_id: row.get("admin_id"),
        handle_date: handle_date.map(time::from_millis),
    })
}
