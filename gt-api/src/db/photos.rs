//! Photo and vote persistence

use gt_common::models::{NewPhoto, Photo, Vote};
use gt_common::time;
use gt_common::{Error, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::debug;

use super::{Page, PhotoFilter, Store};

/// Photo columns plus both vote sets as JSON arrays and the net rating
const PHOTO_SELECT: &str = r#"
    SELECT p.id, p.plant_id, p.user_id, p.image, p.upload_date,
        (SELECT json_group_array(v.user_id) FROM photo_votes v
            WHERE v.photo_id = p.id AND v.direction = 1) AS upvote_ids,
        (SELECT json_group_array(v.user_id) FROM photo_votes v
            WHERE v.photo_id = p.id AND v.direction = -1) AS downvote_ids,
        (SELECT COALESCE(SUM(v.direction), 0) FROM photo_votes v
            WHERE v.photo_id = p.id) AS rating
    FROM photos p
"#;

/// Optional user/plant filter; each value is bound twice
const PHOTO_FILTER: &str = r#"
    WHERE (? IS NULL OR p.user_id = ?)
      AND (? IS NULL OR p.plant_id = ?)
"#;

impl Store {
    /// Store a new photo; id and upload date are assigned here
    pub async fn add_photo(&self, photo: &NewPhoto) -> Result<Photo> {
        let upload_date = time::now();
        let result = sqlx::query(
            r#"
            INSERT INTO photos (plant_id, user_id, image, upload_date)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(photo.plant_id)
        .bind(photo.user_id)
        .bind(&photo.image)
        .bind(time::to_millis(&upload_date))
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        debug!(photo_id = id, plant_id = photo.plant_id, user_id = photo.user_id, "Photo stored");

        Ok(Photo {
            id,
            plant_id: photo.plant_id,
            user_id: photo.user_id,
            image: photo.image.clone(),
            upload_date,
            upvote_ids: Vec::new(),
            downvote_ids: Vec::new(),
        })
    }

    pub async fn get_photo(&self, id: i64) -> Result<Option<Photo>> {
        let sql = format!("{} WHERE p.id = ?", PHOTO_SELECT);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(photo_from_row).transpose()
    }

    /// Returns false if no such photo existed
    pub async fn remove_photo(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM photos WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Newest photos first
    pub async fn list_photos_by_date(&self, filter: PhotoFilter, page: Page) -> Result<Vec<Photo>> {
        self.list_photos(filter, page, "p.upload_date DESC, p.id DESC")
            .await
    }

    /// Highest rated photos first; ties go to the newer photo
    pub async fn list_photos_by_rating(
        &self,
        filter: PhotoFilter,
        page: Page,
    ) -> Result<Vec<Photo>> {
        self.list_photos(filter, page, "rating DESC, p.upload_date DESC, p.id DESC")
            .await
    }

    /// Top `max` rated photos of a plant
    pub async fn top_plant_photos(&self, plant_id: i64, max: i64) -> Result<Vec<Photo>> {
        if max <= 0 {
            return Ok(Vec::new());
        }
        self.list_photos_by_rating(PhotoFilter::ByPlant(plant_id), Page::first(max))
            .await
    }

    async fn list_photos(
        &self,
        filter: PhotoFilter,
        page: Page,
        order_by: &'static str,
    ) -> Result<Vec<Photo>> {
        let sql = format!(
            "{} {} ORDER BY {} LIMIT ? OFFSET ?",
            PHOTO_SELECT, PHOTO_FILTER, order_by
        );
        let rows = sqlx::query(&sql)
            .bind(filter.user_id())
            .bind(filter.user_id())
            .bind(filter.plant_id())
            .bind(filter.plant_id())
            .bind(page.max)
            .bind(page.start_index)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(photo_from_row).collect()
    }

    /// Record `user_id`'s vote on a photo
    ///
    /// A vote is set membership: voting the other way moves the id between
    /// sets, repeating a vote changes nothing, `Vote::Clear` withdraws it.
    /// Returns the updated photo, or `None` if the photo does not exist.
    pub async fn cast_vote(&self, photo_id: i64, user_id: i64, vote: Vote) -> Result<Option<Photo>> {
        match vote.direction() {
            Some(direction) => {
                sqlx::query(
                    r#"
                    INSERT INTO photo_votes (photo_id, user_id, direction)
                    SELECT id, ?, ? FROM photos WHERE id = ?
                    ON CONFLICT(photo_id, user_id) DO UPDATE SET direction = excluded.direction
                    "#,
                )
                .bind(user_id)
                .bind(direction)
                .bind(photo_id)
                .execute(&self.pool)
                .await?;
            }
            None => {
                sqlx::query("DELETE FROM photo_votes WHERE photo_id = ? AND user_id = ?")
                    .bind(photo_id)
                    .bind(user_id)
                    .execute(&self.pool)
                    .await?;
            }
        }

        self.get_photo(photo_id).await
    }
}

fn photo_from_row(row: &SqliteRow) -> Result<Photo> {
    Ok(Photo {
        id: row.get("id"),
        plant_id: row.get("plant_id"),
        user_id: row.get("user_id"),
        image: row.get("image"),
        upload_date: time::from_millis(row.get("upload_date")),
        upvote_ids: parse_id_array(row.get("upvote_ids"))?,
        downvote_ids: parse_id_array(row.get("downvote_ids"))?,
    })
}

/// Parse a `json_group_array` column into sorted ids
fn parse_id_array(json: String) -> Result<Vec<i64>> {
    let mut ids: Vec<i64> = serde_json::from_str(&json)
        .map_err(|e| Error::Internal(format!("Malformed vote array {:?}: {}", json, e)))?;
    ids.sort_unstable();
    Ok(ids)
}
