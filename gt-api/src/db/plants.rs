//! Plant catalogue persistence

use gt_common::models::{NewPlant, Plant};
use gt_common::Result;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::Store;

impl Store {
    pub async fn add_plant(&self, plant: &NewPlant) -> Result<Plant> {
        let result = sqlx::query("INSERT INTO plants (name, bio) VALUES (?, ?)")
            .bind(&plant.name)
            .bind(&plant.bio)
            .execute(&self.pool)
            .await?;

        Ok(Plant::new(
            result.last_insert_rowid(),
            plant.name.clone(),
            plant.bio.clone(),
        ))
    }

    pub async fn get_plant(&self, id: i64) -> Result<Option<Plant>> {
        let row = sqlx::query("SELECT id, name, bio FROM plants WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(plant_from_row))
    }

    /// Persist a plant's mutable fields (bio); returns false if it no longer exists
    pub async fn update_plant(&self, plant: &Plant) -> Result<bool> {
        let result = sqlx::query("UPDATE plants SET bio = ? WHERE id = ?")
            .bind(&plant.bio)
            .bind(plant.id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a plant and its photos; returns false if no such plant existed
    pub async fn remove_plant(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM plants WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Case-insensitive substring search over name and bio
    ///
    /// Case folding is Unicode-aware, so it happens here rather than in
    /// SQLite, whose `lower()` only folds ASCII.
    pub async fn search_plants(&self, query: &str) -> Result<Vec<Plant>> {
        let needle = query.to_lowercase();
        let rows = sqlx::query("SELECT id, name, bio FROM plants ORDER BY name, id")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .iter()
            .map(plant_from_row)
            .filter(|plant| {
                plant.name.to_lowercase().contains(&needle)
                    || plant.bio.to_lowercase().contains(&needle)
            })
            .collect())
    }
}

fn plant_from_row(row: &SqliteRow) -> Plant {
    Plant::new(row.get("id"), row.get("name"), row.get("bio"))
}
