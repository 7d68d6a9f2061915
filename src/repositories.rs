use crate::{
    domain::MemeRepository,
    errors::RepoError,
    models::{MemeRecord, NewMeme},
};
use anyhow::Context;
use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::info;

#[derive(Debug, Clone)]
pub struct SqliteMemeRepository {
    pool: SqlitePool,
}

impl SqliteMemeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        info!("Initializing SqliteMemeRepository");
        Self { pool }
    }
}

#[async_trait]
impl MemeRepository for SqliteMemeRepository {
    async fn insert(&self, new_meme: &NewMeme) -> Result<MemeRecord, RepoError> {
        let record = sqlx::query_as::<_, MemeRecord>(
            "INSERT INTO meme_api (text, image_url) VALUES (?, ?) RETURNING id, text, image_url",
        )
        .bind(&new_meme.text)
        .bind(&new_meme.image_url)
        .fetch_one(&self.pool)
        .await
        .context("Failed to insert meme record")?;

        tracing::debug!(record_id = record.id, "Inserted meme record");
        Ok(record)
    }

    async fn list_all(&self) -> Result<Vec<MemeRecord>, RepoError> {
        let records = sqlx::query_as::<_, MemeRecord>(
            "SELECT id, text, image_url FROM meme_api ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list meme records")?;

        tracing::debug!("Listed {} meme records", records.len());
        Ok(records)
    }

    async fn get_by_id(&self, id: i64) -> Result<MemeRecord, RepoError> {
        sqlx::query_as::<_, MemeRecord>("SELECT id, text, image_url FROM meme_api WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Failed to get meme record (id: {})", id))?
            .ok_or(RepoError::NotFound(id))
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM meme_api WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to delete meme record (id: {})", id))?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound(id));
        }
        tracing::debug!(record_id = id, "Deleted meme record");
        Ok(())
    }
}
