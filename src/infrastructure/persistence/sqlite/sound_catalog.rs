//! SQLite Sound Catalog

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::path::{Path, PathBuf};

use super::DbPool;
use crate::application::ports::{CatalogStats, RepositoryError, SoundCatalogPort, SoundRecord};

const SELECT_SOUND: &str = "SELECT id, name, file_path, play_count, created_at FROM sounds";

/// SQLite Sound Catalog
pub struct SqliteSoundCatalog {
    pool: DbPool,
}

impl SqliteSoundCatalog {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct SoundRow {
    id: String,
    name: String,
    file_path: String,
    play_count: i64,
    created_at: String,
}

impl TryFrom<SoundRow> for SoundRecord {
    type Error = RepositoryError;

    fn try_from(row: SoundRow) -> Result<Self, Self::Error> {
        Ok(SoundRecord {
            play_count: u64::try_from(row.play_count)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?,
            id: row.id,
            name: row.name,
            file_path: PathBuf::from(row.file_path),
            created_at: DateTime::parse_from_rfc3339(&row.created_at)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?
                .with_timezone(&Utc),
        })
    }
}

fn database_error(e: sqlx::Error) -> RepositoryError {
    RepositoryError::DatabaseError(e.to_string())
}

#[async_trait]
impl SoundCatalogPort for SqliteSoundCatalog {
    async fn list(&self) -> Result<Vec<SoundRecord>, RepositoryError> {
        let rows: Vec<SoundRow> = sqlx::query_as(&format!("{} ORDER BY rowid", SELECT_SOUND))
            .fetch_all(&self.pool)
            .await
            .map_err(database_error)?;

        rows.into_iter().map(SoundRecord::try_from).collect()
    }

    async fn find(&self, id: &str) -> Result<Option<SoundRecord>, RepositoryError> {
        let row: Option<SoundRow> = sqlx::query_as(&format!("{} WHERE id = ?", SELECT_SOUND))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error)?;

        row.map(SoundRecord::try_from).transpose()
    }

    async fn add(
        &self,
        id: &str,
        file_path: &Path,
        name: &str,
    ) -> Result<SoundRecord, RepositoryError> {
        let record = SoundRecord {
            id: id.to_string(),
            name: name.to_string(),
            file_path: file_path.to_path_buf(),
            play_count: 0,
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO sounds (id, name, file_path, play_count, created_at)
            VALUES (?, ?, ?, 0, ?)
            "#,
        )
        .bind(&record.id)
        .bind(&record.name)
        .bind(record.file_path.to_string_lossy().to_string())
        .bind(record.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| match e.as_database_error() {
            Some(db) if db.is_unique_violation() => RepositoryError::Duplicate(id.to_string()),
            _ => database_error(e),
        })?;

        Ok(record)
    }

    async fn remove(&self, id: &str) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM sounds WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn increment_play_count(&self, id: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE sounds SET play_count = play_count + 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn top(&self, n: usize) -> Result<Vec<SoundRecord>, RepositoryError> {
        let rows: Vec<SoundRow> = sqlx::query_as(&format!(
            "{} ORDER BY play_count DESC, rowid LIMIT ?",
            SELECT_SOUND
        ))
        .bind(n as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(database_error)?;

        rows.into_iter().map(SoundRecord::try_from).collect()
    }

    async fn stats(&self) -> Result<CatalogStats, RepositoryError> {
        let (total_sounds, total_plays): (i64, i64) =
            sqlx::query_as("SELECT COUNT(*), COALESCE(SUM(play_count), 0) FROM sounds")
                .fetch_one(&self.pool)
                .await
                .map_err(database_error)?;

        Ok(CatalogStats {
            total_sounds: total_sounds.max(0) as u64,
            total_plays: total_plays.max(0) as u64,
        })
    }
}
