//! PostgreSQL `VideoRepository` implementation.

use crate::domain::video::{NewVideoRecord, VideoRecord};
use crate::ports::repository::{StoreError, VideoRepository};
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use uuid::Uuid;

const UNIQUE_VIOLATION: &str = "23505";

#[derive(Clone)]
pub struct PostgresVideoRepository {
    pool: PgPool,
}

impl PostgresVideoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect and bring the schema up to date.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| StoreError::Query(format!("migration failed: {}", e)))?;

        Ok(Self::new(pool))
    }
}

fn store_error(err: sqlx::Error, public_id: Option<&str>) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            StoreError::Duplicate(public_id.unwrap_or_default().to_string())
        }
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed => StoreError::Unavailable(err.to_string()),
        _ => StoreError::Query(err.to_string()),
    }
}

#[async_trait]
impl VideoRepository for PostgresVideoRepository {
    async fn insert(&self, record: NewVideoRecord) -> Result<VideoRecord, StoreError> {
        sqlx::query_as::<_, VideoRecord>(
            r#"
            INSERT INTO videos (id, title, description, public_id, original_size, compressed_size, duration)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, title, description, public_id, original_size, compressed_size, duration, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&record.title)
        .bind(&record.description)
        .bind(&record.public_id)
        .bind(&record.original_size)
        .bind(&record.compressed_size)
        .bind(record.duration)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| store_error(e, Some(&record.public_id)))
    }

    async fn list_newest_first(&self) -> Result<Vec<VideoRecord>, StoreError> {
        sqlx::query_as::<_, VideoRecord>(
            r#"
            SELECT id, title, description, public_id, original_size, compressed_size, duration, created_at, updated_at
            FROM videos
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| store_error(e, None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_errors_are_unavailable() {
        assert!(matches!(
            store_error(sqlx::Error::PoolTimedOut, None),
            StoreError::Unavailable(_)
        ));
        assert!(matches!(
            store_error(sqlx::Error::PoolClosed, None),
            StoreError::Unavailable(_)
        ));
    }

    #[test]
    fn test_other_errors_are_query_failures() {
        assert!(matches!(
            store_error(sqlx::Error::RowNotFound, None),
            StoreError::Query(_)
        ));
    }

    fn new_record(public_id: &str) -> NewVideoRecord {
        NewVideoRecord {
            title: format!("Title {}", public_id),
            description: "clip".to_string(),
            public_id: public_id.to_string(),
            original_size: "2048".to_string(),
            compressed_size: "1024".to_string(),
            duration: 0.0,
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "Requires PostgreSQL database"]
    async fn test_list_is_newest_first(pool: PgPool) {
        let repository = PostgresVideoRepository::new(pool);
        for public_id in ["video-uploads/a", "video-uploads/b", "video-uploads/c"] {
            let stored = repository.insert(new_record(public_id)).await.unwrap();
            assert_eq!(stored.public_id, public_id);
            assert_eq!(stored.compressed_size, "1024");
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }

        let videos = repository.list_newest_first().await.unwrap();
        let ids: Vec<&str> = videos.iter().map(|v| v.public_id.as_str()).collect();
        assert_eq!(ids, ["video-uploads/c", "video-uploads/b", "video-uploads/a"]);
        assert!(videos
            .windows(2)
            .all(|pair| pair[0].created_at > pair[1].created_at));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "Requires PostgreSQL database"]
    async fn test_duplicate_public_id(pool: PgPool) {
        let repository = PostgresVideoRepository::new(pool);
        repository.insert(new_record("video-uploads/dup")).await.unwrap();

        let err = repository
            .insert(new_record("video-uploads/dup"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(id) if id == "video-uploads/dup"));
        assert_eq!(repository.list_newest_first().await.unwrap().len(), 1);
    }
}
