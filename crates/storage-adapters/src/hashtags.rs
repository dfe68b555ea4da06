//! Postgres adapter for hashtags.

use async_trait::async_trait;
use sqlx::postgres::PgPool;
use sqlx::Row;

use domains::{AuditStamp, Hashtag, HashtagStore};

pub struct PgHashtagStore {
    pool: PgPool,
}

impl PgHashtagStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn hashtag_from_row(row: &sqlx::postgres::PgRow) -> Hashtag {
    Hashtag {
        id: row.get("id"),
        hashtag_name: row.get("hashtag_name"),
        created_at: row.get("created_at"),
        created_by: row.get("created_by"),
        modified_at: row.get("modified_at"),
        modified_by: row.get("modified_by"),
    }
}

#[async_trait]
impl HashtagStore for PgHashtagStore {
    async fn find_by_names(&self, names: Vec<String>) -> anyhow::Result<Vec<Hashtag>> {
        let rows = sqlx::query(
            "SELECT id, hashtag_name, created_at, created_by, modified_at, modified_by \
             FROM hashtag WHERE hashtag_name = ANY($1)",
        )
        .bind(&names)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(hashtag_from_row).collect())
    }

    async fn create(&self, name: String, stamp: AuditStamp) -> anyhow::Result<Hashtag> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO hashtag (hashtag_name, created_at, created_by, modified_at, modified_by) \
             VALUES ($1, $2, $3, $2, $3) RETURNING id",
        )
        .bind(&name)
        .bind(stamp.at)
        .bind(&stamp.by)
        .fetch_one(&self.pool)
        .await?;

        Ok(Hashtag {
            id,
            hashtag_name: name,
            created_at: stamp.at,
            created_by: stamp.by.clone(),
            modified_at: stamp.at,
            modified_by: stamp.by,
        })
    }

    /// Conditional single-statement delete: the row only goes away while
    /// no link references it, so the check and the delete cannot be
    /// interleaved.
    async fn delete_if_orphaned(&self, id: i64) -> anyhow::Result<bool> {
        let result = sqlx::query(
            "DELETE FROM hashtag h WHERE h.id = $1 \
             AND NOT EXISTS (SELECT 1 FROM article_hashtag ah WHERE ah.hashtag_id = h.id)",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_names(&self) -> anyhow::Result<Vec<String>> {
        let names: Vec<String> =
            sqlx::query_scalar("SELECT hashtag_name FROM hashtag ORDER BY hashtag_name")
                .fetch_all(&self.pool)
                .await?;
        Ok(names)
    }
}
