//! Postgres adapter for article comments.

use async_trait::async_trait;
use sqlx::postgres::PgPool;
use sqlx::Row;

use domains::{ArticleComment, AuditStamp, CommentRecord, CommentStore, NewComment};

pub struct PgCommentStore {
    pool: PgPool,
}

impl PgCommentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentStore for PgCommentStore {
    async fn find_by_article(&self, article_id: i64) -> anyhow::Result<Vec<CommentRecord>> {
        let rows = sqlx::query(
            "SELECT c.id, c.article_id, c.user_id, u.nickname, u.email, \
                    c.parent_comment_id, c.content, c.created_at \
             FROM article_comment c \
             JOIN user_account u ON u.user_id = c.user_id \
             WHERE c.article_id = $1 \
             ORDER BY c.created_at ASC, c.id ASC",
        )
        .bind(article_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| CommentRecord {
                id: row.get("id"),
                article_id: row.get("article_id"),
                user_id: row.get("user_id"),
                nickname: row.get("nickname"),
                email: row.get("email"),
                parent_comment_id: row.get("parent_comment_id"),
                content: row.get("content"),
                created_at: row.get("created_at"),
            })
            .collect())
    }

    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<ArticleComment>> {
        let row = sqlx::query(
            "SELECT id, article_id, user_id, parent_comment_id, content, \
                    created_at, created_by, modified_at, modified_by \
             FROM article_comment WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| ArticleComment {
            id: row.get("id"),
            article_id: row.get("article_id"),
            user_id: row.get("user_id"),
            parent_comment_id: row.get("parent_comment_id"),
            content: row.get("content"),
            created_at: row.get("created_at"),
            created_by: row.get("created_by"),
            modified_at: row.get("modified_at"),
            modified_by: row.get("modified_by"),
        }))
    }

    async fn create(
        &self,
        comment: NewComment,
        stamp: AuditStamp,
    ) -> anyhow::Result<ArticleComment> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO article_comment \
             (article_id, user_id, parent_comment_id, content, created_at, created_by, modified_at, modified_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $5, $6) RETURNING id",
        )
        .bind(comment.article_id)
        .bind(&comment.user_id)
        .bind(comment.parent_comment_id)
        .bind(&comment.content)
        .bind(stamp.at)
        .bind(&stamp.by)
        .fetch_one(&self.pool)
        .await?;

        Ok(ArticleComment {
            id,
            article_id: comment.article_id,
            user_id: comment.user_id,
            parent_comment_id: comment.parent_comment_id,
            content: comment.content,
            created_at: stamp.at,
            created_by: stamp.by.clone(),
            modified_at: stamp.at,
            modified_by: stamp.by,
        })
    }

    /// Removes a comment and every transitive reply in one statement. The
    /// owner check applies only to the root; replies from other users go
    /// with their thread.
    async fn delete_tree(&self, id: i64, user_id: String) -> anyhow::Result<u64> {
        let result = sqlx::query(
            "WITH RECURSIVE tree AS ( \
                 SELECT id FROM article_comment WHERE id = $1 AND user_id = $2 \
                 UNION ALL \
                 SELECT c.id FROM article_comment c \
                 JOIN tree t ON c.parent_comment_id = t.id \
             ) \
             DELETE FROM article_comment WHERE id IN (SELECT id FROM tree)",
        )
        .bind(id)
        .bind(&user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
