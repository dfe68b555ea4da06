//! Postgres adapter for articles and their hashtag links.

use async_trait::async_trait;
use sqlx::postgres::PgPool;
use sqlx::Row;

use domains::{
    Article, ArticleDetail, ArticleStore, ArticleSummary, AuditStamp, NewArticle, Page,
    PageRequest, SearchFilter, SortDirection, SortKey,
};

use crate::contains_pattern;

pub struct PgArticleStore {
    pool: PgPool,
}

impl PgArticleStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SUMMARY_SELECT: &str = "SELECT a.id, a.title, a.content, a.user_id, u.nickname, a.created_at, \
     COALESCE((SELECT array_agg(h.hashtag_name ORDER BY h.hashtag_name) \
               FROM article_hashtag ah \
               JOIN hashtag h ON h.id = ah.hashtag_id \
               WHERE ah.article_id = a.id), '{}') AS hashtags \
     FROM article a \
     JOIN user_account u ON u.user_id = a.user_id";

fn order_clause(page: &PageRequest) -> String {
    // Closed enums only: nothing user-controlled reaches the SQL text.
    let column = match page.sort {
        SortKey::CreatedAt => "a.created_at",
        SortKey::Title => "a.title",
    };
    let direction = match page.direction {
        SortDirection::Asc => "ASC",
        SortDirection::Desc => "DESC",
    };
    // Secondary key keeps paging stable across equal sort values.
    format!("ORDER BY {column} {direction}, a.id DESC")
}

fn filter_clause(filter: &SearchFilter) -> &'static str {
    match filter {
        SearchFilter::TitleContains(_) => "a.title ILIKE $1",
        SearchFilter::ContentContains(_) => "a.content ILIKE $1",
        SearchFilter::UserIdContains(_) => "a.user_id ILIKE $1",
        SearchFilter::NicknameContains(_) => "u.nickname ILIKE $1",
    }
}

fn filter_keyword(filter: &SearchFilter) -> &str {
    match filter {
        SearchFilter::TitleContains(kw)
        | SearchFilter::ContentContains(kw)
        | SearchFilter::UserIdContains(kw)
        | SearchFilter::NicknameContains(kw) => kw,
    }
}

fn summary_from_row(row: &sqlx::postgres::PgRow) -> ArticleSummary {
    ArticleSummary {
        id: row.get("id"),
        title: row.get("title"),
        content: row.get("content"),
        user_id: row.get("user_id"),
        nickname: row.get("nickname"),
        hashtags: row.get("hashtags"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl ArticleStore for PgArticleStore {
    async fn find_page(
        &self,
        filter: Option<SearchFilter>,
        page: PageRequest,
    ) -> anyhow::Result<Page<ArticleSummary>> {
        let order = order_clause(&page);
        let (rows, total) = match &filter {
            None => {
                let sql = format!("{SUMMARY_SELECT} {order} LIMIT $1 OFFSET $2");
                let rows = sqlx::query(&sql)
                    .bind(page.size as i64)
                    .bind(page.offset() as i64)
                    .fetch_all(&self.pool)
                    .await?;
                let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM article")
                    .fetch_one(&self.pool)
                    .await?;
                (rows, total)
            }
            Some(filter) => {
                let clause = filter_clause(filter);
                let pattern = contains_pattern(filter_keyword(filter));
                let sql = format!("{SUMMARY_SELECT} WHERE {clause} {order} LIMIT $2 OFFSET $3");
                let rows = sqlx::query(&sql)
                    .bind(&pattern)
                    .bind(page.size as i64)
                    .bind(page.offset() as i64)
                    .fetch_all(&self.pool)
                    .await?;
                let count_sql = format!(
                    "SELECT COUNT(*) FROM article a \
                     JOIN user_account u ON u.user_id = a.user_id WHERE {clause}"
                );
                let total: i64 = sqlx::query_scalar(&count_sql)
                    .bind(&pattern)
                    .fetch_one(&self.pool)
                    .await?;
                (rows, total)
            }
        };

        let items = rows.iter().map(summary_from_row).collect();
        Ok(Page::new(items, &page, total as u64))
    }

    async fn find_by_hashtag_names(
        &self,
        names: Vec<String>,
        page: PageRequest,
    ) -> anyhow::Result<Page<ArticleSummary>> {
        let order = order_clause(&page);
        let sql = format!(
            "{SUMMARY_SELECT} \
             WHERE a.id IN (SELECT ah.article_id FROM article_hashtag ah \
                            JOIN hashtag h ON h.id = ah.hashtag_id \
                            WHERE h.hashtag_name = ANY($1)) \
             {order} LIMIT $2 OFFSET $3"
        );
        let rows = sqlx::query(&sql)
            .bind(&names)
            .bind(page.size as i64)
            .bind(page.offset() as i64)
            .fetch_all(&self.pool)
            .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(DISTINCT ah.article_id) FROM article_hashtag ah \
             JOIN hashtag h ON h.id = ah.hashtag_id \
             WHERE h.hashtag_name = ANY($1)",
        )
        .bind(&names)
        .fetch_one(&self.pool)
        .await?;

        let items = rows.iter().map(summary_from_row).collect();
        Ok(Page::new(items, &page, total as u64))
    }

    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<Article>> {
        let row = sqlx::query(
            "SELECT id, user_id, title, content, created_at, created_by, modified_at, modified_by \
             FROM article WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| Article {
            id: row.get("id"),
            user_id: row.get("user_id"),
            title: row.get("title"),
            content: row.get("content"),
            created_at: row.get("created_at"),
            created_by: row.get("created_by"),
            modified_at: row.get("modified_at"),
            modified_by: row.get("modified_by"),
        }))
    }

    async fn find_detail(&self, id: i64) -> anyhow::Result<Option<ArticleDetail>> {
        let row = sqlx::query(
            "SELECT a.id, a.title, a.content, a.user_id, u.nickname, u.email, a.created_at, \
                    COALESCE((SELECT array_agg(h.hashtag_name ORDER BY h.hashtag_name) \
                              FROM article_hashtag ah \
                              JOIN hashtag h ON h.id = ah.hashtag_id \
                              WHERE ah.article_id = a.id), '{}') AS hashtags \
             FROM article a \
             JOIN user_account u ON u.user_id = a.user_id \
             WHERE a.id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| ArticleDetail {
            id: row.get("id"),
            title: row.get("title"),
            content: row.get("content"),
            user_id: row.get("user_id"),
            nickname: row.get("nickname"),
            email: row.get("email"),
            hashtags: row.get("hashtags"),
            created_at: row.get("created_at"),
        }))
    }

    async fn create(&self, article: NewArticle, stamp: AuditStamp) -> anyhow::Result<Article> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO article (user_id, title, content, created_at, created_by, modified_at, modified_by) \
             VALUES ($1, $2, $3, $4, $5, $4, $5) RETURNING id",
        )
        .bind(&article.user_id)
        .bind(&article.title)
        .bind(&article.content)
        .bind(stamp.at)
        .bind(&stamp.by)
        .fetch_one(&self.pool)
        .await?;

        Ok(Article {
            id,
            user_id: article.user_id,
            title: article.title,
            content: article.content,
            created_at: stamp.at,
            created_by: stamp.by.clone(),
            modified_at: stamp.at,
            modified_by: stamp.by,
        })
    }

    /// Content update and link replacement commit together; a failure
    /// anywhere leaves the previous row and links untouched.
    async fn update_with_hashtags(
        &self,
        id: i64,
        title: Option<String>,
        content: Option<String>,
        hashtag_ids: Vec<i64>,
        stamp: AuditStamp,
    ) -> anyhow::Result<Vec<i64>> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "UPDATE article \
             SET title = COALESCE($2, title), \
                 content = COALESCE($3, content), \
                 modified_at = $4, modified_by = $5 \
             WHERE id = $1",
        )
        .bind(id)
        .bind(title)
        .bind(content)
        .bind(stamp.at)
        .bind(&stamp.by)
        .execute(&mut *tx)
        .await?;

        let detached: Vec<i64> = sqlx::query_scalar(
            "DELETE FROM article_hashtag WHERE article_id = $1 RETURNING hashtag_id",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        for hashtag_id in hashtag_ids {
            sqlx::query(
                "INSERT INTO article_hashtag (article_id, hashtag_id) \
                 VALUES ($1, $2) ON CONFLICT DO NOTHING",
            )
            .bind(id)
            .bind(hashtag_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(detached)
    }

    /// Explicit two-step delete in one transaction: dependent comments,
    /// then the hashtag links, then the article row. The database schema
    /// has no cascades.
    async fn delete_with_comments(
        &self,
        id: i64,
        user_id: String,
    ) -> anyhow::Result<Option<Vec<i64>>> {
        let mut tx = self.pool.begin().await?;

        let owner: Option<String> =
            sqlx::query_scalar("SELECT user_id FROM article WHERE id = $1")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        match owner {
            Some(owner) if owner == user_id => {}
            _ => return Ok(None), // dropping tx rolls back
        }

        let detached: Vec<i64> =
            sqlx::query_scalar("SELECT hashtag_id FROM article_hashtag WHERE article_id = $1")
                .bind(id)
                .fetch_all(&mut *tx)
                .await?;

        sqlx::query("DELETE FROM article_comment WHERE article_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM article_hashtag WHERE article_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM article WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(detached))
    }

    async fn link_hashtags(&self, article_id: i64, hashtag_ids: Vec<i64>) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;
        for hashtag_id in hashtag_ids {
            sqlx::query(
                "INSERT INTO article_hashtag (article_id, hashtag_id) \
                 VALUES ($1, $2) ON CONFLICT DO NOTHING",
            )
            .bind(article_id)
            .bind(hashtag_id)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn count(&self) -> anyhow::Result<u64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM article")
            .fetch_one(&self.pool)
            .await?;
        Ok(total as u64)
    }
}
