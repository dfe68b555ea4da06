//! Read-only JSON surface under `/api`. Articles and comments only; user
//! accounts are deliberately not exposed here.

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use domains::{ArticleComment, ArticleDetail, ArticleSummary, CommentRecord, Page, PageRequest};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleResource {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub user_id: String,
    pub nickname: Option<String>,
    pub hashtags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<ArticleSummary> for ArticleResource {
    fn from(summary: ArticleSummary) -> Self {
        Self {
            id: summary.id,
            title: summary.title,
            content: summary.content,
            user_id: summary.user_id,
            nickname: summary.nickname,
            hashtags: summary.hashtags,
            created_at: summary.created_at,
        }
    }
}

impl From<ArticleDetail> for ArticleResource {
    fn from(detail: ArticleDetail) -> Self {
        Self {
            id: detail.id,
            title: detail.title,
            content: detail.content,
            user_id: detail.user_id,
            nickname: detail.nickname,
            hashtags: detail.hashtags,
            created_at: detail.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResource {
    pub id: i64,
    pub article_id: i64,
    pub user_id: String,
    pub parent_comment_id: Option<i64>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<CommentRecord> for CommentResource {
    fn from(record: CommentRecord) -> Self {
        Self {
            id: record.id,
            article_id: record.article_id,
            user_id: record.user_id,
            parent_comment_id: record.parent_comment_id,
            content: record.content,
            created_at: record.created_at,
        }
    }
}

impl From<ArticleComment> for CommentResource {
    fn from(comment: ArticleComment) -> Self {
        Self {
            id: comment.id,
            article_id: comment.article_id,
            user_id: comment.user_id,
            parent_comment_id: comment.parent_comment_id,
            content: comment.content,
            created_at: comment.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResource<T> {
    pub content: Vec<T>,
    pub page: usize,
    pub size: usize,
    pub total_elements: u64,
    pub total_pages: usize,
}

impl<T> PageResource<T> {
    fn from_page<S>(page: Page<S>) -> Self
    where
        T: From<S>,
    {
        let total_pages = page.total_pages();
        Self {
            content: page.items.into_iter().map(T::from).collect(),
            page: page.page,
            size: page.size,
            total_elements: page.total_elements,
            total_pages,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<usize>,
    pub size: Option<usize>,
}

async fn articles(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PageResource<ArticleResource>>, ApiError> {
    let request = PageRequest::new(
        query.page.unwrap_or(0),
        query.size.unwrap_or(domains::paging::DEFAULT_PAGE_SIZE),
    );
    let page = state.articles.search_articles(None, None, request).await?;
    Ok(Json(PageResource::from_page(page)))
}

async fn article(
    State(state): State<AppState>,
    Path(article_id): Path<i64>,
) -> Result<Json<ArticleResource>, ApiError> {
    let detail = state.articles.get_article(article_id).await?;
    Ok(Json(detail.into()))
}

async fn article_comments(
    State(state): State<AppState>,
    Path(article_id): Path<i64>,
) -> Result<Json<Vec<CommentResource>>, ApiError> {
    // 404 for a missing article rather than an empty list.
    state.articles.get_article(article_id).await?;
    let records = state.comments.comment_records(article_id).await?;
    Ok(Json(records.into_iter().map(Into::into).collect()))
}

async fn comment(
    State(state): State<AppState>,
    Path(comment_id): Path<i64>,
) -> Result<Json<CommentResource>, ApiError> {
    let comment = state.comments.get_comment(comment_id).await?;
    Ok(Json(comment.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/articles", get(articles))
        .route("/articles/{article_id}", get(article))
        .route("/articles/{article_id}/comments", get(article_comments))
        .route("/comments/{comment_id}", get(comment))
}
