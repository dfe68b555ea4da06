//! Server-rendered board pages: the article list with its search bar and
//! pagination, the detail page with the reply tree, the hashtag browser,
//! and the write/edit/delete forms.

use askama::Template;
use axum::extract::{Path, Query, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;

use domains::{PageRequest, SearchType, SortDirection, SortKey};
use services::bar_numbers;

use crate::error::ApiError;
use crate::extract::{CurrentUser, MaybeUser};
use crate::state::AppState;
use crate::templates::{
    flatten_comments, search_options, ArticleRow, ArticleView, DetailPage, FormPage, IndexPage,
    SearchHashtagPage,
};

pub(crate) fn render_page<T: Template>(page: T) -> Result<Html<String>, ApiError> {
    page.render()
        .map(Html)
        .map_err(|err| ApiError(anyhow::Error::from(err).into()))
}

fn parse_search_type(raw: &str) -> Option<SearchType> {
    SearchType::ALL.into_iter().find(|ty| ty.as_param() == raw)
}

fn parse_sort(raw: &str) -> Option<SortKey> {
    match raw {
        "created_at" => Some(SortKey::CreatedAt),
        "title" => Some(SortKey::Title),
        _ => None,
    }
}

fn parse_direction(raw: &str) -> Option<SortDirection> {
    match raw {
        "asc" => Some(SortDirection::Asc),
        "desc" => Some(SortDirection::Desc),
        _ => None,
    }
}

/// Minimal percent-encoding for values echoed back into page links.
fn encode_query_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for b in value.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            b' ' => out.push_str("%20"),
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleListQuery {
    pub search_type: Option<String>,
    pub search_value: Option<String>,
    pub page: Option<usize>,
    pub size: Option<usize>,
    pub sort: Option<String>,
    pub direction: Option<String>,
}

impl ArticleListQuery {
    fn page_request(&self) -> PageRequest {
        let mut request = PageRequest::new(
            self.page.unwrap_or(0),
            self.size.unwrap_or(domains::paging::DEFAULT_PAGE_SIZE),
        );
        if let Some(sort) = self.sort.as_deref().and_then(parse_sort) {
            request.sort = sort;
        }
        if let Some(direction) = self.direction.as_deref().and_then(parse_direction) {
            request.direction = direction;
        }
        request
    }

    fn search_type(&self) -> Option<SearchType> {
        self.search_type.as_deref().and_then(parse_search_type)
    }
}

pub async fn root() -> Redirect {
    Redirect::to("/articles")
}

pub async fn articles(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Query(query): Query<ArticleListQuery>,
) -> Result<Html<String>, ApiError> {
    let request = query.page_request();
    let search_type = query.search_type();
    let keyword = query.search_value.as_deref();
    let page = state
        .articles
        .search_articles(search_type, keyword, request)
        .await?;
    let total_count = state.articles.article_count().await?;

    let mut suffix = String::new();
    if let Some(ty) = search_type {
        suffix.push_str(&format!("&searchType={}", ty.as_param()));
    }
    if let Some(value) = keyword.map(str::trim).filter(|v| !v.is_empty()) {
        suffix.push_str(&format!("&searchValue={}", encode_query_value(value)));
    }

    render_page(IndexPage {
        user: user.map(|p| p.display_name().to_owned()),
        rows: page.items.iter().map(ArticleRow::from_summary).collect(),
        page: page.page,
        total_pages: page.total_pages(),
        bar: bar_numbers(page.page, page.total_pages()),
        search_options: search_options(search_type),
        search_value: query.search_value.clone().unwrap_or_default(),
        page_link_suffix: suffix,
        total_count,
    })
}

pub async fn article_detail(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Path(article_id): Path<i64>,
) -> Result<Html<String>, ApiError> {
    let article = state.articles.get_article(article_id).await?;
    let tree = state.comments.comments_for_article(article_id).await?;
    let viewer = user.as_ref().map(|p| p.user_id.as_str());
    let is_owner = viewer == Some(article.user_id.as_str());

    render_page(DetailPage {
        comments: flatten_comments(&tree, viewer),
        user: user.map(|p| p.display_name().to_owned()),
        article: ArticleView::from_detail(&article),
        is_owner,
    })
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HashtagSearchQuery {
    pub search_value: Option<String>,
    pub page: Option<usize>,
    pub size: Option<usize>,
}

pub async fn search_hashtag(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Query(query): Query<HashtagSearchQuery>,
) -> Result<Html<String>, ApiError> {
    let request = PageRequest::new(
        query.page.unwrap_or(0),
        query.size.unwrap_or(domains::paging::DEFAULT_PAGE_SIZE),
    );
    let current = query
        .search_value
        .as_deref()
        .map(str::trim)
        .unwrap_or_default()
        .to_owned();
    let page = state
        .articles
        .search_articles_via_hashtag(Some(&current), request)
        .await?;
    let hashtags = state.articles.hashtag_names().await?;

    let suffix = if current.is_empty() {
        String::new()
    } else {
        format!("&searchValue={}", encode_query_value(&current))
    };

    render_page(SearchHashtagPage {
        user: user.map(|p| p.display_name().to_owned()),
        rows: page.items.iter().map(ArticleRow::from_summary).collect(),
        page: page.page,
        total_pages: page.total_pages(),
        bar: bar_numbers(page.page, page.total_pages()),
        hashtags,
        current,
        page_link_suffix: suffix,
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleForm {
    pub title: String,
    pub content: String,
}

pub async fn new_article_form(
    CurrentUser(principal): CurrentUser,
) -> Result<Html<String>, ApiError> {
    render_page(FormPage {
        user: Some(principal.display_name().to_owned()),
        heading: "New article",
        action: "/articles/form".to_owned(),
        title_value: String::new(),
        content_value: String::new(),
        article_id: None,
    })
}

pub async fn create_article(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Form(form): Form<ArticleForm>,
) -> Result<Redirect, ApiError> {
    let article = state
        .articles
        .save_article(&principal, &form.title, &form.content)
        .await?;
    Ok(Redirect::to(&format!("/articles/{}", article.id)))
}

pub async fn edit_article_form(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(article_id): Path<i64>,
) -> Result<Response, ApiError> {
    let article = state.articles.get_article(article_id).await?;
    if article.user_id != principal.user_id {
        return Ok(Redirect::to(&format!("/articles/{article_id}")).into_response());
    }
    render_page(FormPage {
        user: Some(principal.display_name().to_owned()),
        heading: "Edit article",
        action: format!("/articles/{article_id}/form"),
        title_value: article.title,
        content_value: article.content,
        article_id: Some(article_id),
    })
    .map(IntoResponse::into_response)
}

pub async fn update_article(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(article_id): Path<i64>,
    Form(form): Form<ArticleForm>,
) -> Result<Redirect, ApiError> {
    state
        .articles
        .update_article(
            article_id,
            &principal,
            Some(&form.title),
            Some(&form.content),
        )
        .await?;
    Ok(Redirect::to(&format!("/articles/{article_id}")))
}

pub async fn delete_article(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(article_id): Path<i64>,
) -> Result<Redirect, ApiError> {
    state.articles.delete_article(article_id, &principal).await?;
    Ok(Redirect::to("/articles"))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentForm {
    pub article_id: i64,
    pub parent_comment_id: Option<String>,
    pub content: String,
}

pub async fn create_comment(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Form(form): Form<CommentForm>,
) -> Result<Redirect, ApiError> {
    // Browsers submit the hidden field empty for top-level comments.
    let parent = form
        .parent_comment_id
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::parse::<i64>)
        .transpose()
        .map_err(|_| domains::BoardError::Validation("malformed parent comment id".into()))?;
    state
        .comments
        .save_comment(&principal, form.article_id, parent, &form.content)
        .await?;
    Ok(Redirect::to(&format!("/articles/{}", form.article_id)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentDeleteForm {
    pub article_id: i64,
}

pub async fn delete_comment(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(comment_id): Path<i64>,
    Form(form): Form<CommentDeleteForm>,
) -> Result<Redirect, ApiError> {
    state.comments.delete_comment(comment_id, &principal).await?;
    Ok(Redirect::to(&format!("/articles/{}", form.article_id)))
}
