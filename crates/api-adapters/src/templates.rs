//! Askama page models. Handlers flatten the domain types into plain display
//! rows here so the templates stay free of logic.

use askama::Template;
use chrono::{DateTime, Utc};
use domains::{ArticleDetail, ArticleSummary, SearchType};
use services::CommentNode;

fn display_date(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}

fn joined_hashtags(names: &[String]) -> String {
    names
        .iter()
        .map(|n| format!("#{n}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// One line of the article list table.
pub struct ArticleRow {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub hashtags: String,
    pub created_at: String,
}

impl ArticleRow {
    pub fn from_summary(summary: &ArticleSummary) -> Self {
        Self {
            id: summary.id,
            title: summary.title.clone(),
            author: summary.display_name().to_owned(),
            hashtags: joined_hashtags(&summary.hashtags),
            created_at: display_date(&summary.created_at),
        }
    }
}

/// One comment of the detail page, flattened out of the reply tree with its
/// nesting depth preserved.
pub struct CommentLine {
    pub id: i64,
    pub depth: usize,
    pub author: String,
    pub content: String,
    pub created_at: String,
    pub can_delete: bool,
}

/// Depth-first flattening that keeps the tree order the assembly produced.
pub fn flatten_comments(nodes: &[CommentNode], viewer: Option<&str>) -> Vec<CommentLine> {
    fn walk(nodes: &[CommentNode], depth: usize, viewer: Option<&str>, out: &mut Vec<CommentLine>) {
        for node in nodes {
            out.push(CommentLine {
                id: node.comment.id,
                depth,
                author: node.comment.display_name().to_owned(),
                content: node.comment.content.clone(),
                created_at: display_date(&node.comment.created_at),
                can_delete: viewer == Some(node.comment.user_id.as_str()),
            });
            walk(&node.children, depth + 1, viewer, out);
        }
    }
    let mut out = Vec::new();
    walk(nodes, 0, viewer, &mut out);
    out
}

pub struct SearchOption {
    pub param: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

pub fn search_options(selected: Option<SearchType>) -> Vec<SearchOption> {
    SearchType::ALL
        .iter()
        .map(|ty| SearchOption {
            param: ty.as_param(),
            label: ty.label(),
            selected: selected == Some(*ty),
        })
        .collect()
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexPage {
    pub user: Option<String>,
    pub rows: Vec<ArticleRow>,
    pub page: usize,
    pub total_pages: usize,
    pub bar: Vec<usize>,
    pub search_options: Vec<SearchOption>,
    pub search_value: String,
    /// Query-string tail carried through the pagination links.
    pub page_link_suffix: String,
    pub total_count: u64,
}

pub struct ArticleView {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author: String,
    pub email: String,
    pub hashtags: String,
    pub created_at: String,
}

impl ArticleView {
    pub fn from_detail(detail: &ArticleDetail) -> Self {
        Self {
            id: detail.id,
            title: detail.title.clone(),
            content: detail.content.clone(),
            author: detail.display_name().to_owned(),
            email: detail.email.clone().unwrap_or_default(),
            hashtags: joined_hashtags(&detail.hashtags),
            created_at: display_date(&detail.created_at),
        }
    }
}

#[derive(Template)]
#[template(path = "detail.html")]
pub struct DetailPage {
    pub user: Option<String>,
    pub article: ArticleView,
    pub is_owner: bool,
    pub comments: Vec<CommentLine>,
}

#[derive(Template)]
#[template(path = "search_hashtag.html")]
pub struct SearchHashtagPage {
    pub user: Option<String>,
    pub rows: Vec<ArticleRow>,
    pub page: usize,
    pub total_pages: usize,
    pub bar: Vec<usize>,
    pub hashtags: Vec<String>,
    pub current: String,
    pub page_link_suffix: String,
}

#[derive(Template)]
#[template(path = "form.html")]
pub struct FormPage {
    pub user: Option<String>,
    pub heading: &'static str,
    pub action: String,
    pub title_value: String,
    pub content_value: String,
    /// Set when editing; enables the delete button.
    pub article_id: Option<i64>,
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginPage {
    pub user: Option<String>,
    pub error: bool,
}
