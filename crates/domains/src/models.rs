//! # Domain Models
//!
//! These structs represent the core entities of the board plus the flat
//! projections the read paths work with. Identifiers are `i64` database
//! sequences; user accounts are keyed by their natural username.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Creation/modification audit columns carried by every entity.
///
/// Stamped explicitly by the write path from the authenticated principal.
/// There is no ambient auditing context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditStamp {
    pub at: DateTime<Utc>,
    pub by: String,
}

impl AuditStamp {
    pub fn now(by: impl Into<String>) -> Self {
        Self { at: Utc::now(), by: by.into() }
    }
}

/// A registered account. `user_id` is the natural key; the password is an
/// argon2 PHC string, never plaintext.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    pub user_id: String,
    pub user_password: String,
    pub email: Option<String>,
    pub nickname: Option<String>,
    pub memo: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub modified_at: DateTime<Utc>,
    pub modified_by: String,
}

impl UserAccount {
    /// Display name with the username as fallback for a blank nickname.
    pub fn display_name(&self) -> &str {
        match self.nickname.as_deref() {
            Some(n) if !n.trim().is_empty() => n,
            _ => &self.user_id,
        }
    }
}

/// A board posting. Hashtags are a many-to-many association kept in the
/// `article_hashtag` link table, not a field on the row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    pub user_id: String,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub modified_at: DateTime<Utc>,
    pub modified_by: String,
}

/// Fields needed to insert an article; id and audit columns are assigned
/// by the store.
#[derive(Debug, Clone)]
pub struct NewArticle {
    pub user_id: String,
    pub title: String,
    pub content: String,
}

/// A comment row. `parent_comment_id` is a plain self-referential foreign
/// key; the nested reply tree is derived per request, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleComment {
    pub id: i64,
    pub article_id: i64,
    pub user_id: String,
    pub parent_comment_id: Option<i64>,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub modified_at: DateTime<Utc>,
    pub modified_by: String,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub article_id: i64,
    pub user_id: String,
    pub parent_comment_id: Option<i64>,
    pub content: String,
}

/// A tag extracted from article bodies. A hashtag referenced by zero
/// articles is orphaned and eligible for deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hashtag {
    pub id: i64,
    pub hashtag_name: String,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub modified_at: DateTime<Utc>,
    pub modified_by: String,
}

/// List-page projection: one article row joined with its author and the
/// names of its hashtags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleSummary {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub user_id: String,
    pub nickname: Option<String>,
    pub hashtags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl ArticleSummary {
    pub fn display_name(&self) -> &str {
        match self.nickname.as_deref() {
            Some(n) if !n.trim().is_empty() => n,
            _ => &self.user_id,
        }
    }
}

/// Detail-page projection: the article with author profile fields and
/// hashtag names resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleDetail {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub user_id: String,
    pub nickname: Option<String>,
    pub email: Option<String>,
    pub hashtags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl ArticleDetail {
    pub fn display_name(&self) -> &str {
        match self.nickname.as_deref() {
            Some(n) if !n.trim().is_empty() => n,
            _ => &self.user_id,
        }
    }
}

/// Flat comment projection with author fields, the input to the comment
/// tree assembly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentRecord {
    pub id: i64,
    pub article_id: i64,
    pub user_id: String,
    pub nickname: Option<String>,
    pub email: Option<String>,
    pub parent_comment_id: Option<i64>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl CommentRecord {
    pub fn display_name(&self) -> &str {
        match self.nickname.as_deref() {
            Some(n) if !n.trim().is_empty() => n,
            _ => &self.user_id,
        }
    }
}

/// Which article dimension a keyword search runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchType {
    Title,
    Content,
    /// Author username
    Id,
    /// Author nickname
    Nickname,
    Hashtag,
}

impl SearchType {
    pub const ALL: [SearchType; 5] = [
        SearchType::Title,
        SearchType::Content,
        SearchType::Id,
        SearchType::Nickname,
        SearchType::Hashtag,
    ];

    pub fn as_param(&self) -> &'static str {
        match self {
            SearchType::Title => "title",
            SearchType::Content => "content",
            SearchType::Id => "id",
            SearchType::Nickname => "nickname",
            SearchType::Hashtag => "hashtag",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SearchType::Title => "Title",
            SearchType::Content => "Body",
            SearchType::Id => "Author ID",
            SearchType::Nickname => "Nickname",
            SearchType::Hashtag => "Hashtag",
        }
    }
}

/// Substring filter for the text search dimensions. Hashtag search goes
/// through its own exact-name path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchFilter {
    TitleContains(String),
    ContentContains(String),
    UserIdContains(String),
    NicknameContains(String),
}

/// The authenticated identity attached to a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: String,
    pub nickname: Option<String>,
    pub email: Option<String>,
}

impl Principal {
    pub fn display_name(&self) -> &str {
        match self.nickname.as_deref() {
            Some(n) if !n.trim().is_empty() => n,
            _ => &self.user_id,
        }
    }
}

/// Identity claims obtained from an external (OAuth2) provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalClaims {
    pub provider: String,
    pub provider_user_id: String,
    pub email: Option<String>,
    pub nickname: Option<String>,
}

impl ExternalClaims {
    /// The locally synthesized username for this external identity.
    pub fn local_username(&self) -> String {
        format!("{}_{}", self.provider, self.provider_user_id)
    }
}
