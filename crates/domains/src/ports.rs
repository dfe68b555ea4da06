//! # Core Traits (Ports)
//!
//! Storage and authentication contracts the adapter crates implement.
//! Port methods return `anyhow::Result`; the service layer translates
//! failures into [`crate::BoardError`].

use async_trait::async_trait;

use crate::models::{
    Article, ArticleComment, ArticleDetail, ArticleSummary, AuditStamp, CommentRecord,
    ExternalClaims, Hashtag, NewArticle, NewComment, Principal, SearchFilter, UserAccount,
};
use crate::paging::{Page, PageRequest};

/// Persistence contract for articles and their hashtag links.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// One page of article summaries, optionally narrowed by a substring
    /// filter. `None` returns the unfiltered page.
    async fn find_page(
        &self,
        filter: Option<SearchFilter>,
        page: PageRequest,
    ) -> anyhow::Result<Page<ArticleSummary>>;

    /// Articles carrying any of the given hashtag names (exact match,
    /// OR-combined).
    async fn find_by_hashtag_names(
        &self,
        names: Vec<String>,
        page: PageRequest,
    ) -> anyhow::Result<Page<ArticleSummary>>;

    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<Article>>;

    /// Detail projection with author profile and hashtag names resolved.
    async fn find_detail(&self, id: i64) -> anyhow::Result<Option<ArticleDetail>>;

    async fn create(&self, article: NewArticle, stamp: AuditStamp) -> anyhow::Result<Article>;

    /// Updates title/content in place, re-stamps the modification
    /// columns, and replaces the article's hashtag links, all in one
    /// transaction. Returns the previously linked hashtag ids so the
    /// caller can sweep the ones that ended up orphaned. Missing rows are
    /// a silent zero-row update.
    async fn update_with_hashtags(
        &self,
        id: i64,
        title: Option<String>,
        content: Option<String>,
        hashtag_ids: Vec<i64>,
        stamp: AuditStamp,
    ) -> anyhow::Result<Vec<i64>>;

    /// Explicit two-step delete inside one transaction: comments first,
    /// hashtag links second, the article row last, scoped to the owning
    /// user. Returns the hashtag ids that were detached, or `None` when
    /// the article did not exist or was owned by someone else.
    async fn delete_with_comments(
        &self,
        id: i64,
        user_id: String,
    ) -> anyhow::Result<Option<Vec<i64>>>;

    /// Associates the given hashtags with the article (idempotent).
    async fn link_hashtags(&self, article_id: i64, hashtag_ids: Vec<i64>) -> anyhow::Result<()>;

    async fn count(&self) -> anyhow::Result<u64>;
}

/// Persistence contract for comments.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait CommentStore: Send + Sync {
    /// Every comment of one article, flat, joined with its author.
    async fn find_by_article(&self, article_id: i64) -> anyhow::Result<Vec<CommentRecord>>;

    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<ArticleComment>>;

    async fn create(&self, comment: NewComment, stamp: AuditStamp)
        -> anyhow::Result<ArticleComment>;

    /// Deletes the comment and its whole reply subtree. Only the root is
    /// owner-scoped; replies go with it regardless of author. Returns the
    /// number of rows removed.
    async fn delete_tree(&self, id: i64, user_id: String) -> anyhow::Result<u64>;
}

/// Persistence contract for hashtags.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait HashtagStore: Send + Sync {
    async fn find_by_names(&self, names: Vec<String>) -> anyhow::Result<Vec<Hashtag>>;

    async fn create(&self, name: String, stamp: AuditStamp) -> anyhow::Result<Hashtag>;

    /// Reference-counted cleanup: removes the hashtag only if no article
    /// references it any more. Returns whether a row was deleted.
    async fn delete_if_orphaned(&self, id: i64) -> anyhow::Result<bool>;

    /// Distinct catalog of every stored hashtag name.
    async fn list_names(&self) -> anyhow::Result<Vec<String>>;
}

/// Persistence contract for user accounts.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait UserAccountStore: Send + Sync {
    async fn find_by_id(&self, user_id: String) -> anyhow::Result<Option<UserAccount>>;

    async fn create(
        &self,
        user_id: String,
        password_hash: String,
        email: Option<String>,
        nickname: Option<String>,
        memo: Option<String>,
        stamp: AuditStamp,
    ) -> anyhow::Result<UserAccount>;
}

/// Credential-identity lookup: form login against locally stored
/// credentials.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait CredentialPort: Send + Sync {
    /// Verifies the password against the stored hash. An unknown username
    /// and a wrong password both come back as `Unauthorized`; the
    /// distinction stays inside the auth layer.
    async fn authenticate(&self, username: &str, password: &str) -> crate::Result<Principal>;
}

/// External-identity exchange: maps third-party claims onto a local
/// account, provisioning one on first sign-in.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ExternalIdentityPort: Send + Sync {
    async fn upsert_from_claims(&self, claims: &ExternalClaims) -> crate::Result<Principal>;
}
