//! Article search and lifecycle, including the hashtag renewal that runs
//! on every save and update.

use std::sync::Arc;

use domains::{
    Article, ArticleDetail, ArticleStore, ArticleSummary, AuditStamp, BoardError, NewArticle,
    Page, PageRequest, Principal, Result, SearchFilter, SearchType, UserAccountStore,
};

use crate::hashtag::HashtagService;

pub const MAX_TITLE_LENGTH: usize = 255;
pub const MAX_CONTENT_LENGTH: usize = 10_000;

#[derive(Clone)]
pub struct ArticleService {
    articles: Arc<dyn ArticleStore>,
    users: Arc<dyn UserAccountStore>,
    hashtags: HashtagService,
}

impl ArticleService {
    pub fn new(
        articles: Arc<dyn ArticleStore>,
        users: Arc<dyn UserAccountStore>,
        hashtags: HashtagService,
    ) -> Self {
        Self { articles, users, hashtags }
    }

    /// Keyword search over one dimension. A blank or absent keyword
    /// returns the unfiltered page regardless of the selected dimension;
    /// a keyword without a dimension searches titles.
    pub async fn search_articles(
        &self,
        search_type: Option<SearchType>,
        keyword: Option<&str>,
        page: PageRequest,
    ) -> Result<Page<ArticleSummary>> {
        let keyword = keyword.map(str::trim).filter(|k| !k.is_empty());
        let Some(keyword) = keyword else {
            return self
                .articles
                .find_page(None, page)
                .await
                .map_err(BoardError::Storage);
        };

        match search_type.unwrap_or(SearchType::Title) {
            SearchType::Title => {
                self.filtered(SearchFilter::TitleContains(keyword.into()), page).await
            }
            SearchType::Content => {
                self.filtered(SearchFilter::ContentContains(keyword.into()), page).await
            }
            SearchType::Id => {
                self.filtered(SearchFilter::UserIdContains(keyword.into()), page).await
            }
            SearchType::Nickname => {
                self.filtered(SearchFilter::NicknameContains(keyword.into()), page).await
            }
            SearchType::Hashtag => {
                let names: Vec<String> =
                    keyword.split_whitespace().map(str::to_owned).collect();
                self.articles
                    .find_by_hashtag_names(names, page)
                    .await
                    .map_err(BoardError::Storage)
            }
        }
    }

    async fn filtered(
        &self,
        filter: SearchFilter,
        page: PageRequest,
    ) -> Result<Page<ArticleSummary>> {
        self.articles
            .find_page(Some(filter), page)
            .await
            .map_err(BoardError::Storage)
    }

    /// Hashtag-scoped listing for the dedicated search page. A blank name
    /// short-circuits to an empty page.
    pub async fn search_articles_via_hashtag(
        &self,
        hashtag_name: Option<&str>,
        page: PageRequest,
    ) -> Result<Page<ArticleSummary>> {
        let name = hashtag_name.map(str::trim).filter(|n| !n.is_empty());
        let Some(name) = name else {
            return Ok(Page::empty(&page));
        };
        self.articles
            .find_by_hashtag_names(vec![name.to_owned()], page)
            .await
            .map_err(BoardError::Storage)
    }

    /// Single-article detail; a missing id propagates as `NotFound`.
    pub async fn get_article(&self, article_id: i64) -> Result<ArticleDetail> {
        self.articles
            .find_detail(article_id)
            .await
            .map_err(BoardError::Storage)?
            .ok_or_else(|| BoardError::NotFound("Article", article_id.to_string()))
    }

    /// Creates an article for the principal and associates the hashtags
    /// parsed from its body.
    pub async fn save_article(
        &self,
        principal: &Principal,
        title: &str,
        content: &str,
    ) -> Result<Article> {
        let title = title.trim();
        let content = content.trim();
        validate_fields(title, content)?;

        let author = self
            .users
            .find_by_id(principal.user_id.clone())
            .await
            .map_err(BoardError::Storage)?
            .ok_or_else(|| {
                BoardError::NotFound("UserAccount", principal.user_id.clone())
            })?;

        let stamp = AuditStamp::now(&author.user_id);
        let article = self
            .articles
            .create(
                NewArticle {
                    user_id: author.user_id,
                    title: title.to_owned(),
                    content: content.to_owned(),
                },
                stamp.clone(),
            )
            .await
            .map_err(BoardError::Storage)?;

        self.renew_hashtags(article.id, content, &stamp).await?;
        Ok(article)
    }

    /// Updates title and/or body. A missing article is logged at warn and
    /// dropped; so is an update attempted by someone other than the
    /// owner. The hashtag set is recomputed from the effective body and
    /// swapped in atomically with the content; tags the swap detached are
    /// swept eagerly afterwards (the sweep is conditional, so tags still
    /// linked anywhere survive it).
    pub async fn update_article(
        &self,
        article_id: i64,
        principal: &Principal,
        title: Option<&str>,
        content: Option<&str>,
    ) -> Result<()> {
        let Some(article) = self
            .articles
            .find_by_id(article_id)
            .await
            .map_err(BoardError::Storage)?
        else {
            tracing::warn!(article_id, "article update failed: article not found");
            return Ok(());
        };

        if article.user_id != principal.user_id {
            tracing::warn!(
                article_id,
                owner = %article.user_id,
                actor = %principal.user_id,
                "article update failed: not the owner"
            );
            return Ok(());
        }

        let title = title.map(str::trim).filter(|t| !t.is_empty());
        let content = content.map(str::trim).filter(|c| !c.is_empty());
        let effective_content = content.unwrap_or(article.content.as_str()).to_owned();
        validate_fields(title.unwrap_or(&article.title), &effective_content)?;

        let stamp = AuditStamp::now(&principal.user_id);
        let names = HashtagService::parse_hashtag_names(&effective_content);
        let hashtags = self.hashtags.resolve_names(names, &stamp).await?;
        let ids: Vec<i64> = hashtags.iter().map(|h| h.id).collect();

        let detached = self
            .articles
            .update_with_hashtags(
                article_id,
                title.map(str::to_owned),
                content.map(str::to_owned),
                ids,
                stamp,
            )
            .await
            .map_err(BoardError::Storage)?;

        for hashtag_id in detached {
            self.hashtags.delete_hashtag_without_articles(hashtag_id).await?;
        }
        Ok(())
    }

    /// Deletes an article together with its comments in one transaction,
    /// then sweeps the hashtags the deletion detached.
    pub async fn delete_article(&self, article_id: i64, principal: &Principal) -> Result<()> {
        let detached = self
            .articles
            .delete_with_comments(article_id, principal.user_id.clone())
            .await
            .map_err(BoardError::Storage)?
            .ok_or_else(|| BoardError::NotFound("Article", article_id.to_string()))?;

        for hashtag_id in detached {
            self.hashtags.delete_hashtag_without_articles(hashtag_id).await?;
        }
        Ok(())
    }

    pub async fn article_count(&self) -> Result<u64> {
        self.articles.count().await.map_err(BoardError::Storage)
    }

    /// Distinct hashtag catalog for the hashtag search view.
    pub async fn hashtag_names(&self) -> Result<Vec<String>> {
        self.hashtags.hashtag_names().await
    }

    async fn renew_hashtags(
        &self,
        article_id: i64,
        content: &str,
        stamp: &AuditStamp,
    ) -> Result<()> {
        let names = HashtagService::parse_hashtag_names(content);
        let hashtags = self.hashtags.resolve_names(names, stamp).await?;
        if hashtags.is_empty() {
            return Ok(());
        }
        let ids: Vec<i64> = hashtags.iter().map(|h| h.id).collect();
        self.articles
            .link_hashtags(article_id, ids)
            .await
            .map_err(BoardError::Storage)
    }
}

fn validate_fields(title: &str, content: &str) -> Result<()> {
    if title.is_empty() {
        return Err(BoardError::Validation("title must not be blank".into()));
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(BoardError::Validation(format!(
            "title exceeds {MAX_TITLE_LENGTH} characters"
        )));
    }
    if content.is_empty() {
        return Err(BoardError::Validation("content must not be blank".into()));
    }
    if content.chars().count() > MAX_CONTENT_LENGTH {
        return Err(BoardError::Validation(format!(
            "content exceeds {MAX_CONTENT_LENGTH} characters"
        )));
    }
    Ok(())
}
