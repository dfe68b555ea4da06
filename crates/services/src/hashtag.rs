//! Hashtag parsing and lifecycle.
//!
//! Article bodies embed inline markers (`#rust`, `#스프링`). On every save
//! the distinct marker names are parsed out, resolved against stored
//! hashtags and associated with the article; cleanup of orphaned hashtags
//! happens eagerly right after links are detached, scoped to exactly the
//! detached ids.

use std::collections::BTreeSet;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use domains::{AuditStamp, BoardError, Hashtag, HashtagStore, Result};

// `\w` is Unicode-aware in the regex crate, so non-ASCII alphabets
// (e.g. 한글) match without spelling the ranges out.
static HASHTAG_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"#\w+").unwrap());

#[derive(Clone)]
pub struct HashtagService {
    store: Arc<dyn HashtagStore>,
}

impl HashtagService {
    pub fn new(store: Arc<dyn HashtagStore>) -> Self {
        Self { store }
    }

    /// Extracts the distinct hashtag names from an article body. A bare
    /// `#` yields nothing; adjacent markers (`#java#spring`) each parse
    /// independently.
    pub fn parse_hashtag_names(content: &str) -> BTreeSet<String> {
        HASHTAG_MARKER
            .find_iter(content.trim())
            .map(|m| m.as_str().trim_start_matches('#').to_owned())
            .collect()
    }

    /// Resolves hashtag names against storage, creating records for names
    /// not seen before. Returns the full set, existing and fresh.
    pub async fn resolve_names(
        &self,
        names: BTreeSet<String>,
        stamp: &AuditStamp,
    ) -> Result<Vec<Hashtag>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let mut hashtags = self
            .store
            .find_by_names(names.iter().cloned().collect())
            .await
            .map_err(BoardError::Storage)?;

        let existing: BTreeSet<&str> =
            hashtags.iter().map(|h| h.hashtag_name.as_str()).collect();
        let missing: Vec<String> = names
            .iter()
            .filter(|n| !existing.contains(n.as_str()))
            .cloned()
            .collect();

        for name in missing {
            let created = self
                .store
                .create(name, stamp.clone())
                .await
                .map_err(BoardError::Storage)?;
            hashtags.push(created);
        }

        Ok(hashtags)
    }

    /// Reference-counted cleanup: deletes the hashtag only when no article
    /// references it any more.
    pub async fn delete_hashtag_without_articles(&self, hashtag_id: i64) -> Result<bool> {
        let deleted = self
            .store
            .delete_if_orphaned(hashtag_id)
            .await
            .map_err(BoardError::Storage)?;
        if deleted {
            tracing::debug!(hashtag_id, "removed orphaned hashtag");
        }
        Ok(deleted)
    }

    /// Distinct catalog of stored hashtag names for the search view.
    pub async fn hashtag_names(&self) -> Result<Vec<String>> {
        self.store.list_names().await.map_err(BoardError::Storage)
    }
}
