//! Comment service: persistence orchestration plus the tree assembly that
//! turns the flat `article_comment` rows into nested reply threads.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use domains::{
    ArticleComment, ArticleStore, AuditStamp, BoardError, CommentRecord, CommentStore, NewComment,
    Principal, Result,
};

/// One comment with its recursively nested replies. Derived per request
/// from the flat rows; never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct CommentNode {
    #[serde(flatten)]
    pub comment: CommentRecord,
    pub children: Vec<CommentNode>,
}

impl CommentNode {
    /// Total number of comments in this subtree, the node included.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(CommentNode::subtree_len).sum::<usize>()
    }
}

/// Rebuilds the reply tree from flat records of one article.
///
/// Top-level nodes come out ordered by creation time descending (ties by
/// id ascending); every child collection is ordered by creation time
/// ascending (ties by id ascending). The two orderings are independent
/// and must not be conflated.
///
/// A record whose parent id does not resolve within the set is a
/// data-integrity violation: it is skipped with a warning rather than
/// attached anywhere.
pub fn assemble_tree(records: Vec<CommentRecord>) -> Vec<CommentNode> {
    let known: std::collections::HashSet<i64> = records.iter().map(|r| r.id).collect();

    let mut roots: Vec<CommentRecord> = Vec::new();
    let mut by_parent: HashMap<i64, Vec<CommentRecord>> = HashMap::new();
    for record in records {
        match record.parent_comment_id {
            None => roots.push(record),
            Some(parent_id) if known.contains(&parent_id) => {
                by_parent.entry(parent_id).or_default().push(record)
            }
            Some(parent_id) => {
                tracing::warn!(
                    comment_id = record.id,
                    parent_id,
                    "skipping comment with unresolvable parent"
                );
            }
        }
    }

    roots.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
    roots
        .into_iter()
        .map(|root| attach_children(root, &mut by_parent))
        .collect()
}

fn attach_children(
    record: CommentRecord,
    by_parent: &mut HashMap<i64, Vec<CommentRecord>>,
) -> CommentNode {
    let mut children = by_parent.remove(&record.id).unwrap_or_default();
    children.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
    CommentNode {
        comment: record,
        children: children
            .into_iter()
            .map(|child| attach_children(child, by_parent))
            .collect(),
    }
}

pub const MAX_COMMENT_LENGTH: usize = 500;

#[derive(Clone)]
pub struct CommentService {
    comments: Arc<dyn CommentStore>,
    articles: Arc<dyn ArticleStore>,
}

impl CommentService {
    pub fn new(comments: Arc<dyn CommentStore>, articles: Arc<dyn ArticleStore>) -> Self {
        Self { comments, articles }
    }

    /// The comments of one article in storage order, without the tree shape.
    pub async fn comment_records(&self, article_id: i64) -> Result<Vec<CommentRecord>> {
        self.comments
            .find_by_article(article_id)
            .await
            .map_err(BoardError::Storage)
    }

    /// The assembled reply tree for one article.
    pub async fn comments_for_article(&self, article_id: i64) -> Result<Vec<CommentNode>> {
        Ok(assemble_tree(self.comment_records(article_id).await?))
    }

    /// Single-comment lookup for the read-only JSON surface.
    pub async fn get_comment(&self, comment_id: i64) -> Result<ArticleComment> {
        self.comments
            .find_by_id(comment_id)
            .await
            .map_err(BoardError::Storage)?
            .ok_or_else(|| BoardError::NotFound("ArticleComment", comment_id.to_string()))
    }

    /// Creates a comment (or a reply when `parent_comment_id` is set) for
    /// the authenticated principal. A missing article or parent is logged
    /// and dropped; a parent from a different article is rejected.
    pub async fn save_comment(
        &self,
        principal: &Principal,
        article_id: i64,
        parent_comment_id: Option<i64>,
        content: &str,
    ) -> Result<()> {
        let content = content.trim();
        if content.is_empty() {
            return Err(BoardError::Validation("comment body must not be blank".into()));
        }
        if content.chars().count() > MAX_COMMENT_LENGTH {
            return Err(BoardError::Validation(format!(
                "comment body exceeds {MAX_COMMENT_LENGTH} characters"
            )));
        }

        let article = self
            .articles
            .find_by_id(article_id)
            .await
            .map_err(BoardError::Storage)?;
        if article.is_none() {
            tracing::warn!(article_id, "dropping comment for a missing article");
            return Ok(());
        }

        if let Some(parent_id) = parent_comment_id {
            match self
                .comments
                .find_by_id(parent_id)
                .await
                .map_err(BoardError::Storage)?
            {
                None => {
                    tracing::warn!(parent_id, "dropping reply to a missing parent comment");
                    return Ok(());
                }
                Some(parent) if parent.article_id != article_id => {
                    return Err(BoardError::Validation(
                        "parent comment belongs to a different article".into(),
                    ));
                }
                Some(_) => {}
            }
        }

        let stamp = AuditStamp::now(&principal.user_id);
        self.comments
            .create(
                NewComment {
                    article_id,
                    user_id: principal.user_id.clone(),
                    parent_comment_id,
                    content: content.to_owned(),
                },
                stamp,
            )
            .await
            .map_err(BoardError::Storage)?;
        Ok(())
    }

    /// Deletes a comment owned by the principal together with its whole
    /// reply subtree. Deleting a comment that is already gone (or owned
    /// by someone else) is a silent no-op.
    pub async fn delete_comment(&self, comment_id: i64, principal: &Principal) -> Result<()> {
        let removed = self
            .comments
            .delete_tree(comment_id, principal.user_id.clone())
            .await
            .map_err(BoardError::Storage)?;
        if removed == 0 {
            tracing::warn!(comment_id, user_id = %principal.user_id, "comment delete matched no rows");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use domains::{MockArticleStore, MockCommentStore};

    fn record(id: i64, parent: Option<i64>, minute: u32) -> CommentRecord {
        CommentRecord {
            id,
            article_id: 1,
            user_id: "uno".into(),
            nickname: None,
            email: None,
            parent_comment_id: parent,
            content: format!("comment {id}"),
            created_at: Utc.with_ymd_and_hms(2024, 6, 1, 12, minute, 0).unwrap(),
        }
    }

    #[test]
    fn empty_input_yields_empty_tree() {
        assert!(assemble_tree(vec![]).is_empty());
    }

    #[test]
    fn deep_reply_chain_preserves_linkage_at_every_depth() {
        // One top-level comment and a chain of 7 nested replies.
        let mut records = vec![record(1, None, 0)];
        for i in 2..=8 {
            records.push(record(i, Some(i - 1), i as u32));
        }

        let tree = assemble_tree(records);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].subtree_len(), 8);

        let mut node = &tree[0];
        for expected_id in 1..=8i64 {
            assert_eq!(node.comment.id, expected_id);
            if expected_id < 8 {
                assert_eq!(node.children.len(), 1);
                node = &node.children[0];
            } else {
                assert!(node.children.is_empty());
            }
        }
    }

    #[test]
    fn top_level_and_child_orderings_are_independent() {
        // 3 top-level threads, 8 comments total, mixed timestamps.
        let records = vec![
            record(1, None, 10),
            record(2, None, 30),
            record(3, None, 20),
            record(4, Some(1), 45),
            record(5, Some(1), 40),
            record(6, Some(2), 50),
            record(7, Some(2), 50), // same minute as 6: tie broken by id
            record(8, Some(3), 35),
        ];

        let tree = assemble_tree(records);
        // Top level: creation time descending.
        let top_ids: Vec<i64> = tree.iter().map(|n| n.comment.id).collect();
        assert_eq!(top_ids, vec![2, 3, 1]);

        // Children: creation time ascending, ties by id ascending.
        let thread2: Vec<i64> = tree[0].children.iter().map(|n| n.comment.id).collect();
        assert_eq!(thread2, vec![6, 7]);
        let thread3: Vec<i64> = tree[1].children.iter().map(|n| n.comment.id).collect();
        assert_eq!(thread3, vec![8]);
        let thread1: Vec<i64> = tree[2].children.iter().map(|n| n.comment.id).collect();
        assert_eq!(thread1, vec![5, 4]);
    }

    #[test]
    fn same_timestamp_top_level_ties_break_by_id_ascending() {
        let records = vec![record(9, None, 5), record(3, None, 5), record(7, None, 5)];
        let tree = assemble_tree(records);
        let ids: Vec<i64> = tree.iter().map(|n| n.comment.id).collect();
        assert_eq!(ids, vec![3, 7, 9]);
    }

    #[test]
    fn unresolvable_parent_is_skipped_not_attached() {
        let records = vec![record(1, None, 0), record(2, Some(99), 1)];
        let tree = assemble_tree(records);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].subtree_len(), 1);
    }

    fn principal() -> Principal {
        Principal { user_id: "uno".into(), nickname: None, email: None }
    }

    fn article(id: i64) -> domains::Article {
        let now = Utc::now();
        domains::Article {
            id,
            user_id: "uno".into(),
            title: "t".into(),
            content: "c".into(),
            created_at: now,
            created_by: "uno".into(),
            modified_at: now,
            modified_by: "uno".into(),
        }
    }

    fn stored_comment(id: i64, article_id: i64) -> domains::ArticleComment {
        let now = Utc::now();
        domains::ArticleComment {
            id,
            article_id,
            user_id: "uno".into(),
            parent_comment_id: None,
            content: "c".into(),
            created_at: now,
            created_by: "uno".into(),
            modified_at: now,
            modified_by: "uno".into(),
        }
    }

    #[tokio::test]
    async fn save_comment_for_missing_article_is_a_noop() {
        let comments = MockCommentStore::new(); // create() would panic if called
        let mut articles = MockArticleStore::new();
        articles.expect_find_by_id().returning(|_| Ok(None));

        let service = CommentService::new(Arc::new(comments), Arc::new(articles));
        service
            .save_comment(&principal(), 42, None, "hello")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn reply_to_parent_from_another_article_is_rejected() {
        let mut comments = MockCommentStore::new();
        comments
            .expect_find_by_id()
            .returning(|id| Ok(Some(stored_comment(id, 7))));
        let mut articles = MockArticleStore::new();
        articles.expect_find_by_id().returning(|id| Ok(Some(article(id))));

        let service = CommentService::new(Arc::new(comments), Arc::new(articles));
        let err = service
            .save_comment(&principal(), 1, Some(10), "hello")
            .await
            .unwrap_err();
        assert!(matches!(err, BoardError::Validation(_)));
    }

    #[tokio::test]
    async fn save_comment_persists_the_trimmed_body() {
        let mut comments = MockCommentStore::new();
        comments
            .expect_create()
            .withf(|new, stamp| {
                new.content == "hello" && new.parent_comment_id.is_none() && stamp.by == "uno"
            })
            .times(1)
            .returning(|new, stamp| {
                Ok(domains::ArticleComment {
                    id: 1,
                    article_id: new.article_id,
                    user_id: new.user_id,
                    parent_comment_id: new.parent_comment_id,
                    content: new.content,
                    created_at: stamp.at,
                    created_by: stamp.by.clone(),
                    modified_at: stamp.at,
                    modified_by: stamp.by,
                })
            });
        let mut articles = MockArticleStore::new();
        articles.expect_find_by_id().returning(|id| Ok(Some(article(id))));

        let service = CommentService::new(Arc::new(comments), Arc::new(articles));
        service
            .save_comment(&principal(), 1, None, "  hello  ")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn overlong_comment_is_rejected() {
        let service = CommentService::new(
            Arc::new(MockCommentStore::new()),
            Arc::new(MockArticleStore::new()),
        );
        let body = "a".repeat(MAX_COMMENT_LENGTH + 1);
        let err = service
            .save_comment(&principal(), 1, None, &body)
            .await
            .unwrap_err();
        assert!(matches!(err, BoardError::Validation(_)));
    }
}
