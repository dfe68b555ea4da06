//! Shared fixtures for the HTTP-level tests: mock-backed application state
//! and a deterministic session manager for forging login cookies.

use std::sync::Arc;

use secrecy::SecretString;

use api_adapters::AppState;
use auth_adapters::SessionManager;
use domains::{
    MockArticleStore, MockCommentStore, MockCredentialPort, MockHashtagStore, MockUserAccountStore,
};
use services::{ArticleService, CommentService, HashtagService, UserAccountService};

const TEST_SECRET: &str = "integration-test-secret";

/// Session manager sharing the secret baked into [`TestBoard::into_state`],
/// so tests can mint valid cookies.
pub fn test_sessions() -> SessionManager {
    SessionManager::new(SecretString::from(TEST_SECRET.to_owned()), 3600)
}

/// Mock-backed board. Set expectations on the stores, then turn the whole
/// thing into router state.
#[derive(Default)]
pub struct TestBoard {
    pub articles: MockArticleStore,
    pub comments: MockCommentStore,
    pub hashtags: MockHashtagStore,
    pub users: MockUserAccountStore,
    pub credentials: MockCredentialPort,
}

impl TestBoard {
    pub fn into_state(self) -> AppState {
        let articles = Arc::new(self.articles);
        let users = Arc::new(self.users);
        AppState {
            articles: Arc::new(ArticleService::new(
                articles.clone(),
                users.clone(),
                HashtagService::new(Arc::new(self.hashtags)),
            )),
            comments: Arc::new(CommentService::new(Arc::new(self.comments), articles)),
            users: Arc::new(UserAccountService::new(users)),
            credentials: Arc::new(self.credentials),
            identities: None,
            sessions: Arc::new(test_sessions()),
        }
    }
}
