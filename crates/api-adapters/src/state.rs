//! Shared handler state. Everything is behind an `Arc` so the router can be
//! cloned per connection for free.

use std::sync::Arc;

use auth_adapters::{SessionManager, SocialIdentity};
use domains::CredentialPort;
use services::{ArticleService, CommentService, UserAccountService};

#[derive(Clone)]
pub struct AppState {
    pub articles: Arc<ArticleService>,
    pub comments: Arc<CommentService>,
    pub users: Arc<UserAccountService>,
    pub credentials: Arc<dyn CredentialPort>,
    /// Present only when an OAuth client is configured.
    pub identities: Option<Arc<SocialIdentity>>,
    pub sessions: Arc<SessionManager>,
}
