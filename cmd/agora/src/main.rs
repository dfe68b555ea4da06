//! Agora server binary: loads configuration, runs migrations, wires the
//! adapters into the services, and serves the board.

use std::sync::Arc;

use secrecy::ExposeSecret;
use tracing_subscriber::EnvFilter;

use api_adapters::AppState;
use auth_adapters::{LocalCredentials, OAuthSettings, PasswordEncoder, SessionManager, SocialIdentity};
use configs::AppConfig;
use services::{ArticleService, CommentService, HashtagService, UserAccountService};
use storage_adapters::{PgArticleStore, PgCommentStore, PgHashtagStore, PgUserAccountStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::load()?;

    let pool = storage_adapters::init_pool(
        config.database.url.expose_secret(),
        config.database.max_connections,
    )
    .await?;
    storage_adapters::run_migrations(&pool).await?;

    let articles = Arc::new(PgArticleStore::new(pool.clone()));
    let comments = Arc::new(PgCommentStore::new(pool.clone()));
    let hashtags = Arc::new(PgHashtagStore::new(pool.clone()));
    let users = Arc::new(PgUserAccountStore::new(pool));

    let encoder = PasswordEncoder::new();
    let identities = config.oauth.as_ref().map(|oauth| {
        tracing::info!(provider = %oauth.provider, "social sign-in enabled");
        Arc::new(SocialIdentity::new(
            users.clone(),
            encoder.clone(),
            OAuthSettings {
                provider: oauth.provider.clone(),
                client_id: oauth.client_id.clone(),
                client_secret: oauth.client_secret.clone(),
                token_url: oauth.token_url.clone(),
                user_info_url: oauth.user_info_url.clone(),
                redirect_url: oauth.redirect_url.clone(),
            },
        ))
    });

    let state = AppState {
        articles: Arc::new(ArticleService::new(
            articles.clone(),
            users.clone(),
            HashtagService::new(hashtags),
        )),
        comments: Arc::new(CommentService::new(comments, articles)),
        users: Arc::new(UserAccountService::new(users.clone())),
        credentials: Arc::new(LocalCredentials::new(users, encoder)),
        identities,
        sessions: Arc::new(SessionManager::new(
            config.session.secret.clone(),
            config.session.ttl_seconds,
        )),
    };

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, api_adapters::router(state)).await?;
    Ok(())
}
