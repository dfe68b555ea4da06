//! Seeds a development database with a demo account and a few hashtagged
//! articles so the board has something to show on first run.

use std::sync::Arc;

use secrecy::ExposeSecret;
use tracing_subscriber::EnvFilter;

use auth_adapters::PasswordEncoder;
use domains::Principal;
use services::{ArticleService, CommentService, HashtagService, UserAccountService};
use storage_adapters::{PgArticleStore, PgCommentStore, PgHashtagStore, PgUserAccountStore};

const DEMO_USERNAME: &str = "demo";
const DEMO_PASSWORD: &str = "demo-password";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = configs::AppConfig::load()?;
    let pool = storage_adapters::init_pool(
        config.database.url.expose_secret(),
        config.database.max_connections,
    )
    .await?;
    storage_adapters::run_migrations(&pool).await?;

    let article_store = Arc::new(PgArticleStore::new(pool.clone()));
    let comment_store = Arc::new(PgCommentStore::new(pool.clone()));
    let hashtag_store = Arc::new(PgHashtagStore::new(pool.clone()));
    let user_store = Arc::new(PgUserAccountStore::new(pool));

    let users = UserAccountService::new(user_store.clone());
    let articles = ArticleService::new(
        article_store.clone(),
        user_store,
        HashtagService::new(hashtag_store),
    );
    let comments = CommentService::new(comment_store, article_store);

    if users.search_user(DEMO_USERNAME).await?.is_some() {
        tracing::info!(username = DEMO_USERNAME, "demo account already present, nothing to do");
        return Ok(());
    }

    let hash = PasswordEncoder::new().hash(DEMO_PASSWORD)?;
    let account = users
        .save_user(
            DEMO_USERNAME,
            &hash,
            Some("demo@example.com".to_owned()),
            Some("Demo".to_owned()),
            Some("seeded development account".to_owned()),
        )
        .await?;
    let principal = Principal {
        user_id: account.user_id,
        nickname: account.nickname,
        email: account.email,
    };

    let samples = [
        (
            "Welcome to Agora",
            "A small community board. Write articles, tag them with #hashtags, reply in threads. #agora #welcome",
        ),
        (
            "Formatting tips",
            "Anything after a # up to the next space becomes a tag, so #tips and #formatting both count.",
        ),
        (
            "Open thread",
            "No tags here. Say hello below.",
        ),
    ];
    let mut first_article = None;
    for (title, content) in samples {
        let article = articles.save_article(&principal, title, content).await?;
        tracing::info!(article_id = article.id, title, "seeded article");
        first_article.get_or_insert(article.id);
    }

    if let Some(article_id) = first_article {
        comments
            .save_comment(&principal, article_id, None, "First!")
            .await?;
    }

    tracing::info!(
        username = DEMO_USERNAME,
        password = DEMO_PASSWORD,
        "seeding complete"
    );
    Ok(())
}
