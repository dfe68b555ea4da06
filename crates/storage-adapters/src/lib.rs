//! # storage-adapters
//!
//! Postgres implementations of the domain storage ports, mapping between
//! the relational schema and the `domains` models.

mod articles;
mod comments;
mod hashtags;
mod users;

pub use articles::PgArticleStore;
pub use comments::PgCommentStore;
pub use hashtags::PgHashtagStore;
pub use users::PgUserAccountStore;

use sqlx::postgres::{PgPool, PgPoolOptions};

/// Opens the connection pool used by every adapter.
pub async fn init_pool(url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(url)
        .await?;
    Ok(pool)
}

/// Applies the bundled schema migrations.
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("../../migrations").run(pool).await?;
    Ok(())
}

/// `%`/`_` in user keywords are literals, not LIKE wildcards.
pub(crate) fn contains_pattern(keyword: &str) -> String {
    let escaped = keyword
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}
