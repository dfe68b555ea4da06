//! Postgres adapter for user accounts.

use async_trait::async_trait;
use sqlx::postgres::PgPool;
use sqlx::Row;

use domains::{AuditStamp, UserAccount, UserAccountStore};

pub struct PgUserAccountStore {
    pool: PgPool,
}

impl PgUserAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserAccountStore for PgUserAccountStore {
    async fn find_by_id(&self, user_id: String) -> anyhow::Result<Option<UserAccount>> {
        let row = sqlx::query(
            "SELECT user_id, user_password, email, nickname, memo, \
                    created_at, created_by, modified_at, modified_by \
             FROM user_account WHERE user_id = $1",
        )
        .bind(&user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| UserAccount {
            user_id: row.get("user_id"),
            user_password: row.get("user_password"),
            email: row.get("email"),
            nickname: row.get("nickname"),
            memo: row.get("memo"),
            created_at: row.get("created_at"),
            created_by: row.get("created_by"),
            modified_at: row.get("modified_at"),
            modified_by: row.get("modified_by"),
        }))
    }

    async fn create(
        &self,
        user_id: String,
        password_hash: String,
        email: Option<String>,
        nickname: Option<String>,
        memo: Option<String>,
        stamp: AuditStamp,
    ) -> anyhow::Result<UserAccount> {
        sqlx::query(
            "INSERT INTO user_account \
             (user_id, user_password, email, nickname, memo, created_at, created_by, modified_at, modified_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $6, $7)",
        )
        .bind(&user_id)
        .bind(&password_hash)
        .bind(&email)
        .bind(&nickname)
        .bind(&memo)
        .bind(stamp.at)
        .bind(&stamp.by)
        .execute(&self.pool)
        .await?;

        Ok(UserAccount {
            user_id,
            user_password: password_hash,
            email,
            nickname,
            memo,
            created_at: stamp.at,
            created_by: stamp.by.clone(),
            modified_at: stamp.at,
            modified_by: stamp.by,
        })
    }
}
