//! User account lookup and registration. Password hashing happens in the
//! auth adapter; this service only ever sees the finished hash.

use std::sync::Arc;

use domains::{AuditStamp, BoardError, Result, UserAccount, UserAccountStore};

#[derive(Clone)]
pub struct UserAccountService {
    users: Arc<dyn UserAccountStore>,
}

impl UserAccountService {
    pub fn new(users: Arc<dyn UserAccountStore>) -> Self {
        Self { users }
    }

    /// Lookup by username. Absence is an ordinary `None`; callers decide
    /// whether that is an error.
    pub async fn search_user(&self, username: &str) -> Result<Option<UserAccount>> {
        self.users
            .find_by_id(username.to_owned())
            .await
            .map_err(BoardError::Storage)
    }

    /// Registers an account. The account stamps its own audit columns
    /// with its username, matching how self-registration is recorded.
    pub async fn save_user(
        &self,
        username: &str,
        password_hash: &str,
        email: Option<String>,
        nickname: Option<String>,
        memo: Option<String>,
    ) -> Result<UserAccount> {
        if username.trim().is_empty() {
            return Err(BoardError::Validation("username must not be blank".into()));
        }
        if self.search_user(username).await?.is_some() {
            return Err(BoardError::Conflict(format!("username {username} already taken")));
        }

        let stamp = AuditStamp::now(username);
        self.users
            .create(
                username.to_owned(),
                password_hash.to_owned(),
                email,
                nickname,
                memo,
                stamp,
            )
            .await
            .map_err(BoardError::Storage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domains::MockUserAccountStore;
    use mockall::predicate::eq;

    fn account(user_id: &str) -> UserAccount {
        let now = Utc::now();
        UserAccount {
            user_id: user_id.into(),
            user_password: "$argon2id$stub".into(),
            email: None,
            nickname: None,
            memo: None,
            created_at: now,
            created_by: user_id.into(),
            modified_at: now,
            modified_by: user_id.into(),
        }
    }

    #[tokio::test]
    async fn missing_user_is_none_not_an_error() {
        let mut users = MockUserAccountStore::new();
        users.expect_find_by_id().returning(|_| Ok(None));

        let service = UserAccountService::new(Arc::new(users));
        assert!(service.search_user("ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_username_is_a_conflict() {
        let mut users = MockUserAccountStore::new();
        users
            .expect_find_by_id()
            .with(eq("uno".to_string()))
            .returning(|id| Ok(Some(account(&id))));

        let service = UserAccountService::new(Arc::new(users));
        let err = service
            .save_user("uno", "$argon2id$stub", None, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, BoardError::Conflict(_)));
    }

    #[tokio::test]
    async fn registration_stamps_the_account_with_its_own_username() {
        let mut users = MockUserAccountStore::new();
        users.expect_find_by_id().returning(|_| Ok(None));
        users
            .expect_create()
            .withf(|user_id, hash, _, _, _, stamp| {
                user_id == "uno" && hash.starts_with("$argon2") && stamp.by == "uno"
            })
            .times(1)
            .returning(|user_id, hash, email, nickname, memo, stamp| {
                Ok(UserAccount {
                    user_id,
                    user_password: hash,
                    email,
                    nickname,
                    memo,
                    created_at: stamp.at,
                    created_by: stamp.by.clone(),
                    modified_at: stamp.at,
                    modified_by: stamp.by,
                })
            });

        let service = UserAccountService::new(Arc::new(users));
        let saved = service
            .save_user("uno", "$argon2id$stub", None, Some("Uno".into()), None)
            .await
            .unwrap();
        assert_eq!(saved.created_by, "uno");
    }
}
