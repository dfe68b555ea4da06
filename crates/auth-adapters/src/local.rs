//! Form-login credentials against locally stored argon2 hashes.

use std::sync::Arc;

use async_trait::async_trait;

use domains::{BoardError, CredentialPort, Principal, UserAccountStore};

use crate::password::PasswordEncoder;

pub struct LocalCredentials {
    users: Arc<dyn UserAccountStore>,
    encoder: PasswordEncoder,
}

impl LocalCredentials {
    pub fn new(users: Arc<dyn UserAccountStore>, encoder: PasswordEncoder) -> Self {
        Self { users, encoder }
    }
}

#[async_trait]
impl CredentialPort for LocalCredentials {
    async fn authenticate(&self, username: &str, password: &str) -> domains::Result<Principal> {
        let account = self
            .users
            .find_by_id(username.to_owned())
            .await
            .map_err(BoardError::Storage)?;

        // The "user not found" condition stays in here; callers see the
        // same rejection for a bad username and a bad password.
        let Some(account) = account else {
            tracing::debug!(username, "login rejected: unknown username");
            return Err(BoardError::Unauthorized("invalid username or password".into()));
        };

        if !self.encoder.verify(password, &account.user_password) {
            tracing::debug!(username, "login rejected: password mismatch");
            return Err(BoardError::Unauthorized("invalid username or password".into()));
        }

        Ok(Principal {
            user_id: account.user_id,
            nickname: account.nickname,
            email: account.email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domains::{MockUserAccountStore, UserAccount};

    fn account_with(encoder: &PasswordEncoder, password: &str) -> UserAccount {
        let now = Utc::now();
        UserAccount {
            user_id: "uno".into(),
            user_password: encoder.hash(password).unwrap(),
            email: Some("uno@example.com".into()),
            nickname: Some("Uno".into()),
            memo: None,
            created_at: now,
            created_by: "uno".into(),
            modified_at: now,
            modified_by: "uno".into(),
        }
    }

    #[tokio::test]
    async fn valid_credentials_yield_a_principal() {
        let encoder = PasswordEncoder::new();
        let account = account_with(&encoder, "s3cret");
        let mut users = MockUserAccountStore::new();
        users
            .expect_find_by_id()
            .returning(move |_| Ok(Some(account.clone())));

        let auth = LocalCredentials::new(Arc::new(users), encoder);
        let principal = auth.authenticate("uno", "s3cret").await.unwrap();
        assert_eq!(principal.user_id, "uno");
        assert_eq!(principal.nickname.as_deref(), Some("Uno"));
    }

    #[tokio::test]
    async fn unknown_username_and_bad_password_reject_identically() {
        let encoder = PasswordEncoder::new();
        let account = account_with(&encoder, "s3cret");
        let mut users = MockUserAccountStore::new();
        users.expect_find_by_id().returning(move |username| {
            if username == "uno" {
                Ok(Some(account.clone()))
            } else {
                Ok(None)
            }
        });

        let auth = LocalCredentials::new(Arc::new(users), encoder);
        let unknown = auth.authenticate("ghost", "s3cret").await.unwrap_err();
        let mismatch = auth.authenticate("uno", "wrong").await.unwrap_err();
        assert_eq!(unknown.to_string(), mismatch.to_string());
        assert!(matches!(unknown, BoardError::Unauthorized(_)));
    }
}
