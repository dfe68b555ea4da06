//! Social sign-in: OAuth2 authorization-code exchange plus the local
//! account mapping. A provider identity `12345` on provider `kakao`
//! becomes the local username `kakao_12345`, auto-provisioned with a
//! random placeholder credential on first sign-in.

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use domains::{AuditStamp, BoardError, ExternalClaims, ExternalIdentityPort, Principal, UserAccountStore};

use crate::password::PasswordEncoder;

#[derive(Clone)]
pub struct OAuthSettings {
    pub provider: String,
    pub client_id: String,
    pub client_secret: SecretString,
    pub token_url: String,
    pub user_info_url: String,
    pub redirect_url: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

pub struct SocialIdentity {
    users: Arc<dyn UserAccountStore>,
    encoder: PasswordEncoder,
    http: reqwest::Client,
    settings: OAuthSettings,
}

impl SocialIdentity {
    pub fn new(
        users: Arc<dyn UserAccountStore>,
        encoder: PasswordEncoder,
        settings: OAuthSettings,
    ) -> Self {
        Self { users, encoder, http: reqwest::Client::new(), settings }
    }

    pub fn provider(&self) -> &str {
        &self.settings.provider
    }

    /// Runs the authorization-code exchange and maps the provider's
    /// user-info payload onto claims.
    pub async fn exchange_code(&self, code: &str) -> domains::Result<ExternalClaims> {
        let token: TokenResponse = self
            .http
            .post(&self.settings.token_url)
            .form(&[
                ("grant_type", "authorization_code"),
                ("client_id", self.settings.client_id.as_str()),
                ("client_secret", self.settings.client_secret.expose_secret()),
                ("redirect_uri", self.settings.redirect_url.as_str()),
                ("code", code),
            ])
            .send()
            .await
            .map_err(anyhow::Error::from)?
            .error_for_status()
            .map_err(anyhow::Error::from)?
            .json()
            .await
            .map_err(anyhow::Error::from)?;

        let info: serde_json::Value = self
            .http
            .get(&self.settings.user_info_url)
            .bearer_auth(&token.access_token)
            .send()
            .await
            .map_err(anyhow::Error::from)?
            .error_for_status()
            .map_err(anyhow::Error::from)?
            .json()
            .await
            .map_err(anyhow::Error::from)?;

        claims_from_user_info(&self.settings.provider, &info)
    }
}

/// Providers disagree about payload shape; accept a numeric or string
/// `id` and pick up profile fields from the common spots.
fn claims_from_user_info(
    provider: &str,
    info: &serde_json::Value,
) -> domains::Result<ExternalClaims> {
    let provider_user_id = match info.get("id") {
        Some(serde_json::Value::Number(n)) => n.to_string(),
        Some(serde_json::Value::String(s)) if !s.is_empty() => s.clone(),
        _ => {
            return Err(BoardError::Unauthorized(
                "user-info response carries no usable id".into(),
            ))
        }
    };

    let string_at = |pointers: &[&str]| -> Option<String> {
        pointers
            .iter()
            .find_map(|p| info.pointer(p))
            .and_then(serde_json::Value::as_str)
            .map(str::to_owned)
    };

    Ok(ExternalClaims {
        provider: provider.to_owned(),
        provider_user_id,
        email: string_at(&["/email", "/kakao_account/email"]),
        nickname: string_at(&["/nickname", "/properties/nickname", "/kakao_account/profile/nickname"]),
    })
}

#[async_trait]
impl ExternalIdentityPort for SocialIdentity {
    async fn upsert_from_claims(&self, claims: &ExternalClaims) -> domains::Result<Principal> {
        let username = claims.local_username();

        let existing = self
            .users
            .find_by_id(username.clone())
            .await
            .map_err(BoardError::Storage)?;
        if let Some(account) = existing {
            return Ok(Principal {
                user_id: account.user_id,
                nickname: account.nickname,
                email: account.email,
            });
        }

        tracing::info!(%username, provider = %claims.provider, "provisioning account for first social sign-in");
        let placeholder = self.encoder.random_placeholder()?;
        let stamp = AuditStamp::now(&username);
        let account = self
            .users
            .create(
                username,
                placeholder,
                claims.email.clone(),
                claims.nickname.clone(),
                None,
                stamp,
            )
            .await
            .map_err(BoardError::Storage)?;

        Ok(Principal {
            user_id: account.user_id,
            nickname: account.nickname,
            email: account.email,
        })
    }
}
