//! HMAC-SHA256-signed session tokens carried in a cookie.
//!
//! Token layout: `b64url(user_id ":" expiry_unix) "." b64url(mac)`.
//! Verification is constant-time via the `hmac` crate; anything
//! malformed, tampered with, or expired comes back as `None` and the
//! request proceeds anonymously.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const SESSION_COOKIE: &str = "AGORA_SESSION";

#[derive(Clone)]
pub struct SessionManager {
    secret: SecretString,
    ttl: Duration,
}

impl SessionManager {
    pub fn new(secret: SecretString, ttl_seconds: i64) -> Self {
        Self { secret, ttl: Duration::seconds(ttl_seconds) }
    }

    fn mac(&self, payload: &[u8]) -> HmacSha256 {
        let mut mac = HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .expect("HMAC accepts keys of any length");
        mac.update(payload);
        mac
    }

    /// Issues a signed token for the user, valid for the configured TTL.
    pub fn issue(&self, user_id: &str) -> String {
        let expiry = (Utc::now() + self.ttl).timestamp();
        let payload = format!("{user_id}:{expiry}");
        let tag = self.mac(payload.as_bytes()).finalize().into_bytes();
        format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(payload.as_bytes()),
            URL_SAFE_NO_PAD.encode(tag)
        )
    }

    /// Returns the user id carried by a valid, unexpired token.
    pub fn verify(&self, token: &str) -> Option<String> {
        let (payload_b64, tag_b64) = token.split_once('.')?;
        let payload = URL_SAFE_NO_PAD.decode(payload_b64).ok()?;
        let tag = URL_SAFE_NO_PAD.decode(tag_b64).ok()?;
        self.mac(&payload).verify_slice(&tag).ok()?;

        let payload = String::from_utf8(payload).ok()?;
        // Usernames may contain ':'; the expiry is always the last field.
        let (user_id, expiry) = payload.rsplit_once(':')?;
        let expiry: i64 = expiry.parse().ok()?;
        if expiry <= Utc::now().timestamp() {
            return None;
        }
        Some(user_id.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager(ttl: i64) -> SessionManager {
        SessionManager::new(SecretString::from("test-secret-key"), ttl)
    }

    #[test]
    fn issue_and_verify_round_trip() {
        let sessions = manager(3600);
        let token = sessions.issue("uno");
        assert_eq!(sessions.verify(&token).as_deref(), Some("uno"));
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let sessions = manager(3600);
        let token = sessions.issue("uno");
        let (_, tag) = token.split_once('.').unwrap();
        let forged_payload = URL_SAFE_NO_PAD.encode(format!("admin:{}", i64::MAX));
        let forged = format!("{forged_payload}.{tag}");
        assert!(sessions.verify(&forged).is_none());
    }

    #[test]
    fn expired_token_is_rejected() {
        let sessions = manager(-1);
        let token = sessions.issue("uno");
        assert!(sessions.verify(&token).is_none());
    }

    #[test]
    fn token_signed_with_another_key_is_rejected() {
        let token = manager(3600).issue("uno");
        let other = SessionManager::new(SecretString::from("different-key"), 3600);
        assert!(other.verify(&token).is_none());
    }

    #[test]
    fn malformed_tokens_are_rejected() {
        let sessions = manager(3600);
        assert!(sessions.verify("").is_none());
        assert!(sessions.verify("no-dot").is_none());
        assert!(sessions.verify("a.b").is_none());
    }

    #[test]
    fn usernames_with_colons_survive_the_round_trip() {
        let sessions = manager(3600);
        let token = sessions.issue("kakao:12345");
        assert_eq!(sessions.verify(&token).as_deref(), Some("kakao:12345"));
    }
}
