//! Session extractors. A request is authenticated when it carries a valid
//! signed session cookie AND the account it names still exists.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;
use axum::response::Redirect;
use domains::Principal;

use auth_adapters::SESSION_COOKIE;

use crate::state::AppState;

/// Authenticated principal; rejects to the login page.
pub struct CurrentUser(pub Principal);

/// Optional principal for pages that render both ways.
pub struct MaybeUser(pub Option<Principal>);

fn session_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_owned())
}

async fn resolve_principal(parts: &Parts, state: &AppState) -> Option<Principal> {
    let token = session_token(parts)?;
    let user_id = state.sessions.verify(&token)?;
    match state.users.search_user(&user_id).await {
        Ok(Some(account)) => Some(Principal {
            user_id: account.user_id,
            nickname: account.nickname,
            email: account.email,
        }),
        // Valid token for an account that no longer exists.
        Ok(None) => None,
        Err(err) => {
            tracing::warn!(%user_id, error = %err, "session account lookup failed");
            None
        }
    }
}

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(resolve_principal(parts, state).await))
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Redirect;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        resolve_principal(parts, state)
            .await
            .map(CurrentUser)
            .ok_or_else(|| Redirect::to("/login"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with_cookie(cookie: &str) -> Parts {
        let (parts, ()) = Request::builder()
            .header(header::COOKIE, cookie)
            .body(())
            .unwrap()
            .into_parts();
        parts
    }

    #[test]
    fn finds_the_session_cookie_among_others() {
        let parts = parts_with_cookie("theme=dark; AGORA_SESSION=tok.sig; lang=en");
        assert_eq!(session_token(&parts).as_deref(), Some("tok.sig"));
    }

    #[test]
    fn missing_cookie_yields_none() {
        let parts = parts_with_cookie("theme=dark");
        assert_eq!(session_token(&parts), None);
    }
}
