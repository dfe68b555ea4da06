//! Login, logout, and the OAuth2 callback. Successful sign-in of either
//! flavor ends the same way: a signed session cookie and a redirect to the
//! article list.

use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;

use auth_adapters::SESSION_COOKIE;
use domains::{BoardError, ExternalIdentityPort};

use crate::error::ApiError;
use crate::extract::MaybeUser;
use crate::state::AppState;
use crate::templates::LoginPage;
use crate::views::render_page;

fn signed_in_response(state: &AppState, user_id: &str) -> Response {
    let token = state.sessions.issue(user_id);
    let cookie = format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax");
    ([(header::SET_COOKIE, cookie)], Redirect::to("/articles")).into_response()
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    pub error: Option<String>,
}

pub async fn login_page(
    MaybeUser(user): MaybeUser,
    Query(query): Query<LoginQuery>,
) -> Result<Response, ApiError> {
    if user.is_some() {
        return Ok(Redirect::to("/articles").into_response());
    }
    render_page(LoginPage {
        user: None,
        error: query.error.is_some(),
    })
    .map(IntoResponse::into_response)
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Response, ApiError> {
    match state
        .credentials
        .authenticate(&form.username, &form.password)
        .await
    {
        Ok(principal) => Ok(signed_in_response(&state, &principal.user_id)),
        Err(BoardError::Unauthorized(_)) => Ok(Redirect::to("/login?error=1").into_response()),
        Err(err) => Err(err.into()),
    }
}

pub async fn logout() -> Response {
    let cookie = format!("{SESSION_COOKIE}=; Path=/; HttpOnly; Max-Age=0");
    ([(header::SET_COOKIE, cookie)], Redirect::to("/articles")).into_response()
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: String,
}

/// Exchanges the authorization code, provisioning a local account on first
/// sign-in. Returns 404 when no OAuth client is configured.
pub async fn oauth_callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> Result<Response, ApiError> {
    let Some(identities) = state.identities.as_ref() else {
        return Err(BoardError::NotFound("OAuthClient", "unconfigured".into()).into());
    };
    let claims = identities.exchange_code(&query.code).await?;
    let principal = identities.upsert_from_claims(&claims).await?;
    Ok(signed_in_response(&state, &principal.user_id))
}
