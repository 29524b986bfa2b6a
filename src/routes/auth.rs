//! Auth routes — email-code login flow and session management.

use axum::extract::{FromRef, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::Deserialize;
use time::Duration;

use crate::services::{email_auth, session};
use crate::state::AppState;

const COOKIE_NAME: &str = "cms_session";

pub(crate) fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .and_then(|raw| match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
}

pub(crate) fn cookie_secure() -> bool {
    if let Some(value) = env_bool("COOKIE_SECURE") {
        return value;
    }

    std::env::var("PUBLIC_BASE_URL")
        .map(|url| url.starts_with("https://"))
        .unwrap_or(false)
}

fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, token))
        .path("/")
        .http_only(true)
        .same_site(axum_extra::extract::cookie::SameSite::Lax)
        .secure(secure)
        .build()
}

fn clear_session_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, ""))
        .path("/")
        .http_only(true)
        .same_site(axum_extra::extract::cookie::SameSite::Lax)
        .secure(secure)
        .max_age(Duration::ZERO)
        .build()
}

// =============================================================================
// AUTH EXTRACTOR
// =============================================================================

/// Authenticated operator extracted from the session cookie.
/// Use as a handler parameter to require authentication.
pub struct AuthUser {
    pub user: session::SessionUser,
    pub token: String,
}

impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut axum::http::request::Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar.get(COOKIE_NAME).map(Cookie::value).unwrap_or_default();
        if token.is_empty() {
            return Err(StatusCode::UNAUTHORIZED);
        }

        let app_state = AppState::from_ref(state);
        let user = session::validate_session(&app_state.pool, token)
            .await
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
            .ok_or(StatusCode::UNAUTHORIZED)?;

        Ok(Self { user, token: token.to_owned() })
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

#[derive(Deserialize)]
pub struct RequestCodeBody {
    pub email: String,
}

/// `POST /api/auth/request-code` — email a login code to an active member.
///
/// Responds `{ok: true}` whether or not the email belongs to a member, so the
/// endpoint cannot be used to probe for accounts.
pub async fn request_code(
    State(state): State<AppState>,
    Json(body): Json<RequestCodeBody>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let code = match email_auth::request_access_code(&state.pool, &body.email).await {
        Ok(code) => code,
        Err(email_auth::EmailAuthError::InvalidEmail) => return Err(StatusCode::BAD_REQUEST),
        Err(e) => {
            tracing::error!(error = %e, "access code request failed");
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    if let Some(code) = code {
        let Some(email_cfg) = &state.email else {
            tracing::warn!("login code generated but outbound email is disabled");
            return Err(StatusCode::SERVICE_UNAVAILABLE);
        };
        if let Err(e) =
            email_auth::send_access_code_email(&email_cfg.api_key, &email_cfg.from, &body.email, &code).await
        {
            tracing::error!(error = %e, "access code delivery failed");
            return Err(StatusCode::BAD_GATEWAY);
        }
    }

    Ok(Json(serde_json::json!({ "ok": true })))
}

#[derive(Deserialize)]
pub struct VerifyCodeBody {
    pub email: String,
    pub code: String,
}

/// `POST /api/auth/verify-code` — verify the code, create a session, set cookie.
pub async fn verify_code(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<VerifyCodeBody>,
) -> Result<(CookieJar, Json<session::SessionUser>), StatusCode> {
    let user_id = match email_auth::verify_access_code(&state.pool, &body.email, &body.code).await {
        Ok(id) => id,
        Err(email_auth::EmailAuthError::InvalidEmail | email_auth::EmailAuthError::InvalidCode) => {
            return Err(StatusCode::BAD_REQUEST);
        }
        Err(email_auth::EmailAuthError::VerificationFailed) => return Err(StatusCode::UNAUTHORIZED),
        Err(e) => {
            tracing::error!(error = %e, "access code verification failed");
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let token = session::create_session(&state.pool, user_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    let user = session::validate_session(&state.pool, &token)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let jar = jar.add(session_cookie(token, cookie_secure()));
    Ok((jar, Json(user)))
}

/// `GET /api/auth/me` — return the current operator.
pub async fn me(auth: AuthUser) -> Json<session::SessionUser> {
    Json(auth.user)
}

/// `POST /api/auth/logout` — delete session, clear cookie.
pub async fn logout(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    let _ = session::delete_session(&state.pool, &auth.token).await;

    let jar = CookieJar::new().add(clear_session_cookie(cookie_secure()));
    (jar, StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
