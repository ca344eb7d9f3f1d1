use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, Key, PrivateCookieJar, SameSite};
use std::convert::Infallible;
use time::Duration;
use tracing::debug;

use crate::config::Config;
use crate::error::{ApiFailure, LinkHubError};
use crate::service::ApiKey;

pub const SESSION_COOKIE: &str = "linkhub_session";
const SESSION_ADMIN: &str = "admin";
const API_KEY_HEADER: &str = "x-api-key";

/// Attributes of the session cookie.
#[derive(Debug, Clone, Copy)]
pub struct SessionSettings {
    pub secure: bool,
    pub max_age: Duration,
}

impl SessionSettings {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            secure: !cfg.insecure_cookie,
            max_age: Duration::days(cfg.session_max_age_days),
        }
    }
}

/// Per-request view of the browser session.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionContext {
    pub authenticated: bool,
}

impl SessionContext {
    pub fn from_jar(jar: &PrivateCookieJar) -> Self {
        let authenticated = jar
            .get(SESSION_COOKIE)
            .is_some_and(|c| c.value() == SESSION_ADMIN);
        Self { authenticated }
    }
}

impl<S> FromRequestParts<S> for SessionContext
where
    S: Send + Sync,
    Key: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = PrivateCookieJar::<Key>::from_request_parts(parts, state).await?;
        Ok(Self::from_jar(&jar))
    }
}

/// Guard for admin routes: anonymous sessions are sent to `/login` before the
/// handler runs.
#[derive(Debug, Clone, Copy)]
pub struct RequireAdmin;

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
    Key: FromRef<S>,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Ok(session) = SessionContext::from_request_parts(parts, state).await;
        if session.authenticated {
            return Ok(Self);
        }
        debug!(path = %parts.uri.path(), "anonymous request to admin route");
        Err(Redirect::to("/login").into_response())
    }
}

/// Guard for the automation endpoint. Reads only the `x-api-key` header and
/// never looks at the session cookie.
#[derive(Debug, Clone, Copy)]
pub struct RequireApiKey;

impl<S> FromRequestParts<S> for RequireApiKey
where
    S: Send + Sync,
    ApiKey: FromRef<S>,
{
    type Rejection = ApiFailure;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let expected = ApiKey::from_ref(state);
        let presented = parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok());
        if expected.matches(presented) {
            Ok(Self)
        } else {
            Err(ApiFailure(LinkHubError::Unauthorized))
        }
    }
}

pub fn start_session(jar: PrivateCookieJar, settings: &SessionSettings) -> PrivateCookieJar {
    jar.add(
        Cookie::build(Cookie::new(SESSION_COOKIE, SESSION_ADMIN))
            .path("/")
            .http_only(true)
            .secure(settings.secure)
            .same_site(SameSite::Lax)
            .max_age(settings.max_age)
            .build(),
    )
}

pub fn end_session(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/").build())
}
