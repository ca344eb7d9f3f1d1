use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::PrivateCookieJar;
use serde::Deserialize;
use tracing::{info, warn};

use crate::middleware::auth::{end_session, start_session};
use crate::{LinkHubError, router::LinkHubState, views};

const LOGIN_FAILED: &str = "Incorrect password.";

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub password: String,
}

/// GET /login
pub async fn login_form() -> Html<String> {
    Html(views::login(None).into_string())
}

/// POST /login -> on success marks the session as admin and goes to /admin.
pub async fn login(
    State(state): State<LinkHubState>,
    jar: PrivateCookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, LinkHubError> {
    let admin = state.admin.clone();
    // argon2 verification is CPU-bound
    let ok = tokio::task::spawn_blocking(move || admin.login(&form.password))
        .await
        .map_err(|e| LinkHubError::Internal(format!("login task failed: {e}")))?;

    if !ok {
        warn!("rejected admin login");
        let page = views::login(Some(LOGIN_FAILED)).into_string();
        return Ok((StatusCode::UNAUTHORIZED, Html(page)).into_response());
    }

    info!("admin logged in");
    let jar = start_session(jar, &state.session);
    Ok((jar, Redirect::to("/admin")).into_response())
}

/// GET /logout -> drop the session unconditionally.
pub async fn logout(jar: PrivateCookieJar) -> (PrivateCookieJar, Redirect) {
    (end_session(jar), Redirect::to("/"))
}
