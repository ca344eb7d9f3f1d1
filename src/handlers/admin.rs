use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    response::{Html, Redirect},
};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::ApiFailure;
use crate::middleware::auth::RequireAdmin;
use crate::middleware::multipart::MultipartForm;
use crate::{LinkHubError, router::LinkHubState, views};

/// GET /admin -> dashboard with links, profile and totals.
pub async fn dashboard(
    _: RequireAdmin,
    State(state): State<LinkHubState>,
) -> Result<Html<String>, LinkHubError> {
    let ((links, stats), profile) =
        tokio::try_join!(state.links.list_with_totals(), state.profiles.get())?;
    Ok(Html(views::admin(&profile, &links, stats).into_string()))
}

/// POST /admin/update-profile (multipart: username, description, currentImage, profile_image)
pub async fn update_profile(
    _: RequireAdmin,
    State(state): State<LinkHubState>,
    mut form: MultipartForm,
) -> Result<Redirect, LinkHubError> {
    let username = form.text("username").unwrap_or_default().to_string();
    if username.trim().is_empty() {
        return Err(LinkHubError::Validation("username is required.".into()));
    }
    let description = form.text("description").map(str::to_string);

    // the stored row, not the form's currentImage, decides what gets replaced
    let current = state.profiles.get().await?;
    let swap = state
        .media
        .replace(
            current.profile_image_url.as_deref(),
            form.take_file("profile_image"),
        )
        .await?;

    match state
        .profiles
        .update(&username, description.as_deref(), swap.url())
        .await
    {
        Ok(()) => {
            release_image(&state, swap.commit()).await;
            Ok(Redirect::to("/admin"))
        }
        Err(e) => {
            swap.abort(&state.media).await;
            Err(e)
        }
    }
}

/// POST /admin/add (multipart: title, url, image)
pub async fn add_link(
    _: RequireAdmin,
    State(state): State<LinkHubState>,
    mut form: MultipartForm,
) -> Result<Redirect, LinkHubError> {
    let title = form.text("title").unwrap_or_default().to_string();
    let url = form.text("url").unwrap_or_default().to_string();
    if title.trim().is_empty() || url.trim().is_empty() {
        return Err(LinkHubError::Validation("title and url are required.".into()));
    }

    let image = state.media.store(form.take_file("image")).await?;
    if let Err(e) = state.links.create(&title, &url, image.as_deref()).await {
        state.media.remove(image.as_deref()).await;
        return Err(e);
    }
    Ok(Redirect::to("/admin"))
}

/// GET /admin/edit/{id}
pub async fn edit_form(
    _: RequireAdmin,
    State(state): State<LinkHubState>,
    Path(id): Path<i64>,
) -> Result<Html<String>, LinkHubError> {
    let link = state.links.get(id).await?;
    Ok(Html(views::edit_link(&link).into_string()))
}

/// POST /admin/edit/{id} (multipart: title, url, currentImage, image)
pub async fn edit_link(
    _: RequireAdmin,
    State(state): State<LinkHubState>,
    Path(id): Path<i64>,
    mut form: MultipartForm,
) -> Result<Redirect, LinkHubError> {
    let title = form.text("title").unwrap_or_default().to_string();
    let url = form.text("url").unwrap_or_default().to_string();
    if title.trim().is_empty() || url.trim().is_empty() {
        return Err(LinkHubError::Validation("title and url are required.".into()));
    }

    let current = state.links.get(id).await?;
    let swap = state
        .media
        .replace(current.image.as_deref(), form.take_file("image"))
        .await?;

    match state.links.update(id, &title, &url, swap.url()).await {
        Ok(()) => {
            release_image(&state, swap.commit()).await;
            Ok(Redirect::to("/admin"))
        }
        Err(e) => {
            swap.abort(&state.media).await;
            Err(e)
        }
    }
}

/// POST /admin/delete/{id} -> delete the row, then clean up its image.
pub async fn delete_link(
    _: RequireAdmin,
    State(state): State<LinkHubState>,
    Path(id): Path<i64>,
) -> Result<Redirect, LinkHubError> {
    let image = state.links.delete(id).await?;
    release_image(&state, image).await;
    Ok(Redirect::to("/admin"))
}

/// Deletes a stored image once no link or profile row points at it anymore.
/// A failed reference check keeps the file.
async fn release_image(state: &LinkHubState, url: Option<String>) {
    let Some(url) = url else {
        return;
    };
    match state.links.image_in_use(&url).await {
        Ok(false) => state.media.remove(Some(&url)).await,
        Ok(true) => debug!(url = %url, "image still referenced, keeping it"),
        Err(e) => warn!(url = %url, error = %e, "image reference check failed, keeping it"),
    }
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub success: bool,
}

/// POST /admin/update-order, body `{"order": [id, ...]}`.
pub async fn update_order(
    _: RequireAdmin,
    State(state): State<LinkHubState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<OrderResponse>, ApiFailure> {
    let Json(body) = payload.map_err(LinkHubError::from)?;
    let ids = parse_order(&body)?;
    state.links.reorder(&ids).await?;
    info!(count = ids.len(), "order updated from dashboard");
    Ok(Json(OrderResponse { success: true }))
}

/// Accepts numbers and numeric strings; anything else rejects the whole request.
fn parse_order(body: &Value) -> Result<Vec<i64>, LinkHubError> {
    let invalid = || LinkHubError::Validation("order must be an array of link ids".into());
    let items = body
        .get("order")
        .and_then(Value::as_array)
        .ok_or_else(invalid)?;
    items
        .iter()
        .map(|item| match item {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
        .map(|id| id.ok_or_else(invalid))
        .collect()
}
