use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ApiFailure;
use crate::middleware::auth::RequireApiKey;
use crate::{LinkHubError, router::LinkHubState};

#[derive(Debug, Deserialize)]
pub struct CreateLinkRequest {
    pub title: Option<String>,
    pub url: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateLinkResponse {
    pub success: bool,
    pub id: i64,
}

/// POST /api/admin/links -> insert a link on behalf of an automation script.
/// Authenticated by the `x-api-key` header only.
pub async fn create_link(
    _: RequireApiKey,
    State(state): State<LinkHubState>,
    payload: Result<Json<CreateLinkRequest>, JsonRejection>,
) -> Result<Json<CreateLinkResponse>, ApiFailure> {
    let Json(req) = payload.map_err(LinkHubError::from)?;
    let id = state
        .links
        .create(
            req.title.as_deref().unwrap_or_default(),
            req.url.as_deref().unwrap_or_default(),
            req.image.as_deref(),
        )
        .await?;
    info!(id, "link created through automation API");
    Ok(Json(CreateLinkResponse { success: true, id }))
}
