use axum::{
    extract::{Path, State},
    response::{Html, Redirect},
};
use tracing::warn;

use crate::{LinkHubError, router::LinkHubState, views};

/// GET / -> profile header and link list.
pub async fn index(State(state): State<LinkHubState>) -> Result<Html<String>, LinkHubError> {
    let (links, profile) = tokio::try_join!(state.links.list(), state.profiles.get())?;
    Ok(Html(views::index(&profile, &links).into_string()))
}

/// GET /click/{id} -> count the click, then redirect to the link target.
/// The counter update runs detached; its failure never affects the redirect.
pub async fn click(
    State(state): State<LinkHubState>,
    Path(id): Path<i64>,
) -> Result<Redirect, LinkHubError> {
    let links = state.links.clone();
    tokio::spawn(async move {
        if let Err(e) = links.record_click(id).await {
            warn!(id, error = %e, "failed to record click");
        }
    });

    let target = state.links.resolve_redirect_target(id).await?;
    Ok(Redirect::to(&target))
}

/// GET /cron-ping -> liveness check for external schedulers.
pub async fn cron_ping() -> &'static str {
    "OK"
}
