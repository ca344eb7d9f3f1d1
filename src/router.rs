use axum::{
    Router,
    extract::{DefaultBodyLimit, FromRef},
    routing::{get, post},
};
use axum_extra::extract::cookie::Key;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::config::{Config, MediaBackend};
use crate::db::Store;
use crate::handlers::{admin, api, public, session};
use crate::media::MediaRelocation;
use crate::middleware::auth::SessionSettings;
use crate::service::{AdminAuth, ApiKey, LinkCatalog, ProfileService};

#[derive(Clone)]
pub struct LinkHubState {
    pub links: LinkCatalog,
    pub profiles: ProfileService,
    pub media: MediaRelocation,
    pub admin: AdminAuth,
    pub api_key: ApiKey,
    pub session: SessionSettings,
    cookie_key: Key,
}

impl LinkHubState {
    pub fn new(
        store: Store,
        media: MediaRelocation,
        admin: AdminAuth,
        api_key: ApiKey,
        session: SessionSettings,
        cookie_key: Key,
    ) -> Self {
        Self {
            links: LinkCatalog::new(store.clone()),
            profiles: ProfileService::new(store),
            media,
            admin,
            api_key,
            session,
            cookie_key,
        }
    }
}

impl FromRef<LinkHubState> for Key {
    fn from_ref(state: &LinkHubState) -> Key {
        state.cookie_key.clone()
    }
}

impl FromRef<LinkHubState> for ApiKey {
    fn from_ref(state: &LinkHubState) -> ApiKey {
        state.api_key.clone()
    }
}

pub fn linkhub_router(state: LinkHubState, cfg: &Config) -> Router {
    let admin_routes = Router::new()
        .route("/", get(admin::dashboard))
        .route("/update-profile", post(admin::update_profile))
        .route("/add", post(admin::add_link))
        .route("/edit/{id}", get(admin::edit_form).post(admin::edit_link))
        .route("/delete/{id}", post(admin::delete_link))
        .route("/update-order", post(admin::update_order));

    let mut router = Router::new()
        .route("/", get(public::index))
        .route("/click/{id}", get(public::click))
        .route("/cron-ping", get(public::cron_ping))
        .route("/login", get(session::login_form).post(session::login))
        .route("/logout", get(session::logout))
        .route("/api/admin/links", post(api::create_link))
        .nest("/admin", admin_routes);

    if cfg.media.backend == MediaBackend::Local {
        router = router.nest_service(
            cfg.media.public_prefix.trim_end_matches('/'),
            ServeDir::new(&cfg.media.upload_dir),
        );
    }

    router
        .fallback_service(ServeDir::new(&cfg.static_dir))
        .layer(DefaultBodyLimit::max(cfg.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
