#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, Bytes, to_bytes},
    http::{Request, Response, header},
};
use linkhub::{
    LinkHubError,
    config::Config,
    db::Store,
    media::{MediaRelocation, MediaStore},
    middleware::auth::SessionSettings,
    router::{LinkHubState, linkhub_router},
    service::{AdminAuth, ApiKey},
};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tower::ServiceExt;

pub const ADMIN_PASSWORD: &str = "correct horse";
pub const API_SECRET: &str = "automation-secret";
pub const BOUNDARY: &str = "LinkHubTestBoundary";
pub const PNG: &[u8] = b"\x89PNG\r\n\x1a\n";

/// In-memory media backend that remembers every put and delete.
#[derive(Default)]
pub struct FakeMedia {
    pub puts: Mutex<Vec<String>>,
    pub deletes: Mutex<Vec<String>>,
}

#[async_trait]
impl MediaStore for FakeMedia {
    async fn put(
        &self,
        key: &str,
        _bytes: Bytes,
        _content_type: &str,
    ) -> Result<String, LinkHubError> {
        let url = format!("https://cdn.test/{key}");
        self.puts.lock().unwrap().push(url.clone());
        Ok(url)
    }

    async fn delete(&self, url: &str) -> Result<(), LinkHubError> {
        self.deletes.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Store,
    pub media: Arc<FakeMedia>,
    _dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    pub async fn with_config(tweak: impl FnOnce(&mut Config)) -> Self {
        let dir = TempDir::new().unwrap();
        let mut cfg = Config {
            database_url: format!("sqlite:{}", dir.path().join("linkhub.db").display()),
            admin_password: ADMIN_PASSWORD.into(),
            api_secret: API_SECRET.into(),
            insecure_cookie: true,
            static_dir: concat!(env!("CARGO_MANIFEST_DIR"), "/static").into(),
            ..Config::default()
        };
        cfg.media.upload_dir = dir.path().join("uploads");
        tweak(&mut cfg);

        let store = linkhub::db::connect(&cfg.database_url).await.unwrap();
        store.init_schema().await.unwrap();

        let media = Arc::new(FakeMedia::default());
        let state = LinkHubState::new(
            store.clone(),
            MediaRelocation::new(media.clone()),
            AdminAuth::new(&cfg.admin_password).unwrap(),
            ApiKey::new(cfg.api_secret.clone()),
            SessionSettings::from_config(&cfg),
            cfg.cookie_key().unwrap(),
        );
        Self {
            router: linkhub_router(state, &cfg),
            store,
            media,
            _dir: dir,
        }
    }

    pub async fn send(&self, req: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(req).await.unwrap()
    }

    /// Log in through the form and return the `Cookie` header value.
    pub async fn login(&self) -> String {
        let resp = self
            .send(
                Request::post("/login")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from(format!("password={}", ADMIN_PASSWORD.replace(' ', "+"))))
                    .unwrap(),
            )
            .await;
        assert_eq!(resp.headers()[header::LOCATION], "/admin");
        resp.headers()[header::SET_COOKIE]
            .to_str()
            .unwrap()
            .split(';')
            .next()
            .unwrap()
            .to_string()
    }

    pub async fn insert_link(&self, title: &str, url: &str, image: Option<&str>) -> i64 {
        sqlx::query_scalar(
            "INSERT INTO links (title, url, image, ordering)
             VALUES (?, ?, ?, (SELECT COALESCE(MAX(ordering) + 1, 0) FROM links))
             RETURNING id",
        )
        .bind(title)
        .bind(url)
        .bind(image)
        .fetch_one(self.store.pool())
        .await
        .unwrap()
    }

    pub async fn clicks(&self, id: i64) -> i64 {
        sqlx::query_scalar("SELECT clicks FROM links WHERE id = ?")
            .bind(id)
            .fetch_one(self.store.pool())
            .await
            .unwrap()
    }

    pub async fn link_count(&self) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM links")
            .fetch_one(self.store.pool())
            .await
            .unwrap()
    }
}

/// Builds a multipart body from text fields and `(field, file name, bytes)` files.
pub fn multipart(fields: &[(&str, &str)], files: &[(&str, &str, &[u8])]) -> Body {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    for (name, file_name, bytes) in files {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    Body::from(body)
}

pub fn multipart_request(uri: &str, cookie: &str, body: Body) -> Request<Body> {
    Request::post(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header(header::COOKIE, cookie)
        .body(body)
        .unwrap()
}

pub async fn body_string(resp: Response<Body>) -> String {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
