use axum_extra::extract::cookie::Key;
use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

use crate::error::LinkHubError;

const DEV_ADMIN_PASSWORD: &str = "admin1234";
const DEV_API_SECRET: &str = "change-me-api-secret";
const ENV_PREFIX: &str = "LINKHUB_";

/// Config keys whose values are taken verbatim from the environment. The
/// generic `Env` provider would turn `12345678` into an integer and `0042`
/// into `42`.
const VERBATIM_KEYS: [&str; 5] = [
    "admin_password",
    "api_secret",
    "session_secret",
    "media.access_key_id",
    "media.secret_access_key",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub listen_addr: String,
    pub database_url: String,
    pub loglevel: String,
    pub admin_password: String,
    pub session_secret: String,
    pub api_secret: String,
    /// Drop the `Secure` flag from the session cookie (plain-HTTP development).
    pub insecure_cookie: bool,
    pub session_max_age_days: i64,
    pub max_upload_bytes: usize,
    /// Directory served at `/`; holds the placeholder avatar.
    pub static_dir: PathBuf,
    pub media: MediaConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaBackend {
    Local,
    Bucket,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    pub backend: MediaBackend,
    pub upload_dir: PathBuf,
    pub public_prefix: String,
    pub bucket_name: String,
    pub bucket_region: String,
    pub bucket_endpoint: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub public_base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:3000".to_string(),
            database_url: "sqlite:linkhub.db".to_string(),
            loglevel: "info".to_string(),
            admin_password: DEV_ADMIN_PASSWORD.to_string(),
            session_secret: String::new(),
            api_secret: DEV_API_SECRET.to_string(),
            insecure_cookie: false,
            session_max_age_days: 7,
            max_upload_bytes: 10 * 1024 * 1024,
            static_dir: PathBuf::from("static"),
            media: MediaConfig::default(),
        }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            backend: MediaBackend::Local,
            upload_dir: PathBuf::from("uploads"),
            public_prefix: "/uploads".to_string(),
            bucket_name: String::new(),
            bucket_region: "auto".to_string(),
            bucket_endpoint: String::new(),
            access_key_id: String::new(),
            secret_access_key: String::new(),
            public_base_url: String::new(),
        }
    }
}

impl Config {
    /// Defaults, overridden by `LINKHUB_*` environment variables.
    /// Nested keys use a double underscore: `LINKHUB_MEDIA__BACKEND=bucket`.
    /// Secrets are read exactly as written, digits and leading zeros included.
    pub fn load() -> Result<Self, LinkHubError> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Env::prefixed(ENV_PREFIX).split("__").ignore(&VERBATIM_KEYS));
        for key in VERBATIM_KEYS {
            let var = format!("{ENV_PREFIX}{}", key.replace('.', "__").to_uppercase());
            if let Ok(value) = std::env::var(&var) {
                figment = figment.merge(Serialized::default(key, value));
            }
        }
        let cfg: Config = figment
            .extract()
            .map_err(|e| LinkHubError::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), LinkHubError> {
        if self.admin_password.is_empty() {
            return Err(LinkHubError::Config("admin_password must not be empty".into()));
        }
        if self.api_secret.is_empty() {
            return Err(LinkHubError::Config("api_secret must not be empty".into()));
        }
        if self.admin_password == DEV_ADMIN_PASSWORD {
            warn!("LINKHUB_ADMIN_PASSWORD not set, using the development default");
        }
        if self.api_secret == DEV_API_SECRET {
            warn!("LINKHUB_API_SECRET not set, using the development default");
        }
        if self.media.backend == MediaBackend::Local {
            let prefix = self.media.public_prefix.trim_end_matches('/');
            if !prefix.starts_with('/') || prefix.len() < 2 {
                return Err(LinkHubError::Config(
                    "media.public_prefix must be a path like /uploads".into(),
                ));
            }
        }
        if self.media.backend == MediaBackend::Bucket {
            let m = &self.media;
            for (name, value) in [
                ("media.bucket_name", &m.bucket_name),
                ("media.bucket_endpoint", &m.bucket_endpoint),
                ("media.public_base_url", &m.public_base_url),
            ] {
                if value.trim().is_empty() {
                    return Err(LinkHubError::Config(format!(
                        "{name} is required for the bucket backend"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Key used to encrypt the session cookie.
    pub fn cookie_key(&self) -> Result<Key, LinkHubError> {
        if self.session_secret.is_empty() {
            warn!("LINKHUB_SESSION_SECRET not set; sessions will not survive a restart");
            return Ok(Key::generate());
        }
        if self.session_secret.len() < 32 {
            return Err(LinkHubError::Config(
                "session_secret must be at least 32 bytes".into(),
            ));
        }
        Ok(Key::derive_from(self.session_secret.as_bytes()))
    }
}
