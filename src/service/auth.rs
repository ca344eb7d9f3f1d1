use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use rand::rngs::OsRng;
use subtle::ConstantTimeEq;
use tracing::debug;

use crate::error::LinkHubError;

/// Admin credential check. The configured password is hashed once at startup
/// and only the PHC string is kept in memory.
#[derive(Clone)]
pub struct AdminAuth {
    password_hash: String,
}

impl AdminAuth {
    pub fn new(password: &str) -> Result<Self, LinkHubError> {
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| LinkHubError::Internal(format!("failed to hash admin password: {e}")))?
            .to_string();
        Ok(Self { password_hash })
    }

    pub fn login(&self, candidate: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(&self.password_hash) else {
            return false;
        };
        let ok = Argon2::default()
            .verify_password(candidate.as_bytes(), &parsed)
            .is_ok();
        debug!(ok, "admin login attempt");
        ok
    }
}

/// Shared secret for the automation endpoint.
#[derive(Clone)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn matches(&self, presented: Option<&str>) -> bool {
        let Some(presented) = presented else {
            return false;
        };
        bool::from(presented.as_bytes().ct_eq(self.0.as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_accepts_only_the_configured_password() {
        let auth = AdminAuth::new("s3cret-pass").unwrap();
        assert!(auth.login("s3cret-pass"));
        assert!(!auth.login("s3cret-pas"));
        assert!(!auth.login(""));
    }

    #[test]
    fn hash_is_salted() {
        let a = AdminAuth::new("same").unwrap();
        let b = AdminAuth::new("same").unwrap();
        assert_ne!(a.password_hash, b.password_hash);
    }

    #[test]
    fn api_key_comparison() {
        let key = ApiKey::new("auto-key");
        assert!(key.matches(Some("auto-key")));
        assert!(!key.matches(Some("auto-kez")));
        assert!(!key.matches(Some("auto-key-longer")));
        assert!(!key.matches(None));
    }
}
