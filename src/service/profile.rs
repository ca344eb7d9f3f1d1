use tracing::info;

use crate::db::{Profile, Store};
use crate::error::LinkHubError;

/// Read/update access to the singleton profile row.
#[derive(Clone)]
pub struct ProfileService {
    store: Store,
}

impl ProfileService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn get(&self) -> Result<Profile, LinkHubError> {
        self.store
            .one(
                "SELECT id, username, description, profile_image_url FROM profile WHERE id = 1",
                vec![],
            )
            .await?
            .ok_or_else(|| LinkHubError::Internal("profile row is missing".into()))
    }

    /// Overwrites username, description and image together.
    pub async fn update(
        &self,
        username: &str,
        description: Option<&str>,
        image: Option<&str>,
    ) -> Result<(), LinkHubError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(LinkHubError::Validation("username is required.".into()));
        }
        let description = description.map(str::trim).filter(|d| !d.is_empty());
        let image = image.map(str::trim).filter(|i| !i.is_empty());

        let affected = self
            .store
            .execute(
                "UPDATE profile SET username = ?, description = ?, profile_image_url = ? WHERE id = 1",
                vec![username.into(), description.into(), image.into()],
            )
            .await?;
        if affected == 0 {
            return Err(LinkHubError::Internal("profile row is missing".into()));
        }
        info!(username, "profile updated");
        Ok(())
    }
}
