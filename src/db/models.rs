use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, FromRow)]
pub struct Link {
    pub id: i64,
    pub title: String,
    pub url: String,
    pub image: Option<String>,
    pub clicks: i64,
    pub ordering: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, FromRow)]
pub struct Profile {
    pub id: i64,
    pub username: String,
    pub description: Option<String>,
    pub profile_image_url: Option<String>,
}

/// Aggregates shown on the admin dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total_links: usize,
    pub total_clicks: i64,
}
