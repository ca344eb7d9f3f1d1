use tracing::info;

use crate::db::{DashboardStats, Link, Param, Store};
use crate::error::LinkHubError;

const SELECT_LINKS: &str =
    "SELECT id, title, url, image, clicks, ordering FROM links ORDER BY ordering ASC, id ASC";

/// CRUD, ordering and click counting over the `links` table.
#[derive(Clone)]
pub struct LinkCatalog {
    store: Store,
}

impl LinkCatalog {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<Link>, LinkHubError> {
        self.store.all(SELECT_LINKS, vec![]).await
    }

    pub async fn list_with_totals(&self) -> Result<(Vec<Link>, DashboardStats), LinkHubError> {
        let links = self.list().await?;
        let stats = DashboardStats {
            total_links: links.len(),
            total_clicks: links.iter().map(|l| l.clicks).sum(),
        };
        Ok((links, stats))
    }

    pub async fn get(&self, id: i64) -> Result<Link, LinkHubError> {
        self.store
            .one(
                "SELECT id, title, url, image, clicks, ordering FROM links WHERE id = ?",
                vec![id.into()],
            )
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// New links go to the end of the list.
    pub async fn create(
        &self,
        title: &str,
        url: &str,
        image: Option<&str>,
    ) -> Result<i64, LinkHubError> {
        let (title, url) = validate(title, url)?;
        let id = self
            .store
            .insert_returning_id(
                r#"INSERT INTO links (title, url, image, ordering)
                   VALUES (?, ?, ?, (SELECT COALESCE(MAX(ordering) + 1, 0) FROM links))
                   RETURNING id"#,
                vec![title.into(), url.into(), non_empty(image).into()],
            )
            .await?;
        info!(id, "link created");
        Ok(id)
    }

    pub async fn update(
        &self,
        id: i64,
        title: &str,
        url: &str,
        image: Option<&str>,
    ) -> Result<(), LinkHubError> {
        let (title, url) = validate(title, url)?;
        let affected = self
            .store
            .execute(
                "UPDATE links SET title = ?, url = ?, image = ? WHERE id = ?",
                vec![title.into(), url.into(), non_empty(image).into(), id.into()],
            )
            .await?;
        if affected == 0 {
            return Err(not_found(id));
        }
        info!(id, "link updated");
        Ok(())
    }

    /// Delete a link and hand back its image so the caller can clean it up
    /// once the row is gone.
    pub async fn delete(&self, id: i64) -> Result<Option<String>, LinkHubError> {
        let (image,): (Option<String>,) = self
            .store
            .one("SELECT image FROM links WHERE id = ?", vec![id.into()])
            .await?
            .ok_or_else(|| not_found(id))?;
        let affected = self
            .store
            .execute("DELETE FROM links WHERE id = ?", vec![id.into()])
            .await?;
        if affected == 0 {
            return Err(not_found(id));
        }
        info!(id, "link deleted");
        Ok(image.filter(|i| !i.trim().is_empty()))
    }

    /// Returns whether a row was touched.
    pub async fn record_click(&self, id: i64) -> Result<bool, LinkHubError> {
        let affected = self
            .store
            .execute(
                "UPDATE links SET clicks = clicks + 1 WHERE id = ?",
                vec![id.into()],
            )
            .await?;
        Ok(affected > 0)
    }

    pub async fn resolve_redirect_target(&self, id: i64) -> Result<String, LinkHubError> {
        let (url,): (String,) = self
            .store
            .one("SELECT url FROM links WHERE id = ?", vec![id.into()])
            .await?
            .ok_or_else(|| not_found(id))?;
        Ok(url)
    }

    /// Whether any link, or the profile, still points at `url`.
    pub async fn image_in_use(&self, url: &str) -> Result<bool, LinkHubError> {
        let (in_use,): (bool,) = self
            .store
            .one(
                r#"SELECT EXISTS(SELECT 1 FROM links WHERE image = ?)
                       OR EXISTS(SELECT 1 FROM profile WHERE profile_image_url = ?)"#,
                vec![url.into(), url.into()],
            )
            .await?
            .ok_or_else(|| LinkHubError::Internal("reference check returned no row".into()))?;
        Ok(in_use)
    }

    /// `ordering = position` for every id, in one transaction. Unknown ids
    /// match no row; ids left out keep their current ordering.
    pub async fn reorder(&self, ids: &[i64]) -> Result<(), LinkHubError> {
        if ids.is_empty() {
            return Err(LinkHubError::Validation("order must not be empty".into()));
        }
        let batches = ids
            .iter()
            .enumerate()
            .map(|(position, id)| vec![Param::Int(position as i64), Param::Int(*id)])
            .collect();
        let affected = self
            .store
            .execute_batch("UPDATE links SET ordering = ? WHERE id = ?", batches)
            .await?;
        info!(requested = ids.len(), affected, "links reordered");
        Ok(())
    }
}

fn not_found(id: i64) -> LinkHubError {
    LinkHubError::NotFound(format!("link {id}"))
}

fn validate<'a>(title: &'a str, url: &'a str) -> Result<(&'a str, &'a str), LinkHubError> {
    let (title, url) = (title.trim(), url.trim());
    if title.is_empty() || url.is_empty() {
        return Err(LinkHubError::Validation("title and url are required.".into()));
    }
    Ok((title, url))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
