use crate::db::schema::{
    DEFAULT_DESCRIPTION, DEFAULT_PROFILE_IMAGE, DEFAULT_USERNAME, SEED_PROFILE, SQLITE_INIT,
};
use crate::error::LinkHubError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{FromRow, Pool, Sqlite};
use std::str::FromStr;
use tracing::info;

pub type SqlitePool = Pool<Sqlite>;

/// A single bound query parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Param {
    Int(i64),
    Text(Option<String>),
}

impl From<i64> for Param {
    fn from(v: i64) -> Self {
        Param::Int(v)
    }
}

impl From<&str> for Param {
    fn from(v: &str) -> Self {
        Param::Text(Some(v.to_string()))
    }
}

impl From<String> for Param {
    fn from(v: String) -> Self {
        Param::Text(Some(v))
    }
}

impl From<Option<String>> for Param {
    fn from(v: Option<String>) -> Self {
        Param::Text(v)
    }
}

impl From<Option<&str>> for Param {
    fn from(v: Option<&str>) -> Self {
        Param::Text(v.map(str::to_string))
    }
}

// `Query`, `QueryAs` and `QueryScalar` share a `bind` method but no trait for it.
macro_rules! bind_params {
    ($query:expr, $params:expr) => {{
        let mut query = $query;
        for param in $params {
            query = match param {
                Param::Int(v) => query.bind(v),
                Param::Text(v) => query.bind(v),
            };
        }
        query
    }};
}

/// Open a pool for `database_url`, creating the database file if needed.
///
/// In-memory databases are pinned to a single long-lived connection, since
/// every SQLite connection to `:memory:` sees its own empty database.
pub async fn connect(database_url: &str) -> Result<Store, LinkHubError> {
    let connect_opts = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    let mut pool_opts = SqlitePoolOptions::new();
    if database_url.contains(":memory:") {
        pool_opts = pool_opts
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
    }
    let pool = pool_opts.connect_with(connect_opts).await?;
    Ok(Store::new(pool))
}

#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create both tables and the default profile row, all or nothing.
    /// Safe to run on every start.
    pub async fn init_schema(&self) -> Result<(), LinkHubError> {
        let mut tx = self.pool.begin().await?;
        // sqlx::query runs one statement at a time
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&mut *tx).await?;
        }
        let seeded = sqlx::query(SEED_PROFILE)
            .bind(DEFAULT_USERNAME)
            .bind(DEFAULT_DESCRIPTION)
            .bind(DEFAULT_PROFILE_IMAGE)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        tx.commit().await?;

        info!(seeded_profile = seeded > 0, "database schema ready");
        Ok(())
    }

    pub async fn all<T>(&self, sql: &str, params: Vec<Param>) -> Result<Vec<T>, LinkHubError>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        let rows = bind_params!(sqlx::query_as::<_, T>(sql), params)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// First row, or `None` when the query matched nothing.
    pub async fn one<T>(&self, sql: &str, params: Vec<Param>) -> Result<Option<T>, LinkHubError>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        let row = bind_params!(sqlx::query_as::<_, T>(sql), params)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Run a mutation and return the number of affected rows.
    pub async fn execute(&self, sql: &str, params: Vec<Param>) -> Result<u64, LinkHubError> {
        let done = bind_params!(sqlx::query(sql), params)
            .execute(&self.pool)
            .await?;
        Ok(done.rows_affected())
    }

    /// Run an insert whose statement ends in `RETURNING id`.
    pub async fn insert_returning_id(
        &self,
        sql: &str,
        params: Vec<Param>,
    ) -> Result<i64, LinkHubError> {
        let id: i64 = bind_params!(sqlx::query_scalar::<_, i64>(sql), params)
            .fetch_one(&self.pool)
            .await?;
        Ok(id)
    }

    /// Run the same statement once per parameter set inside one transaction.
    /// Returns the total number of affected rows.
    pub async fn execute_batch(
        &self,
        sql: &str,
        batches: Vec<Vec<Param>>,
    ) -> Result<u64, LinkHubError> {
        let mut tx = self.pool.begin().await?;
        let mut affected = 0;
        for params in batches {
            affected += bind_params!(sqlx::query(sql), params)
                .execute(&mut *tx)
                .await?
                .rows_affected();
        }
        tx.commit().await?;
        Ok(affected)
    }
}

#[cfg(test)]
pub(crate) async fn memory_store() -> Store {
    let store = connect("sqlite::memory:").await.expect("open in-memory db");
    store.init_schema().await.expect("init schema");
    store
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{Link, Profile};

    #[tokio::test]
    async fn init_schema_is_idempotent() {
        let store = memory_store().await;
        store.init_schema().await.expect("second init");

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM profile")
            .fetch_one(store.pool())
            .await
            .unwrap();
        assert_eq!(count.0, 1);

        let tables: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'links'",
        )
        .fetch_one(store.pool())
        .await
        .unwrap();
        assert_eq!(tables.0, 1);
    }

    #[tokio::test]
    async fn init_schema_keeps_an_edited_profile() {
        let store = memory_store().await;
        store
            .execute(
                "UPDATE profile SET username = ? WHERE id = 1",
                vec!["@edited".into()],
            )
            .await
            .unwrap();
        store.init_schema().await.unwrap();

        let profile: Profile = store
            .one("SELECT * FROM profile WHERE id = 1", vec![])
            .await
            .unwrap()
            .unwrap();
        assert_eq!(profile.username, "@edited");
    }

    #[tokio::test]
    async fn seeded_profile_uses_defaults() {
        let store = memory_store().await;
        let profile: Profile = store
            .one("SELECT * FROM profile WHERE id = 1", vec![])
            .await
            .unwrap()
            .expect("profile row");
        assert_eq!(profile.username, DEFAULT_USERNAME);
        assert_eq!(
            profile.profile_image_url.as_deref(),
            Some(DEFAULT_PROFILE_IMAGE)
        );
    }

    #[tokio::test]
    async fn one_returns_none_for_zero_rows() {
        let store = memory_store().await;
        let link: Option<Link> = store
            .one("SELECT * FROM links WHERE id = ?", vec![Param::Int(42)])
            .await
            .unwrap();
        assert!(link.is_none());
    }

    #[tokio::test]
    async fn insert_returning_id_and_execute() {
        let store = memory_store().await;
        let id = store
            .insert_returning_id(
                "INSERT INTO links (title, url, image) VALUES (?, ?, ?) RETURNING id",
                vec!["Blog".into(), "https://blog.example".into(), Param::Text(None)],
            )
            .await
            .unwrap();
        assert!(id > 0);

        let affected = store
            .execute("DELETE FROM links WHERE id = ?", vec![id.into()])
            .await
            .unwrap();
        assert_eq!(affected, 1);
    }

    #[tokio::test]
    async fn malformed_sql_is_a_database_error() {
        let store = memory_store().await;
        let err = store
            .all::<Link>("SELECT * FROM nowhere", vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, LinkHubError::Database(_)));
    }

    #[tokio::test]
    async fn execute_batch_rolls_back_on_failure() {
        let store = memory_store().await;
        let id = store
            .insert_returning_id(
                "INSERT INTO links (title, url) VALUES (?, ?) RETURNING id",
                vec!["a".into(), "https://a".into()],
            )
            .await
            .unwrap();

        // second set violates the clicks CHECK constraint
        let result = store
            .execute_batch(
                "UPDATE links SET clicks = ? WHERE id = ?",
                vec![
                    vec![Param::Int(5), id.into()],
                    vec![Param::Int(-1), id.into()],
                ],
            )
            .await;
        assert!(result.is_err());

        let link: Link = store
            .one("SELECT * FROM links WHERE id = ?", vec![id.into()])
            .await
            .unwrap()
            .unwrap();
        assert_eq!(link.clicks, 0);
    }
}
