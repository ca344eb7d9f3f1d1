//! Database module: the persistence adapter over SQLite.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows
//! - `schema.rs`: SQL DDL and the default profile row
//! - `sqlite.rs`: pool setup, schema initialization and the query interface

pub mod models;
pub mod schema;
pub mod sqlite;

pub use models::{DashboardStats, Link, Profile};
pub use schema::{DEFAULT_PROFILE_IMAGE, SQLITE_INIT};
pub use sqlite::{Param, SqlitePool, Store, connect};
