pub mod auth;
pub mod links;
pub mod profile;

pub use auth::{AdminAuth, ApiKey};
pub use links::LinkCatalog;
pub use profile::ProfileService;
