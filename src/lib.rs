pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod media;
pub mod middleware;
pub mod router;
pub mod service;
pub mod views;

pub use error::LinkHubError;
