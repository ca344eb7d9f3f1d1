pub mod auth;
pub mod multipart;
