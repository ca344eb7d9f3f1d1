//! SQL DDL for the link and profile tables.

/// SQLite schema with:
/// - `links.id` INTEGER PRIMARY KEY AUTOINCREMENT
/// - `clicks` and `ordering` defaulting to 0
/// - `profile.id` fixed to 1 by the seeding insert (singleton row)
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS links (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    url TEXT NOT NULL,
    image TEXT NULL,
    clicks INTEGER NOT NULL DEFAULT 0 CHECK (clicks >= 0),
    ordering INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS profile (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    username TEXT NOT NULL,
    description TEXT NULL,
    profile_image_url TEXT NULL
);
"#;

pub const SEED_PROFILE: &str = r#"
INSERT INTO profile (id, username, description, profile_image_url)
VALUES (1, ?, ?, ?)
ON CONFLICT(id) DO NOTHING
"#;

pub const DEFAULT_USERNAME: &str = "@MyProfile";
pub const DEFAULT_DESCRIPTION: &str =
    "Everything about me, in one place. Edit this from the admin page.";
/// Bundled placeholder avatar. Never deleted from media storage.
pub const DEFAULT_PROFILE_IMAGE: &str = "/default-profile.png";
