//! HTML pages, rendered with maud (all interpolated values are escaped).

use axum::http::StatusCode;
use maud::{DOCTYPE, Markup, PreEscaped, html};

use crate::db::{DEFAULT_PROFILE_IMAGE, DashboardStats, Link, Profile};

const STYLE: &str = r#"
body{font-family:system-ui,sans-serif;max-width:640px;margin:0 auto;padding:24px;background:#f6f6f8;color:#222}
.profile{text-align:center;margin-bottom:24px}
.profile img{width:96px;height:96px;border-radius:50%;object-fit:cover}
.links a.link{display:flex;align-items:center;gap:12px;padding:14px;margin:10px 0;background:#fff;border-radius:12px;text-decoration:none;color:inherit;box-shadow:0 1px 3px rgba(0,0,0,.1)}
.links img{width:40px;height:40px;border-radius:8px;object-fit:cover}
.error{color:#b00020}
table{width:100%;border-collapse:collapse}td,th{padding:6px;border-bottom:1px solid #ddd;text-align:left}
form.inline{display:inline}
"#;

// Up/down buttons post the new order as JSON.
const REORDER_SCRIPT: &str = r#"
function moveRow(btn, dir) {
  const row = btn.closest('tr');
  const sibling = dir < 0 ? row.previousElementSibling : row.nextElementSibling;
  if (!sibling) return;
  if (dir < 0) row.parentNode.insertBefore(row, sibling);
  else row.parentNode.insertBefore(sibling, row);
  const order = Array.from(document.querySelectorAll('#link-rows tr')).map(r => Number(r.dataset.id));
  fetch('/admin/update-order', {
    method: 'POST',
    headers: {'Content-Type': 'application/json'},
    body: JSON.stringify({order})
  });
}
"#;

fn layout(title: &str, body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                style { (PreEscaped(STYLE)) }
            }
            body { (body) }
        }
    }
}

fn avatar(profile: &Profile) -> &str {
    profile
        .profile_image_url
        .as_deref()
        .unwrap_or(DEFAULT_PROFILE_IMAGE)
}

pub fn index(profile: &Profile, links: &[Link]) -> Markup {
    layout(
        &profile.username,
        html! {
            header.profile {
                img src=(avatar(profile)) alt="profile";
                h1 { (profile.username) }
                @if let Some(description) = &profile.description {
                    p { (description) }
                }
            }
            nav.links {
                @for link in links {
                    a.link href={ "/click/" (link.id) } {
                        @if let Some(image) = &link.image {
                            img src=(image) alt="";
                        }
                        span { (link.title) }
                    }
                }
            }
        },
    )
}

pub fn login(error: Option<&str>) -> Markup {
    layout(
        "Admin login",
        html! {
            h1 { "Admin login" }
            @if let Some(error) = error {
                p.error { (error) }
            }
            form method="post" action="/login" {
                input type="password" name="password" placeholder="Password" autofocus required;
                button type="submit" { "Log in" }
            }
        },
    )
}

pub fn admin(profile: &Profile, links: &[Link], stats: DashboardStats) -> Markup {
    layout(
        "Admin",
        html! {
            p { a href="/" { "View page" } " · " a href="/logout" { "Log out" } }
            h1 { "Dashboard" }
            p { "Links: " strong { (stats.total_links) } " · Total clicks: " strong { (stats.total_clicks) } }

            h2 { "Profile" }
            form method="post" action="/admin/update-profile" enctype="multipart/form-data" {
                img src=(avatar(profile)) alt="profile" width="64" height="64";
                input type="hidden" name="currentImage" value=(avatar(profile));
                p { input type="text" name="username" value=(profile.username) required; }
                p { textarea name="description" { (profile.description.as_deref().unwrap_or_default()) } }
                p { input type="file" name="profile_image" accept="image/*"; }
                button type="submit" { "Save profile" }
            }

            h2 { "Add link" }
            form method="post" action="/admin/add" enctype="multipart/form-data" {
                p { input type="text" name="title" placeholder="Title" required; }
                p { input type="url" name="url" placeholder="https://" required; }
                p { input type="file" name="image" accept="image/*"; }
                button type="submit" { "Add" }
            }

            h2 { "Links" }
            table {
                thead { tr { th { "Order" } th { "Title" } th { "Clicks" } th {} } }
                tbody id="link-rows" {
                    @for link in links {
                        tr data-id=(link.id) {
                            td {
                                button type="button" onclick="moveRow(this,-1)" { "↑" }
                                button type="button" onclick="moveRow(this,1)" { "↓" }
                            }
                            td { a href=(link.url) { (link.title) } }
                            td { (link.clicks) }
                            td {
                                a href={ "/admin/edit/" (link.id) } { "Edit" }
                                " "
                                form.inline method="post" action={ "/admin/delete/" (link.id) } {
                                    button type="submit" { "Delete" }
                                }
                            }
                        }
                    }
                }
            }
            script { (PreEscaped(REORDER_SCRIPT)) }
        },
    )
}

pub fn edit_link(link: &Link) -> Markup {
    layout(
        "Edit link",
        html! {
            h1 { "Edit link" }
            form method="post" action={ "/admin/edit/" (link.id) } enctype="multipart/form-data" {
                input type="hidden" name="currentImage" value=(link.image.as_deref().unwrap_or_default());
                p { input type="text" name="title" value=(link.title) required; }
                p { input type="url" name="url" value=(link.url) required; }
                @if let Some(image) = &link.image {
                    p { img src=(image) alt="" width="64" height="64"; }
                }
                p { input type="file" name="image" accept="image/*"; }
                button type="submit" { "Save" }
                " "
                a href="/admin" { "Cancel" }
            }
        },
    )
}

pub fn error_page(status: StatusCode, message: &str) -> Markup {
    layout(
        status.canonical_reason().unwrap_or("Error"),
        html! {
            h1 { (status.as_u16()) }
            p { (message) }
            p { a href="/" { "Home" } }
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> Profile {
        Profile {
            id: 1,
            username: "@me".into(),
            description: Some("<b>hi</b>".into()),
            profile_image_url: None,
        }
    }

    #[test]
    fn index_escapes_user_content() {
        let links = vec![Link {
            id: 7,
            title: "<script>x</script>".into(),
            url: "https://x".into(),
            image: None,
            clicks: 0,
            ordering: 0,
        }];
        let page = index(&profile(), &links).into_string();
        assert!(page.contains("&lt;b&gt;hi&lt;/b&gt;"));
        assert!(!page.contains("<script>x</script>"));
        assert!(page.contains(r#"href="/click/7""#));
        assert!(page.contains(DEFAULT_PROFILE_IMAGE));
    }

    #[test]
    fn login_shows_error_only_when_present() {
        assert!(!login(None).into_string().contains("class=\"error\""));
        assert!(
            login(Some("Incorrect password."))
                .into_string()
                .contains("Incorrect password.")
        );
    }
}
