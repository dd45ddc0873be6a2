use maud::{DOCTYPE, Markup, PreEscaped, html};

use crate::listing::Listing;

// ── Shared page shell ──────────────────────────────────────────────────────────

fn shell(title: &str, body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) " — Admin" }
                style { (PreEscaped(BASE_CSS)) }
            }
            body {
                (body)
            }
        }
    }
}

fn topbar(active: &str) -> Markup {
    html! {
        header class="topbar" {
            span class="brand" { "Ship listings" span { " · admin" } }
            nav {
                a href="/admin/panel" class=[(active == "panel").then_some("active")] { "Listings" }
                a href="/admin/trash" class=[(active == "trash").then_some("active")] { "Trash" }
                a href="/" { "View site" }
            }
            form method="post" action="/admin/logout" {
                button type="submit" class="btn-secondary" { "Sign out" }
            }
        }
    }
}

// ── Login page ─────────────────────────────────────────────────────────────────

pub fn login_page(error: Option<&str>) -> Markup {
    shell(
        "Login",
        html! {
            div class="login-wrap" {
                div class="brand" { "Ship listings" span { " · admin" } }
                form method="post" action="/admin/login" class="stack" {
                    @if let Some(err) = error {
                        p class="error" { (err) }
                    }
                    label for="username" { "Username" }
                    input type="text" id="username" name="username"
                        autocomplete="username" autofocus required;
                    label for="password" { "Password" }
                    input type="password" id="password" name="password"
                        autocomplete="current-password" required;
                    button type="submit" { "Sign in" }
                }
            }
        },
    )
}

// ── Listings ───────────────────────────────────────────────────────────────────

pub fn panel(listings: &[Listing], error: Option<&str>) -> Markup {
    shell(
        "Listings",
        html! {
            (topbar("panel"))
            main {
                section class="card" {
                    h2 { "New listing" }
                    @if let Some(err) = error {
                        p class="error" { (err) }
                    }
                    form method="post" action="/admin/ships" class="grid" {
                        (field("title", "Title", true))
                        (field("price", "Price", true))
                        (field("year", "Year", true))
                        (field("image", "Image path or URL", true))
                        (field("length", "Length", false))
                        (field("type", "Type", false))
                        (field("flag", "Flag", false))
                        (field("location", "Location", false))
                        (field("engine", "Engine", false))
                        (field("condition", "Condition", false))
                        label class="wide" {
                            "Description"
                            textarea name="description" rows="3" {}
                        }
                        button type="submit" class="wide" { "Publish" }
                    }
                }
                section {
                    h2 { "Active listings (" (listings.len()) ")" }
                    (listing_table(listings, |l| html! {
                        form method="post" action=(format!("/admin/ships/{}/trash", l.id)) {
                            button type="submit" class="btn-secondary" { "Move to trash" }
                        }
                    }))
                }
            }
        },
    )
}

pub fn trash(listings: &[Listing]) -> Markup {
    shell(
        "Trash",
        html! {
            (topbar("trash"))
            main {
                section {
                    h2 { "Trash (" (listings.len()) ")" }
                    p class="muted" { "Deleting permanently cannot be undone." }
                    (listing_table(listings, |l| html! {
                        form method="post" action=(format!("/admin/ships/{}/restore", l.id)) {
                            button type="submit" class="btn-secondary" { "Restore" }
                        }
                        form method="post" action=(format!("/admin/ships/{}/purge", l.id)) {
                            button type="submit" class="btn-danger" { "Delete permanently" }
                        }
                    }))
                }
            }
        },
    )
}

fn field(name: &str, label: &str, required: bool) -> Markup {
    html! {
        label {
            (label)
            input type="text" name=(name) required[required];
        }
    }
}

fn listing_table(listings: &[Listing], actions: impl Fn(&Listing) -> Markup) -> Markup {
    html! {
        @if listings.is_empty() {
            p class="muted" { em { "Nothing here." } }
        } @else {
            table {
                thead {
                    tr { th {} th { "#" } th { "Title" } th { "Price" } th { "Year" } th { "Type" } th {} }
                }
                tbody {
                    @for l in listings {
                        tr {
                            td { img src=(l.image_src()) alt="" class="thumb"; }
                            td { (l.id) }
                            td { (l.title) }
                            td { (l.price) }
                            td { (l.year) }
                            td { (l.kind) }
                            td class="actions" { (actions(l)) }
                        }
                    }
                }
            }
        }
    }
}

const BASE_CSS: &str = r#"
*, *::before, *::after { box-sizing: border-box; margin: 0; padding: 0; }

:root {
  --bg:        #0d0f14;
  --surface:   #141720;
  --surface-2: #1b2030;
  --border:    #242a3d;
  --text:      #dde1ed;
  --muted:     #68718f;
  --accent:    #4c9ac9;
  --danger:    #e05555;
}

body { font-family: system-ui, sans-serif; background: var(--bg); color: var(--text); }
a { color: var(--accent); text-decoration: none; }
h2 { font-size: 1rem; margin-bottom: 0.75rem; }
main { max-width: 1080px; margin: 0 auto; padding: 1.5rem; display: grid; gap: 1.5rem; }

.brand { font-weight: 800; }
.brand span { color: var(--accent); font-weight: 400; }
.topbar {
  display: flex; align-items: center; gap: 1.5rem;
  padding: 0.75rem 1.5rem; border-bottom: 1px solid var(--border); background: var(--surface);
}
.topbar nav { display: flex; gap: 1rem; flex: 1; }
.topbar nav a { color: var(--muted); }
.topbar nav a.active { color: var(--text); }

.card, .login-wrap { background: var(--surface); border: 1px solid var(--border); border-radius: 12px; padding: 1.5rem; }
.login-wrap { max-width: 360px; margin: 12vh auto 0; }
.stack { display: flex; flex-direction: column; gap: 0.5rem; margin-top: 1.5rem; }
.grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(220px, 1fr)); gap: 0.75rem; }
.grid label { display: flex; flex-direction: column; gap: 0.25rem; font-size: 0.8rem; color: var(--muted); }
.wide { grid-column: 1 / -1; }

input, textarea {
  padding: 0.5rem 0.75rem; background: var(--surface-2); color: var(--text);
  border: 1px solid var(--border); border-radius: 6px; font: inherit;
}
button {
  padding: 0.5rem 1rem; border: 0; border-radius: 6px; cursor: pointer;
  background: var(--accent); color: #fff; font: inherit;
}
.btn-secondary { background: var(--surface-2); color: var(--text); border: 1px solid var(--border); }
.btn-danger { background: var(--danger); }

table { width: 100%; border-collapse: collapse; }
th, td { text-align: left; padding: 0.5rem; border-bottom: 1px solid var(--border); vertical-align: middle; }
th { font-size: 0.75rem; color: var(--muted); text-transform: uppercase; }
td.actions { display: flex; gap: 0.5rem; justify-content: flex-end; }
.thumb { width: 64px; height: 40px; object-fit: cover; border-radius: 4px; }

.error { color: var(--danger); }
.muted { color: var(--muted); margin-bottom: 0.75rem; }
"#;
