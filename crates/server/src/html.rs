// crates/server/src/html.rs
//! Minimal HTML rendering for the read-only pages.

use std::fmt::Write;

/// Escape text for use in HTML element content and quoted attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Nav entries: (href, label).
const NAV: [(&str, &str); 2] = [("/", "All Companies"), ("/dashboard", "Dashboards")];

/// Wrap `body` in the shared page layout. `active` is the href of the
/// current nav entry, if any.
pub fn page(title: &str, active: Option<&str>, body: &str) -> String {
    let mut nav = String::new();
    for (href, label) in NAV {
        let class = if active == Some(href) { "nav-link active" } else { "nav-link" };
        let _ = write!(
            nav,
            r#"<li class="nav-item"><a class="{class}" href="{href}">{label}</a></li>"#
        );
    }
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>{title}</title>
  <link href="https://cdn.jsdelivr.net/npm/bootstrap@5.3.0/dist/css/bootstrap.min.css" rel="stylesheet">
</head>
<body>
<nav class="navbar navbar-expand-lg navbar-dark bg-primary mb-4">
  <div class="container-fluid">
    <a class="navbar-brand" href="/">Company Reviews</a>
    <ul class="navbar-nav me-auto mb-2 mb-lg-0">{nav}</ul>
  </div>
</nav>
<div class="container">
{body}
</div>
</body>
</html>
"#,
        title = escape(title),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(escape(r#"<a href="x">Tom & Jerry's</a>"#), "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#39;s&lt;/a&gt;");
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn test_page_marks_active_nav() {
        let html = page("Dash", Some("/dashboard"), "<p>hi</p>");
        assert!(html.contains(r#"<a class="nav-link active" href="/dashboard">"#));
        assert!(html.contains(r#"<a class="nav-link" href="/">"#));
        assert!(html.contains("<title>Dash</title>"));
        assert!(html.contains("<p>hi</p>"));
    }

    #[test]
    fn test_page_escapes_title() {
        let html = page("A<B", None, "");
        assert!(html.contains("<title>A&lt;B</title>"));
    }
}
