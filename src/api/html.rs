use axum::response::Html;
use html_escape::{encode_double_quoted_attribute, encode_text};

const STYLE: &str = "body{font-family:system-ui,sans-serif;margin:0;color:#222}\
header{background:#1f3b57;color:#fff;padding:.75rem 1.5rem}\
header a{color:#fff;margin-right:1rem}\
.layout{display:flex;gap:1.5rem;padding:1.5rem}\
aside{min-width:16rem;max-width:18rem}\
main{flex:1;overflow-x:auto}\
label{display:block;margin:.5rem 0 .2rem}\
input,select,textarea{width:100%;box-sizing:border-box;padding:.3rem}\
button{margin-top:.6rem;padding:.4rem .9rem}\
.alert{padding:.6rem .9rem;border-radius:4px;margin:.6rem 0}\
.alert-success{background:#e6f4ea}.alert-danger{background:#fdecea}\
.alert-warning{background:#fff4e5}.muted{color:#666;font-size:.9rem}\
table{border-collapse:collapse;width:100%}\
th,td{border:1px solid #ddd;padding:.35rem .5rem;text-align:left;vertical-align:top}\
pre.markdown{white-space:pre-wrap;background:#fafafa;padding:1rem;border:1px solid #eee}";

pub fn text(s: &str) -> String {
    encode_text(s).into_owned()
}

pub fn attr(s: &str) -> String {
    encode_double_quoted_attribute(s).into_owned()
}

#[derive(Debug, Clone, Copy)]
pub enum AlertKind {
    Success,
    Danger,
    Warning,
}

impl AlertKind {
    fn class(&self) -> &'static str {
        match self {
            AlertKind::Success => "alert alert-success",
            AlertKind::Danger => "alert alert-danger",
            AlertKind::Warning => "alert alert-warning",
        }
    }
}

pub fn alert(kind: AlertKind, message: &str) -> String {
    let role = match kind {
        AlertKind::Success => "status",
        _ => "alert",
    };
    format!(r#"<div class="{}" role="{}">{}</div>"#, kind.class(), role, text(message))
}

pub fn muted(message: &str) -> String {
    format!(r#"<p class="muted">{}</p>"#, text(message))
}

/// Renders a table; every cell is escaped. `extra` is appended raw to each
/// row and must already be safe markup.
pub fn table<'a, I>(columns: &[&str], rows: I, extra_header: Option<&str>) -> String
where
    I: IntoIterator<Item = (Vec<&'a str>, Option<String>)>,
{
    let mut out = String::from("<table><thead><tr>");
    for column in columns {
        out.push_str(&format!("<th>{}</th>", text(column)));
    }
    if let Some(extra) = extra_header {
        out.push_str(&format!("<th>{}</th>", text(extra)));
    }
    out.push_str("</tr></thead><tbody>");
    for (cells, extra) in rows {
        out.push_str("<tr>");
        for cell in cells {
            out.push_str(&format!("<td>{}</td>", text(cell)));
        }
        if let Some(extra) = extra {
            out.push_str(&format!("<td>{}</td>", extra));
        }
        out.push_str("</tr>");
    }
    out.push_str("</tbody></table>");
    out
}

pub struct Tab<'a> {
    pub href: &'a str,
    pub label: &'a str,
    pub active: bool,
}

pub fn page(title: &str, tabs: &[Tab<'_>], sidebar: &str, content: &str) -> Html<String> {
    let nav: String = tabs
        .iter()
        .map(|tab| {
            let label = if tab.active {
                format!("<strong>{}</strong>", text(tab.label))
            } else {
                text(tab.label)
            };
            format!(r#"<a href="{}">{}</a>"#, attr(tab.href), label)
        })
        .collect();

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>{STYLE}</style>
</head>
<body>
<header><h1>{title}</h1><nav>{nav}</nav></header>
<div class="layout">
<aside>{sidebar}</aside>
<main>{content}</main>
</div>
</body>
</html>"#,
        title = text(title),
        STYLE = STYLE,
        nav = nav,
        sidebar = sidebar,
        content = content,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_escapes_cells() {
        let html = table(
            &["Name"],
            vec![(vec!["<script>alert(1)</script>"], None)],
            None,
        );
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_alert_escapes_message() {
        let html = alert(AlertKind::Danger, "HTTP error: 500 & <down>");
        assert!(html.contains("alert-danger"));
        assert!(html.contains("500 &amp; &lt;down&gt;"));
    }
}
