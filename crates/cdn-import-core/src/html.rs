//! HTML tag serialization and injection.

use crate::tags::{HtmlTag, HtmlTagDescriptor, InjectTo};
use std::fmt::Write;

/// Escape an attribute value for use inside double quotes.
fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Serialize one tag. `link` is a void element; `script` is always closed.
#[must_use]
pub fn serialize_tag(tag: &HtmlTagDescriptor) -> String {
    let name = tag.tag.as_str();
    let mut out = format!("<{name}");
    for (key, value) in &tag.attrs {
        if value.is_empty() {
            let _ = write!(out, " {key}");
        } else {
            let _ = write!(out, " {key}=\"{}\"", escape_attr(value));
        }
    }
    out.push('>');
    if tag.tag == HtmlTag::Script {
        let _ = write!(out, "</{name}>");
    }
    out
}

/// Byte offset just past the opening `<name ...>` tag, case-insensitive.
fn after_open_tag(html: &str, name: &str) -> Option<usize> {
    let lower = html.to_ascii_lowercase();
    let needle = format!("<{name}");
    let mut from = 0;
    while let Some(rel) = lower[from..].find(&needle) {
        let start = from + rel;
        let next = lower.as_bytes().get(start + needle.len()).copied();
        // Skip e.g. `<header>` when looking for `<head>`.
        if matches!(next, Some(b'>' | b' ' | b'\t' | b'\n' | b'\r' | b'/')) {
            return lower[start..].find('>').map(|end| start + end + 1);
        }
        from = start + needle.len();
    }
    None
}

/// Byte offset of the closing `</name>` tag, case-insensitive.
fn close_tag(html: &str, name: &str) -> Option<usize> {
    html.to_ascii_lowercase().rfind(&format!("</{name}>"))
}

/// Byte offset just past `</name>`.
fn after_close_tag(html: &str, name: &str) -> Option<usize> {
    close_tag(html, name).map(|pos| pos + name.len() + 3)
}

/// Byte offset just past `<!DOCTYPE ...>`.
fn after_doctype(html: &str) -> Option<usize> {
    let lower = html.to_ascii_lowercase();
    let start = lower.find("<!doctype")?;
    lower[start..].find('>').map(|end| start + end + 1)
}

/// Insert head tags into a document without `<head>`: after `<html>`, else
/// after the doctype, else at the very start.
fn insert_headless(out: &mut String, text: &str) {
    match after_open_tag(out, "html").or_else(|| after_doctype(out)) {
        Some(pos) => out.insert_str(pos, text),
        None => out.insert_str(0, &format!("{}\n", text.trim_start())),
    }
}

fn render_group(tags: &[&HtmlTagDescriptor], indent: &str) -> String {
    let mut out = String::new();
    for tag in tags {
        let _ = write!(out, "\n{indent}{}", serialize_tag(tag));
    }
    out
}

/// Insert `tags` into `html` following their `inject_to` placement.
///
/// Tags keep their relative order within each placement. Without `<head>`,
/// head tags go after `<html>`, then after the doctype, then at the start of
/// the document. Without `<body>`, body-prepend tags go after `</head>` and
/// body tags at the end, with prepended tags ahead of appended ones.
#[must_use]
pub fn inject_tags(html: &str, tags: &[HtmlTagDescriptor]) -> String {
    if tags.is_empty() {
        return html.to_string();
    }

    let group = |placement: InjectTo| -> Vec<&HtmlTagDescriptor> {
        tags.iter().filter(|t| t.inject_to == placement).collect()
    };

    let mut out = html.to_string();

    // Insert from the end of the document backwards so earlier offsets stay valid.
    let mut appended_at = None;

    let body_append = group(InjectTo::Body);
    if !body_append.is_empty() {
        let text = render_group(&body_append, "  ");
        match close_tag(&out, "body") {
            Some(pos) => out.insert_str(pos, &format!("{text}\n")),
            None => {
                appended_at = Some(out.len());
                out.push_str(&text);
            }
        }
    }

    let body_prepend = group(InjectTo::BodyPrepend);
    if !body_prepend.is_empty() {
        let text = render_group(&body_prepend, "  ");
        let anchor = after_open_tag(&out, "body")
            .or_else(|| after_close_tag(&out, "head"))
            .unwrap_or_else(|| appended_at.unwrap_or(out.len()));
        out.insert_str(anchor, &text);
    }

    let head_append = group(InjectTo::Head);
    if !head_append.is_empty() {
        let text = render_group(&head_append, "  ");
        match close_tag(&out, "head") {
            Some(pos) => out.insert_str(pos, &format!("{text}\n")),
            None => insert_headless(&mut out, &text),
        }
    }

    let head_prepend = group(InjectTo::HeadPrepend);
    if !head_prepend.is_empty() {
        let text = render_group(&head_prepend, "  ");
        match after_open_tag(&out, "head") {
            Some(pos) => out.insert_str(pos, &text),
            None => insert_headless(&mut out, &text),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn script(src: &str, inject_to: InjectTo) -> HtmlTagDescriptor {
        let mut attrs = BTreeMap::new();
        attrs.insert("crossorigin".to_string(), "anonymous".to_string());
        attrs.insert("src".to_string(), src.to_string());
        HtmlTagDescriptor {
            tag: HtmlTag::Script,
            attrs,
            inject_to,
        }
    }

    const DOC: &str = "<!DOCTYPE html>\n<html>\n<head>\n  <title>x</title>\n</head>\n<body>\n  <div id=\"app\"></div>\n</body>\n</html>\n";

    #[test]
    fn test_serialize_script_and_link() {
        let tag = script("https://cdn/a.js?x=1&y=\"2\"", InjectTo::Head);
        assert_eq!(
            serialize_tag(&tag),
            r#"<script crossorigin="anonymous" src="https://cdn/a.js?x=1&amp;y=&quot;2&quot;"></script>"#
        );

        let mut attrs = BTreeMap::new();
        attrs.insert("href".to_string(), "https://cdn/a.css".to_string());
        attrs.insert("rel".to_string(), "stylesheet".to_string());
        let link = HtmlTagDescriptor {
            tag: HtmlTag::Link,
            attrs,
            inject_to: InjectTo::Head,
        };
        assert_eq!(
            serialize_tag(&link),
            r#"<link href="https://cdn/a.css" rel="stylesheet">"#
        );
    }

    #[test]
    fn test_empty_value_is_boolean_attribute() {
        let mut tag = script("a.js", InjectTo::Head);
        tag.attrs.insert("defer".to_string(), String::new());
        assert!(serialize_tag(&tag).contains(" defer "));
    }

    #[test]
    fn test_head_prepend_keeps_order() {
        let out = inject_tags(
            DOC,
            &[
                script("https://cdn/1.js", InjectTo::HeadPrepend),
                script("https://cdn/2.js", InjectTo::HeadPrepend),
            ],
        );
        let head = out.find("<head>").unwrap();
        let first = out.find("1.js").unwrap();
        let second = out.find("2.js").unwrap();
        let title = out.find("<title>").unwrap();
        assert!(head < first && first < second && second < title);
    }

    #[test]
    fn test_all_placements() {
        let out = inject_tags(
            DOC,
            &[
                script("head.js", InjectTo::Head),
                script("body.js", InjectTo::Body),
                script("body-prepend.js", InjectTo::BodyPrepend),
                script("head-prepend.js", InjectTo::HeadPrepend),
            ],
        );

        let pos = |s: &str| out.find(s).unwrap();
        assert!(pos("head-prepend.js") < pos("<title>"));
        assert!(pos("<title>") < pos("head.js") && pos("head.js") < pos("</head>"));
        assert!(pos("<body>") < pos("body-prepend.js") && pos("body-prepend.js") < pos("<div"));
        assert!(pos("<div") < pos("body.js") && pos("body.js") < pos("</body>"));
    }

    #[test]
    fn test_header_element_is_not_head() {
        let html = "<html><head><title>t</title></head><body><header>h</header></body></html>";
        let out = inject_tags(html, &[script("a.js", InjectTo::HeadPrepend)]);
        assert!(out.find("a.js").unwrap() < out.find("<title>").unwrap());
    }

    #[test]
    fn test_fragment_without_anchors() {
        let out = inject_tags(
            "<div></div>",
            &[
                script("h.js", InjectTo::HeadPrepend),
                script("b.js", InjectTo::Body),
            ],
        );
        assert!(out.starts_with("<script"));
        assert!(out.trim_end().ends_with("</script>"));
        assert!(out.contains("<div></div>"));
    }

    #[test]
    fn test_missing_head_keeps_doctype_first() {
        let html = "<!DOCTYPE html>\n<html lang=\"en\">\n<body>\n  <div id=\"app\"></div>\n</body>\n</html>\n";
        let out = inject_tags(
            html,
            &[
                script("head.js", InjectTo::Head),
                script("head-prepend.js", InjectTo::HeadPrepend),
            ],
        );

        let pos = |s: &str| out.find(s).unwrap();
        assert!(out.starts_with("<!DOCTYPE html>"));
        assert!(pos("<html lang=\"en\">") < pos("head-prepend.js"));
        assert!(pos("head-prepend.js") < pos("head.js"));
        assert!(pos("head.js") < pos("<body>"));
    }

    #[test]
    fn test_doctype_without_html_element() {
        let out = inject_tags(
            "<!doctype html><div></div>",
            &[script("a.js", InjectTo::HeadPrepend)],
        );
        assert!(out.starts_with("<!doctype html>\n  <script"));
        assert!(out.find("a.js").unwrap() < out.find("<div>").unwrap());
    }

    #[test]
    fn test_missing_body_prepends_before_appends() {
        let out = inject_tags(
            "<div></div>",
            &[
                script("body.js", InjectTo::Body),
                script("body-prepend.js", InjectTo::BodyPrepend),
            ],
        );
        let pos = |s: &str| out.find(s).unwrap();
        assert!(pos("<div>") < pos("body-prepend.js"));
        assert!(pos("body-prepend.js") < pos("body.js"));
    }

    #[test]
    fn test_missing_body_prepends_after_head() {
        let html = "<html><head><title>t</title></head><div></div></html>";
        let out = inject_tags(html, &[script("b.js", InjectTo::BodyPrepend)]);
        let pos = |s: &str| out.find(s).unwrap();
        assert!(pos("</head>") < pos("b.js") && pos("b.js") < pos("<div>"));
    }

    #[test]
    fn test_no_tags_is_identity() {
        assert_eq!(inject_tags(DOC, &[]), DOC);
    }
}
