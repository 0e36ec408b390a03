//! CDN URL rendering.

/// Default URL template (jsDelivr npm mirror).
pub const DEFAULT_PROD_URL: &str = "https://cdn.jsdelivr.net/npm/{name}@{version}/{path}";

/// Whether `path` is already a fully qualified URL.
#[must_use]
pub fn is_full_url(path: &str) -> bool {
    path.starts_with("http:") || path.starts_with("https:") || path.starts_with("//")
}

/// Render one asset URL.
///
/// A fully qualified `path` is returned verbatim and the template is ignored.
/// Otherwise every `{name}`, `{version}` and `{path}` in `template` is
/// substituted.
#[must_use]
pub fn render_url(template: &str, name: &str, version: &str, path: &str) -> String {
    if is_full_url(path) {
        return path.to_string();
    }

    template
        .replace("{name}", name)
        .replace("{version}", version)
        .replace("{path}", path)
}
