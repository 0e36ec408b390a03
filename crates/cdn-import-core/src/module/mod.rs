//! Module descriptors and their normalization.
//!
//! A module descriptor names one externalized dependency: the package name,
//! the global variable the bundle reads it from, and the asset paths that are
//! rendered into CDN URLs.

mod entry;
mod shortcuts;

pub use entry::{normalize, DeferredModule, ModuleEntry};
pub use shortcuts::{shortcut, shortcut_names, CdnProvider};

use serde::{Deserialize, Serialize};

/// A single string or a list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    /// Iterate over the contained strings in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let slice: &[String] = match self {
            Self::One(s) => std::slice::from_ref(s),
            Self::Many(v) => v,
        };
        slice.iter().map(String::as_str)
    }

    /// Convert into an owned list.
    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(s) => vec![s],
            Self::Many(v) => v,
        }
    }
}

impl From<&str> for OneOrMany {
    fn from(s: &str) -> Self {
        Self::One(s.to_string())
    }
}

impl From<String> for OneOrMany {
    fn from(s: String) -> Self {
        Self::One(s)
    }
}

impl From<Vec<String>> for OneOrMany {
    fn from(v: Vec<String>) -> Self {
        Self::Many(v)
    }
}

impl From<Vec<&str>> for OneOrMany {
    fn from(v: Vec<&str>) -> Self {
        Self::Many(v.into_iter().map(String::from).collect())
    }
}

/// One externalized dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleDescriptor {
    /// Package name, as imported by source code.
    pub name: String,
    /// Global variable that provides the package at runtime.
    pub var: String,
    /// Script asset path(s), relative to the package root or fully qualified.
    pub path: OneOrMany,
    /// Explicit version. Discovered from installed manifests when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Stylesheet asset path(s).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub css: Option<OneOrMany>,
    /// Additional import names that map to the same global.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alias: Vec<String>,
    /// URL template overriding the global one for this module.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prod_url: Option<String>,
}

impl ModuleDescriptor {
    /// Create a descriptor with the required fields.
    pub fn new(
        name: impl Into<String>,
        var: impl Into<String>,
        path: impl Into<OneOrMany>,
    ) -> Self {
        Self {
            name: name.into(),
            var: var.into(),
            path: path.into(),
            version: None,
            css: None,
            alias: Vec::new(),
            prod_url: None,
        }
    }

    /// Pin the version.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Set stylesheet path(s).
    pub fn css(mut self, css: impl Into<OneOrMany>) -> Self {
        self.css = Some(css.into());
        self
    }

    /// Add an alias import name.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias.push(alias.into());
        self
    }

    /// Override the URL template for this module.
    pub fn prod_url(mut self, template: impl Into<String>) -> Self {
        self.prod_url = Some(template.into());
        self
    }
}

/// A descriptor with its version resolved and its URLs rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedModule {
    pub name: String,
    pub var: String,
    /// Resolved version; empty when every asset is a fully qualified URL.
    pub version: String,
    pub alias: Vec<String>,
    /// Rendered script URLs.
    pub path_list: Vec<String>,
    /// Rendered stylesheet URLs.
    pub css_list: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_from_json() {
        let json = r#"{
            "name": "antd",
            "var": "antd",
            "path": ["dist/antd.min.js"],
            "css": "dist/antd.min.css",
            "alias": ["ant-design"],
            "prodUrl": "https://unpkg.com/{name}@{version}/{path}"
        }"#;

        let module: ModuleDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(module.name, "antd");
        assert_eq!(module.path, OneOrMany::Many(vec!["dist/antd.min.js".into()]));
        assert_eq!(module.css, Some(OneOrMany::One("dist/antd.min.css".into())));
        assert_eq!(module.alias, vec!["ant-design"]);
        assert!(module.version.is_none());
        assert_eq!(
            module.prod_url.as_deref(),
            Some("https://unpkg.com/{name}@{version}/{path}")
        );
    }

    #[test]
    fn test_one_or_many_iter() {
        let one = OneOrMany::from("a.js");
        assert_eq!(one.iter().collect::<Vec<_>>(), vec!["a.js"]);

        let many = OneOrMany::from(vec!["a.js", "b.js"]);
        assert_eq!(many.iter().collect::<Vec<_>>(), vec!["a.js", "b.js"]);
        assert_eq!(many.into_vec().len(), 2);
    }

    #[test]
    fn test_builder() {
        let module = ModuleDescriptor::new("react", "React", "umd/react.production.min.js")
            .version("18.2.0")
            .alias("React");
        assert_eq!(module.version.as_deref(), Some("18.2.0"));
        assert_eq!(module.alias, vec!["React"]);
        assert!(module.css.is_none());
    }
}
