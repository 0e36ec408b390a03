//! Externals map and HTML tag generation.
//!
//! From the resolved modules this builds the two artifacts the host needs:
//! the import name -> global variable map used for externalization, and the
//! `<script>`/`<link>` descriptors injected into the HTML document.

use crate::module::ResolvedModule;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Import name -> global variable, sorted by import name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ExternalMap(BTreeMap<String, String>);

impl ExternalMap {
    /// Map `name` to `var`, replacing any earlier entry.
    pub fn insert(&mut self, name: impl Into<String>, var: impl Into<String>) {
        self.0.insert(name.into(), var.into());
    }

    /// Global variable for an import name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Build the externals map: each module name and each alias maps to the
/// module's global variable.
#[must_use]
pub fn build_external_map(modules: &[ResolvedModule]) -> ExternalMap {
    let mut map = ExternalMap::default();
    for module in modules {
        map.insert(&module.name, &module.var);
        for alias in &module.alias {
            map.insert(alias, &module.var);
        }
    }
    map
}

/// Element kind of a tag descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HtmlTag {
    Script,
    Link,
}

impl HtmlTag {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Script => "script",
            Self::Link => "link",
        }
    }
}

/// Where a tag is placed in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InjectTo {
    /// Before `</head>`.
    Head,
    /// Before `</body>`.
    Body,
    /// Right after `<head>`.
    #[default]
    HeadPrepend,
    /// Right after `<body>`.
    BodyPrepend,
}

/// An HTML element to inject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HtmlTagDescriptor {
    pub tag: HtmlTag,
    pub attrs: BTreeMap<String, String>,
    pub inject_to: InjectTo,
}

/// Caller overrides for one tag. Attributes are merged over the defaults;
/// `inject_to`, when set, replaces the default placement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TagOverrides {
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inject_to: Option<InjectTo>,
}

impl TagOverrides {
    /// Set one attribute.
    #[must_use]
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn inject_to(mut self, inject_to: InjectTo) -> Self {
        self.inject_to = Some(inject_to);
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty() && self.inject_to.is_none()
    }
}

/// Per-tag customization hook.
///
/// Both methods default to no overrides, so implementors only write the one
/// they need.
pub trait TagCustomizer: Send + Sync {
    /// Overrides for the script tag of `url` belonging to module `name`.
    fn script_tag(&self, _name: &str, _url: &str) -> TagOverrides {
        TagOverrides::default()
    }

    /// Overrides for the stylesheet link tag of `url`.
    fn css_link_tag(&self, _name: &str, _url: &str) -> TagOverrides {
        TagOverrides::default()
    }
}

/// The default customizer: no overrides.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCustomization;

impl TagCustomizer for NoCustomization {}

/// Applies the same overrides to every tag of a kind.
#[derive(Debug, Clone, Default)]
pub struct StaticTagOverrides {
    pub script: TagOverrides,
    pub css_link: TagOverrides,
}

impl TagCustomizer for StaticTagOverrides {
    fn script_tag(&self, _name: &str, _url: &str) -> TagOverrides {
        self.script.clone()
    }

    fn css_link_tag(&self, _name: &str, _url: &str) -> TagOverrides {
        self.css_link.clone()
    }
}

fn descriptor(
    tag: HtmlTag,
    defaults: &[(&str, &str)],
    overrides: TagOverrides,
) -> HtmlTagDescriptor {
    let mut attrs: BTreeMap<String, String> = defaults
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    attrs.extend(overrides.attrs);

    HtmlTagDescriptor {
        tag,
        attrs,
        inject_to: overrides.inject_to.unwrap_or_default(),
    }
}

/// Build tag descriptors for every rendered URL: per module its script tags
/// first, then its stylesheet links.
#[must_use]
pub fn build_tags(
    modules: &[ResolvedModule],
    customizer: &dyn TagCustomizer,
) -> Vec<HtmlTagDescriptor> {
    let mut tags = Vec::new();

    for module in modules {
        for url in &module.path_list {
            tags.push(descriptor(
                HtmlTag::Script,
                &[("src", url.as_str()), ("crossorigin", "anonymous")],
                customizer.script_tag(&module.name, url),
            ));
        }
        for url in &module.css_list {
            tags.push(descriptor(
                HtmlTag::Link,
                &[("href", url.as_str()), ("rel", "stylesheet"), ("crossorigin", "anonymous")],
                customizer.css_link_tag(&module.name, url),
            ));
        }
    }

    tags
}
