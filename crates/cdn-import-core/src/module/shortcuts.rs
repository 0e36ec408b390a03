//! Built-in presets for popular packages.
//!
//! A preset expands to a [`DeferredModule`] so the file layout can depend on
//! which CDN the URL template points at.

use super::{DeferredModule, ModuleDescriptor};
use crate::error::{Error, Result};
use std::sync::Arc;
use tracing::warn;

struct Preset {
    key: &'static str,
    /// Package name when it differs from the key (e.g. `vue2` is `vue`).
    name: Option<&'static str>,
    var: &'static str,
    path: &'static str,
    css: Option<&'static str>,
}

const fn preset(key: &'static str, var: &'static str, path: &'static str) -> Preset {
    Preset {
        key,
        name: None,
        var,
        path,
        css: None,
    }
}

/// npm file layout, shared by jsDelivr and unpkg.
const PRESETS: &[Preset] = &[
    preset("react", "React", "umd/react.production.min.js"),
    preset("react-dom", "ReactDOM", "umd/react-dom.production.min.js"),
    preset("react-router-dom", "ReactRouterDOM", "umd/react-router-dom.min.js"),
    Preset {
        key: "antd",
        name: None,
        var: "antd",
        path: "dist/antd.min.js",
        css: Some("dist/antd.min.css"),
    },
    preset("ahooks", "ahooks", "dist/ahooks.js"),
    preset("@ant-design/charts", "charts", "dist/charts.min.js"),
    preset("vue", "Vue", "dist/vue.global.prod.js"),
    Preset {
        key: "vue2",
        name: Some("vue"),
        var: "Vue",
        path: "dist/vue.runtime.min.js",
        css: None,
    },
    preset("@vueuse/shared", "VueUse", "index.iife.min.js"),
    preset("@vueuse/core", "VueUse", "index.iife.min.js"),
    preset("moment", "moment", "moment.min.js"),
    preset("eventemitter3", "EventEmitter3", "umd/eventemitter3.min.js"),
    preset("file-saver", "window", "dist/FileSaver.min.js"),
    preset("browser-md5-file", "browserMD5File", "dist/index.umd.js"),
    preset("xlsx", "XLSX", "dist/xlsx.full.min.js"),
    preset("axios", "axios", "dist/axios.min.js"),
    preset("lodash", "_", "lodash.min.js"),
    preset("crypto-js", "crypto-js", "crypto-js.min.js"),
    preset("localforage", "localforage", "dist/localforage.min.js"),
];

/// CDN recognized from a URL template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CdnProvider {
    JsDelivr,
    Unpkg,
    Cdnjs,
    Unknown,
}

impl CdnProvider {
    /// Detect the provider a template points at.
    #[must_use]
    pub fn detect(template: &str) -> Self {
        if template.contains("//cdn.jsdelivr.net") {
            Self::JsDelivr
        } else if template.contains("//unpkg.com") {
            Self::Unpkg
        } else if template.contains("//cdnjs.cloudflare.com") {
            Self::Cdnjs
        } else {
            Self::Unknown
        }
    }
}

/// Look up a preset and return its deferred constructor.
pub fn shortcut(key: &str) -> Result<DeferredModule> {
    let preset = PRESETS
        .iter()
        .find(|p| p.key == key)
        .ok_or_else(|| Error::UnknownShortcut(key.to_string()))?;

    Ok(Arc::new(move |prod_url: &str| {
        let name = preset.name.unwrap_or(preset.key);
        match CdnProvider::detect(prod_url) {
            CdnProvider::Cdnjs => {
                return Err(Error::UnsupportedProvider {
                    name: preset.key.to_string(),
                    prod_url: prod_url.to_string(),
                })
            }
            CdnProvider::Unknown => {
                warn!(module = preset.key, prod_url, "unknown prodUrl, using the jsDelivr layout");
            }
            CdnProvider::JsDelivr | CdnProvider::Unpkg => {}
        }

        let mut module = ModuleDescriptor::new(name, preset.var, preset.path);
        if let Some(css) = preset.css {
            module = module.css(css);
        }
        Ok(module)
    }))
}

/// Names of all built-in presets, in table order.
pub fn shortcut_names() -> impl Iterator<Item = &'static str> {
    PRESETS.iter().map(|p| p.key)
}
