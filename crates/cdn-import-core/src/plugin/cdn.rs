//! The cdn-import host plugin.

use super::{
    Command, ConfigEnv, ConfigOverlay, DevExternalsPlugin, ExternalGlobalsPlugin, HookResult,
    IndexHtml, Plugin, PluginEnforce,
};
use crate::config::Options;
use crate::error::Result;
use crate::module::ResolvedModule;
use crate::resolve::resolve_modules;
use crate::tags::{build_external_map, build_tags, ExternalMap, HtmlTagDescriptor};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// Name reported by [`CdnImportPlugin`].
pub const PLUGIN_NAME: &str = "cdn-import";

/// Injects CDN tags into the HTML entry and externalizes their imports in
/// builds.
///
/// Everything is resolved up front; the hooks only pick what to hand back
/// depending on whether the host is building.
#[derive(Debug)]
pub struct CdnImportPlugin {
    modules: Vec<ResolvedModule>,
    externals: ExternalMap,
    tags: Vec<HtmlTagDescriptor>,
    enable_in_dev_mode: bool,
    is_build: AtomicBool,
}

impl CdnImportPlugin {
    /// Resolve `options` and build the plugin.
    pub async fn from_options(options: &Options) -> Result<Self> {
        let modules = resolve_modules(options).await?;
        let externals = build_external_map(&modules);
        let tags = build_tags(&modules, options.customizer.as_ref());

        debug!(
            modules = modules.len(),
            externals = externals.len(),
            tags = tags.len(),
            "cdn-import plugin ready"
        );

        Ok(Self {
            modules,
            externals,
            tags,
            enable_in_dev_mode: options.enable_in_dev_mode,
            is_build: AtomicBool::new(false),
        })
    }

    /// Resolved modules, in configuration order.
    pub fn modules(&self) -> &[ResolvedModule] {
        &self.modules
    }

    pub fn externals(&self) -> &ExternalMap {
        &self.externals
    }

    /// Tags injected into the HTML entry.
    pub fn tags(&self) -> &[HtmlTagDescriptor] {
        &self.tags
    }

    /// Whether the last `config` call was for a build.
    pub fn is_build(&self) -> bool {
        self.is_build.load(Ordering::Acquire)
    }
}

impl Plugin for CdnImportPlugin {
    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    fn enforce(&self) -> PluginEnforce {
        PluginEnforce::Pre
    }

    fn config(&self, env: &ConfigEnv) -> HookResult<Option<ConfigOverlay>> {
        let is_build = env.command == Command::Build;
        self.is_build.store(is_build, Ordering::Release);

        let mut overlay = ConfigOverlay::default();
        if is_build {
            overlay
                .bundler_plugins
                .push(Box::new(ExternalGlobalsPlugin::new(self.externals.clone())));
        }
        Ok(Some(overlay))
    }

    fn transform_index_html(&self, html: &str) -> HookResult<Option<IndexHtml>> {
        if !self.is_build() && !self.enable_in_dev_mode {
            return Ok(Some(IndexHtml::Html(html.to_string())));
        }
        Ok(Some(IndexHtml::Tags(self.tags.clone())))
    }
}

/// Build the plugin list for `options`.
///
/// The first entry is always the [`CdnImportPlugin`]. A [`DevExternalsPlugin`]
/// follows when running in development with `enable_in_dev_mode` set.
pub async fn cdn_import(options: Options) -> Result<Vec<Box<dyn Plugin>>> {
    let plugin = CdnImportPlugin::from_options(&options).await?;
    let dev_externals = (options.mode.is_development() && options.enable_in_dev_mode)
        .then(|| DevExternalsPlugin::new(plugin.externals().clone()));

    let mut plugins: Vec<Box<dyn Plugin>> = vec![Box::new(plugin)];
    if let Some(dev) = dev_externals {
        plugins.push(Box::new(dev));
    }
    Ok(plugins)
}
