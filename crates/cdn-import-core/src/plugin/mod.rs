//! Host plugin interface.
//!
//! A Vite-style plugin trait with the hooks cdn-import needs: `config` to
//! contribute bundler plugins, `transform` to rewrite module source, and
//! `transform_index_html` to inject tags into the HTML entry.
//!
//! ## Example
//!
//! ```ignore
//! use cdn_import_core::plugin::{Plugin, PluginContext, HookResult};
//!
//! struct MyPlugin;
//!
//! impl Plugin for MyPlugin {
//!     fn name(&self) -> &str { "my-plugin" }
//!
//!     fn transform(&self, code: &str, id: &str, _ctx: &PluginContext) -> HookResult<Option<String>> {
//!         if id.ends_with(".txt") {
//!             return Ok(Some(format!("export default {:?};", code)));
//!         }
//!         Ok(None)
//!     }
//! }
//! ```

mod cdn;
mod externals;

pub use cdn::{cdn_import, CdnImportPlugin, PLUGIN_NAME};
pub use externals::{rewrite_externals, DevExternalsPlugin, ExternalGlobalsPlugin, RewriteError};

use crate::html::inject_tags;
use crate::tags::HtmlTagDescriptor;

/// Result type for plugin hooks.
pub type HookResult<T> = Result<T, PluginError>;

/// Error from a plugin.
#[derive(Debug)]
pub struct PluginError {
    /// Plugin name that caused the error.
    pub plugin: String,
    /// Hook that failed.
    pub hook: &'static str,
    /// Error message.
    pub message: String,
}

impl PluginError {
    pub fn new(plugin: impl Into<String>, hook: &'static str, message: impl Into<String>) -> Self {
        Self {
            plugin: plugin.into(),
            hook,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for PluginError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.plugin, self.hook, self.message)
    }
}

impl std::error::Error for PluginError {}

/// Context passed to module hooks.
#[derive(Debug, Clone, Copy, Default)]
pub struct PluginContext {
    /// Whether modules are being served by the dev server.
    pub watch: bool,
}

/// Which host command is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Command {
    /// Production build.
    Build,
    /// Dev server.
    #[default]
    Serve,
}

impl Command {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Build => "build",
            Self::Serve => "serve",
        }
    }
}

/// Environment passed to the `config` hook.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigEnv {
    pub command: Command,
}

impl ConfigEnv {
    #[must_use]
    pub fn build() -> Self {
        Self {
            command: Command::Build,
        }
    }

    #[must_use]
    pub fn serve() -> Self {
        Self {
            command: Command::Serve,
        }
    }
}

/// Config contributed by a plugin's `config` hook.
#[derive(Default)]
pub struct ConfigOverlay {
    /// Plugins appended to the bundler's own plugin pipeline.
    pub bundler_plugins: Vec<Box<dyn Plugin>>,
}

impl ConfigOverlay {
    /// Append another overlay to this one.
    pub fn merge(&mut self, other: ConfigOverlay) {
        self.bundler_plugins.extend(other.bundler_plugins);
    }
}

impl std::fmt::Debug for ConfigOverlay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.bundler_plugins.iter().map(|p| p.name()).collect();
        f.debug_struct("ConfigOverlay")
            .field("bundler_plugins", &names)
            .finish()
    }
}

/// Result of the `transform_index_html` hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexHtml {
    /// Replace the document with this HTML.
    Html(String),
    /// Inject these tags into the document.
    Tags(Vec<HtmlTagDescriptor>),
}

/// Plugin enforcement ordering.
///
/// Controls where a plugin runs relative to others in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum PluginEnforce {
    /// Runs before normal plugins.
    Pre,
    #[default]
    Normal,
    /// Runs after normal plugins.
    Post,
}

/// The main plugin trait.
///
/// All hooks have default implementations that do nothing, so a plugin only
/// implements the ones it cares about.
pub trait Plugin: Send + Sync {
    /// Plugin name for debugging and error messages.
    fn name(&self) -> &str;

    /// Plugin ordering: `Pre`, `Normal` (default), or `Post`.
    fn enforce(&self) -> PluginEnforce {
        PluginEnforce::Normal
    }

    /// Called once before the build or dev server starts.
    ///
    /// Return config to merge into the host's config.
    fn config(&self, _env: &ConfigEnv) -> HookResult<Option<ConfigOverlay>> {
        Ok(None)
    }

    /// Transform module source code.
    ///
    /// Return `Some(code)` to replace the code, or `None` to pass it through.
    fn transform(
        &self,
        _code: &str,
        _id: &str,
        _ctx: &PluginContext,
    ) -> HookResult<Option<String>> {
        Ok(None)
    }

    /// Transform an HTML entry document.
    ///
    /// Return `None` to pass the document through unchanged.
    fn transform_index_html(&self, _html: &str) -> HookResult<Option<IndexHtml>> {
        Ok(None)
    }
}

/// A container for managing multiple plugins.
///
/// Plugins are sorted by their `enforce()` ordering: `Pre` → `Normal` → `Post`.
/// Within the same enforcement level, insertion order is preserved.
#[derive(Default)]
pub struct PluginContainer {
    plugins: Vec<Box<dyn Plugin>>,
    ctx: PluginContext,
}

impl PluginContainer {
    /// Create an empty plugin container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a plugin. Plugins are kept sorted by enforce order.
    pub fn add(&mut self, plugin: Box<dyn Plugin>) {
        self.plugins.push(plugin);
        // Stable sort preserves insertion order within each level.
        self.plugins.sort_by_key(|p| p.enforce());
    }

    /// Add several plugins.
    pub fn extend(&mut self, plugins: impl IntoIterator<Item = Box<dyn Plugin>>) {
        for plugin in plugins {
            self.add(plugin);
        }
    }

    /// Set watch mode (modules are served by the dev server).
    pub fn set_watch(&mut self, watch: bool) {
        self.ctx.watch = watch;
    }

    /// Plugin names in execution order.
    pub fn names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    /// Call `config` on all plugins and merge their overlays.
    pub fn call_config(&self, env: &ConfigEnv) -> HookResult<ConfigOverlay> {
        let mut merged = ConfigOverlay::default();
        for plugin in &self.plugins {
            if let Some(overlay) = plugin.config(env)? {
                merged.merge(overlay);
            }
        }
        Ok(merged)
    }

    /// Transform code through all plugins.
    /// Each plugin's output is passed to the next plugin.
    pub fn transform(&self, code: &str, id: &str) -> HookResult<String> {
        let mut current = code.to_string();
        for plugin in &self.plugins {
            if let Some(transformed) = plugin.transform(&current, id, &self.ctx)? {
                current = transformed;
            }
        }
        Ok(current)
    }

    /// Call `transform_index_html` on all plugins (chained).
    ///
    /// Tag results are injected into the current document before the next
    /// plugin sees it.
    pub fn call_transform_index_html(&self, html: &str) -> HookResult<String> {
        let mut current = html.to_string();
        for plugin in &self.plugins {
            match plugin.transform_index_html(&current)? {
                Some(IndexHtml::Html(replaced)) => current = replaced,
                Some(IndexHtml::Tags(tags)) => current = inject_tags(&current, &tags),
                None => {}
            }
        }
        Ok(current)
    }
}
