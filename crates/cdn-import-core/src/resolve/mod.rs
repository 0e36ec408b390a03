//! Batch resolution of module descriptors.
//!
//! ## Pipeline
//!
//! 1. **Normalize** - expand shortcuts, lists and deferred entries
//! 2. **Discover** - find the workspace once, if any module lacks a version
//! 3. **Resolve** - look up versions and render URLs, one future per module
//!
//! The lookups share nothing mutable and complete in any order; results keep
//! input order. The first failure aborts the batch.

mod url;
mod version;

pub use url::{is_full_url, render_url, DEFAULT_PROD_URL};
pub use version::installed_version;

use crate::config::{Options, RunMode};
use crate::error::{Error, Result};
use crate::module::{normalize, ModuleDescriptor, ResolvedModule};
use crate::workspace::{discover_workspace, Workspace};
use futures::future::try_join_all;
use std::sync::Arc;
use tracing::{debug, info};

fn needs_lookup(module: &ModuleDescriptor) -> bool {
    module.version.as_deref().map_or(true, str::is_empty)
}

/// Resolve every configured module.
pub async fn resolve_modules(options: &Options) -> Result<Vec<ResolvedModule>> {
    let descriptors = normalize(&options.modules, &options.prod_url)?;

    let workspace = if descriptors.iter().any(needs_lookup) {
        let root = options.root.clone();
        let workspace = tokio::task::spawn_blocking(move || discover_workspace(&root))
            .await
            .map_err(|e| Error::other(format!("workspace discovery failed: {e}")))??;
        Some(Arc::new(workspace))
    } else {
        None
    };

    let lookups = descriptors.into_iter().map(|module| {
        let workspace = workspace.clone();
        async move {
            resolve_module(module, &options.prod_url, workspace.as_deref(), options.mode).await
        }
    });

    try_join_all(lookups).await
}

/// Resolve a single descriptor against `workspace`.
///
/// `prod_url` is used unless the module carries its own template. A module
/// without a version fails unless all its script and stylesheet paths are
/// fully qualified URLs.
pub async fn resolve_module(
    module: ModuleDescriptor,
    prod_url: &str,
    workspace: Option<&Workspace>,
    mode: RunMode,
) -> Result<ResolvedModule> {
    let version = match (module.version.as_deref(), workspace) {
        (Some(v), _) if !v.is_empty() => v.to_string(),
        (_, Some(workspace)) => installed_version(&module.name, workspace).await?,
        (_, None) => String::new(),
    };

    let ModuleDescriptor {
        name,
        var,
        path,
        css,
        alias,
        prod_url: module_prod_url,
        ..
    } = module;

    let paths = path.into_vec();
    let css = css.map(crate::module::OneOrMany::into_vec).unwrap_or_default();

    if version.is_empty() && paths.iter().chain(&css).any(|p| !is_full_url(p)) {
        return Err(Error::ModuleVersionMissing { name });
    }

    let template = module_prod_url.as_deref().unwrap_or(prod_url);
    let render = |p: &String| render_url(template, &name, &version, p);
    let path_list: Vec<String> = paths.iter().map(render).collect();
    let css_list: Vec<String> = css.iter().map(render).collect();

    if mode.is_development() {
        info!(module = %name, version = %version, "resolved module");
    } else {
        debug!(module = %name, version = %version, urls = path_list.len() + css_list.len(), "resolved module");
    }

    Ok(ResolvedModule {
        name,
        var,
        version,
        alias,
        path_list,
        css_list,
    })
}
