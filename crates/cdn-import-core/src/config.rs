//! Plugin options and config file discovery.
//!
//! Options can be built in code or loaded from a JSON config file:
//!
//! ```json
//! {
//!   "modules": ["react", { "name": "dayjs", "var": "dayjs", "path": "dayjs.min.js" }],
//!   "prodUrl": "https://unpkg.com/{name}@{version}/{path}",
//!   "enableInDevMode": true,
//!   "scriptTag": { "attrs": { "defer": "" } }
//! }
//! ```
//!
//! Discovery order: `cdn-import.config.json`, `.cdnimportrc.json`, then the
//! `cdnImport` field of `package.json`.

use crate::error::{Error, Result};
use crate::module::ModuleEntry;
use crate::resolve::DEFAULT_PROD_URL;
use crate::tags::{NoCustomization, StaticTagOverrides, TagCustomizer, TagOverrides};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Config file names in priority order.
const CONFIG_FILES: &[&str] = &["cdn-import.config.json", ".cdnimportrc.json"];

/// package.json field holding inline configuration.
const PACKAGE_JSON_KEY: &str = "cdnImport";

/// Process run mode, as given by `NODE_ENV`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    Development,
    #[default]
    Production,
}

impl RunMode {
    /// Map a `NODE_ENV` value to a run mode. Anything but `development`
    /// (including an unset variable) is treated as production.
    #[must_use]
    pub fn from_node_env(value: Option<&str>) -> Self {
        match value {
            Some("development") => Self::Development,
            _ => Self::Production,
        }
    }

    #[must_use]
    pub fn is_development(self) -> bool {
        self == Self::Development
    }
}

/// Options for [`crate::cdn_import`].
#[derive(Clone)]
pub struct Options {
    /// Project directory; workspace discovery starts here.
    pub root: PathBuf,
    /// Modules to load from the CDN.
    pub modules: Vec<ModuleEntry>,
    /// URL template with `{name}`, `{version}` and `{path}` placeholders.
    pub prod_url: String,
    /// Inject tags and externalize imports during development too.
    pub enable_in_dev_mode: bool,
    pub mode: RunMode,
    /// Per-tag customization.
    pub customizer: Arc<dyn TagCustomizer>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            root: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            modules: Vec::new(),
            prod_url: DEFAULT_PROD_URL.to_string(),
            enable_in_dev_mode: false,
            mode: RunMode::default(),
            customizer: Arc::new(NoCustomization),
        }
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("root", &self.root)
            .field("modules", &self.modules)
            .field("prod_url", &self.prod_url)
            .field("enable_in_dev_mode", &self.enable_in_dev_mode)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl Options {
    /// Create options rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }

    /// Add a module entry.
    #[must_use]
    pub fn module(mut self, entry: impl Into<ModuleEntry>) -> Self {
        self.modules.push(entry.into());
        self
    }

    /// Set the URL template.
    #[must_use]
    pub fn prod_url(mut self, template: impl Into<String>) -> Self {
        self.prod_url = template.into();
        self
    }

    #[must_use]
    pub fn enable_in_dev_mode(mut self, enable: bool) -> Self {
        self.enable_in_dev_mode = enable;
        self
    }

    #[must_use]
    pub fn mode(mut self, mode: RunMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the tag customizer.
    #[must_use]
    pub fn customizer(mut self, customizer: impl TagCustomizer + 'static) -> Self {
        self.customizer = Arc::new(customizer);
        self
    }
}

/// Serialized form of [`Options`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub modules: Vec<ModuleEntry>,
    pub prod_url: Option<String>,
    #[serde(default)]
    pub enable_in_dev_mode: bool,
    /// Overrides applied to every script tag.
    #[serde(default)]
    pub script_tag: TagOverrides,
    /// Overrides applied to every stylesheet link tag.
    #[serde(default)]
    pub css_link_tag: TagOverrides,
}

impl ConfigFile {
    /// Turn the file contents into options for `root`.
    #[must_use]
    pub fn into_options(self, root: impl Into<PathBuf>, mode: RunMode) -> Options {
        let mut options = Options::new(root).mode(mode);
        options.modules = self.modules;
        if let Some(prod_url) = self.prod_url {
            options.prod_url = prod_url;
        }
        options.enable_in_dev_mode = self.enable_in_dev_mode;
        if !self.script_tag.is_empty() || !self.css_link_tag.is_empty() {
            options = options.customizer(StaticTagOverrides {
                script: self.script_tag,
                css_link: self.css_link_tag,
            });
        }
        options
    }
}

/// Find a config file in the given root directory.
#[must_use]
pub fn find_config_file(root: &Path) -> Option<PathBuf> {
    CONFIG_FILES
        .iter()
        .map(|name| root.join(name))
        .find(|path| path.is_file())
}

/// Load configuration for `root`.
///
/// If `config_path` is `Some`, that file must exist. Otherwise the standard
/// file names are tried, then package.json. Returns `None` when nothing is
/// configured.
pub fn load_config(root: &Path, config_path: Option<&Path>) -> Result<Option<(PathBuf, ConfigFile)>> {
    let path = match config_path {
        Some(p) => {
            let abs = if p.is_absolute() { p.to_path_buf() } else { root.join(p) };
            if !abs.exists() {
                return Err(Error::ConfigNotFound { path: abs });
            }
            abs
        }
        None => match find_config_file(root) {
            Some(p) => p,
            None => return load_package_json_config(root),
        },
    };

    let content = read_config(&path)?;
    let config = serde_json::from_str(&content).map_err(|source| Error::ConfigParse {
        path: path.clone(),
        source,
    })?;
    Ok(Some((path, config)))
}

fn load_package_json_config(root: &Path) -> Result<Option<(PathBuf, ConfigFile)>> {
    let path = root.join("package.json");
    if !path.is_file() {
        return Ok(None);
    }

    let content = read_config(&path)?;
    let mut package: serde_json::Value =
        serde_json::from_str(&content).map_err(|source| Error::ConfigParse {
            path: path.clone(),
            source,
        })?;

    let Some(section) = package.get_mut(PACKAGE_JSON_KEY).map(serde_json::Value::take) else {
        return Ok(None);
    };

    let config = serde_json::from_value(section).map_err(|source| Error::ConfigParse {
        path: path.clone(),
        source,
    })?;
    Ok(Some((path, config)))
}

fn read_config(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
        path: path.to_path_buf(),
        source,
    })
}
