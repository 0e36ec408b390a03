use std::path::PathBuf;
use thiserror::Error;

use crate::plugin::PluginError;

/// Stable error codes, one per [`Error`] variant.
pub mod codes {
    pub const CDN_MODULE_VERSION_MISSING: &str = "CDN_MODULE_VERSION_MISSING";
    pub const CDN_UNKNOWN_SHORTCUT: &str = "CDN_UNKNOWN_SHORTCUT";
    pub const CDN_UNSUPPORTED_PROVIDER: &str = "CDN_UNSUPPORTED_PROVIDER";
    pub const CDN_MANIFEST_READ_FAILED: &str = "CDN_MANIFEST_READ_FAILED";
    pub const CDN_MANIFEST_INVALID: &str = "CDN_MANIFEST_INVALID";
    pub const CDN_WORKSPACE_INVALID: &str = "CDN_WORKSPACE_INVALID";
    pub const CDN_CONFIG_NOT_FOUND: &str = "CDN_CONFIG_NOT_FOUND";
    pub const CDN_CONFIG_READ_FAILED: &str = "CDN_CONFIG_READ_FAILED";
    pub const CDN_CONFIG_INVALID: &str = "CDN_CONFIG_INVALID";
    pub const CDN_PLUGIN_FAILED: &str = "CDN_PLUGIN_FAILED";
    pub const CDN_IO_ERROR: &str = "CDN_IO_ERROR";
    pub const CDN_INTERNAL: &str = "CDN_INTERNAL";
}

/// Result alias for cdn-import operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for cdn-import operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A module needs a version (it has relative asset paths) but none was
    /// declared and no installed manifest was found.
    #[error("modules: {name} package.json file does not exist")]
    ModuleVersionMissing { name: String },

    #[error("The configuration of module {0} does not exist")]
    UnknownShortcut(String),

    #[error("The configuration of module {name} in {prod_url} does not exist")]
    UnsupportedProvider { name: String, prod_url: String },

    #[error("Failed to read manifest at {path}: {source}")]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse manifest at {path}: {source}")]
    ManifestInvalid {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse workspace file at {path}: {source}")]
    WorkspaceInvalid {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Config file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Failed to read config at {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config at {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Plugin(#[from] PluginError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    #[must_use]
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Get the stable error code for this error.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::ModuleVersionMissing { .. } => codes::CDN_MODULE_VERSION_MISSING,
            Self::UnknownShortcut(_) => codes::CDN_UNKNOWN_SHORTCUT,
            Self::UnsupportedProvider { .. } => codes::CDN_UNSUPPORTED_PROVIDER,
            Self::ManifestRead { .. } => codes::CDN_MANIFEST_READ_FAILED,
            Self::ManifestInvalid { .. } => codes::CDN_MANIFEST_INVALID,
            Self::WorkspaceInvalid { .. } => codes::CDN_WORKSPACE_INVALID,
            Self::ConfigNotFound { .. } => codes::CDN_CONFIG_NOT_FOUND,
            Self::ConfigRead { .. } => codes::CDN_CONFIG_READ_FAILED,
            Self::ConfigParse { .. } => codes::CDN_CONFIG_INVALID,
            Self::Plugin(_) => codes::CDN_PLUGIN_FAILED,
            Self::Io(_) => codes::CDN_IO_ERROR,
            Self::Other(_) => codes::CDN_INTERNAL,
        }
    }
}
