#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::return_self_not_must_use)]

//! Load npm dependencies from a CDN instead of bundling them.
//!
//! Given a list of modules, cdn-import resolves each one's installed version,
//! renders its CDN URLs, and produces a host plugin that injects the matching
//! `<script>`/`<link>` tags into the HTML entry and rewrites imports of those
//! packages into reads of their globals.

pub mod config;
pub mod error;
pub mod html;
pub mod module;
pub mod plugin;
pub mod resolve;
pub mod tags;
pub mod version;
pub mod workspace;

pub use config::{load_config, ConfigFile, Options, RunMode};
pub use error::{Error, Result};
pub use module::{ModuleDescriptor, ModuleEntry, OneOrMany, ResolvedModule};
pub use plugin::{cdn_import, CdnImportPlugin, Plugin, PluginContainer};
pub use resolve::{resolve_modules, DEFAULT_PROD_URL};
pub use tags::{ExternalMap, HtmlTagDescriptor, TagCustomizer, TagOverrides};
pub use version::VERSION;
