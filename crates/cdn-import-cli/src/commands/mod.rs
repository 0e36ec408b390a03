pub mod externals;
pub mod html;
pub mod resolve;
pub mod shortcuts;
pub mod transform;
pub mod version;

use cdn_import_core::plugin::{cdn_import, ConfigEnv, PluginContainer};
use cdn_import_core::{load_config, Error, Options, RunMode};
use miette::{IntoDiagnostic, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Settings shared by every command that loads a project.
#[derive(Debug, Clone)]
pub struct Project {
    pub cwd: PathBuf,
    pub config: Option<PathBuf>,
    pub mode: RunMode,
    pub json: bool,
}

/// Host command selected with `--command`.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HostCommand {
    #[default]
    Build,
    Serve,
}

impl HostCommand {
    pub fn env(self) -> ConfigEnv {
        match self {
            Self::Build => ConfigEnv::build(),
            Self::Serve => ConfigEnv::serve(),
        }
    }
}

impl Project {
    /// Load options from the project's config.
    pub fn options(&self) -> std::result::Result<Options, Error> {
        match load_config(&self.cwd, self.config.as_deref())? {
            Some((path, config)) => {
                debug!(config = %path.display(), "loaded config");
                Ok(config.into_options(&self.cwd, self.mode))
            }
            None => Err(Error::ConfigNotFound {
                path: self.cwd.join("cdn-import.config.json"),
            }),
        }
    }

    /// Resolve the project and set up a container the way the host would
    /// for `command`: the cdn-import plugins plus whatever their `config`
    /// hooks contribute.
    pub async fn container(&self, command: HostCommand) -> std::result::Result<PluginContainer, Error> {
        let options = self.options()?;
        let plugins = cdn_import(options).await?;

        let mut container = PluginContainer::new();
        container.extend(plugins);
        let overlay = container.call_config(&command.env())?;
        container.extend(overlay.bundler_plugins);
        container.set_watch(command == HostCommand::Serve);

        debug!(plugins = ?container.names(), command = command.env().command.as_str(), "plugin container ready");
        Ok(container)
    }

    /// Resolve `path` against the working directory.
    pub fn path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        }
    }
}

/// Run a future on a fresh runtime.
pub fn block_on<F: std::future::Future>(future: F) -> Result<F::Output> {
    let runtime = tokio::runtime::Runtime::new().into_diagnostic()?;
    Ok(runtime.block_on(future))
}

/// Report `err` and exit with status 1.
pub fn fail(err: &Error, json: bool) -> ! {
    if json {
        println!(
            "{}",
            serde_json::json!({
                "ok": false,
                "error": {
                    "code": err.code(),
                    "message": err.to_string()
                }
            })
        );
    } else {
        eprintln!("error: {err}");
    }
    std::process::exit(1);
}

/// Write `content` to `output`, or stdout when unset.
pub fn emit(content: &str, output: Option<&Path>) -> std::result::Result<(), Error> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            std::fs::write(path, content)?;
        }
        None => print!("{content}"),
    }
    Ok(())
}
