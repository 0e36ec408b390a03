//! Installed version lookup.

use crate::error::{Error, Result};
use crate::workspace::Workspace;
use serde::Deserialize;
use std::io::ErrorKind;
use tracing::trace;

#[derive(Debug, Deserialize)]
struct InstalledManifest {
    #[serde(default)]
    version: String,
}

/// Find the installed version of dependency `name`.
///
/// Scans the workspace packages in order. The first package that declares
/// `name` in `dependencies` and has its manifest installed under
/// `node_modules` decides the version. Returns an empty string when no
/// package qualifies.
pub async fn installed_version(name: &str, workspace: &Workspace) -> Result<String> {
    for pkg in workspace.packages.iter().filter(|p| p.depends_on(name)) {
        let manifest_path = pkg.installed_manifest(name);

        let content = match tokio::fs::read_to_string(&manifest_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                trace!(module = name, path = %manifest_path.display(), "declared but not installed");
                continue;
            }
            Err(source) => {
                return Err(Error::ManifestRead {
                    path: manifest_path,
                    source,
                })
            }
        };

        let manifest: InstalledManifest =
            serde_json::from_str(&content).map_err(|source| Error::ManifestInvalid {
                path: manifest_path.clone(),
                source,
            })?;

        return Ok(manifest.version);
    }

    Ok(String::new())
}
