//! Workspace discovery for monorepos.
//!
//! Finds the workspace root above a project directory and enumerates the
//! workspace packages with their declared `dependencies`. Both pnpm
//! (`pnpm-workspace.yaml`) and npm/yarn (`workspaces` in package.json)
//! layouts are recognized.

use crate::error::{Error, Result};
use glob::{MatchOptions, Pattern};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

const PNPM_WORKSPACE_FILE: &str = "pnpm-workspace.yaml";

/// How the workspace root was recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkspaceKind {
    /// Directory containing `pnpm-workspace.yaml`.
    Pnpm,
    /// package.json with a `workspaces` field.
    PackageJson,
    /// No workspace configuration; the project is its own only package.
    Single,
}

/// A package declared in the workspace.
#[derive(Debug, Clone)]
pub struct WorkspacePackage {
    /// Package name from package.json, if any.
    pub name: Option<String>,
    /// Real path of the package directory.
    pub root: PathBuf,
    /// The `dependencies` section (name -> range).
    pub dependencies: BTreeMap<String, String>,
}

impl WorkspacePackage {
    /// Whether this package declares `name` in `dependencies`.
    #[must_use]
    pub fn depends_on(&self, name: &str) -> bool {
        self.dependencies.contains_key(name)
    }

    /// Location of the installed manifest of dependency `name`.
    #[must_use]
    pub fn installed_manifest(&self, name: &str) -> PathBuf {
        self.root
            .join("node_modules")
            .join(name)
            .join("package.json")
    }
}

/// A discovered workspace.
#[derive(Debug, Clone)]
pub struct Workspace {
    /// Root directory of the workspace.
    pub root: PathBuf,
    pub kind: WorkspaceKind,
    /// Root package first, then matched packages in path order.
    pub packages: Vec<WorkspacePackage>,
}

#[derive(Debug, Default, Deserialize)]
struct PnpmWorkspaceFile {
    packages: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct PackageManifest {
    name: Option<String>,
    #[serde(default)]
    dependencies: BTreeMap<String, String>,
}

/// Find the workspace root by walking up the directory tree.
///
/// At each level a `pnpm-workspace.yaml` wins over a package.json with a
/// `workspaces` field.
#[must_use]
pub fn find_workspace_root(start: &Path) -> Option<(PathBuf, WorkspaceKind)> {
    let mut current = start.to_path_buf();

    loop {
        if current.join(PNPM_WORKSPACE_FILE).is_file() {
            return Some((current, WorkspaceKind::Pnpm));
        }

        if read_json(&current.join("package.json"))
            .is_some_and(|package| package.get("workspaces").is_some())
        {
            return Some((current, WorkspaceKind::PackageJson));
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Find the nearest directory with a package.json, starting at `start`.
fn find_project_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join("package.json").is_file())
        .map(Path::to_path_buf)
}

/// Discover the workspace that `start` belongs to.
///
/// Without any workspace configuration the nearest project (or `start`
/// itself) is treated as a single-package workspace.
pub fn discover_workspace(start: &Path) -> Result<Workspace> {
    let (root, kind) = find_workspace_root(start).unwrap_or_else(|| {
        let root = find_project_root(start).unwrap_or_else(|| start.to_path_buf());
        (root, WorkspaceKind::Single)
    });

    let patterns = match kind {
        WorkspaceKind::Pnpm => read_pnpm_patterns(&root.join(PNPM_WORKSPACE_FILE))?,
        WorkspaceKind::PackageJson => read_json(&root.join("package.json"))
            .map(|package| package_json_patterns(&package))
            .unwrap_or_default(),
        WorkspaceKind::Single => Vec::new(),
    };

    let mut packages = Vec::new();
    if let Some(pkg) = read_workspace_package(&root) {
        packages.push(pkg);
    }
    packages.extend(discover_workspace_packages(&root, &patterns));

    debug!(
        root = %root.display(),
        kind = ?kind,
        packages = packages.len(),
        "discovered workspace"
    );

    Ok(Workspace {
        root,
        kind,
        packages,
    })
}

fn read_pnpm_patterns(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path).map_err(|source| Error::ManifestRead {
        path: path.to_path_buf(),
        source,
    })?;

    let file: PnpmWorkspaceFile = if content.trim().is_empty() {
        PnpmWorkspaceFile::default()
    } else {
        serde_yaml::from_str(&content).map_err(|source| Error::WorkspaceInvalid {
            path: path.to_path_buf(),
            source,
        })?
    };

    // pnpm includes every package below the root when `packages` is omitted.
    Ok(file.packages.unwrap_or_else(|| vec!["**".to_string()]))
}

/// Workspaces can be an array or an object with a "packages" field.
fn package_json_patterns(package: &Value) -> Vec<String> {
    let strings = |arr: &Vec<Value>| -> Vec<String> {
        arr.iter()
            .filter_map(|v| v.as_str().map(String::from))
            .collect()
    };

    match package.get("workspaces") {
        Some(Value::Array(arr)) => strings(arr),
        Some(Value::Object(obj)) => obj
            .get("packages")
            .and_then(Value::as_array)
            .map(strings)
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

/// Expand glob patterns below `root` and read every matching package.
fn discover_workspace_packages(root: &Path, patterns: &[String]) -> Vec<WorkspacePackage> {
    let mut include = Vec::new();
    let mut exclude = Vec::new();

    for raw in patterns {
        let (negated, body) = match raw.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, raw.as_str()),
        };
        let body = body.trim_start_matches("./").trim_end_matches('/');
        match Pattern::new(body) {
            Ok(pattern) if negated => exclude.push(pattern),
            Ok(pattern) => include.push(pattern),
            Err(e) => warn!(pattern = %raw, error = %e, "ignoring invalid workspace pattern"),
        }
    }

    if include.is_empty() {
        return Vec::new();
    }

    let options = MatchOptions {
        require_literal_separator: true,
        ..MatchOptions::default()
    };

    WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() == 0 {
                return true;
            }
            let name = entry.file_name().to_string_lossy();
            entry.file_type().is_dir() && name != "node_modules" && !name.starts_with('.')
        })
        .filter_map(std::result::Result::ok)
        .filter(|entry| {
            let Ok(relative) = entry.path().strip_prefix(root) else {
                return false;
            };
            let relative = relative.to_string_lossy().replace('\\', "/");
            include.iter().any(|p| p.matches_with(&relative, options))
                && !exclude.iter().any(|p| p.matches_with(&relative, options))
        })
        .filter_map(|entry| read_workspace_package(entry.path()))
        .collect()
}

/// Read package info from a workspace directory.
fn read_workspace_package(dir: &Path) -> Option<WorkspacePackage> {
    let manifest_path = dir.join("package.json");
    let content = std::fs::read_to_string(&manifest_path).ok()?;
    let manifest: PackageManifest = match serde_json::from_str(&content) {
        Ok(manifest) => manifest,
        Err(e) => {
            warn!(path = %manifest_path.display(), error = %e, "skipping unreadable workspace manifest");
            return None;
        }
    };

    Some(WorkspacePackage {
        name: manifest.name,
        root: dunce::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf()),
        dependencies: manifest.dependencies,
    })
}

fn read_json(path: &Path) -> Option<Value> {
    let content = std::fs::read_to_string(path).ok()?;
    serde_json::from_str(&content).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write_package(dir: &Path, json: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join("package.json"), json).unwrap();
    }

    #[test]
    fn test_pnpm_workspace() {
        let root = tempdir().unwrap();
        fs::write(
            root.path().join(PNPM_WORKSPACE_FILE),
            "packages:\n  - 'packages/*'\n  - '!packages/ignored'\n",
        )
        .unwrap();
        write_package(root.path(), r#"{"name": "monorepo"}"#);
        write_package(
            &root.path().join("packages/app"),
            r#"{"name": "app", "dependencies": {"react": "^18.2.0"}}"#,
        );
        write_package(&root.path().join("packages/ignored"), r#"{"name": "ignored"}"#);
        write_package(&root.path().join("packages/app/nested"), r#"{"name": "nested"}"#);

        let workspace = discover_workspace(&root.path().join("packages/app")).unwrap();
        assert_eq!(workspace.kind, WorkspaceKind::Pnpm);

        let names: Vec<_> = workspace
            .packages
            .iter()
            .filter_map(|p| p.name.as_deref())
            .collect();
        assert_eq!(names, vec!["monorepo", "app"]);
        assert!(workspace.packages[1].depends_on("react"));
    }

    #[test]
    fn test_pnpm_workspace_without_packages_includes_everything() {
        let root = tempdir().unwrap();
        fs::write(root.path().join(PNPM_WORKSPACE_FILE), "").unwrap();
        write_package(&root.path().join("a/b"), r#"{"name": "deep"}"#);
        write_package(
            &root.path().join("a/node_modules/dep"),
            r#"{"name": "dep"}"#,
        );

        let workspace = discover_workspace(root.path()).unwrap();
        let names: Vec<_> = workspace
            .packages
            .iter()
            .filter_map(|p| p.name.as_deref())
            .collect();
        assert_eq!(names, vec!["deep"]);
    }

    #[test]
    fn test_package_json_workspaces_object_format() {
        let root = tempdir().unwrap();
        write_package(
            root.path(),
            r#"{"name": "monorepo", "workspaces": {"packages": ["apps/*"]}}"#,
        );
        write_package(&root.path().join("apps/web"), r#"{"name": "web"}"#);

        let workspace = discover_workspace(root.path()).unwrap();
        assert_eq!(workspace.kind, WorkspaceKind::PackageJson);
        assert_eq!(workspace.packages.len(), 2);
    }

    #[test]
    fn test_single_project_fallback() {
        let root = tempdir().unwrap();
        write_package(
            root.path(),
            r#"{"name": "app", "dependencies": {"vue": "^3.0.0"}}"#,
        );
        let src = root.path().join("src");
        fs::create_dir_all(&src).unwrap();

        let workspace = discover_workspace(&src).unwrap();
        assert_eq!(workspace.kind, WorkspaceKind::Single);
        assert_eq!(workspace.packages.len(), 1);
        assert!(workspace.packages[0].depends_on("vue"));
    }

    #[test]
    fn test_invalid_pnpm_file() {
        let root = tempdir().unwrap();
        fs::write(root.path().join(PNPM_WORKSPACE_FILE), "packages: [unclosed").unwrap();

        let err = discover_workspace(root.path()).unwrap_err();
        assert!(matches!(err, Error::WorkspaceInvalid { .. }));
    }

    #[test]
    fn test_find_workspace_root() {
        let root = tempdir().unwrap();
        write_package(
            root.path(),
            r#"{"name": "monorepo", "workspaces": ["packages/*"]}"#,
        );
        let nested = root.path().join("packages").join("nested").join("deep");
        fs::create_dir_all(&nested).unwrap();

        let (found, kind) = find_workspace_root(&nested).unwrap();
        assert_eq!(found, root.path());
        assert_eq!(kind, WorkspaceKind::PackageJson);
    }
}
