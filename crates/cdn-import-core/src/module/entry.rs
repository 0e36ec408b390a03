use super::{shortcut, ModuleDescriptor};
use crate::error::Result;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;

/// Descriptor constructor called with the global URL template, so a module
/// can pick a path layout that matches the CDN in use.
pub type DeferredModule = Arc<dyn Fn(&str) -> Result<ModuleDescriptor> + Send + Sync>;

/// One entry of the `modules` option.
#[derive(Clone, Deserialize)]
#[serde(from = "RawModuleEntry")]
pub enum ModuleEntry {
    /// Name of a built-in preset (e.g. `"react"`).
    Shortcut(String),
    /// A fully spelled-out descriptor.
    Descriptor(ModuleDescriptor),
    /// Several entries, flattened in order.
    List(Vec<ModuleEntry>),
    /// Constructed from the URL template during normalization.
    Deferred(DeferredModule),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawModuleEntry {
    Shortcut(String),
    Descriptor(ModuleDescriptor),
    List(Vec<ModuleEntry>),
}

impl From<RawModuleEntry> for ModuleEntry {
    fn from(raw: RawModuleEntry) -> Self {
        match raw {
            RawModuleEntry::Shortcut(name) => Self::Shortcut(name),
            RawModuleEntry::Descriptor(module) => Self::Descriptor(module),
            RawModuleEntry::List(list) => Self::List(list),
        }
    }
}

impl ModuleEntry {
    /// Create a deferred entry from a closure.
    pub fn deferred<F>(f: F) -> Self
    where
        F: Fn(&str) -> Result<ModuleDescriptor> + Send + Sync + 'static,
    {
        Self::Deferred(Arc::new(f))
    }

    fn flatten_into(&self, prod_url: &str, out: &mut Vec<ModuleDescriptor>) -> Result<()> {
        match self {
            Self::Shortcut(name) => {
                let build = shortcut(name)?;
                out.push(build(prod_url)?);
            }
            Self::Descriptor(module) => out.push(module.clone()),
            Self::List(list) => {
                for entry in list {
                    entry.flatten_into(prod_url, out)?;
                }
            }
            Self::Deferred(build) => out.push(build(prod_url)?),
        }
        Ok(())
    }
}

impl fmt::Debug for ModuleEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shortcut(name) => f.debug_tuple("Shortcut").field(name).finish(),
            Self::Descriptor(module) => f.debug_tuple("Descriptor").field(module).finish(),
            Self::List(list) => f.debug_tuple("List").field(list).finish(),
            Self::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

impl From<ModuleDescriptor> for ModuleEntry {
    fn from(module: ModuleDescriptor) -> Self {
        Self::Descriptor(module)
    }
}

impl From<&str> for ModuleEntry {
    fn from(name: &str) -> Self {
        Self::Shortcut(name.to_string())
    }
}

impl From<Vec<ModuleDescriptor>> for ModuleEntry {
    fn from(list: Vec<ModuleDescriptor>) -> Self {
        Self::List(list.into_iter().map(Self::Descriptor).collect())
    }
}

/// Flatten `entries` into an ordered list of descriptors.
///
/// Shortcuts are expanded through the built-in preset table and deferred
/// entries are called with `prod_url`. The first failure is returned as is.
pub fn normalize(entries: &[ModuleEntry], prod_url: &str) -> Result<Vec<ModuleDescriptor>> {
    let mut out = Vec::with_capacity(entries.len());
    for entry in entries {
        entry.flatten_into(prod_url, &mut out)?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::module::OneOrMany;

    const JSDELIVR: &str = "https://cdn.jsdelivr.net/npm/{name}@{version}/{path}";

    #[test]
    fn test_normalize_mixed_entries() {
        let entries = vec![
            ModuleEntry::from("react"),
            ModuleEntry::from(vec![
                ModuleDescriptor::new("a", "A", "a.js"),
                ModuleDescriptor::new("b", "B", "b.js"),
            ]),
            ModuleEntry::deferred(|template| {
                let path = if template.contains("unpkg") { "u.js" } else { "j.js" };
                Ok(ModuleDescriptor::new("c", "C", path))
            }),
        ];

        let modules = normalize(&entries, JSDELIVR).unwrap();
        let names: Vec<_> = modules.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["react", "a", "b", "c"]);
        assert_eq!(modules[0].var, "React");
        assert_eq!(modules[3].path, OneOrMany::One("j.js".into()));
    }

    #[test]
    fn test_normalize_unknown_shortcut_propagates() {
        let entries = vec![ModuleEntry::from("not-a-preset")];
        let err = normalize(&entries, JSDELIVR).unwrap_err();
        assert!(matches!(err, Error::UnknownShortcut(ref name) if name == "not-a-preset"));
    }

    #[test]
    fn test_deserialize_entries() {
        let json = r#"[
            "vue",
            { "name": "x", "var": "X", "path": "x.js" },
            [{ "name": "y", "var": "Y", "path": ["y.js"] }, "lodash"]
        ]"#;

        let entries: Vec<ModuleEntry> = serde_json::from_str(json).unwrap();
        assert!(matches!(entries[0], ModuleEntry::Shortcut(_)));
        assert!(matches!(entries[1], ModuleEntry::Descriptor(_)));
        assert!(matches!(entries[2], ModuleEntry::List(ref l) if l.len() == 2));

        let modules = normalize(&entries, JSDELIVR).unwrap();
        let names: Vec<_> = modules.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["vue", "x", "y", "lodash"]);
    }
}
