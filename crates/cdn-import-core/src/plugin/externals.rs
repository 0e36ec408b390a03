//! Import externalization.
//!
//! Rewrites imports of CDN-loaded packages into reads of their globals:
//! - `import X from "m"` / `import * as X from "m"` → `const X = window["G"];`
//! - `import { a, b as c } from "m"` → `const { a, b: c } = window["G"];`
//! - `import "m"` → removed
//! - `import("m")` → `Promise.resolve(window["G"])`
//! - `export { a, b as c } from "m"` → `export const { a, b: c } = window["G"];`
//! - `export * as ns from "m"` → `export const ns = window["G"];`
//!
//! Inline `type` specifiers are dropped. `export * from "m"` cannot be mapped
//! onto a global and is rejected.

use super::{HookResult, Plugin, PluginContext, PluginEnforce, PluginError};
use crate::tags::ExternalMap;
use regex_lite::{Captures, Regex};
use std::sync::OnceLock;
use thiserror::Error;

/// Extensions of modules that may import externalized packages.
const SCRIPT_EXTENSIONS: &[&str] = &[
    ".js", ".mjs", ".cjs", ".jsx", ".ts", ".mts", ".cts", ".tsx", ".vue", ".svelte",
];

/// A statement that references an externalized package but has no global
/// equivalent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RewriteError {
    #[error("`export * from \"{0}\"` cannot be served from a global; re-export the names explicitly")]
    StarReexport(String),
}

fn static_import_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?m)^([ \t]*)import\s+([\w$*{},\s]+?)\s*from\s*(['"])([^'"\n]+)['"][ \t]*;?"#)
            .unwrap_or_else(|e| unreachable!("invalid static import pattern: {e}"))
    })
}

fn reexport_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?m)^([ \t]*)export\s*(\{[^}]*\}|\*\s*as\s+[\w$]+|\*)\s*from\s*(['"])([^'"\n]+)['"][ \t]*;?"#)
            .unwrap_or_else(|e| unreachable!("invalid re-export pattern: {e}"))
    })
}

fn side_effect_import_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?m)^([ \t]*)import\s*(['"])([^'"\n]+)['"][ \t]*;?[ \t]*$"#)
            .unwrap_or_else(|e| unreachable!("invalid side-effect import pattern: {e}"))
    })
}

fn dynamic_import_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"import\(\s*(['"])([^'"\n]+)['"]\s*\)"#)
            .unwrap_or_else(|e| unreachable!("invalid dynamic import pattern: {e}"))
    })
}

fn global(var: &str) -> String {
    format!("window[\"{var}\"]")
}

/// A `name` or `name as local` specifier inside braces.
struct Binding<'a> {
    imported: &'a str,
    local: &'a str,
}

impl Binding<'_> {
    fn pattern(&self) -> String {
        if self.imported == self.local {
            self.imported.to_string()
        } else {
            format!("{}: {}", self.imported, self.local)
        }
    }
}

/// Value specifiers of `{ a, type B, c as d }`. Type-only specifiers are
/// dropped. `None` if the text is not a brace list.
fn bindings(named: &str) -> Option<Vec<Binding<'_>>> {
    let inner = named.trim().strip_prefix('{')?.strip_suffix('}')?;
    Some(
        inner
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty() && !s.starts_with("type "))
            .map(|spec| match spec.split_once(" as ") {
                Some((imported, local)) => Binding {
                    imported: imported.trim(),
                    local: local.trim(),
                },
                None => Binding {
                    imported: spec,
                    local: spec,
                },
            })
            .collect(),
    )
}

/// Turn `{ a, b as c }` into `{ a, b: c }`. `None` when nothing but types
/// is imported.
fn destructure(named: &str) -> Option<String> {
    let bindings = bindings(named)?;
    if bindings.is_empty() {
        return None;
    }
    let patterns: Vec<String> = bindings.iter().map(Binding::pattern).collect();
    Some(format!("{{ {} }}", patterns.join(", ")))
}

/// Local binding for a default or namespace import.
fn whole_binding(part: &str) -> Option<&str> {
    let part = part.trim();
    match part.strip_prefix('*') {
        Some(rest) => rest.trim_start().strip_prefix("as").map(str::trim),
        None => Some(part),
    }
    .filter(|name| !name.is_empty() && !name.contains(char::is_whitespace))
}

/// Build the declarations replacing an import clause, or `None` if the clause
/// is not understood or imports only types.
fn declarations(clause: &str, var: &str) -> Option<String> {
    let clause = clause.trim();
    if clause.starts_with("type ") || clause.starts_with("typeof ") {
        return None;
    }

    let target = global(var);
    if clause.starts_with('{') {
        return Some(format!("const {} = {target};", destructure(clause)?));
    }

    let (first, rest) = match clause.split_once(',') {
        Some((first, rest)) => (first, Some(rest.trim())),
        None => (clause, None),
    };

    let mut out = format!("const {} = {target};", whole_binding(first)?);
    match rest {
        Some(rest) if rest.starts_with('{') => {
            if !rest.ends_with('}') {
                return None;
            }
            // `import X, { type T }` keeps just the default binding.
            if let Some(pattern) = destructure(rest) {
                out.push_str(&format!(" const {pattern} = {target};"));
            }
        }
        Some(rest) => {
            out.push_str(&format!(" const {} = {target};", whole_binding(rest)?));
        }
        None => {}
    }
    Some(out)
}

/// Build the statements replacing a re-export clause, or `None` if the
/// clause re-exports only types.
fn reexports(clause: &str, var: &str) -> Option<String> {
    let target = global(var);

    if clause.starts_with('*') {
        return Some(format!("export const {} = {target};", whole_binding(clause)?));
    }

    let bindings = bindings(clause)?;
    if bindings.is_empty() {
        return None;
    }

    let (defaults, named): (Vec<_>, Vec<_>) =
        bindings.iter().partition(|b| b.local == "default");

    let mut statements = Vec::new();
    if !named.is_empty() {
        let patterns: Vec<String> = named.iter().map(|b| b.pattern()).collect();
        statements.push(format!("export const {{ {} }} = {target};", patterns.join(", ")));
    }
    for binding in defaults {
        if binding.imported == "default" {
            statements.push(format!("export default {target};"));
        } else {
            statements.push(format!("export default {target}.{};", binding.imported));
        }
    }
    Some(statements.join(" "))
}

/// Rewrite imports and re-exports of names in `externals`.
///
/// Returns `Ok(None)` when the code references no externalized package.
pub fn rewrite_externals(
    code: &str,
    externals: &ExternalMap,
) -> Result<Option<String>, RewriteError> {
    if externals.is_empty() || !(code.contains("import") || code.contains("export")) {
        return Ok(None);
    }

    let mut changed = false;
    let mut star_reexport = None;

    let code = reexport_re().replace_all(code, |caps: &Captures<'_>| {
        let Some(var) = externals.get(&caps[4]) else {
            return caps[0].to_string();
        };
        if caps[2].trim() == "*" {
            star_reexport.get_or_insert_with(|| caps[4].to_string());
            return caps[0].to_string();
        }
        match reexports(caps[2].trim(), var) {
            Some(statements) => {
                changed = true;
                format!("{}{statements}", &caps[1])
            }
            None => caps[0].to_string(),
        }
    });

    if let Some(name) = star_reexport {
        return Err(RewriteError::StarReexport(name));
    }

    let code = static_import_re().replace_all(&code, |caps: &Captures<'_>| {
        let rewritten = externals
            .get(&caps[4])
            .and_then(|var| declarations(&caps[2], var));
        match rewritten {
            Some(decl) => {
                changed = true;
                format!("{}{decl}", &caps[1])
            }
            None => caps[0].to_string(),
        }
    });

    let code = side_effect_import_re().replace_all(&code, |caps: &Captures<'_>| {
        if externals.get(&caps[3]).is_some() {
            changed = true;
            String::new()
        } else {
            caps[0].to_string()
        }
    });

    let code = dynamic_import_re().replace_all(&code, |caps: &Captures<'_>| {
        match externals.get(&caps[2]) {
            Some(var) => {
                changed = true;
                format!("Promise.resolve({})", global(var))
            }
            None => caps[0].to_string(),
        }
    });

    Ok(changed.then(|| code.into_owned()))
}

fn transform_error(plugin: &str, id: &str, err: RewriteError) -> PluginError {
    PluginError::new(plugin, "transform", format!("{id}: {err}"))
}

fn is_script_module(id: &str) -> bool {
    let path = id.split(['?', '#']).next().unwrap_or(id);
    SCRIPT_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

/// Bundler plugin mapping externalized imports to globals in a build.
#[derive(Debug, Clone)]
pub struct ExternalGlobalsPlugin {
    externals: ExternalMap,
}

impl ExternalGlobalsPlugin {
    pub fn new(externals: ExternalMap) -> Self {
        Self { externals }
    }

    pub fn externals(&self) -> &ExternalMap {
        &self.externals
    }
}

impl Plugin for ExternalGlobalsPlugin {
    fn name(&self) -> &str {
        "cdn-import:external-globals"
    }

    fn transform(&self, code: &str, id: &str, _ctx: &PluginContext) -> HookResult<Option<String>> {
        if !is_script_module(id) {
            return Ok(None);
        }
        rewrite_externals(code, &self.externals).map_err(|e| transform_error(self.name(), id, e))
    }
}

/// Dev server plugin applying the same rewrite to served source modules.
///
/// Only active while serving (`ctx.watch`). Dependencies under
/// `node_modules` are left alone.
#[derive(Debug, Clone)]
pub struct DevExternalsPlugin {
    externals: ExternalMap,
}

impl DevExternalsPlugin {
    pub fn new(externals: ExternalMap) -> Self {
        Self { externals }
    }
}

impl Plugin for DevExternalsPlugin {
    fn name(&self) -> &str {
        "cdn-import:dev-externals"
    }

    fn enforce(&self) -> PluginEnforce {
        PluginEnforce::Pre
    }

    fn transform(&self, code: &str, id: &str, ctx: &PluginContext) -> HookResult<Option<String>> {
        if !ctx.watch || id.contains("/node_modules/") || !is_script_module(id) {
            return Ok(None);
        }
        rewrite_externals(code, &self.externals).map_err(|e| transform_error(self.name(), id, e))
    }
}
