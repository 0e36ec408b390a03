//! `cdn-import resolve` command implementation.
//!
//! Resolves every configured module and prints its version and CDN URLs.

use super::{block_on, fail, Project};
use cdn_import_core::{resolve_modules, Error};
use miette::Result;

/// Run the resolve command.
pub fn run(project: &Project) -> Result<()> {
    let result = block_on(async {
        let options = project.options()?;
        Ok::<_, Error>(resolve_modules(&options).await?)
    })?;

    let modules = match result {
        Ok(modules) => modules,
        Err(e) => fail(&e, project.json),
    };

    if project.json {
        println!(
            "{}",
            serde_json::json!({
                "ok": true,
                "modules": modules
            })
        );
        return Ok(());
    }

    if modules.is_empty() {
        println!("No modules configured.");
        return Ok(());
    }

    for module in &modules {
        if module.version.is_empty() {
            println!("{} -> window.{}", module.name, module.var);
        } else {
            println!("{}@{} -> window.{}", module.name, module.version, module.var);
        }
        for url in module.path_list.iter().chain(&module.css_list) {
            println!("  {url}");
        }
    }

    Ok(())
}
