//! `cdn-import externals` command implementation.

use super::{block_on, fail, Project};
use cdn_import_core::{resolve_modules, Error};
use cdn_import_core::tags::build_external_map;
use miette::Result;

/// Print the import name -> global map.
pub fn run(project: &Project) -> Result<()> {
    let result = block_on(async {
        let options = project.options()?;
        Ok::<_, Error>(resolve_modules(&options).await?)
    })?;

    let externals = match result {
        Ok(modules) => build_external_map(&modules),
        Err(e) => fail(&e, project.json),
    };

    if project.json {
        println!(
            "{}",
            serde_json::json!({
                "ok": true,
                "externals": externals
            })
        );
    } else {
        for (name, var) in externals.iter() {
            println!("{name} -> {var}");
        }
    }

    Ok(())
}
