//! `cdn-import shortcuts` command implementation.

use cdn_import_core::module::shortcut_names;
use miette::Result;

/// List the module names usable as shortcut entries.
pub fn run(json: bool) -> Result<()> {
    let names: Vec<&str> = shortcut_names().collect();

    if json {
        println!(
            "{}",
            serde_json::json!({
                "ok": true,
                "shortcuts": names
            })
        );
    } else {
        for name in names {
            println!("{name}");
        }
    }

    Ok(())
}
