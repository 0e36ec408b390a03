//! `cdn-import transform` command implementation.
//!
//! Runs the module transform chain over one source file, showing how
//! externalized imports are rewritten.

use super::{block_on, emit, fail, HostCommand, Project};
use cdn_import_core::Error;
use miette::Result;
use std::path::Path;

/// Transform `file` and write the result to `output` (stdout when unset).
pub fn run(project: &Project, file: &Path, command: HostCommand, output: Option<&Path>) -> Result<()> {
    let file = project.path(file);
    let output = output.map(|p| project.path(p));

    let result = block_on(async {
        let code = tokio::fs::read_to_string(&file).await?;
        let container = project.container(command).await?;
        let id = file.to_string_lossy();
        let transformed = container.transform(&code, &id)?;
        Ok::<_, Error>((transformed != code, transformed))
    })?;

    let (changed, code) = match result {
        Ok(out) => out,
        Err(e) => fail(&e, project.json),
    };

    if project.json {
        if let Some(path) = &output {
            if let Err(e) = emit(&code, Some(path)) {
                fail(&e, true);
            }
        }
        let inline = output.is_none().then_some(&code);
        println!(
            "{}",
            serde_json::json!({
                "ok": true,
                "command": command.env().command.as_str(),
                "file": file.to_string_lossy(),
                "changed": changed,
                "output": output.as_ref().map(|p| p.to_string_lossy()),
                "code": inline
            })
        );
        return Ok(());
    }

    if let Err(e) = emit(&code, output.as_deref()) {
        fail(&e, false);
    }
    Ok(())
}
