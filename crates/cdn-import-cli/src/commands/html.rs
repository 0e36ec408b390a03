//! `cdn-import html` command implementation.
//!
//! Runs the HTML hooks over an entry document as the host would for
//! `--command`.

use super::{block_on, emit, fail, HostCommand, Project};
use cdn_import_core::Error;
use miette::Result;
use std::path::Path;

/// Transform `input` and write the result to `output` (stdout when unset).
pub fn run(project: &Project, input: &Path, command: HostCommand, output: Option<&Path>) -> Result<()> {
    let input = project.path(input);
    let output = output.map(|p| project.path(p));

    let result = block_on(async {
        let html = tokio::fs::read_to_string(&input).await?;
        let container = project.container(command).await?;
        let html = container.call_transform_index_html(&html)?;
        Ok::<_, Error>(html)
    })?;

    let html = match result {
        Ok(html) => html,
        Err(e) => fail(&e, project.json),
    };

    if project.json {
        if let Some(path) = &output {
            if let Err(e) = emit(&html, Some(path)) {
                fail(&e, true);
            }
        }
        let inline = output.is_none().then_some(&html);
        println!(
            "{}",
            serde_json::json!({
                "ok": true,
                "command": command.env().command.as_str(),
                "input": input.to_string_lossy(),
                "output": output.as_ref().map(|p| p.to_string_lossy()),
                "html": inline
            })
        );
        return Ok(());
    }

    if let Err(e) = emit(&html, output.as_deref()) {
        fail(&e, false);
    }
    Ok(())
}
