//! File upload with scope selection.

use std::path::Path;

use anyhow::{bail, Context, Result};
use huddle_core::models::UploadRequest;

use crate::commands::{resolve_agent_id, Ctx};
use crate::output;

pub async fn upload(
    ctx: &Ctx,
    path: &str,
    thread: Option<String>,
    agents: Vec<String>,
    institutional: bool,
) -> Result<()> {
    let session = ctx.signed_in()?;
    let (filename, bytes) = read_file(path)?;
    let base = UploadRequest::new(filename, bytes);

    let (upload, done) = if institutional {
        if session.is_admin() {
            (base.institutional(), "Institutional document uploaded.")
        } else {
            // Non-admins keep the file usable in their conversation and ask
            // the admins to promote it.
            let Some(thread_id) = thread else {
                bail!("requesting an institutional document needs --thread <id>");
            };
            (
                base.institutional_request(thread_id),
                "Uploaded; promotion request sent to the admins.",
            )
        }
    } else if !agents.is_empty() {
        let roster = ctx.client.list_agents(session).await?;
        let ids = agents
            .iter()
            .map(|reference| resolve_agent_id(&roster, reference))
            .collect::<Result<Vec<_>>>()?;
        (base.for_agents(ids), "Linked to the selected agents.")
    } else if let Some(thread_id) = thread {
        (base.for_thread(thread_id), "Attached to the conversation.")
    } else {
        bail!("choose a scope: --thread <id>, --agents <name,...>, or --institutional");
    };

    let response = ctx.client.upload_file(session, upload).await?;
    if ctx.json {
        return output::print_json(&response.data);
    }
    println!("{done}");
    Ok(())
}

fn read_file(path: &str) -> Result<(String, Vec<u8>)> {
    let path = Path::new(path);
    let bytes = std::fs::read(path).with_context(|| format!("cannot read {}", path.display()))?;
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("upload.bin")
        .to_string();
    Ok((filename, bytes))
}
