//! Admin surface: tenant oversight, approvals, and agent management.

use anyhow::{bail, Result};
use huddle_core::models::{Agent, AgentSpec, DelegateRequest};
use huddle_core::Session;

use crate::commands::{resolve_agent_id, Ctx};
use crate::output;

/// Flags shared by `agent create` and `agent update`.
#[derive(Debug, Clone, clap::Args)]
pub struct AgentOpts {
    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub system_prompt: Option<String>,

    #[arg(long)]
    pub model: Option<String>,

    #[arg(long)]
    pub embedding_model: Option<String>,

    #[arg(long)]
    pub temperature: Option<f64>,

    /// Disable retrieval for this agent.
    #[arg(long)]
    pub no_rag: bool,

    #[arg(long)]
    pub top_k: Option<u32>,

    /// Make this the tenant's default agent.
    #[arg(long)]
    pub default: bool,
}

fn admin_session(ctx: &Ctx) -> Result<&Session> {
    let session = ctx.signed_in()?;
    if !session.is_admin() {
        bail!("this command needs the admin role");
    }
    Ok(session)
}

// ============================================================================
// Oversight
// ============================================================================

pub async fn overview(ctx: &Ctx) -> Result<()> {
    let session = admin_session(ctx)?;
    let overview = ctx.client.admin_overview(session).await?;
    if ctx.json {
        return output::print_json(&overview);
    }
    let cell = |v: Option<u64>| v.map(|n| n.to_string()).unwrap_or_else(|| "-".to_string());
    println!("Tenants:  {}", cell(overview.tenants));
    println!("Users:    {}", cell(overview.users));
    println!("Threads:  {}", cell(overview.threads));
    println!("Messages: {}", cell(overview.messages));
    println!("Files:    {}", cell(overview.files));
    Ok(())
}

pub async fn users(ctx: &Ctx, pending: bool) -> Result<()> {
    let session = admin_session(ctx)?;
    let status = pending.then_some("pending");
    let users = ctx.client.admin_users(session, status).await?;
    if ctx.json {
        return output::print_json(&users);
    }
    if users.is_empty() {
        println!("No users.");
        return Ok(());
    }
    for user in &users {
        let approved = if user.is_approved() {
            output::format_timestamp(user.approved_at)
        } else {
            "pending".to_string()
        };
        println!(
            "{}  {}  {}  approved: {}",
            user.id,
            user.email,
            user.role,
            approved
        );
    }
    Ok(())
}

pub async fn approve(ctx: &Ctx, user_id: &str) -> Result<()> {
    let session = admin_session(ctx)?;
    ctx.client.approve_user(session, user_id).await?;
    println!("Approved {user_id}.");
    Ok(())
}

pub async fn reject(ctx: &Ctx, user_id: &str) -> Result<()> {
    let session = admin_session(ctx)?;
    ctx.client.reject_user(session, user_id).await?;
    println!("Rejected {user_id}.");
    Ok(())
}

pub async fn files(ctx: &Ctx, institutional_only: bool) -> Result<()> {
    let session = admin_session(ctx)?;
    let files = ctx.client.admin_files(session, institutional_only).await?;
    if ctx.json {
        return output::print_json(&files);
    }
    if files.is_empty() {
        println!("No files.");
        return Ok(());
    }
    for file in &files {
        let size = file
            .size_bytes
            .map(|b| format!("{b} B"))
            .unwrap_or_else(|| "-".to_string());
        let mut notes = Vec::new();
        if file.institutional == Some(true) {
            notes.push("institutional");
        }
        if file.extraction_failed == Some(true) {
            notes.push("extraction failed");
        }
        println!(
            "{}  {}  {}  {}  {}",
            file.id,
            output::format_timestamp(file.created_at),
            size,
            output::truncate(&file.filename, 48),
            notes.join(", ")
        );
    }
    Ok(())
}

pub async fn file_requests(ctx: &Ctx) -> Result<()> {
    let session = admin_session(ctx)?;
    let requests = ctx
        .client
        .admin_file_requests(session, Some("pending"))
        .await?;
    if ctx.json {
        return output::print_json(&requests);
    }
    if requests.is_empty() {
        println!("No pending file requests.");
        return Ok(());
    }
    for request in &requests {
        println!(
            "{}  {}  {}  by {}",
            request.id,
            output::format_timestamp(request.created_at),
            request.filename.as_deref().unwrap_or("-"),
            request.requested_by.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

pub async fn audit(ctx: &Ctx) -> Result<()> {
    let session = admin_session(ctx)?;
    let events = ctx.client.admin_audit(session).await?;
    if ctx.json {
        return output::print_json(&events);
    }
    if events.is_empty() {
        println!("No audit events.");
        return Ok(());
    }
    for event in &events {
        println!(
            "{}  {}  {}  {}  {}ms",
            output::format_timestamp(event.created_at),
            event.org_slug.as_deref().unwrap_or("-"),
            event
                .action
                .as_deref()
                .or(event.path.as_deref())
                .unwrap_or("-"),
            event
                .status_code
                .map(|s| s.to_string())
                .unwrap_or_else(|| "-".to_string()),
            event.latency_ms.unwrap_or(0.0)
        );
    }
    Ok(())
}

pub async fn costs(ctx: &Ctx, days: u32) -> Result<()> {
    let session = admin_session(ctx)?;
    let report = ctx.client.admin_costs(session, days).await?;
    if ctx.json {
        return output::print_json(&report);
    }
    println!(
        "Last {days} days: {} tokens ({} prompt, {} completion)",
        report.total.total_tokens,
        report.total.prompt_tokens,
        report.total.completion_tokens
    );
    for agent in &report.per_agent {
        println!(
            "  {}  {} tokens",
            agent
                .agent_name
                .as_deref()
                .or(agent.agent_id.as_deref())
                .unwrap_or("-"),
            agent.total_tokens
        );
    }
    Ok(())
}

pub async fn upload(ctx: &Ctx, path: &str) -> Result<()> {
    let session = admin_session(ctx)?;
    let file_path = std::path::Path::new(path);
    let bytes = std::fs::read(file_path)
        .map_err(|err| anyhow::anyhow!("cannot read {}: {err}", file_path.display()))?;
    let filename = file_path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("upload.bin");

    let response = ctx.client.admin_upload_file(session, filename, bytes).await?;
    if ctx.json {
        return output::print_json(&response.data);
    }
    println!("Institutional document uploaded.");
    Ok(())
}

// ============================================================================
// Agents
// ============================================================================

pub async fn agents(ctx: &Ctx) -> Result<()> {
    let session = admin_session(ctx)?;
    let agents = ctx.client.admin_agents(session).await?;
    if ctx.json {
        return output::print_json(&agents);
    }
    if agents.is_empty() {
        println!("No agents.");
        return Ok(());
    }
    for agent in &agents {
        let mut notes = Vec::new();
        if agent.is_default == Some(true) {
            notes.push("default".to_string());
        }
        if let Some(model) = &agent.model {
            notes.push(model.clone());
        }
        if agent.rag_enabled == Some(true) {
            notes.push(format!("rag top_k={}", agent.rag_top_k.unwrap_or(6)));
        }
        println!("{}  {}  {}", agent.id, agent.name, notes.join(", "));
    }
    Ok(())
}

pub async fn agent_create(ctx: &Ctx, name: &str, opts: AgentOpts) -> Result<()> {
    let session = admin_session(ctx)?;
    let spec = AgentSpec {
        name: name.to_string(),
        description: opts.description,
        system_prompt: opts
            .system_prompt
            .unwrap_or_else(|| "You are a helpful, concise assistant.".to_string()),
        model: opts.model,
        embedding_model: opts.embedding_model,
        temperature: opts.temperature,
        rag_enabled: !opts.no_rag,
        rag_top_k: opts.top_k.unwrap_or(6),
        is_default: opts.default,
    };
    ctx.client.create_agent(session, &spec).await?;
    println!("Created agent '{name}'.");
    Ok(())
}

pub async fn agent_update(
    ctx: &Ctx,
    reference: &str,
    name: Option<String>,
    opts: AgentOpts,
) -> Result<()> {
    let session = admin_session(ctx)?;
    let roster = ctx.client.admin_agents(session).await?;
    let agent_id = resolve_agent_id(&roster, reference)?;
    let current = roster
        .iter()
        .find(|a| a.id == agent_id)
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("no agent '{reference}'"))?;

    let spec = merged_spec(current, name, opts);
    ctx.client.update_agent(session, &agent_id, &spec).await?;
    println!("Updated agent {agent_id}.");
    Ok(())
}

/// The update endpoint replaces the whole agent, so unset flags carry the
/// current values forward instead of clearing them.
fn merged_spec(current: Agent, name: Option<String>, opts: AgentOpts) -> AgentSpec {
    AgentSpec {
        name: name.unwrap_or(current.name),
        description: opts.description.or(current.description),
        system_prompt: opts
            .system_prompt
            .or(current.system_prompt)
            .unwrap_or_default(),
        model: opts.model.or(current.model),
        embedding_model: opts.embedding_model.or(current.embedding_model),
        temperature: opts.temperature.or(current.temperature),
        rag_enabled: if opts.no_rag {
            false
        } else {
            current.rag_enabled.unwrap_or(true)
        },
        rag_top_k: opts.top_k.or(current.rag_top_k).unwrap_or(6),
        is_default: opts.default || current.is_default.unwrap_or(false),
    }
}

pub async fn agent_delete(ctx: &Ctx, reference: &str) -> Result<()> {
    let session = admin_session(ctx)?;
    let roster = ctx.client.admin_agents(session).await?;
    let agent_id = resolve_agent_id(&roster, reference)?;
    ctx.client.delete_agent(session, &agent_id).await?;
    println!("Deleted agent {agent_id}.");
    Ok(())
}

pub async fn links(ctx: &Ctx, reference: &str) -> Result<()> {
    let session = admin_session(ctx)?;
    let roster = ctx.client.admin_agents(session).await?;
    let agent_id = resolve_agent_id(&roster, reference)?;
    let links = ctx.client.agent_links(session, &agent_id).await?;
    if ctx.json {
        return output::print_json(&links);
    }
    if links.is_empty() {
        println!("No links.");
        return Ok(());
    }
    for link in &links {
        let target_name = roster
            .iter()
            .find(|a| a.id == link.target_agent_id)
            .map(|a| a.name.as_str())
            .unwrap_or(link.target_agent_id.as_str());
        println!("{}  mode: {}", target_name, link.mode);
    }
    Ok(())
}

pub async fn link_set(ctx: &Ctx, reference: &str, targets: Vec<String>, mode: &str) -> Result<()> {
    let session = admin_session(ctx)?;
    let roster = ctx.client.admin_agents(session).await?;
    let agent_id = resolve_agent_id(&roster, reference)?;
    let target_ids = targets
        .iter()
        .map(|target| resolve_agent_id(&roster, target))
        .collect::<Result<Vec<_>>>()?;
    ctx.client
        .set_agent_links(session, &agent_id, &target_ids, mode)
        .await?;
    println!("Linked {} target(s) to {agent_id}.", target_ids.len());
    Ok(())
}

pub async fn knowledge(ctx: &Ctx, reference: &str) -> Result<()> {
    let session = admin_session(ctx)?;
    let roster = ctx.client.admin_agents(session).await?;
    let agent_id = resolve_agent_id(&roster, reference)?;
    let links = ctx.client.agent_knowledge(session, &agent_id).await?;
    if ctx.json {
        return output::print_json(&links);
    }
    if links.is_empty() {
        println!("No knowledge links.");
        return Ok(());
    }
    for link in &links {
        println!(
            "{}  file: {}  enabled: {}",
            link.id,
            link.file_id.as_deref().unwrap_or("-"),
            output::flag(link.enabled)
        );
    }
    Ok(())
}

pub async fn knowledge_link(ctx: &Ctx, reference: &str, file_id: &str) -> Result<()> {
    let session = admin_session(ctx)?;
    let roster = ctx.client.admin_agents(session).await?;
    let agent_id = resolve_agent_id(&roster, reference)?;
    ctx.client.link_knowledge(session, &agent_id, file_id).await?;
    println!("Linked file {file_id} to {agent_id}.");
    Ok(())
}

pub async fn knowledge_unlink(ctx: &Ctx, reference: &str, link_id: &str) -> Result<()> {
    let session = admin_session(ctx)?;
    let roster = ctx.client.admin_agents(session).await?;
    let agent_id = resolve_agent_id(&roster, reference)?;
    ctx.client
        .unlink_knowledge(session, &agent_id, link_id)
        .await?;
    println!("Unlinked {link_id} from {agent_id}.");
    Ok(())
}

pub async fn delegate(
    ctx: &Ctx,
    from: &str,
    to: &str,
    instruction: &str,
    title: Option<String>,
) -> Result<()> {
    let session = admin_session(ctx)?;
    let roster = ctx.client.admin_agents(session).await?;
    let source_id = resolve_agent_id(&roster, from)?;
    let target_id = resolve_agent_id(&roster, to)?;
    let source_name = roster
        .iter()
        .find(|a| a.id == source_id)
        .map(|a| a.name.clone())
        .unwrap_or_else(|| source_id.clone());

    let request = DelegateRequest {
        source_agent_id: source_id,
        target_agent_id: target_id,
        instruction: instruction.to_string(),
        create_thread: true,
        thread_title: Some(title.unwrap_or_else(|| format!("Instruction from {source_name}"))),
    };
    ctx.client.delegate(session, &request).await?;
    println!("Instruction delivered; a new conversation was opened for it.");
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
