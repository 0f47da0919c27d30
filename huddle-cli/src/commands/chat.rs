//! One-shot sends and the interactive chat loop.

use std::io::Write;

use anyhow::{bail, Result};
use huddle_core::models::{Agent, ChatRequest};
use huddle_core::{address_message, message_prefix, ApiError, Destination, Inflight, Session};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::commands::{resolve_agent_id, Ctx};
use crate::output;

/// Send one message and print the reply.
pub async fn send(
    ctx: &Ctx,
    text: &str,
    thread: Option<String>,
    to: Vec<String>,
) -> Result<()> {
    let session = ctx.signed_in()?;
    let agents = ctx.client.list_agents(session).await?;
    let destination = parse_destination(&to, &agents)?;
    let thread_id = ensure_thread(ctx, session, thread).await?;

    let request = ChatRequest::new(Some(thread_id), address_message(&destination, &agents, text));
    let reply = ctx.client.chat(session, &request).await?;

    if ctx.json {
        return output::print_json(&reply);
    }
    println!("{}", output::reply_text(&reply));
    Ok(())
}

/// Interactive loop. Each outgoing message goes through an [`Inflight`] slot
/// so a newer send always cancels a straggler before it can interleave.
pub async fn repl(ctx: &Ctx, thread: Option<String>) -> Result<()> {
    let session = ctx.signed_in()?.clone();
    let agents = ctx.client.list_agents(&session).await.unwrap_or_default();

    // Land in the first listed conversation unless the caller picked one.
    let mut thread_id = match thread {
        Some(id) => Some(id),
        None => ctx
            .client
            .list_threads(&session)
            .await
            .ok()
            .and_then(|threads| threads.into_iter().next().map(|t| t.id)),
    };
    let mut destination = Destination::Team;
    let mut inflight: Inflight<Result<Value, ApiError>> = Inflight::new();

    println!("Huddle chat on tenant '{}'. :help lists commands, :q quits.", session.tenant_slug());
    prompt(&destination, &agents, thread_id.as_deref())?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        match line {
            "" => {}
            ":q" | ":quit" => break,
            ":help" => print_help(),
            ":threads" => match ctx.client.list_threads(&session).await {
                Ok(threads) => {
                    for t in &threads {
                        println!("{}  {}", t.id, output::truncate(t.display_title(), 60));
                    }
                }
                Err(err) => eprintln!("huddle: {err}"),
            },
            ":agents" => {
                for a in &agents {
                    println!("{}  {}", a.id, a.name);
                }
            }
            _ if line.starts_with(":use ") => {
                thread_id = Some(line[5..].trim().to_string());
            }
            _ if line.starts_with(":new") => {
                let title = line[4..].trim();
                let title = if title.is_empty() { "New conversation" } else { title };
                match ctx.client.create_thread(&session, title).await {
                    Ok(thread) => {
                        println!("Created {}", thread.id);
                        thread_id = Some(thread.id);
                    }
                    Err(err) => eprintln!("huddle: {err}"),
                }
            }
            _ if line.starts_with(":to ") => {
                match parse_destination_spec(line[4..].trim(), &agents) {
                    Ok(dest) => destination = dest,
                    Err(err) => eprintln!("huddle: {err}"),
                }
            }
            _ if line.starts_with(':') => {
                eprintln!("huddle: unknown command '{line}' (:help lists commands)");
            }
            text => match ensure_thread(ctx, &session, thread_id.clone()).await {
                Ok(target) => {
                    thread_id = Some(target.clone());
                    let request =
                        ChatRequest::new(Some(target), address_message(&destination, &agents, text));
                    let client = ctx.client.clone();
                    let send_session = session.clone();
                    inflight.replace(async move { client.chat(&send_session, &request).await });
                    match inflight.finish().await {
                        Some(Ok(reply)) => println!("{}", output::reply_text(&reply)),
                        Some(Err(err)) => eprintln!("huddle: {err}"),
                        None => {}
                    }
                }
                Err(err) => eprintln!("huddle: {err}"),
            },
        }
        prompt(&destination, &agents, thread_id.as_deref())?;
    }

    inflight.cancel();
    Ok(())
}

/// List the tenant's agent roster.
pub async fn agents(ctx: &Ctx) -> Result<()> {
    let session = ctx.signed_in()?;
    let agents = ctx.client.list_agents(session).await?;
    if ctx.json {
        return output::print_json(&agents);
    }
    if agents.is_empty() {
        println!("No agents on this tenant.");
        return Ok(());
    }
    for agent in &agents {
        let marker = if agent.is_default == Some(true) { "*" } else { " " };
        println!(
            "{} {}  {}  {}",
            marker,
            agent.id,
            agent.name,
            output::truncate(agent.description.as_deref().unwrap_or(""), 60)
        );
    }
    Ok(())
}

/// The conversation a message lands in: the explicit id when given, else the
/// first existing conversation, else a fresh one.
async fn ensure_thread(ctx: &Ctx, session: &Session, current: Option<String>) -> Result<String> {
    if let Some(id) = current {
        return Ok(id);
    }
    let threads = ctx.client.list_threads(session).await?;
    if let Some(first) = threads.into_iter().next() {
        return Ok(first.id);
    }
    let thread = ctx.client.create_thread(session, "New conversation").await?;
    eprintln!("huddle: started conversation {}", thread.id);
    Ok(thread.id)
}

/// `--to` values into a destination: none means the whole team, one means a
/// single agent, several mean an explicit subset.
pub fn parse_destination(to: &[String], agents: &[Agent]) -> Result<Destination> {
    match to {
        [] => Ok(Destination::Team),
        [single] if single.eq_ignore_ascii_case("team") => Ok(Destination::Team),
        [single] => Ok(Destination::Single(resolve_agent_id(agents, single)?)),
        many => {
            let ids = many
                .iter()
                .map(|reference| resolve_agent_id(agents, reference))
                .collect::<Result<Vec<_>>>()?;
            Ok(Destination::Multi(ids))
        }
    }
}

fn parse_destination_spec(spec: &str, agents: &[Agent]) -> Result<Destination> {
    if spec.is_empty() {
        bail!("usage: :to team|<agent>[,<agent>...]");
    }
    let parts: Vec<String> = spec
        .split(',')
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect();
    parse_destination(&parts, agents)
}

fn prompt(destination: &Destination, agents: &[Agent], thread_id: Option<&str>) -> Result<()> {
    let target = message_prefix(destination, agents);
    let target = target.trim();
    let target = if target.is_empty() { "(unaddressed)" } else { target };
    print!("[{} {}] > ", thread_id.unwrap_or("no-thread"), target);
    std::io::stdout().flush()?;
    Ok(())
}

fn print_help() {
    println!(":threads          list conversations");
    println!(":use <id>         switch to a conversation");
    println!(":new [title]      start a conversation");
    println!(":agents           list agents");
    println!(":to team|a[,b]    address the team, one agent, or several");
    println!(":q                quit");
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn agent(id: &str, name: &str) -> Agent {
        Agent {
            id: id.to_string(),
            name: name.to_string(),
            description: None,
            model: None,
            embedding_model: None,
            temperature: None,
            system_prompt: None,
            rag_enabled: None,
            rag_top_k: None,
            is_default: None,
        }
    }

    fn roster() -> Vec<Agent> {
        vec![agent("a1", "Chris"), agent("a2", "Orion")]
    }

    // TEST 1: no --to flags address the team
    #[test]
    fn test_empty_to_is_team() {
        assert_eq!(parse_destination(&[], &roster()).unwrap(), Destination::Team);
    }

    // TEST 2: one reference resolves to a single destination
    #[test]
    fn test_single_reference() {
        let dest = parse_destination(&["orion".to_string()], &roster()).unwrap();
        assert_eq!(dest, Destination::Single("a2".to_string()));
    }

    // TEST 3: several references resolve to a multi destination in order
    #[test]
    fn test_multi_references() {
        let to = vec!["Orion".to_string(), "chris".to_string()];
        let dest = parse_destination(&to, &roster()).unwrap();
        assert_eq!(
            dest,
            Destination::Multi(vec!["a2".to_string(), "a1".to_string()])
        );
    }

    // TEST 4: the literal word team works no matter the case
    #[test]
    fn test_team_keyword() {
        let dest = parse_destination(&["TEAM".to_string()], &roster()).unwrap();
        assert_eq!(dest, Destination::Team);
    }

    // TEST 5: unknown references surface an error instead of dropping silently
    #[test]
    fn test_unknown_reference_errors() {
        assert!(parse_destination(&["nope".to_string()], &roster()).is_err());
    }

    // TEST 6: :to spec parsing splits on commas
    #[test]
    fn test_to_spec_parsing() {
        let dest = parse_destination_spec("chris, orion", &roster()).unwrap();
        assert_eq!(
            dest,
            Destination::Multi(vec!["a1".to_string(), "a2".to_string()])
        );
        assert!(parse_destination_spec("", &roster()).is_err());
    }
}
