//! Conversation listing and upkeep.

use anyhow::{bail, Result};
use huddle_core::models::{Message, SystemEvent};

use crate::commands::Ctx;
use crate::output;

pub async fn list(ctx: &Ctx) -> Result<()> {
    let session = ctx.signed_in()?;
    let threads = match ctx.client.list_threads(session).await {
        Ok(threads) => threads,
        // A rejected token means the stored session is stale. Drop it so the
        // next command starts clean instead of failing the same way.
        Err(err) if err.is_auth_error() => {
            ctx.store.clear()?;
            bail!("session expired; run `huddle login` to sign in again");
        }
        Err(err) => return Err(err.into()),
    };

    if ctx.json {
        return output::print_json(&threads);
    }
    if threads.is_empty() {
        println!("No conversations yet. Start one with `huddle threads new`.");
        return Ok(());
    }
    for thread in &threads {
        println!(
            "{}  {}  {}",
            thread.id,
            output::format_timestamp(thread.updated_at.or(thread.created_at)),
            output::truncate(thread.display_title(), 60)
        );
    }
    Ok(())
}

pub async fn create(ctx: &Ctx, title: &str) -> Result<()> {
    let session = ctx.signed_in()?;
    let thread = ctx.client.create_thread(session, title).await?;
    if ctx.json {
        return output::print_json(&thread);
    }
    println!("Created conversation {} ({})", thread.id, thread.display_title());
    Ok(())
}

pub async fn rename(ctx: &Ctx, thread_id: &str, title: &str) -> Result<()> {
    let session = ctx.signed_in()?;
    ctx.client.rename_thread(session, thread_id, title).await?;
    println!("Renamed {thread_id}.");
    Ok(())
}

pub async fn delete(ctx: &Ctx, thread_id: &str) -> Result<()> {
    let session = ctx.signed_in()?;
    ctx.client.delete_thread(session, thread_id).await?;
    println!("Deleted {thread_id}.");
    Ok(())
}

pub async fn messages(ctx: &Ctx, thread_id: &str) -> Result<()> {
    let session = ctx.signed_in()?;
    let messages = ctx.client.list_messages(session, thread_id).await?;
    if ctx.json {
        return output::print_json(&messages);
    }
    if messages.is_empty() {
        println!("No messages in this conversation.");
        return Ok(());
    }
    for message in &messages {
        println!("{}", render_message(message));
    }
    Ok(())
}

/// One line per message; system events render as an activity note instead of
/// speech.
pub fn render_message(message: &Message) -> String {
    if let Some(event) = message.system_event() {
        return render_event(&event, message);
    }
    let speaker = message
        .agent_name
        .as_deref()
        .or(message.user_name.as_deref())
        .unwrap_or(&message.role);
    format!(
        "[{}] {}: {}",
        output::format_timestamp(message.created_at),
        speaker,
        message.content
    )
}

fn render_event(event: &SystemEvent, message: &Message) -> String {
    let when = output::format_timestamp(event.timestamp().or(message.created_at));
    let who = event.user_name.as_deref().unwrap_or("someone");
    if event.kind == SystemEvent::FILE_UPLOAD {
        let filename = event.filename.as_deref().unwrap_or("a file");
        format!("[{}] * {} uploaded \"{}\"", when, who, filename)
    } else {
        format!("[{}] * {} ({})", when, who, event.kind)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use huddle_core::models::EVENT_PREFIX;

    fn message(content: &str) -> Message {
        Message {
            id: "m1".to_string(),
            role: "user".to_string(),
            content: content.to_string(),
            user_name: Some("Ada".to_string()),
            agent_name: None,
            created_at: None,
        }
    }

    // TEST 1: plain messages show the speaker and text
    #[test]
    fn test_render_plain_message() {
        let rendered = render_message(&message("hello there"));
        assert_eq!(rendered, "[-] Ada: hello there");
    }

    // TEST 2: agent name wins over user name for assistant turns
    #[test]
    fn test_render_prefers_agent_name() {
        let mut m = message("reporting in");
        m.role = "assistant".to_string();
        m.agent_name = Some("Orion".to_string());
        assert_eq!(render_message(&m), "[-] Orion: reporting in");
    }

    // TEST 3: upload events render as an activity note
    #[test]
    fn test_render_file_upload_event() {
        let payload = format!(
            "{}{}",
            EVENT_PREFIX,
            r#"{"type":"file_upload","filename":"notes.pdf","user_name":"Ada"}"#
        );
        let rendered = render_message(&message(&payload));
        assert_eq!(rendered, "[-] * Ada uploaded \"notes.pdf\"");
    }

    // TEST 4: malformed event payloads fall back to plain rendering
    #[test]
    fn test_malformed_event_renders_as_text() {
        let payload = format!("{}{}", EVENT_PREFIX, "not json");
        let rendered = render_message(&message(&payload));
        assert!(rendered.contains("not json"));
    }
}
