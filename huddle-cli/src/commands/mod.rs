//! Subcommand implementations.
//!
//! Every command receives a [`Ctx`]: the configured client, the session
//! store, and the session loaded at startup. Commands that change the signed
//! in state write back through the store; nothing mutates global state.

pub mod admin;
pub mod auth;
pub mod chat;
pub mod threads;
pub mod upload;

use anyhow::{bail, Result};
use huddle_core::models::Agent;
use huddle_core::{ApiClient, Session, SessionStore};

pub struct Ctx {
    pub client: ApiClient,
    pub store: SessionStore,
    pub session: Session,
    pub json: bool,
}

impl Ctx {
    /// The session for a command that needs to be signed in.
    pub fn signed_in(&self) -> Result<&Session> {
        if self.session.is_authenticated() {
            Ok(&self.session)
        } else {
            bail!("not signed in; run `huddle login` first");
        }
    }
}

/// Resolve a user-supplied agent reference to an id: exact id first, then
/// case-insensitive name.
pub fn resolve_agent_id(agents: &[Agent], reference: &str) -> Result<String> {
    if let Some(agent) = agents.iter().find(|a| a.id == reference) {
        return Ok(agent.id.clone());
    }
    let wanted = reference.to_lowercase();
    if let Some(agent) = agents.iter().find(|a| a.name.to_lowercase() == wanted) {
        return Ok(agent.id.clone());
    }
    bail!("no agent named '{reference}'");
}

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

    #[test]
    fn test_resolve_prefers_exact_id() {
        let agents = vec![agent("orion", "Chris"), agent("a2", "Orion")];
        assert_eq!(resolve_agent_id(&agents, "orion").unwrap(), "orion");
    }

    #[test]
    fn test_resolve_matches_name_case_insensitively() {
        let agents = vec![agent("a1", "Chris"), agent("a2", "Orion")];
        assert_eq!(resolve_agent_id(&agents, "ORION").unwrap(), "a2");
    }

    #[test]
    fn test_resolve_unknown_reference_fails() {
        let agents = vec![agent("a1", "Chris")];
        assert!(resolve_agent_id(&agents, "nope").is_err());
    }
}
