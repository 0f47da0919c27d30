//! Message addressing.
//!
//! Outgoing chat messages are routed server-side by an `@Token` convention in
//! the message text itself. This module turns a [`Destination`] choice into
//! that textual prefix.

use crate::models::Agent;

/// Where an outgoing message should go.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Destination {
    /// Every agent on the team.
    #[default]
    Team,
    /// One agent, by id.
    Single(String),
    /// A subset of agents, by id.
    Multi(Vec<String>),
}

/// The `@Token` prefix for a destination, resolved against the loaded agent
/// roster.
///
/// - `Team` is always `"@Team "`.
/// - `Single` is `"@<Name> "` when the id resolves, otherwise empty so the
///   message goes out unaddressed.
/// - `Multi` lists each resolved name in roster order; with nothing resolved
///   it falls back to `"@Team "`.
pub fn message_prefix(destination: &Destination, agents: &[Agent]) -> String {
    match destination {
        Destination::Team => "@Team ".to_string(),
        Destination::Single(id) => agents
            .iter()
            .find(|a| &a.id == id)
            .map(|a| format!("@{} ", a.name))
            .unwrap_or_default(),
        Destination::Multi(ids) => {
            let names: Vec<String> = agents
                .iter()
                .filter(|a| ids.contains(&a.id))
                .map(|a| format!("@{}", a.name))
                .collect();
            if names.is_empty() {
                "@Team ".to_string()
            } else {
                format!("{} ", names.join(" "))
            }
        }
    }
}

/// The final message text: addressing prefix followed by the user's literal
/// text.
pub fn address_message(destination: &Destination, agents: &[Agent], text: &str) -> String {
    format!("{}{}", message_prefix(destination, agents), text)
}

// =============================================================================
// Tests
// =============================================================================

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
        vec![
            agent("a1", "Chris"),
            agent("a2", "Orion"),
            agent("a3", "Orkio"),
        ]
    }

    // TEST 1: team destination always produces the team token
    #[test]
    fn test_team_prefix() {
        assert_eq!(message_prefix(&Destination::Team, &roster()), "@Team ");
        assert_eq!(message_prefix(&Destination::Team, &[]), "@Team ");
    }

    // TEST 2: single destination resolves the agent's name
    #[test]
    fn test_single_prefix_resolves_name() {
        let dest = Destination::Single("a2".into());
        assert_eq!(message_prefix(&dest, &roster()), "@Orion ");
    }

    // TEST 3: an unknown single id yields no prefix at all
    #[test]
    fn test_single_prefix_unknown_id_is_empty() {
        let dest = Destination::Single("missing".into());
        assert_eq!(message_prefix(&dest, &roster()), "");
    }

    // TEST 4: multi joins resolved names in roster order
    #[test]
    fn test_multi_prefix_joins_names() {
        let dest = Destination::Multi(vec!["a2".into(), "a1".into()]);
        assert_eq!(message_prefix(&dest, &roster()), "@Chris @Orion ");
    }

    // TEST 5: multi with nothing resolved falls back to the team token
    #[test]
    fn test_multi_prefix_empty_selection_falls_back_to_team() {
        assert_eq!(message_prefix(&Destination::Multi(vec![]), &roster()), "@Team ");
        let unresolved = Destination::Multi(vec!["nope".into()]);
        assert_eq!(message_prefix(&unresolved, &roster()), "@Team ");
    }

    // TEST 6: the prefix lands ahead of the literal text
    #[test]
    fn test_addressed_message_keeps_text_verbatim() {
        let dest = Destination::Single("a1".into());
        assert_eq!(
            address_message(&dest, &roster(), "status report, please"),
            "@Chris status report, please"
        );
        assert_eq!(
            address_message(&Destination::Team, &roster(), "hi"),
            "@Team hi"
        );
    }
}
