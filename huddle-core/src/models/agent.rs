use serde::{Deserialize, Serialize};

/// An AI persona configured for a tenant. Referenced by id for addressing
/// and by name for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub embedding_model: Option<String>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub rag_enabled: Option<bool>,
    #[serde(default)]
    pub rag_top_k: Option<u32>,
    #[serde(default)]
    pub is_default: Option<bool>,
}

/// Payload for creating or updating an agent. Unset optionals serialize as
/// explicit nulls, which the backend reads as "clear this field".
#[derive(Debug, Clone, Serialize)]
pub struct AgentSpec {
    pub name: String,
    pub description: Option<String>,
    pub system_prompt: String,
    pub model: Option<String>,
    pub embedding_model: Option<String>,
    pub temperature: Option<f64>,
    pub rag_enabled: bool,
    pub rag_top_k: u32,
    pub is_default: bool,
}

impl Default for AgentSpec {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: None,
            system_prompt: String::new(),
            model: None,
            embedding_model: None,
            temperature: None,
            rag_enabled: true,
            rag_top_k: 6,
            is_default: false,
        }
    }
}

/// One collaboration link from an agent to a peer it may involve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentLink {
    pub target_agent_id: String,
    #[serde(default = "default_link_mode")]
    pub mode: String,
}

fn default_link_mode() -> String {
    "consult".to_string()
}

/// A document attached to an agent's knowledge base. The filename comes from
/// the files listing; links only carry the file id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeLink {
    pub id: String,
    #[serde(default)]
    pub file_id: Option<String>,
    #[serde(default)]
    pub enabled: Option<bool>,
}

/// Instruction handed from one agent to another.
#[derive(Debug, Clone, Serialize)]
pub struct DelegateRequest {
    pub source_agent_id: String,
    pub target_agent_id: String,
    pub instruction: String,
    pub create_thread: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_title: Option<String>,
}
