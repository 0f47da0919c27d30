use serde::Serialize;

/// Default number of retrieval passages a RAG agent receives with a message.
pub const DEFAULT_TOP_K: u32 = 6;

/// Body of a chat send, minus the tenant field the client injects from the
/// session. `thread_id` and `agent_id` serialize as explicit nulls when
/// unset; routing normally rides in the message text's `@` prefix rather
/// than in `agent_id`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub thread_id: Option<String>,
    pub agent_id: Option<String>,
    pub message: String,
    pub top_k: u32,
}

impl ChatRequest {
    pub fn new(thread_id: Option<String>, message: impl Into<String>) -> Self {
        Self {
            thread_id,
            agent_id: None,
            message: message.into(),
            top_k: DEFAULT_TOP_K,
        }
    }
}
