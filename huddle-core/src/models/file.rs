use serde::{Deserialize, Serialize};

/// A stored document, as listed by the admin files endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileEntry {
    pub id: String,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub org_slug: Option<String>,
    #[serde(default)]
    pub size_bytes: Option<u64>,
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub extraction_failed: Option<bool>,
    #[serde(default)]
    pub institutional: Option<bool>,
}

/// A non-admin's request to promote a document to institutional scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRequest {
    pub id: String,
    #[serde(default)]
    pub file_id: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub requested_by: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<i64>,
}

/// How an upload is scoped: to the current conversation, to specific agents,
/// or tenant-wide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadIntent {
    Chat,
    Agent,
    Institutional,
}

impl UploadIntent {
    pub fn as_str(self) -> &'static str {
        match self {
            UploadIntent::Chat => "chat",
            UploadIntent::Agent => "agent",
            UploadIntent::Institutional => "institutional",
        }
    }
}

/// Everything a multipart upload to the files endpoint carries besides the
/// file itself. Only set fields become form parts.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub agent_id: Option<String>,
    pub agent_ids: Vec<String>,
    pub thread_id: Option<String>,
    pub intent: Option<UploadIntent>,
    pub institutional_request: bool,
    pub link_all_agents: bool,
}

impl UploadRequest {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
            agent_id: None,
            agent_ids: Vec::new(),
            thread_id: None,
            intent: None,
            institutional_request: false,
            link_all_agents: false,
        }
    }

    /// Scope the upload to one conversation.
    pub fn for_thread(mut self, thread_id: impl Into<String>) -> Self {
        self.thread_id = Some(thread_id.into());
        self.intent = Some(UploadIntent::Chat);
        self
    }

    /// Scope the upload to a set of agents' knowledge bases.
    pub fn for_agents(mut self, agent_ids: Vec<String>) -> Self {
        self.agent_ids = agent_ids;
        self.intent = Some(UploadIntent::Agent);
        self
    }

    /// Tenant-wide upload, linked to every agent. Admin only.
    pub fn institutional(mut self) -> Self {
        self.intent = Some(UploadIntent::Institutional);
        self.link_all_agents = true;
        self
    }

    /// Conversation-scoped upload that also files an institutional-promotion
    /// request for admin approval.
    pub fn institutional_request(mut self, thread_id: impl Into<String>) -> Self {
        self = self.for_thread(thread_id);
        self.institutional_request = true;
        self
    }
}
