use serde::{Deserialize, Serialize};

/// Tenant-wide counters shown on the admin landing view.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Overview {
    #[serde(default)]
    pub tenants: Option<u64>,
    #[serde(default)]
    pub users: Option<u64>,
    #[serde(default)]
    pub threads: Option<u64>,
    #[serde(default)]
    pub messages: Option<u64>,
    #[serde(default)]
    pub files: Option<u64>,
}

/// One row from the request audit log. Timestamps are epoch seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub org_slug: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub status_code: Option<u16>,
    #[serde(default)]
    pub latency_ms: Option<f64>,
    #[serde(default)]
    pub created_at: Option<i64>,
}

/// Token-usage totals over a reporting window.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CostReport {
    #[serde(default)]
    pub total: CostBucket,
    #[serde(default)]
    pub per_agent: Vec<AgentCost>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CostBucket {
    #[serde(default)]
    pub total_tokens: u64,
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
}

/// Per-agent slice of a cost report.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentCost {
    #[serde(default)]
    pub agent_id: Option<String>,
    #[serde(default)]
    pub agent_name: Option<String>,
    #[serde(default)]
    pub total_tokens: u64,
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
}
