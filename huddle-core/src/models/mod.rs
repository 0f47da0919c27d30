//! Wire shapes for the Huddle backend API.
//!
//! These are carriers, not interpretations: anything the backend may omit is
//! an `Option` with a serde default, so a lagging server never breaks
//! deserialization of the fields we do use.

pub mod admin;
pub mod agent;
pub mod chat;
pub mod file;
pub mod message;
pub mod thread;
pub mod user;

pub use admin::{AgentCost, AuditEvent, CostBucket, CostReport, Overview};
pub use agent::{Agent, AgentLink, AgentSpec, DelegateRequest, KnowledgeLink};
pub use chat::{ChatRequest, DEFAULT_TOP_K};
pub use file::{FileEntry, FileRequest, UploadIntent, UploadRequest};
pub use message::{Message, SystemEvent, EVENT_PREFIX};
pub use thread::Thread;
pub use user::{AuthResponse, User};
