pub mod addressing;
pub mod client;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod models;
pub mod session;

pub use addressing::{address_message, message_prefix, Destination};
pub use client::{api_base, build_headers, join_api, unwrap_data, ApiClient, ApiResponse};
pub use config::{ClientConfig, DEFAULT_API_BASE_URL};
pub use error::ApiError;
pub use lifecycle::{Inflight, RequestHandle};
pub use session::{is_admin, Session, SessionError, SessionStore, DEFAULT_TENANT};
