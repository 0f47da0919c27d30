//! HTTP client for the Huddle backend.
//!
//! One [`ApiClient`] serves every surface the backend exposes:
//! - **auth** — login and registration against a tenant
//! - **console** — health, threads, messages, chat, agents, file upload
//! - **admin** — overview, users, files, audit, costs, agent CRUD and links
//!
//! Every operation takes the [`Session`] it acts as; nothing in this module
//! reads global state. Responses are normalized once here: a `{ "data": ... }`
//! envelope is unwrapped transparently and non-2xx statuses become
//! [`ApiError`] values with the server's own message.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::models::{
    Agent, AgentLink, AgentSpec, AuditEvent, AuthResponse, ChatRequest, CostReport,
    DelegateRequest, FileEntry, FileRequest, KnowledgeLink, Message, Overview, Thread,
    UploadRequest, User,
};
use crate::session::Session;

/// Header carrying the tenant slug on every request. Lowercase because
/// `HeaderName` requires it; servers match header names case-insensitively.
pub const TENANT_HEADER: &str = "x-org-slug";

// ============================================================================
// URL and header assembly
// ============================================================================

/// Normalize a configured base URL.
///
/// Accepts both `https://host` and the legacy `https://host/api` form: one
/// trailing slash is dropped, then one trailing `/api`, so callers can always
/// write paths as `/api/...` without doubling the segment.
pub fn api_base(raw: &str) -> String {
    let base = raw.trim();
    let base = base.strip_suffix('/').unwrap_or(base);
    base.strip_suffix("/api").unwrap_or(base).to_string()
}

/// Absolute URL for an API path, with a `/` inserted when the path lacks one.
pub fn join_api(base_url: &str, path: &str) -> String {
    if path.starts_with('/') {
        format!("{}{}", api_base(base_url), path)
    } else {
        format!("{}/{}", api_base(base_url), path)
    }
}

/// Headers for one request: JSON content type unless the body brings its own
/// (multipart), bearer token and tenant slug when non-empty.
pub fn build_headers(token: &str, tenant: &str, json: bool) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if json {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }

    let token = token.trim();
    if !token.is_empty() {
        match HeaderValue::from_str(&format!("Bearer {token}")) {
            Ok(value) => {
                headers.insert(AUTHORIZATION, value);
            }
            Err(err) => {
                tracing::warn!(error = %err, "dropping bearer token with invalid header bytes");
            }
        }
    }

    let tenant = tenant.trim();
    if !tenant.is_empty() {
        match HeaderValue::from_str(tenant) {
            Ok(value) => {
                headers.insert(TENANT_HEADER, value);
            }
            Err(err) => {
                tracing::warn!(error = %err, "dropping tenant slug with invalid header bytes");
            }
        }
    }

    headers
}

/// The backend wraps some payloads in `{ "data": ... }` and returns others
/// bare. Any object carrying a `data` key is unwrapped.
pub fn unwrap_data(payload: Value) -> Value {
    match payload {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

// ============================================================================
// Responses
// ============================================================================

/// A successful (2xx) response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    /// The body as received: parsed JSON, or a string for non-JSON bodies.
    pub data: Value,
}

impl ApiResponse {
    /// Decode the payload into a typed value, unwrapping a data envelope
    /// when present.
    pub fn decode<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        serde_json::from_value(unwrap_data(self.data)).map_err(ApiError::Decode)
    }
}

// ============================================================================
// ApiClient
// ============================================================================

/// Typed client for the Huddle backend API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url(),
        })
    }

    /// Client against an explicit base URL (for testing / integration).
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn prepare(&self, session: &Session, method: Method, path: &str, json: bool) -> RequestBuilder {
        let url = join_api(&self.base_url, path);
        let token = session.bearer_token().unwrap_or("");
        self.http
            .request(method, url)
            .headers(build_headers(token, session.tenant_slug(), json))
    }

    async fn execute(&self, request: RequestBuilder) -> Result<ApiResponse, ApiError> {
        let response = request.send().await?;

        let status = response.status();
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.contains("application/json"))
            .unwrap_or(false);
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(ApiError::from_response(status.as_u16(), is_json, &body));
        }

        let data = if is_json {
            serde_json::from_str(&body).unwrap_or_else(|_| json!({}))
        } else {
            Value::String(body)
        };

        Ok(ApiResponse {
            status: status.as_u16(),
            data,
        })
    }

    /// One JSON request against an API path. The building block for every
    /// typed operation below; public so callers can reach endpoints this
    /// client has no wrapper for.
    pub async fn request(
        &self,
        session: &Session,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<ApiResponse, ApiError> {
        let mut request = self.prepare(session, method, path, true);
        if let Some(body) = body {
            request = request.json(body);
        }
        self.execute(request).await
    }

    async fn request_json<T: DeserializeOwned>(
        &self,
        session: &Session,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<T, ApiError> {
        self.request(session, method, path, body).await?.decode()
    }

    // ========================================================================
    // Auth
    // ========================================================================

    pub async fn login(
        &self,
        tenant: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, ApiError> {
        let session = Session::anonymous_for(tenant);
        let body = json!({
            "tenant": session.tenant_slug(),
            "email": email,
            "password": password,
        });
        self.request_json(&session, Method::POST, "/api/auth/login", Some(&body))
            .await
    }

    pub async fn register(
        &self,
        tenant: &str,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, ApiError> {
        let session = Session::anonymous_for(tenant);
        let body = json!({
            "tenant": session.tenant_slug(),
            "email": email,
            "name": name,
            "password": password,
        });
        self.request_json(&session, Method::POST, "/api/auth/register", Some(&body))
            .await
    }

    pub async fn health(&self, session: &Session) -> Result<ApiResponse, ApiError> {
        self.request(session, Method::GET, "/api/health", None).await
    }

    // ========================================================================
    // Threads and messages
    // ========================================================================

    pub async fn list_threads(&self, session: &Session) -> Result<Vec<Thread>, ApiError> {
        self.request_json(session, Method::GET, "/api/threads", None)
            .await
    }

    pub async fn create_thread(&self, session: &Session, title: &str) -> Result<Thread, ApiError> {
        let body = json!({ "title": title });
        self.request_json(session, Method::POST, "/api/threads", Some(&body))
            .await
    }

    pub async fn rename_thread(
        &self,
        session: &Session,
        thread_id: &str,
        title: &str,
    ) -> Result<(), ApiError> {
        let body = json!({ "title": title });
        self.request(
            session,
            Method::PATCH,
            &format!("/api/threads/{thread_id}"),
            Some(&body),
        )
        .await?;
        Ok(())
    }

    pub async fn delete_thread(&self, session: &Session, thread_id: &str) -> Result<(), ApiError> {
        self.request(
            session,
            Method::DELETE,
            &format!("/api/threads/{thread_id}"),
            None,
        )
        .await?;
        Ok(())
    }

    pub async fn list_messages(
        &self,
        session: &Session,
        thread_id: &str,
    ) -> Result<Vec<Message>, ApiError> {
        let request = self
            .prepare(session, Method::GET, "/api/messages", true)
            .query(&[("thread_id", thread_id)]);
        self.execute(request).await?.decode()
    }

    // ========================================================================
    // Chat and agents
    // ========================================================================

    /// Send one chat message. The tenant is always taken from the session and
    /// placed in the body alongside the header, which is what the backend's
    /// chat endpoint expects.
    pub async fn chat(&self, session: &Session, request: &ChatRequest) -> Result<Value, ApiError> {
        let mut body = serde_json::to_value(request).map_err(ApiError::Decode)?;
        if let Value::Object(map) = &mut body {
            map.insert(
                "tenant".to_string(),
                Value::String(session.tenant_slug().to_string()),
            );
        }
        let response = self
            .request(session, Method::POST, "/api/chat", Some(&body))
            .await?;
        Ok(unwrap_data(response.data))
    }

    pub async fn list_agents(&self, session: &Session) -> Result<Vec<Agent>, ApiError> {
        self.request_json(session, Method::GET, "/api/agents", None)
            .await
    }

    /// Hand an instruction from one agent to another.
    pub async fn delegate(
        &self,
        session: &Session,
        request: &DelegateRequest,
    ) -> Result<ApiResponse, ApiError> {
        let body = serde_json::to_value(request).map_err(ApiError::Decode)?;
        self.request(session, Method::POST, "/api/agents/delegate", Some(&body))
            .await
    }

    // ========================================================================
    // File upload
    // ========================================================================

    /// Upload a file with its scope fields. `link_agent` always rides along;
    /// the backend honors the intent over it.
    pub async fn upload_file(
        &self,
        session: &Session,
        upload: UploadRequest,
    ) -> Result<ApiResponse, ApiError> {
        let request = self
            .prepare(session, Method::POST, "/api/files/upload", false)
            .multipart(upload_form(upload));
        self.execute(request).await
    }

    /// Admin-only institutional upload: the file part alone.
    pub async fn admin_upload_file(
        &self,
        session: &Session,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<ApiResponse, ApiError> {
        let file = Part::bytes(bytes).file_name(filename.to_string());
        let form = Form::new().part("file", file);
        let request = self
            .prepare(session, Method::POST, "/api/admin/files/upload", false)
            .multipart(form);
        self.execute(request).await
    }

    // ========================================================================
    // Admin
    // ========================================================================

    pub async fn admin_overview(&self, session: &Session) -> Result<Overview, ApiError> {
        self.request_json(session, Method::GET, "/api/admin/overview", None)
            .await
    }

    pub async fn admin_users(
        &self,
        session: &Session,
        status: Option<&str>,
    ) -> Result<Vec<User>, ApiError> {
        let mut request = self.prepare(session, Method::GET, "/api/admin/users", true);
        if let Some(status) = status {
            request = request.query(&[("status", status)]);
        }
        self.execute(request).await?.decode()
    }

    pub async fn approve_user(&self, session: &Session, user_id: &str) -> Result<(), ApiError> {
        self.request(
            session,
            Method::POST,
            &format!("/api/admin/users/{user_id}/approve"),
            None,
        )
        .await?;
        Ok(())
    }

    pub async fn reject_user(&self, session: &Session, user_id: &str) -> Result<(), ApiError> {
        self.request(
            session,
            Method::POST,
            &format!("/api/admin/users/{user_id}/reject"),
            None,
        )
        .await?;
        Ok(())
    }

    pub async fn admin_files(
        &self,
        session: &Session,
        institutional_only: bool,
    ) -> Result<Vec<FileEntry>, ApiError> {
        let mut request = self.prepare(session, Method::GET, "/api/admin/files", true);
        if institutional_only {
            request = request.query(&[("institutional_only", "true")]);
        }
        self.execute(request).await?.decode()
    }

    pub async fn admin_file_requests(
        &self,
        session: &Session,
        status: Option<&str>,
    ) -> Result<Vec<FileRequest>, ApiError> {
        let mut request = self.prepare(session, Method::GET, "/api/admin/file-requests", true);
        if let Some(status) = status {
            request = request.query(&[("status", status)]);
        }
        self.execute(request).await?.decode()
    }

    pub async fn admin_audit(&self, session: &Session) -> Result<Vec<AuditEvent>, ApiError> {
        self.request_json(session, Method::GET, "/api/admin/audit", None)
            .await
    }

    pub async fn admin_costs(&self, session: &Session, days: u32) -> Result<CostReport, ApiError> {
        let request = self
            .prepare(session, Method::GET, "/api/admin/costs", true)
            .query(&[("days", days.to_string())]);
        self.execute(request).await?.decode()
    }

    // ========================================================================
    // Admin: agent CRUD, links, knowledge
    // ========================================================================

    pub async fn admin_agents(&self, session: &Session) -> Result<Vec<Agent>, ApiError> {
        self.request_json(session, Method::GET, "/api/admin/agents", None)
            .await
    }

    pub async fn create_agent(
        &self,
        session: &Session,
        spec: &AgentSpec,
    ) -> Result<ApiResponse, ApiError> {
        let body = serde_json::to_value(spec).map_err(ApiError::Decode)?;
        self.request(session, Method::POST, "/api/admin/agents", Some(&body))
            .await
    }

    pub async fn update_agent(
        &self,
        session: &Session,
        agent_id: &str,
        spec: &AgentSpec,
    ) -> Result<ApiResponse, ApiError> {
        let body = serde_json::to_value(spec).map_err(ApiError::Decode)?;
        self.request(
            session,
            Method::PUT,
            &format!("/api/admin/agents/{agent_id}"),
            Some(&body),
        )
        .await
    }

    pub async fn delete_agent(&self, session: &Session, agent_id: &str) -> Result<(), ApiError> {
        self.request(
            session,
            Method::DELETE,
            &format!("/api/admin/agents/{agent_id}"),
            None,
        )
        .await?;
        Ok(())
    }

    /// Consultation links from one agent to others. The backend has returned
    /// both a bare array and an `{ "items": [...] }` wrapper here; accept
    /// either.
    pub async fn agent_links(
        &self,
        session: &Session,
        agent_id: &str,
    ) -> Result<Vec<AgentLink>, ApiError> {
        let response = self
            .request(
                session,
                Method::GET,
                &format!("/api/admin/agents/{agent_id}/links"),
                None,
            )
            .await?;

        let data = unwrap_data(response.data);
        let items = if data.is_array() {
            data
        } else {
            data.get("items")
                .cloned()
                .unwrap_or_else(|| Value::Array(Vec::new()))
        };
        serde_json::from_value(items).map_err(ApiError::Decode)
    }

    pub async fn set_agent_links(
        &self,
        session: &Session,
        agent_id: &str,
        target_agent_ids: &[String],
        mode: &str,
    ) -> Result<(), ApiError> {
        let body = json!({
            "target_agent_ids": target_agent_ids,
            "mode": mode,
        });
        self.request(
            session,
            Method::PUT,
            &format!("/api/admin/agents/{agent_id}/links"),
            Some(&body),
        )
        .await?;
        Ok(())
    }

    pub async fn agent_knowledge(
        &self,
        session: &Session,
        agent_id: &str,
    ) -> Result<Vec<KnowledgeLink>, ApiError> {
        self.request_json(
            session,
            Method::GET,
            &format!("/api/admin/agents/{agent_id}/knowledge"),
            None,
        )
        .await
    }

    pub async fn link_knowledge(
        &self,
        session: &Session,
        agent_id: &str,
        file_id: &str,
    ) -> Result<(), ApiError> {
        let body = json!({ "file_id": file_id, "enabled": true });
        self.request(
            session,
            Method::POST,
            &format!("/api/admin/agents/{agent_id}/knowledge"),
            Some(&body),
        )
        .await?;
        Ok(())
    }

    pub async fn unlink_knowledge(
        &self,
        session: &Session,
        agent_id: &str,
        link_id: &str,
    ) -> Result<(), ApiError> {
        self.request(
            session,
            Method::DELETE,
            &format!("/api/admin/agents/{agent_id}/knowledge/{link_id}"),
            None,
        )
        .await?;
        Ok(())
    }
}

/// Form parts in the order the backend's handler declares them. Absent scope
/// fields are omitted entirely, never sent empty.
fn upload_form(upload: UploadRequest) -> Form {
    let file = Part::bytes(upload.bytes).file_name(upload.filename);
    let mut form = Form::new().part("file", file);
    if let Some(agent_id) = upload.agent_id {
        form = form.text("agent_id", agent_id);
    }
    if !upload.agent_ids.is_empty() {
        form = form.text("agent_ids", upload.agent_ids.join(","));
    }
    if let Some(thread_id) = upload.thread_id {
        form = form.text("thread_id", thread_id);
    }
    if let Some(intent) = upload.intent {
        form = form.text("intent", intent.as_str());
    }
    if upload.institutional_request {
        form = form.text("institutional_request", "true");
    }
    if upload.link_all_agents {
        form = form.text("link_all_agents", "true");
    }
    form.text("link_agent", "true")
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChatRequest, UploadRequest};
    use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_session() -> Session {
        Session {
            token: Some("tok-123".to_string()),
            tenant: "acme".to_string(),
            user: None,
        }
    }

    async fn test_client(server: &MockServer) -> ApiClient {
        ApiClient::with_base_url(server.uri()).expect("Failed to create client")
    }

    // --- URL and header assembly ---

    #[test]
    fn test_api_base_strips_slash_and_api_suffix() {
        assert_eq!(api_base("https://host"), "https://host");
        assert_eq!(api_base("https://host/"), "https://host");
        assert_eq!(api_base("https://host/api"), "https://host");
        assert_eq!(api_base("https://host/api/"), "https://host");
        assert_eq!(api_base("  https://host/api  "), "https://host");
        // only one /api comes off
        assert_eq!(api_base("https://host/api/api"), "https://host/api");
    }

    #[test]
    fn test_join_api_normalizes_leading_slash() {
        assert_eq!(
            join_api("https://host/api", "/api/health"),
            "https://host/api/health"
        );
        assert_eq!(
            join_api("https://host", "api/health"),
            "https://host/api/health"
        );
    }

    #[test]
    fn test_build_headers_sets_all_three() {
        let headers = build_headers("tok", "acme", true);
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer tok");
        assert_eq!(headers.get(TENANT_HEADER).unwrap(), "acme");
    }

    #[test]
    fn test_build_headers_omits_empty_values() {
        let headers = build_headers("", "   ", true);
        assert!(headers.get(AUTHORIZATION).is_none());
        assert!(headers.get(TENANT_HEADER).is_none());

        let headers = build_headers("  tok  ", "acme", false);
        assert!(headers.get(CONTENT_TYPE).is_none());
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer tok");
    }

    #[test]
    fn test_unwrap_data_envelope() {
        assert_eq!(unwrap_data(json!({"data": [1, 2]})), json!([1, 2]));
        assert_eq!(
            unwrap_data(json!({"data": {"id": "x"}, "status": 200})),
            json!({"id": "x"})
        );
        assert_eq!(unwrap_data(json!([1, 2])), json!([1, 2]));
        assert_eq!(unwrap_data(json!({"id": "x"})), json!({"id": "x"}));
    }

    // --- request plumbing ---

    #[tokio::test]
    async fn test_list_threads_sends_auth_and_tenant_headers() {
        let server = MockServer::start().await;
        let client = test_client(&server).await;

        Mock::given(method("GET"))
            .and(path("/api/threads"))
            .and(header("authorization", "Bearer tok-123"))
            .and(header("x-org-slug", "acme"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": "t1", "title": "First", "created_at": 1700000000},
                {"id": "t2"}
            ])))
            .mount(&server)
            .await;

        let threads = client.list_threads(&test_session()).await.unwrap();
        assert_eq!(threads.len(), 2);
        assert_eq!(threads[0].id, "t1");
        assert_eq!(threads[1].display_title(), "Untitled");
    }

    #[tokio::test]
    async fn test_data_envelope_is_unwrapped() {
        let server = MockServer::start().await;
        let client = test_client(&server).await;

        Mock::given(method("GET"))
            .and(path("/api/threads"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"id": "t1", "title": "Enveloped"}]
            })))
            .mount(&server)
            .await;

        let threads = client.list_threads(&test_session()).await.unwrap();
        assert_eq!(threads.len(), 1);
        assert_eq!(threads[0].title, "Enveloped");
    }

    #[tokio::test]
    async fn test_error_message_from_json_detail() {
        let server = MockServer::start().await;
        let client = test_client(&server).await;

        Mock::given(method("GET"))
            .and(path("/api/threads"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({"detail": "X"})))
            .mount(&server)
            .await;

        let err = client.list_threads(&test_session()).await.unwrap_err();
        assert_eq!(err.to_string(), "X");
        assert_eq!(err.status(), Some(400));
    }

    #[tokio::test]
    async fn test_error_message_from_plain_text_body() {
        let server = MockServer::start().await;
        let client = test_client(&server).await;

        Mock::given(method("GET"))
            .and(path("/api/threads"))
            .respond_with(ResponseTemplate::new(502).set_body_string("Y"))
            .mount(&server)
            .await;

        let err = client.list_threads(&test_session()).await.unwrap_err();
        assert_eq!(err.to_string(), "Y");
    }

    #[tokio::test]
    async fn test_error_message_synthesized_from_status() {
        let server = MockServer::start().await;
        let client = test_client(&server).await;

        Mock::given(method("GET"))
            .and(path("/api/threads"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = client.list_threads(&test_session()).await.unwrap_err();
        assert_eq!(err.to_string(), "HTTP 500");
    }

    #[tokio::test]
    async fn test_pending_approval_classified_from_response() {
        let server = MockServer::start().await;
        let client = test_client(&server).await;

        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(
                ResponseTemplate::new(403)
                    .set_body_json(json!({"detail": "Account pending approval"})),
            )
            .mount(&server)
            .await;

        let err = client
            .login("acme", "a@b.c", "hunter2")
            .await
            .unwrap_err();
        assert!(err.is_pending_approval());
        assert!(err.is_auth_error());
    }

    // --- auth ---

    #[tokio::test]
    async fn test_login_posts_tenant_and_decodes_auth() {
        let server = MockServer::start().await;
        let client = test_client(&server).await;

        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .and(header("x-org-slug", "acme"))
            .and(body_json(json!({
                "tenant": "acme",
                "email": "ada@example.com",
                "password": "hunter2"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "tok-9",
                "user": {
                    "id": "u1",
                    "email": "ada@example.com",
                    "role": "admin",
                    "org_slug": "acme"
                }
            })))
            .mount(&server)
            .await;

        let auth = client
            .login("acme", "ada@example.com", "hunter2")
            .await
            .unwrap();
        assert_eq!(auth.access_token, "tok-9");
        assert!(auth.user.is_admin());
        assert!(auth.user.is_approved());
    }

    #[tokio::test]
    async fn test_register_posts_name_and_blank_tenant_defaults_to_public() {
        let server = MockServer::start().await;
        let client = test_client(&server).await;

        Mock::given(method("POST"))
            .and(path("/api/auth/register"))
            .and(body_json(json!({
                "tenant": "public",
                "email": "bo@example.com",
                "name": "Bo",
                "password": "pw"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "tok-1",
                "user": {"id": "u2", "email": "bo@example.com", "role": "user"}
            })))
            .mount(&server)
            .await;

        let auth = client.register("  ", "Bo", "bo@example.com", "pw").await.unwrap();
        assert!(!auth.user.is_approved());
    }

    // --- chat ---

    #[tokio::test]
    async fn test_chat_body_carries_tenant_nulls_and_default_top_k() {
        let server = MockServer::start().await;
        let client = test_client(&server).await;

        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_json(json!({
                "tenant": "acme",
                "thread_id": "t1",
                "agent_id": null,
                "message": "@Team hi",
                "top_k": 6
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"reply": "hello"})))
            .mount(&server)
            .await;

        let request = ChatRequest::new(Some("t1".to_string()), "@Team hi");
        let reply = client.chat(&test_session(), &request).await.unwrap();
        assert_eq!(reply["reply"], "hello");
    }

    #[tokio::test]
    async fn test_chat_without_thread_sends_explicit_null() {
        let server = MockServer::start().await;
        let client = test_client(&server).await;

        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_json(json!({
                "tenant": "acme",
                "thread_id": null,
                "agent_id": null,
                "message": "hi",
                "top_k": 6
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let request = ChatRequest::new(None, "hi");
        client.chat(&test_session(), &request).await.unwrap();
    }

    // --- queries ---

    #[tokio::test]
    async fn test_list_messages_passes_thread_id_query() {
        let server = MockServer::start().await;
        let client = test_client(&server).await;

        Mock::given(method("GET"))
            .and(path("/api/messages"))
            .and(query_param("thread_id", "t-9"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": "m1", "role": "user", "content": "hi"}
            ])))
            .mount(&server)
            .await;

        let messages = client.list_messages(&test_session(), "t-9").await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, "hi");
    }

    #[tokio::test]
    async fn test_admin_queries_carry_filters() {
        let server = MockServer::start().await;
        let client = test_client(&server).await;
        let session = test_session();

        Mock::given(method("GET"))
            .and(path("/api/admin/users"))
            .and(query_param("status", "pending"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": "u1", "email": "p@example.com", "role": "user"}
            ])))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/admin/costs"))
            .and(query_param("days", "30"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "total": {"total_tokens": 10, "prompt_tokens": 6, "completion_tokens": 4},
                "per_agent": []
            })))
            .mount(&server)
            .await;

        let pending = client.admin_users(&session, Some("pending")).await.unwrap();
        assert_eq!(pending.len(), 1);

        let costs = client.admin_costs(&session, 30).await.unwrap();
        assert_eq!(costs.total.total_tokens, 10);
    }

    // --- upload ---

    #[tokio::test]
    async fn test_upload_multipart_fields_and_always_link_agent() {
        let server = MockServer::start().await;
        let client = test_client(&server).await;

        Mock::given(method("POST"))
            .and(path("/api/files/upload"))
            .and(header("x-org-slug", "acme"))
            .and(body_string_contains("name=\"file\"; filename=\"notes.txt\""))
            .and(body_string_contains("name=\"thread_id\""))
            .and(body_string_contains("name=\"intent\""))
            .and(body_string_contains("chat"))
            .and(body_string_contains("name=\"link_agent\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "f1"})))
            .mount(&server)
            .await;

        let upload = UploadRequest::new("notes.txt", b"hello".to_vec()).for_thread("t1");
        let response = client.upload_file(&test_session(), upload).await.unwrap();
        assert_eq!(response.data["id"], "f1");
    }

    #[tokio::test]
    async fn test_upload_for_agents_joins_ids_with_commas() {
        let server = MockServer::start().await;
        let client = test_client(&server).await;

        Mock::given(method("POST"))
            .and(path("/api/files/upload"))
            .and(body_string_contains("name=\"agent_ids\""))
            .and(body_string_contains("a1,a2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let upload = UploadRequest::new("kb.md", b"# kb".to_vec())
            .for_agents(vec!["a1".to_string(), "a2".to_string()]);
        client.upload_file(&test_session(), upload).await.unwrap();
    }

    #[tokio::test]
    async fn test_admin_upload_hits_admin_endpoint() {
        let server = MockServer::start().await;
        let client = test_client(&server).await;

        Mock::given(method("POST"))
            .and(path("/api/admin/files/upload"))
            .and(body_string_contains("name=\"file\"; filename=\"policy.pdf\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "f2"})))
            .mount(&server)
            .await;

        client
            .admin_upload_file(&test_session(), "policy.pdf", vec![1, 2, 3])
            .await
            .unwrap();
    }

    // --- admin agents ---

    #[tokio::test]
    async fn test_agent_links_accepts_bare_array_and_items_wrapper() {
        let server = MockServer::start().await;
        let client = test_client(&server).await;
        let session = test_session();

        Mock::given(method("GET"))
            .and(path("/api/admin/agents/a1/links"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"target_agent_id": "a2", "mode": "consult"}
            ])))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/admin/agents/a2/links"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{"target_agent_id": "a3"}]
            })))
            .mount(&server)
            .await;

        let links = client.agent_links(&session, "a1").await.unwrap();
        assert_eq!(links[0].target_agent_id, "a2");

        let links = client.agent_links(&session, "a2").await.unwrap();
        assert_eq!(links[0].target_agent_id, "a3");
        assert_eq!(links[0].mode, "consult");
    }

    #[tokio::test]
    async fn test_set_agent_links_puts_targets_and_mode() {
        let server = MockServer::start().await;
        let client = test_client(&server).await;

        Mock::given(method("PUT"))
            .and(path("/api/admin/agents/a1/links"))
            .and(body_json(json!({
                "target_agent_ids": ["a2", "a3"],
                "mode": "consult"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        client
            .set_agent_links(
                &test_session(),
                "a1",
                &["a2".to_string(), "a3".to_string()],
                "consult",
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_knowledge_link_round_trip() {
        let server = MockServer::start().await;
        let client = test_client(&server).await;
        let session = test_session();

        Mock::given(method("POST"))
            .and(path("/api/admin/agents/a1/knowledge"))
            .and(body_json(json!({"file_id": "f1", "enabled": true})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        Mock::given(method("DELETE"))
            .and(path("/api/admin/agents/a1/knowledge/k1"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        client.link_knowledge(&session, "a1", "f1").await.unwrap();
        client.unlink_knowledge(&session, "a1", "k1").await.unwrap();
    }

    #[tokio::test]
    async fn test_rename_and_delete_thread_methods() {
        let server = MockServer::start().await;
        let client = test_client(&server).await;
        let session = test_session();

        Mock::given(method("PATCH"))
            .and(path("/api/threads/t1"))
            .and(body_json(json!({"title": "Renamed"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        Mock::given(method("DELETE"))
            .and(path("/api/threads/t1"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        client.rename_thread(&session, "t1", "Renamed").await.unwrap();
        client.delete_thread(&session, "t1").await.unwrap();
    }
}
