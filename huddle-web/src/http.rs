//! Huddle web host
//!
//! Axum-based static server for the built web console. The bundle is plain
//! files; the only dynamic piece is `/env.js`, which hands the page its
//! runtime configuration before the first API request.
//!
//! Routes:
//! - GET /env.js — runtime environment script (shadows any `env.js` file
//!   that happens to be in the dist dir)
//! - everything else — the matching file from the dist dir; unmatched paths
//!   fall back to `index.html` so client-side routes deep-link correctly

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::services::{ServeDir, ServeFile};

/// Shared state for the dynamic routes
#[derive(Clone)]
pub struct WebState {
    pub api_base_url: String,
    pub dist_dir: PathBuf,
}

/// Build the Axum router: the environment script plus the static bundle.
pub fn build_router(state: Arc<WebState>) -> Router {
    let index = ServeFile::new(state.dist_dir.join("index.html"));
    let assets = ServeDir::new(&state.dist_dir)
        .append_index_html_on_directories(false)
        .not_found_service(index);

    Router::new()
        .route("/env.js", get(env_handler))
        .fallback_service(assets)
        .with_state(state)
}

/// Start the server on `addr`.
/// Gracefully shuts down when the broadcast shutdown signal fires.
pub async fn start_server(
    addr: &str,
    state: WebState,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<()> {
    let dist = state.dist_dir.display().to_string();
    let app = build_router(Arc::new(state));
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("huddle-web serving {} on http://{}", dist, addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
            tracing::info!("huddle-web shutting down...");
        })
        .await?;

    Ok(())
}

// ============================================================================
// Environment script
// ============================================================================

/// Script body for `/env.js`. The value lands on `window.__HUDDLE_ENV__`,
/// where the console's API layer reads it before building its base URL.
/// JSON-encoding the payload keeps arbitrary URLs safe inside the script.
pub fn env_script(api_base_url: &str) -> String {
    let payload = serde_json::json!({ "VITE_API_BASE_URL": api_base_url });
    format!("window.__HUDDLE_ENV__={payload};")
}

async fn env_handler(State(state): State<Arc<WebState>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
        env_script(&state.api_base_url),
    )
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // TEST 1: env_script embeds the URL as a JSON payload
    // ========================================================================
    #[test]
    fn test_env_script_embeds_url() {
        let script = env_script("http://api.example.com");
        assert_eq!(
            script,
            r#"window.__HUDDLE_ENV__={"VITE_API_BASE_URL":"http://api.example.com"};"#
        );
    }

    // ========================================================================
    // TEST 2: env_script with no configured URL emits an empty string
    // ========================================================================
    #[test]
    fn test_env_script_empty_url() {
        let script = env_script("");
        assert_eq!(script, r#"window.__HUDDLE_ENV__={"VITE_API_BASE_URL":""};"#);
    }

    // ========================================================================
    // TEST 3: env_script escapes characters that would break the script
    // ========================================================================
    #[test]
    fn test_env_script_escapes_quotes() {
        let script = env_script(r#"http://x/"onload="evil"#);
        assert!(script.contains(r#"\"onload=\"evil"#), "got: {script}");
        assert!(script.starts_with("window.__HUDDLE_ENV__={"));
        assert!(script.ends_with("};"));
    }
}
