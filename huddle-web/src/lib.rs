//! huddle-web — static host for the built Huddle web console.
//!
//! Serves the frontend `dist/` bundle plus one dynamic route, `/env.js`,
//! which injects the backend base URL into the page at runtime so one build
//! can point at different deployments.

pub mod http;
