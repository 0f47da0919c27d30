//! Persistent login state.
//!
//! A [`Session`] carries the bearer token, tenant slug, and cached profile of
//! the signed-in user. [`SessionStore`] round-trips it through a JSON file in
//! the platform data directory, writing atomically so a crash mid-save never
//! leaves a truncated file behind.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::models::User;

/// Tenant used when nothing else is configured.
pub const DEFAULT_TENANT: &str = "public";

const SESSION_FILE: &str = "session.json";

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Failed to read session at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write session at {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to encode session: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("No home directory available for session storage")]
    NoHome,
}

/// Who the client is acting as.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_tenant")]
    pub tenant: String,
    #[serde(default)]
    pub user: Option<User>,
}

fn default_tenant() -> String {
    DEFAULT_TENANT.to_string()
}

impl Default for Session {
    fn default() -> Self {
        Self::anonymous()
    }
}

impl Session {
    /// A signed-out session against the default tenant.
    pub fn anonymous() -> Self {
        Self {
            token: None,
            tenant: default_tenant(),
            user: None,
        }
    }

    /// A signed-out session against a specific tenant.
    pub fn anonymous_for(tenant: impl Into<String>) -> Self {
        Self {
            token: None,
            tenant: tenant.into(),
            user: None,
        }
    }

    /// A signed-in session. The tenant comes from the user's profile when the
    /// server reports one.
    pub fn authenticated(token: impl Into<String>, tenant: impl Into<String>, user: User) -> Self {
        let tenant = user
            .org_slug
            .clone()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| tenant.into());
        Self {
            token: Some(token.into()),
            tenant,
            user: Some(user),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.bearer_token().is_some()
    }

    /// The token to put on the wire, if any. Whitespace-only tokens count as
    /// absent.
    pub fn bearer_token(&self) -> Option<&str> {
        self.token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// The tenant to put on the wire. Never empty.
    pub fn tenant_slug(&self) -> &str {
        let tenant = self.tenant.trim();
        if tenant.is_empty() {
            DEFAULT_TENANT
        } else {
            tenant
        }
    }

    pub fn is_admin(&self) -> bool {
        self.user.as_ref().map(User::is_admin).unwrap_or(false)
    }
}

/// True when the session belongs to an admin user.
pub fn is_admin(session: &Session) -> bool {
    session.is_admin()
}

/// Reads and writes [`Session`]s at a fixed path.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Store at the platform data directory, e.g.
    /// `~/.local/share/huddle/session.json` on Linux.
    pub fn open_default() -> Result<Self, SessionError> {
        let dirs = ProjectDirs::from("dev", "huddle", "huddle").ok_or(SessionError::NoHome)?;
        Ok(Self::at(dirs.data_dir().join(SESSION_FILE)))
    }

    /// Store at an explicit path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the saved session. A missing file means nobody is signed in; a
    /// file we cannot parse is treated the same way rather than locking the
    /// user out.
    pub fn load(&self) -> Result<Session, SessionError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Session::anonymous());
            }
            Err(source) => {
                return Err(SessionError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        match serde_json::from_str(&contents) {
            Ok(session) => Ok(session),
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "discarding unreadable session file");
                Ok(Session::anonymous())
            }
        }
    }

    /// Persist the session, replacing any previous one atomically.
    pub fn save(&self, session: &Session) -> Result<(), SessionError> {
        let parent = self.path.parent().filter(|dir| !dir.as_os_str().is_empty());

        if let Some(dir) = parent {
            fs::create_dir_all(dir).map_err(|source| SessionError::Write {
                path: self.path.clone(),
                source,
            })?;
        }

        let contents = serde_json::to_string_pretty(session)?;
        let mut temp_file = match parent {
            Some(dir) => NamedTempFile::new_in(dir),
            None => NamedTempFile::new(),
        }
        .map_err(|source| SessionError::Write {
            path: self.path.clone(),
            source,
        })?;

        temp_file
            .write_all(contents.as_bytes())
            .map_err(|source| SessionError::Write {
                path: self.path.clone(),
                source,
            })?;
        temp_file
            .as_file_mut()
            .sync_all()
            .map_err(|source| SessionError::Write {
                path: self.path.clone(),
                source,
            })?;
        temp_file
            .persist(&self.path)
            .map_err(|err| SessionError::Write {
                path: self.path.clone(),
                source: err.error,
            })?;
        Ok(())
    }

    /// Remove the saved session. Succeeds when there is nothing to remove.
    pub fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(SessionError::Write {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
