use serde::{Deserialize, Serialize};

/// A platform account, as returned by the auth and admin endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub org_slug: Option<String>,
    /// Epoch seconds; unset until an admin approves the account.
    #[serde(default)]
    pub approved_at: Option<i64>,
    #[serde(default)]
    pub created_at: Option<i64>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }

    /// Admins count as approved regardless of `approved_at`.
    pub fn is_approved(&self) -> bool {
        self.is_admin() || self.approved_at.is_some()
    }

    /// Name to show for this account, falling back to the email.
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(n) if !n.is_empty() => n,
            _ => &self.email,
        }
    }
}

/// Body of a successful login or register call.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub user: User,
}
