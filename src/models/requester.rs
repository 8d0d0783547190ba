//! Requesting user model used by permission checks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User roles for protected file access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Staff,
    #[default]
    Member,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Staff => "staff",
            Self::Member => "member",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "staff" => Some(Self::Staff),
            "member" => Some(Self::Member),
            _ => None,
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// User known to the file server, as declared in the records file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Identifier referenced by record owners
    pub id: String,
    /// Human-readable name
    pub name: String,
    #[serde(default)]
    pub role: UserRole,
    /// SHA-256 hex digest of the user's API key
    pub key_hash: String,
    /// Expiration timestamp (optional)
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl User {
    /// Check if the key is expired.
    pub fn is_expired(&self) -> bool {
        if let Some(expires_at) = self.expires_at {
            Utc::now() > expires_at
        } else {
            false
        }
    }
}

/// Caller of a file request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requester {
    /// No credentials were presented.
    Anonymous,
    /// Caller authenticated with a valid API key.
    User {
        id: String,
        name: String,
        role: UserRole,
    },
}

impl Requester {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::User { .. })
    }

    pub fn is_staff(&self) -> bool {
        matches!(
            self,
            Self::User {
                role: UserRole::Staff,
                ..
            }
        )
    }

    pub fn user_id(&self) -> Option<&str> {
        match self {
            Self::User { id, .. } => Some(id),
            Self::Anonymous => None,
        }
    }
}

impl From<&User> for Requester {
    fn from(user: &User) -> Self {
        Self::User {
            id: user.id.clone(),
            name: user.name.clone(),
            role: user.role,
        }
    }
}

impl std::fmt::Display for Requester {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Anonymous => write!(f, "anonymous"),
            Self::User { id, role, .. } => write!(f, "{} ({})", id, role),
        }
    }
}
