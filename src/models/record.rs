//! Protected record models and the records file layout.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::requester::{Requester, User};

/// Record owning one or more protected files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtectedRecord {
    /// Primary key, matched against the `{pk}` URL segment
    pub pk: String,
    /// Owning user id, if the record belongs to someone
    #[serde(default)]
    pub owner_id: Option<String>,
    /// File-valued fields: field name to path under the protected root
    #[serde(default)]
    pub files: HashMap<String, String>,
}

impl ProtectedRecord {
    pub fn file(&self, field: &str) -> Option<&str> {
        self.files
            .get(field)
            .map(String::as_str)
            .filter(|path| !path.is_empty())
    }

    pub fn is_owned_by(&self, requester: &Requester) -> bool {
        match (self.owner_id.as_deref(), requester.user_id()) {
            (Some(owner), Some(user)) => owner == user,
            _ => false,
        }
    }
}

/// Who may download a protected field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldPolicy {
    /// Anyone, including anonymous callers
    Public,
    /// Any authenticated user
    Authenticated,
    /// The record owner and staff
    Owner,
    /// Staff only
    Staff,
}

impl FieldPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Authenticated => "authenticated",
            Self::Owner => "owner",
            Self::Staff => "staff",
        }
    }
}

/// One model section of the records file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelDefinition {
    /// Field name to access policy; fields not listed are never served
    #[serde(default)]
    pub fields: HashMap<String, FieldPolicy>,
    #[serde(default)]
    pub records: Vec<ProtectedRecord>,
}

/// Records file loaded at startup.
///
/// ```json
/// {
///   "users": [{ "id": "u1", "name": "Alice", "role": "member", "key_hash": "..." }],
///   "models": {
///     "account": {
///       "fields": { "profile_image": "owner" },
///       "records": [
///         { "pk": "1", "owner_id": "u1", "files": { "profile_image": "account/1/avatar.png" } }
///       ]
///     }
///   }
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordsFile {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub models: HashMap<String, ModelDefinition>,
}
