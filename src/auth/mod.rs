//! Authentication module for identifying the requesting user.

mod extractor;

use subtle::ConstantTimeEq;

use crate::models::{Requester, User};
use crate::services::api_key::hash_key;

pub use extractor::Identity;

/// Users allowed to authenticate, matched by API key hash.
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    users: Vec<User>,
}

impl UserDirectory {
    pub fn new(users: Vec<User>) -> Self {
        Self { users }
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Resolve a presented API key to its user.
    ///
    /// Every stored hash is compared with `subtle::ConstantTimeEq`, with no
    /// early exit on the first match, so timing does not reveal which entry
    /// matched. Expired keys are rejected.
    pub fn verify(&self, provided: &str) -> Option<Requester> {
        let provided_hash = hash_key(provided);
        let mut found: Option<&User> = None;

        for user in &self.users {
            let matches: bool = user
                .key_hash
                .to_lowercase()
                .as_bytes()
                .ct_eq(provided_hash.as_bytes())
                .into();
            if matches && found.is_none() {
                found = Some(user);
            }
        }

        found
            .filter(|user| !user.is_expired())
            .map(Requester::from)
    }
}
