//! Permission gate for protected files.
//!
//! Each `(model, field)` pair that may be downloaded registers a typed
//! permission check at startup. Every way a lookup can fail (unknown model,
//! missing record, unregistered field, failed check, empty file field)
//! produces the same `AppError::PermissionDenied`, so callers cannot learn
//! which primary keys exist.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::{AppError, AppResult};
use crate::models::{FieldPolicy, ProtectedRecord, Requester};

/// Decides whether `requester` may download a field of `record`.
pub type PermissionCheck = fn(&ProtectedRecord, &Requester) -> bool;

/// Loads records of one model by primary key.
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn find(&self, pk: &str) -> AppResult<Option<ProtectedRecord>>;
}

/// Records held in memory, keyed by primary key.
#[derive(Debug, Default, Clone)]
pub struct InMemoryRecords {
    records: HashMap<String, ProtectedRecord>,
}

impl InMemoryRecords {
    pub fn new(records: impl IntoIterator<Item = ProtectedRecord>) -> Self {
        Self {
            records: records
                .into_iter()
                .map(|record| (record.pk.clone(), record))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl RecordSource for InMemoryRecords {
    async fn find(&self, pk: &str) -> AppResult<Option<ProtectedRecord>> {
        Ok(self.records.get(pk).cloned())
    }
}

pub fn allow_any(_record: &ProtectedRecord, _requester: &Requester) -> bool {
    true
}

pub fn allow_authenticated(_record: &ProtectedRecord, requester: &Requester) -> bool {
    requester.is_authenticated()
}

pub fn allow_owner_or_staff(record: &ProtectedRecord, requester: &Requester) -> bool {
    requester.is_staff() || record.is_owned_by(requester)
}

pub fn allow_staff(_record: &ProtectedRecord, requester: &Requester) -> bool {
    requester.is_staff()
}

impl FieldPolicy {
    /// Permission check implementing this policy.
    pub fn check(self) -> PermissionCheck {
        match self {
            FieldPolicy::Public => allow_any,
            FieldPolicy::Authenticated => allow_authenticated,
            FieldPolicy::Owner => allow_owner_or_staff,
            FieldPolicy::Staff => allow_staff,
        }
    }
}

/// Registered models and their downloadable fields.
#[derive(Default, Clone)]
pub struct ProtectedRegistry {
    sources: HashMap<String, Arc<dyn RecordSource>>,
    checks: HashMap<(String, String), PermissionCheck>,
}

impl ProtectedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the record source for `model`.
    pub fn register_model(&mut self, model: impl Into<String>, source: Arc<dyn RecordSource>) {
        self.sources.insert(model.into(), source);
    }

    /// Allow downloads of `model.field` when `check` passes.
    pub fn register_field(
        &mut self,
        model: impl Into<String>,
        field: impl Into<String>,
        check: PermissionCheck,
    ) {
        self.checks.insert((model.into(), field.into()), check);
    }

    pub fn model_count(&self) -> usize {
        self.sources.len()
    }

    pub fn field_count(&self) -> usize {
        self.checks.len()
    }

    /// Resolve the stored file path of `model.field` on record `pk`, if the
    /// requester is allowed to download it.
    pub async fn authorize(
        &self,
        model: &str,
        field: &str,
        pk: &str,
        requester: &Requester,
    ) -> AppResult<String> {
        let source = self.sources.get(model).ok_or_else(|| {
            debug!(model, "Unknown protected model");
            AppError::PermissionDenied
        })?;

        let record = match source.find(pk).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                debug!(model, pk, "Protected record not found");
                return Err(AppError::PermissionDenied);
            }
            Err(e) => {
                warn!(model, pk, "Protected record lookup failed: {}", e);
                return Err(AppError::PermissionDenied);
            }
        };

        let check = self
            .checks
            .get(&(model.to_string(), field.to_string()))
            .ok_or_else(|| {
                debug!(model, field, "No permission check registered");
                AppError::PermissionDenied
            })?;

        if !check(&record, requester) {
            debug!(model, field, pk, requester = %requester, "Permission check failed");
            return Err(AppError::PermissionDenied);
        }

        record
            .file(field)
            .map(str::to_string)
            .ok_or(AppError::PermissionDenied)
    }
}

impl std::fmt::Debug for ProtectedRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut fields: Vec<String> = self
            .checks
            .keys()
            .map(|(model, field)| format!("{}.{}", model, field))
            .collect();
        fields.sort();
        f.debug_struct("ProtectedRegistry")
            .field("models", &self.sources.len())
            .field("fields", &fields)
            .finish()
    }
}
