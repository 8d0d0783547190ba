//! Records file loading.
//!
//! The records file declares users, protected models, their downloadable
//! fields and the records themselves. It is read once at startup.

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::auth::UserDirectory;
use crate::error::{AppError, AppResult};
use crate::models::RecordsFile;
use crate::services::access::{InMemoryRecords, ProtectedRegistry};

/// Read and parse a records file.
pub async fn load_records_file(path: &Path) -> AppResult<RecordsFile> {
    let raw = tokio::fs::read(path).await.map_err(|e| {
        AppError::Misconfigured(format!(
            "cannot read records file {}: {}",
            path.display(),
            e
        ))
    })?;

    serde_json::from_slice(&raw).map_err(|e| {
        AppError::Misconfigured(format!(
            "invalid records file {}: {}",
            path.display(),
            e
        ))
    })
}

/// Build the permission registry and user directory from a records file.
pub fn build_access(records: RecordsFile) -> (ProtectedRegistry, UserDirectory) {
    let mut registry = ProtectedRegistry::new();

    for (model, definition) in records.models {
        let source = InMemoryRecords::new(definition.records);
        info!(
            model = %model,
            records = source.len(),
            fields = definition.fields.len(),
            "Registered protected model"
        );

        for (field, policy) in definition.fields {
            info!(model = %model, field = %field, policy = policy.as_str(), "Registered protected field");
            registry.register_field(model.clone(), field, policy.check());
        }
        registry.register_model(model, Arc::new(source));
    }

    let users = UserDirectory::new(records.users);
    info!(users = users.len(), "Loaded user directory");

    (registry, users)
}
