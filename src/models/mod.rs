//! Domain models for the media file server.

pub mod record;
pub mod requester;

// Re-export commonly used types
pub use record::{FieldPolicy, ModelDefinition, ProtectedRecord, RecordsFile};
pub use requester::{Requester, User, UserRole};
