//! Business logic services.

pub mod access;
pub mod api_key;
pub mod records;
pub mod sendfile;

pub use access::{PermissionCheck, ProtectedRegistry, RecordSource};
pub use records::{build_access, load_records_file};
pub use sendfile::{FileRequest, FileServer};
