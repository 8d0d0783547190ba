//! Resolve requested paths against a root directory.
//!
//! Every failure collapses into `AppError::NotFound` so clients cannot tell a
//! traversal attempt from a missing file.

use std::path::{Component, Path, PathBuf};

use crate::error::{AppError, AppResult};

/// A file confirmed to live under its root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedFile {
    pub path: PathBuf,
    pub size: u64,
}

impl SanitizedFile {
    /// Final path component, used as the default download name.
    pub fn file_name(&self) -> Option<String> {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
    }
}

/// Collapse `.` and `..` segments without touching the filesystem.
///
/// `..` at the filesystem root stays at the root; leading `..` on a relative
/// path is kept so the containment check rejects it.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }

    out.iter().collect()
}

/// Join `candidate` onto `root` and verify the result stays inside `root`.
///
/// An absolute candidate replaces the root entirely (like `Path::join`), so it
/// only passes when it already points inside the root.
pub fn resolve_within(root: &Path, candidate: &str) -> AppResult<PathBuf> {
    if root.as_os_str().is_empty() {
        return Err(AppError::NotFound("file root is not configured".to_string()));
    }

    let root = normalize_lexically(root);
    let resolved = normalize_lexically(&root.join(candidate));

    if resolved.starts_with(&root) {
        Ok(resolved)
    } else {
        Err(AppError::NotFound(format!(
            "{} escapes {}",
            resolved.display(),
            root.display()
        )))
    }
}

/// Resolve `candidate` under `root` and confirm it is an existing regular file.
pub async fn sanitize_path(root: Option<&Path>, candidate: &str) -> AppResult<SanitizedFile> {
    let root = root.ok_or_else(|| AppError::NotFound("file root is not configured".to_string()))?;
    let path = resolve_within(root, candidate)?;

    let metadata = tokio::fs::metadata(&path)
        .await
        .map_err(|e| AppError::NotFound(format!("{}: {}", path.display(), e)))?;

    if !metadata.is_file() {
        return Err(AppError::NotFound(format!(
            "{} is not a regular file",
            path.display()
        )));
    }

    Ok(SanitizedFile {
        path,
        size: metadata.len(),
    })
}
