//! Delivery backends: in-process chunked reads or proxy accelerated redirects.

use std::io::SeekFrom;
use std::path::{Path, PathBuf};

use actix_web::web::Bytes;
use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

use super::sanitize::normalize_lexically;
use crate::config::{BackendKind, FileServerSettings};
use crate::error::AppResult;

/// A root directory and the URL prefix the reverse proxy serves it under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mount {
    pub root: PathBuf,
    pub url_prefix: String,
}

impl Mount {
    pub fn new(root: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            url_prefix: url_prefix.into(),
        }
    }

    /// Translate a file under this mount into the proxy-internal URL.
    ///
    /// Each path segment is percent-encoded. Returns `None` when the path is
    /// not inside the mount, so a filesystem path is never sent upstream.
    pub fn internal_url(&self, path: &Path) -> Option<String> {
        let root = normalize_lexically(&self.root);
        let relative = normalize_lexically(path).strip_prefix(&root).ok()?.to_path_buf();

        let mut segments = Vec::new();
        for component in relative.components() {
            match component {
                std::path::Component::Normal(segment) => {
                    segments.push(urlencoding::encode(segment.to_str()?).into_owned());
                }
                _ => return None,
            }
        }

        let prefix = self.url_prefix.trim_end_matches('/');
        let prefix = if prefix.starts_with('/') {
            prefix.to_string()
        } else {
            format!("/{}", prefix)
        };

        if segments.is_empty() {
            Some(prefix)
        } else {
            Some(format!("{}/{}", prefix.trim_end_matches('/'), segments.join("/")))
        }
    }
}

/// Delivery strategy, chosen once from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendfileBackend {
    /// Stream the file from this process in `chunk_size` reads.
    Local { chunk_size: usize },
    /// Emit `X-Accel-Redirect` and let the proxy send the bytes.
    Redirect,
}

impl SendfileBackend {
    pub fn from_settings(settings: &FileServerSettings) -> Self {
        match settings.backend {
            BackendKind::Local => Self::Local {
                chunk_size: settings.chunk_size,
            },
            BackendKind::Redirect => Self::Redirect,
        }
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            Self::Local { .. } => BackendKind::Local,
            Self::Redirect => BackendKind::Redirect,
        }
    }
}

/// Chunks of a file read by the local backend.
pub type ChunkStream = BoxStream<'static, std::io::Result<Bytes>>;

/// Open `path` and stream `length` bytes starting at `offset`.
///
/// Each chunk is a separate read, so other requests progress between chunks.
/// The file handle lives inside the stream and is closed when the stream is
/// dropped, including when the client disconnects mid-body.
pub async fn chunked_file_stream(
    path: &Path,
    offset: u64,
    length: u64,
    chunk_size: usize,
) -> AppResult<ChunkStream> {
    let mut file = File::open(path).await?;
    if offset > 0 {
        file.seek(SeekFrom::Start(offset)).await?;
    }

    let chunk_size = chunk_size.max(1);
    Ok(
        futures_util::stream::try_unfold((file, length), move |state| {
            read_chunk(state, chunk_size)
        })
        .boxed(),
    )
}

async fn read_chunk(
    (mut file, remaining): (File, u64),
    chunk_size: usize,
) -> std::io::Result<Option<(Bytes, (File, u64))>> {
    if remaining == 0 {
        return Ok(None);
    }

    let want = remaining.min(chunk_size as u64) as usize;
    let mut buf = vec![0u8; want];
    let read = file.read(&mut buf).await?;
    if read == 0 {
        return Ok(None);
    }

    buf.truncate(read);
    Ok(Some((Bytes::from(buf), (file, remaining - read as u64))))
}
