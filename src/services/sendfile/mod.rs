//! File delivery: path sanitizing, backend selection, byte ranges and
//! response assembly.
//!
//! Video files always go through the range path and are streamed from this
//! process in windows of at most `max_chunk_volume_mb`. Everything else is
//! delivered whole by the configured backend.
//!
//! No `Connection` header is set here: actix-http owns connection
//! persistence and keeps HTTP/1.1 connections alive by default.

pub mod backend;
pub mod content;
pub mod range;
pub mod sanitize;

use actix_web::body::SizedStream;
use actix_web::http::{StatusCode, header};
use actix_web::{HttpResponse, HttpResponseBuilder};
use tracing::{debug, warn};

use crate::config::{
    ACCEL_BUFFERING_HEADER, ACCEL_REDIRECT_HEADER, BackendKind, FileServerSettings, roots_overlap,
};
use crate::error::{AppError, AppResult};

pub use backend::{Mount, SendfileBackend, chunked_file_stream};
pub use content::{DisplayName, content_disposition, guess_type, is_video};
pub use range::{ByteRange, RangeRequest, compute_range, parse_range_header};
pub use sanitize::{SanitizedFile, sanitize_path};

/// Which configured root a request is resolved against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RootKind {
    #[default]
    Public,
    Protected,
}

/// A single file delivery request.
#[derive(Debug, Clone, Default)]
pub struct FileRequest {
    /// Path relative to the root (absolute paths must already lie inside it)
    pub path: String,
    /// Ask the client to download rather than display
    pub attachment: bool,
    pub display_name: DisplayName,
    /// Overrides the guessed MIME type
    pub mime_type: Option<String>,
    /// Overrides the guessed content encoding
    pub encoding: Option<String>,
    pub root: RootKind,
}

impl FileRequest {
    pub fn public(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn protected(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            root: RootKind::Protected,
            ..Self::default()
        }
    }

    pub fn attachment(mut self, display_name: DisplayName) -> Self {
        self.attachment = true;
        self.display_name = display_name;
        self
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = Some(encoding.into());
        self
    }
}

/// Immutable delivery state shared by all workers.
#[derive(Debug, Clone)]
pub struct FileServer {
    backend: SendfileBackend,
    public: Mount,
    protected: Option<Mount>,
    max_chunk_bytes: u64,
    chunk_size: usize,
}

impl FileServer {
    pub fn new(settings: &FileServerSettings) -> Self {
        Self {
            backend: SendfileBackend::from_settings(settings),
            public: Mount::new(settings.public_root.clone(), settings.public_url.clone()),
            protected: settings
                .protected_root
                .as_ref()
                .map(|root| Mount::new(root.clone(), settings.protected_url.clone())),
            max_chunk_bytes: settings.max_chunk_bytes(),
            chunk_size: settings.chunk_size,
        }
    }

    pub fn backend(&self) -> BackendKind {
        self.backend.kind()
    }

    pub fn public_mount(&self) -> &Mount {
        &self.public
    }

    pub fn protected_mount(&self) -> Option<&Mount> {
        self.protected.as_ref()
    }

    fn mount(&self, root: RootKind) -> Option<&Mount> {
        match root {
            RootKind::Public => Some(&self.public),
            RootKind::Protected => self.protected.as_ref(),
        }
    }

    /// Build the response for `request`.
    ///
    /// `range_header` is the raw `Range` request header, only consulted for
    /// video files.
    pub async fn sendfile(
        &self,
        request: FileRequest,
        range_header: Option<&str>,
    ) -> AppResult<HttpResponse> {
        let mount = self.mount(request.root);
        let file = sanitize_path(mount.map(|m| m.root.as_path()), &request.path).await?;

        // Protected files are only reachable through the permission gate
        if request.root == RootKind::Public
            && let Some(protected) = &self.protected
            && roots_overlap(&file.path, &protected.root)
        {
            warn!(
                path = %file.path.display(),
                "Public request resolved into the protected root"
            );
            return Err(AppError::NotFound(
                "public path inside protected root".to_string(),
            ));
        }

        let (guessed_type, guessed_encoding) = guess_type(&file.path);
        let mime_type = request
            .mime_type
            .clone()
            .or(guessed_type)
            .unwrap_or_else(|| content::DEFAULT_MIME_TYPE.to_string());
        let encoding = request
            .encoding
            .clone()
            .or_else(|| guessed_encoding.map(str::to_string));

        let filename = match &request.display_name {
            DisplayName::FromPath => file.file_name(),
            DisplayName::Omit => None,
            DisplayName::Custom(name) => Some(name.clone()),
        };

        let mut response = HttpResponse::Ok();
        response
            .insert_header((
                header::CONTENT_DISPOSITION,
                content_disposition(request.attachment, filename.as_deref()),
            ))
            .insert_header((header::CONTENT_TYPE, mime_type.clone()));
        if let Some(encoding) = encoding {
            response.insert_header((header::CONTENT_ENCODING, encoding));
        }

        if is_video(&mime_type) && file.size > 0 {
            self.stream_range(response, &file, range_header).await
        } else {
            self.deliver_whole(response, &file, mount).await
        }
    }

    /// Serve one window of a video file with 206 Partial Content.
    async fn stream_range(
        &self,
        mut response: HttpResponseBuilder,
        file: &SanitizedFile,
        range_header: Option<&str>,
    ) -> AppResult<HttpResponse> {
        let range = compute_range(
            parse_range_header(range_header),
            file.size,
            self.max_chunk_bytes,
        )?;
        debug!(
            path = %file.path.display(),
            first = range.first,
            last = range.last,
            total = range.total,
            "Streaming byte range"
        );

        let stream =
            chunked_file_stream(&file.path, range.first, range.length(), self.chunk_size).await?;
        let content_range = range.content_range();

        Ok(response
            .status(StatusCode::PARTIAL_CONTENT)
            .insert_header((header::CONTENT_RANGE, content_range.clone()))
            .insert_header((header::ACCEPT_RANGES, content_range))
            .insert_header((ACCEL_BUFFERING_HEADER, "no"))
            .body(SizedStream::new(range.length(), stream)))
    }

    /// Serve the whole file through the configured backend.
    async fn deliver_whole(
        &self,
        mut response: HttpResponseBuilder,
        file: &SanitizedFile,
        mount: Option<&Mount>,
    ) -> AppResult<HttpResponse> {
        match self.backend {
            SendfileBackend::Local { chunk_size } => {
                let stream = chunked_file_stream(&file.path, 0, file.size, chunk_size).await?;
                Ok(response.body(SizedStream::new(file.size, stream)))
            }
            SendfileBackend::Redirect => {
                let url = mount.and_then(|m| m.internal_url(&file.path)).ok_or_else(|| {
                    warn!(
                        path = %file.path.display(),
                        "Cannot translate file path to an internal redirect URL"
                    );
                    AppError::NotFound("no internal URL for file".to_string())
                })?;
                debug!(url = %url, "Delegating file to proxy");

                Ok(response.insert_header((ACCEL_REDIRECT_HEADER, url)).finish())
            }
        }
    }
}
