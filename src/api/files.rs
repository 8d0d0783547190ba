//! File serving API handlers.
//!
//! Public files are served by path; protected files are addressed by
//! model, field and primary key and pass the permission gate first.

use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, web};
use tracing::{debug, info};

use crate::auth::Identity;
use crate::error::AppResult;
use crate::services::{FileRequest, FileServer, ProtectedRegistry};

fn range_header(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(header::RANGE)
        .and_then(|v| v.to_str().ok())
}

/// Serve a public file.
///
/// Video files are streamed in byte ranges; everything else is served whole.
#[utoipa::path(
    get,
    path = "/api/fileserver/{filename}",
    tag = "Files",
    params(
        ("filename" = String, Path, description = "File path relative to the public root"),
        ("Range" = Option<String>, Header, description = "bytes=<first>-[<last>], honoured for video files")
    ),
    responses(
        (status = 200, description = "Whole file, or an empty body with X-Accel-Redirect"),
        (status = 206, description = "Partial video content"),
        (status = 404, description = "File not found", body = crate::error::ErrorResponse),
        (status = 416, description = "Range starts past the end of the file", body = crate::error::ErrorResponse),
    )
)]
pub async fn serve_file(
    req: HttpRequest,
    server: web::Data<FileServer>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let filename = path.into_inner();
    let filename = filename.strip_suffix('/').unwrap_or(&filename);

    debug!("Serving public file: {}", filename);

    server
        .sendfile(FileRequest::public(filename), range_header(&req))
        .await
}

/// Serve a permission-gated file field of a record.
#[utoipa::path(
    get,
    path = "/api/fileserver/protected/{model}/{field}/{pk}",
    tag = "Files",
    params(
        ("model" = String, Path, description = "Model name"),
        ("field" = String, Path, description = "File field name"),
        ("pk" = String, Path, description = "Record primary key"),
        ("Range" = Option<String>, Header, description = "bytes=<first>-[<last>], honoured for video files")
    ),
    responses(
        (status = 200, description = "Whole file, or an empty body with X-Accel-Redirect"),
        (status = 206, description = "Partial video content"),
        (status = 401, description = "Unrecognised API key", body = crate::error::ErrorResponse),
        (status = 403, description = "Record missing or permission denied", body = crate::error::DeniedResponse),
    ),
    security(
        (),
        ("api_key" = [])
    )
)]
pub async fn serve_protected(
    req: HttpRequest,
    server: web::Data<FileServer>,
    registry: web::Data<ProtectedRegistry>,
    identity: Identity,
    path: web::Path<(String, String, String)>,
) -> AppResult<HttpResponse> {
    let (model, field, pk) = path.into_inner();

    let stored_path = registry
        .authorize(&model, &field, &pk, &identity.requester)
        .await?;

    info!(
        model = %model,
        field = %field,
        pk = %pk,
        requester = %identity.requester,
        "Protected file access granted"
    );

    server
        .sendfile(FileRequest::protected(stored_path), range_header(&req))
        .await
}

/// Configure file routes.
///
/// A public file stored at `protected/<a>/<b>/<c>` is unreachable: that shape
/// always resolves to the gated route. Shorter or deeper paths under
/// `protected/` stay public.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    // Protected route first so it is not swallowed by the catch-all
    cfg.service(
        web::resource("/protected/{model}/{field}/{pk}").route(web::get().to(serve_protected)),
    )
    .service(web::resource("/{filename:.+}").route(web::get().to(serve_file)));
}
