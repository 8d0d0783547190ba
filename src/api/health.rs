//! Health check endpoints.

use actix_web::{HttpResponse, get, web};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::services::FileServer;

/// Health check response.
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    status: String,
    timestamp: String,
}

/// Readiness check response.
#[derive(Serialize, ToSchema)]
pub struct ReadyResponse {
    status: String,
    /// `available` or `missing`
    public_root: String,
    /// `available`, `missing` or `disabled`
    protected_root: String,
}

/// Server info response.
#[derive(Serialize, ToSchema)]
pub struct ServerInfoResponse {
    version: String,
    backend: String,
    protected_files: bool,
}

/// Health check endpoint.
///
/// Returns 200 if the service is running.
#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
#[get("/health")]
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

async fn dir_state(path: &std::path::Path) -> &'static str {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_dir() => "available",
        _ => "missing",
    }
}

/// Readiness check endpoint.
///
/// Returns 200 if the public root (and the protected root, when configured)
/// is an accessible directory.
#[utoipa::path(
    get,
    path = "/api/v1/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Service is ready", body = ReadyResponse),
        (status = 503, description = "Service unavailable", body = ReadyResponse)
    )
)]
#[get("/ready")]
pub async fn ready(server: web::Data<FileServer>) -> HttpResponse {
    let public_root = dir_state(&server.public_mount().root).await;
    let protected_root = match server.protected_mount() {
        Some(mount) => dir_state(&mount.root).await,
        None => "disabled",
    };

    let is_ready = public_root == "available" && protected_root != "missing";
    let body = ReadyResponse {
        status: (if is_ready { "ready" } else { "not_ready" }).to_string(),
        public_root: public_root.to_string(),
        protected_root: protected_root.to_string(),
    };

    if is_ready {
        HttpResponse::Ok().json(body)
    } else {
        HttpResponse::ServiceUnavailable().json(body)
    }
}

/// Server info endpoint.
#[utoipa::path(
    get,
    path = "/api/v1/info",
    tag = "Health",
    responses(
        (status = 200, description = "Server version and delivery backend", body = ServerInfoResponse)
    )
)]
#[get("/info")]
pub async fn info(server: web::Data<FileServer>) -> HttpResponse {
    HttpResponse::Ok().json(ServerInfoResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        backend: server.backend().to_string(),
        protected_files: server.protected_mount().is_some(),
    })
}

/// Configure health routes.
pub fn configure_health_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health).service(ready).service(info);
}
