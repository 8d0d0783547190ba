//! OpenAPI documentation configuration.

use utoipa::OpenApi;

use crate::{api, error};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Media File Server",
        version = "0.1.0",
        description = "Serves public and permission-gated media files with byte-range streaming and accelerated redirects"
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    paths(
        // Health endpoints
        api::health::health,
        api::health::ready,
        api::health::info,
        // File endpoints
        api::files::serve_file,
        api::files::serve_protected,
    ),
    components(
        schemas(
            // Common
            error::ErrorResponse,
            error::DeniedResponse,
            // Health
            api::health::HealthResponse,
            api::health::ReadyResponse,
            api::health::ServerInfoResponse,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Files", description = "Public and protected file delivery")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Add API key security scheme.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "api_key",
                utoipa::openapi::security::SecurityScheme::ApiKey(
                    utoipa::openapi::security::ApiKey::Header(
                        utoipa::openapi::security::ApiKeyValue::new("X-API-Key"),
                    ),
                ),
            );
        }
    }
}
