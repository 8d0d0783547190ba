//! Media File Server - Main entry point.
//!
//! Starts the Actix-web server with configured routes and middleware.

use actix_cors::Cors;
use actix_web::http::header::{self, HeaderName};
use actix_web::{App, HttpServer, web};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use media_fileserver_lib::api;
use media_fileserver_lib::auth::UserDirectory;
use media_fileserver_lib::config::Config;
use media_fileserver_lib::middleware::RequestLogger;
use media_fileserver_lib::services::{FileServer, ProtectedRegistry, build_access, load_records_file};

/// Perform health check (for Docker healthcheck).
async fn health_check() -> bool {
    // Simple check - just verify we can load config
    Config::from_env().is_ok()
}

/// Build the permission registry and user directory for protected files.
///
/// Without a records file no protected model is registered, so every
/// protected request is denied.
async fn load_access(config: &Config) -> Result<(ProtectedRegistry, UserDirectory), String> {
    let Some(ref path) = config.files.records_file else {
        info!("No records file configured, protected files are disabled");
        return Ok((ProtectedRegistry::new(), UserDirectory::default()));
    };

    if config.files.protected_root.is_none() {
        return Err(format!(
            "FS_RECORDS_FILE is set to {} but FS_PROTECTED_ROOT is not",
            path.display()
        ));
    }

    let records = load_records_file(path).await.map_err(|e| e.to_string())?;
    Ok(build_access(records))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Check for --health-check flag (used by Docker HEALTHCHECK)
    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|arg| arg == "--health-check") {
        dotenvy::dotenv().ok();
        if health_check().await {
            std::process::exit(0);
        } else {
            std::process::exit(1);
        }
    }

    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        std::process::exit(1);
    }

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            error!("");
            error!("Please check your environment variables:");
            error!("  - RUST_ENV must be set to 'development' or 'production'");
            error!("  - In production, FS_PUBLIC_ROOT must be set to an absolute path");
            error!("  - FS_SENDFILE_BACKEND must be 'local' or 'redirect'");
            std::process::exit(1);
        }
    };

    info!("========================================");
    info!("  Media File Server");
    info!("  Environment: {}", config.environment);
    info!("  Backend: {}", config.files.backend);
    info!("========================================");

    if config.is_development() {
        warn!("Running in DEVELOPMENT mode - do not use in production!");

        // Create media directories
        tokio::fs::create_dir_all(&config.files.public_root).await?;
        if let Some(ref root) = config.files.protected_root {
            tokio::fs::create_dir_all(root).await?;
        }
    }

    let (registry, users) = match load_access(&config).await {
        Ok(access) => access,
        Err(e) => {
            error!("Failed to load protected records: {}", e);
            std::process::exit(1);
        }
    };

    info!(
        "Serving public files from {} (max {} MB per partial response)",
        config.files.public_root.display(),
        config.files.max_chunk_volume_mb
    );
    if let Some(ref root) = config.files.protected_root {
        info!(
            "Serving protected files from {} ({} models, {} fields)",
            root.display(),
            registry.model_count(),
            registry.field_count()
        );
    }

    // Prepare shared state
    let bind_address = config.bind_address();
    let is_development = config.is_development();
    let file_server = web::Data::new(FileServer::new(&config.files));
    let registry = web::Data::new(registry);
    let users = web::Data::new(users);

    let worker_count = if is_development {
        info!(
            "Starting server at http://{} (4 workers - development mode)",
            bind_address
        );
        4
    } else {
        let cpus = num_cpus::get();
        info!(
            "Starting server at http://{} ({} workers)",
            bind_address, cpus
        );
        cpus
    };

    // Start HTTP server
    let server = HttpServer::new(move || {
        let allowed_headers = vec![
            header::ACCEPT,
            header::RANGE,
            HeaderName::from_static("x-api-key"),
        ];
        let exposed_headers = vec![
            header::CONTENT_RANGE,
            header::ACCEPT_RANGES,
            header::CONTENT_DISPOSITION,
        ];

        // Configure CORS
        let cors = if is_development {
            Cors::default()
                .allowed_origin("http://localhost:3000")
                .allowed_origin("http://127.0.0.1:3000")
                .allowed_methods(vec!["GET", "HEAD", "OPTIONS"])
                .allowed_headers(allowed_headers)
                .expose_headers(exposed_headers)
                .max_age(3600)
        } else {
            // Same-origin only
            Cors::default()
                .allowed_methods(vec!["GET", "HEAD", "OPTIONS"])
                .allowed_headers(allowed_headers)
                .expose_headers(exposed_headers)
                .max_age(3600)
        };

        let mut app = App::new()
            // CORS must wrap before other middleware
            .wrap(cors)
            .wrap(RequestLogger)
            .app_data(file_server.clone())
            .app_data(registry.clone())
            .app_data(users.clone())
            .service(web::scope("/api/v1").configure(api::configure_health_routes))
            .service(web::scope("/api/fileserver").configure(api::configure_file_routes));

        if is_development {
            app = app.service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", api::ApiDoc::openapi()),
            );
        }

        app
    });

    server
        .workers(worker_count)
        .bind(&bind_address)?
        .run()
        .await
}
