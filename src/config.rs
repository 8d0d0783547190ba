//! Application configuration loaded from environment variables.

use std::env;
use std::path::{Path, PathBuf};

use crate::services::sendfile::sanitize::normalize_lexically;

/// HTTP header name for API key authentication.
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Header instructing the upstream proxy to serve a file itself.
pub const ACCEL_REDIRECT_HEADER: &str = "X-Accel-Redirect";

/// Header disabling response buffering in the upstream proxy.
pub const ACCEL_BUFFERING_HEADER: &str = "X-Accel-Buffering";

/// Development default values - NEVER use in production.
pub mod defaults {
    pub const DEV_HOST: &str = "127.0.0.1";
    pub const DEV_PORT: u16 = 8080;
    pub const DEV_PUBLIC_ROOT: &str = "./media";
    pub const DEV_PROTECTED_ROOT: &str = "./protected_media";
    pub const PUBLIC_URL: &str = "/media";
    pub const PROTECTED_URL: &str = "/protected";
    pub const MAX_CHUNK_VOLUME_MB: u64 = 5; // Max MB per partial (206) response
    pub const CHUNK_SIZE: usize = 8192; // Bytes per local read
}

/// Runtime environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// Parse environment from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Some(Self::Development),
            "production" | "prod" => Some(Self::Production),
            _ => None,
        }
    }

    /// Check if this is a development environment.
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    /// Check if this is a production environment.
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

/// How file bytes reach the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Read the file in-process, chunk by chunk.
    Local,
    /// Hand the file off to the reverse proxy via `X-Accel-Redirect`.
    Redirect,
}

impl BackendKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "local" | "dev" => Some(Self::Local),
            "redirect" | "nginx" | "accel" => Some(Self::Redirect),
            _ => None,
        }
    }

    /// Backend used when none is configured explicitly.
    pub fn default_for(environment: Environment) -> Self {
        if environment.is_development() {
            Self::Local
        } else {
            Self::Redirect
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Redirect => "redirect",
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// File delivery configuration.
#[derive(Debug, Clone)]
pub struct FileServerSettings {
    /// Root directory for public files
    pub public_root: PathBuf,
    /// URL prefix the proxy maps onto `public_root`
    pub public_url: String,
    /// Root directory for protected (permission-gated) files
    pub protected_root: Option<PathBuf>,
    /// Public URL prefix the proxy maps onto `protected_root`
    pub protected_url: String,
    /// Delivery backend, resolved once at startup
    pub backend: BackendKind,
    /// Maximum megabytes served by a single partial response
    pub max_chunk_volume_mb: u64,
    /// Bytes read per chunk by the local backend
    pub chunk_size: usize,
    /// JSON file describing protected records and users
    pub records_file: Option<PathBuf>,
}

impl FileServerSettings {
    /// Maximum chunk volume in bytes.
    pub fn max_chunk_bytes(&self) -> u64 {
        self.max_chunk_volume_mb.saturating_mul(1024 * 1024)
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Runtime environment
    pub environment: Environment,
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// File delivery settings
    pub files: FileServerSettings,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// In development mode (RUST_ENV=development) every variable has a default.
    /// In production mode `FS_PUBLIC_ROOT` is required and the server will not
    /// start with development defaults.
    ///
    /// Environment variables:
    /// - `RUST_ENV`: Environment (development/production) - REQUIRED
    /// - `FS_HOST`: Server host (default: 127.0.0.1)
    /// - `FS_PORT`: Server port (default: 8080)
    /// - `FS_PUBLIC_ROOT`: Root directory for public files
    /// - `FS_PUBLIC_URL`: URL prefix mapped onto the public root (default: /media)
    /// - `FS_PROTECTED_ROOT`: Root directory for protected files
    /// - `FS_PROTECTED_URL`: URL prefix mapped onto the protected root (default: /protected)
    /// - `FS_SENDFILE_BACKEND`: `local` or `redirect` (default: local in dev, redirect in prod)
    /// - `FS_MAX_CHUNK_VOLUME_MB`: Max MB per partial response (default: 5)
    /// - `FS_CHUNK_SIZE`: Bytes per local read (default: 8192)
    /// - `FS_RECORDS_FILE`: JSON file with protected records and users
    pub fn from_env() -> Result<Self, ConfigError> {
        let env_str = env::var("RUST_ENV").map_err(|_| ConfigError::MissingEnvVar("RUST_ENV"))?;

        let environment = Environment::parse(&env_str).ok_or(ConfigError::InvalidValue(
            "RUST_ENV must be 'development' or 'production'",
        ))?;

        let host = env::var("FS_HOST").unwrap_or_else(|_| defaults::DEV_HOST.to_string());

        let port = env::var("FS_PORT")
            .unwrap_or_else(|_| defaults::DEV_PORT.to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidValue("FS_PORT must be a valid port number"))?;

        let public_root = match env::var("FS_PUBLIC_ROOT") {
            Ok(root) if !root.trim().is_empty() => PathBuf::from(root),
            _ if environment.is_development() => PathBuf::from(defaults::DEV_PUBLIC_ROOT),
            _ => return Err(ConfigError::MissingEnvVar("FS_PUBLIC_ROOT")),
        };

        let protected_root = env::var("FS_PROTECTED_ROOT")
            .ok()
            .filter(|root| !root.trim().is_empty())
            .map(PathBuf::from)
            .or_else(|| {
                if environment.is_development() {
                    Some(PathBuf::from(defaults::DEV_PROTECTED_ROOT))
                } else {
                    None
                }
            });

        let public_url =
            env::var("FS_PUBLIC_URL").unwrap_or_else(|_| defaults::PUBLIC_URL.to_string());

        let protected_url =
            env::var("FS_PROTECTED_URL").unwrap_or_else(|_| defaults::PROTECTED_URL.to_string());

        let backend = match env::var("FS_SENDFILE_BACKEND") {
            Ok(value) => BackendKind::parse(&value).ok_or(ConfigError::InvalidValue(
                "FS_SENDFILE_BACKEND must be 'local' or 'redirect'",
            ))?,
            Err(_) => BackendKind::default_for(environment),
        };

        let max_chunk_volume_mb = env::var("FS_MAX_CHUNK_VOLUME_MB")
            .unwrap_or_else(|_| defaults::MAX_CHUNK_VOLUME_MB.to_string())
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidValue("FS_MAX_CHUNK_VOLUME_MB must be a valid number"))?;

        let chunk_size = env::var("FS_CHUNK_SIZE")
            .unwrap_or_else(|_| defaults::CHUNK_SIZE.to_string())
            .parse::<usize>()
            .map_err(|_| ConfigError::InvalidValue("FS_CHUNK_SIZE must be a valid number"))?;

        let records_file = env::var("FS_RECORDS_FILE").ok().map(PathBuf::from);

        let config = Config {
            environment,
            host,
            port,
            files: FileServerSettings {
                public_root,
                public_url,
                protected_root,
                protected_url,
                backend,
                max_chunk_volume_mb,
                chunk_size,
                records_file,
            },
        };

        config.validate()?;

        if environment.is_production() {
            config.validate_production()?;
        }

        Ok(config)
    }

    /// Reject limits that would make every response empty, and roots that
    /// overlap so protected files could be fetched through the public route.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(ref protected_root) = self.files.protected_root
            && roots_overlap(&self.files.public_root, protected_root)
        {
            return Err(ConfigError::InvalidValue(
                "FS_PUBLIC_ROOT and FS_PROTECTED_ROOT must not contain one another",
            ));
        }

        if self.files.max_chunk_volume_mb == 0 {
            return Err(ConfigError::InvalidValue(
                "FS_MAX_CHUNK_VOLUME_MB must be greater than zero",
            ));
        }
        if self.files.chunk_size == 0 {
            return Err(ConfigError::InvalidValue(
                "FS_CHUNK_SIZE must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Validate that production configuration does not use development defaults.
    fn validate_production(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.files.public_root == PathBuf::from(defaults::DEV_PUBLIC_ROOT) {
            errors.push(format!(
                "FS_PUBLIC_ROOT is using development default '{}'. Set an absolute media directory.",
                defaults::DEV_PUBLIC_ROOT
            ));
        }

        if self.files.public_root.is_relative() {
            errors.push("FS_PUBLIC_ROOT must be an absolute path in production.".to_string());
        }

        if let Some(ref root) = self.files.protected_root
            && root.is_relative()
        {
            errors.push("FS_PROTECTED_ROOT must be an absolute path in production.".to_string());
        }

        if !errors.is_empty() {
            return Err(ConfigError::ProductionValidation(errors));
        }

        Ok(())
    }

    /// Get the server bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check if running in development mode.
    pub fn is_development(&self) -> bool {
        self.environment.is_development()
    }
}

/// Whether one root lies inside the other, compared lexically.
///
/// Relative roots are anchored at the working directory first so `./media`
/// and `/srv/app/media/protected` still compare correctly.
pub fn roots_overlap(a: &Path, b: &Path) -> bool {
    let anchor = |p: &Path| match env::current_dir() {
        Ok(cwd) if p.is_relative() => normalize_lexically(&cwd.join(p)),
        _ => normalize_lexically(p),
    };
    let (a, b) = (anchor(a), anchor(b));
    a.starts_with(&b) || b.starts_with(&a)
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(&'static str),

    #[error("Production configuration validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    ProductionValidation(Vec<String>),
}
