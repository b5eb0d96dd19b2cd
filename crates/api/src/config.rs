use std::path::PathBuf;

use crate::auth::jwt::JwtConfig;

/// Which [`peekit_db::store::StudioStore`] backs the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl StoreBackend {
    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "pg" => Some(Self::Postgres),
            "memory" => Some(Self::Memory),
            _ => None,
        }
    }
}

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Upper bound on draining in-flight requests after a shutdown signal.
    pub shutdown_timeout_secs: u64,
    /// JWT token configuration.
    pub jwt: JwtConfig,
    /// Origin of the client app, used to build public tracking links.
    pub public_origin: String,
    /// Directory uploaded files are written to.
    pub storage_root: PathBuf,
    /// Public base URL under which `storage_root` is served.
    pub storage_public_url: String,
    /// Maximum request body size for uploads, in bytes.
    pub max_upload_bytes: usize,
    pub store_backend: StoreBackend,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                                 |
    /// |------------------------|-----------------------------------------|
    /// | `HOST`                 | `0.0.0.0`                               |
    /// | `PORT`                 | `3000`                                  |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`                 |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                                    |
    /// | `SHUTDOWN_TIMEOUT_SECS`| `30`                                    |
    /// | `PUBLIC_ORIGIN`        | `http://localhost:5173`                 |
    /// | `STORAGE_ROOT`         | `storage`                               |
    /// | `STORAGE_PUBLIC_URL`   | `http://localhost:3000/files`           |
    /// | `MAX_UPLOAD_BYTES`     | `104857600` (100 MiB)                   |
    /// | `STORE_BACKEND`        | `postgres` (`memory` for local demos)   |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let jwt = JwtConfig::from_env();

        let public_origin =
            std::env::var("PUBLIC_ORIGIN").unwrap_or_else(|_| "http://localhost:5173".into());

        let storage_root = PathBuf::from(
            std::env::var("STORAGE_ROOT").unwrap_or_else(|_| "storage".into()),
        );

        let storage_public_url = std::env::var("STORAGE_PUBLIC_URL")
            .unwrap_or_else(|_| format!("http://localhost:{port}/files"));

        let max_upload_bytes: usize = std::env::var("MAX_UPLOAD_BYTES")
            .unwrap_or_else(|_| (100 * 1024 * 1024).to_string())
            .parse()
            .expect("MAX_UPLOAD_BYTES must be a valid usize");

        let store_backend = std::env::var("STORE_BACKEND")
            .map(|v| StoreBackend::parse(&v).expect("STORE_BACKEND must be 'postgres' or 'memory'"))
            .unwrap_or(StoreBackend::Postgres);

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            jwt,
            public_origin,
            storage_root,
            storage_public_url,
            max_upload_bytes,
            store_backend,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_backend_parsing() {
        assert_eq!(StoreBackend::parse("postgres"), Some(StoreBackend::Postgres));
        assert_eq!(StoreBackend::parse(" Memory "), Some(StoreBackend::Memory));
        assert_eq!(StoreBackend::parse("sqlite"), None);
    }
}
