use std::env;

/// Where uploaded posters and actor pictures are kept
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// Files on the local disk, served back under `/uploads`
    Local,
    /// S3-compatible object store (MinIO, AWS)
    S3,
}

impl StorageBackend {
    fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "s3" | "minio" => StorageBackend::S3,
            _ => StorageBackend::Local,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Database connection string (default: "sqlite://movies.db?mode=rwc")
    pub database_url: String,

    /// Symmetric key used to sign bearer tokens (Required in production)
    pub jwt_secret: String,

    /// Token lifetime in days (default: 365)
    pub token_lifetime_days: i64,

    /// Upper bound for `recordsPerPage` on paginated listings (default: 50)
    pub max_records_per_page: u64,

    /// Maximum request body size for multipart uploads in bytes (default: 10 MB)
    pub max_upload_size: usize,

    /// Storage backend: "local" or "s3" (default: "local")
    pub storage_backend: StorageBackend,

    /// Root directory for the local backend (default: "wwwroot")
    pub local_storage_path: String,

    /// Public URL prefix under which the local backend's files are reachable
    pub public_base_url: String,

    /// S3 endpoint
    pub s3_endpoint: Option<String>,
    /// S3 access key
    pub s3_access_key: Option<String>,
    /// S3 secret key
    pub s3_secret_key: Option<String>,
    /// S3 bucket (default: "movies")
    pub s3_bucket: String,
    /// Public URL prefix for objects in the bucket
    pub s3_public_url: Option<String>,

    /// Allowed CORS Origins (comma separated)
    pub allowed_origins: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://movies.db?mode=rwc".to_string(),
            jwt_secret: "secret".to_string(),
            token_lifetime_days: 365,
            max_records_per_page: 50,
            max_upload_size: 10 * 1024 * 1024, // 10 MB
            storage_backend: StorageBackend::Local,
            local_storage_path: "wwwroot".to_string(),
            public_base_url: "http://localhost:3000/uploads".to_string(),
            s3_endpoint: None,
            s3_access_key: None,
            s3_secret_key: None,
            s3_bucket: "movies".to_string(),
            s3_public_url: None,
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:5173".to_string(), // Vite default
                "http://127.0.0.1:3000".to_string(),
            ],
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            database_url: env::var("DATABASE_URL").unwrap_or(default.database_url),

            jwt_secret: env::var("JWT_SECRET").unwrap_or_else(|_| {
                tracing::warn!(
                    "⚠️  JWT_SECRET is not set; signing tokens with the built-in development key"
                );
                default.jwt_secret
            }), // Strictly enforced in production method

            token_lifetime_days: env::var("TOKEN_LIFETIME_DAYS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.token_lifetime_days),

            max_records_per_page: env::var("MAX_RECORDS_PER_PAGE")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|v: &u64| *v > 0)
                .unwrap_or(default.max_records_per_page),

            max_upload_size: env::var("MAX_UPLOAD_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_upload_size),

            storage_backend: env::var("STORAGE_BACKEND")
                .map(|v| StorageBackend::parse(&v))
                .unwrap_or(default.storage_backend),

            local_storage_path: env::var("LOCAL_STORAGE_PATH")
                .unwrap_or(default.local_storage_path),

            public_base_url: env::var("PUBLIC_BASE_URL").unwrap_or(default.public_base_url),

            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            s3_access_key: env::var("S3_ACCESS_KEY").ok(),
            s3_secret_key: env::var("S3_SECRET_KEY").ok(),
            s3_bucket: env::var("S3_BUCKET").unwrap_or(default.s3_bucket),
            s3_public_url: env::var("S3_PUBLIC_URL").ok(),

            allowed_origins: env::var("ALLOWED_ORIGINS")
                .ok()
                .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or(default.allowed_origins),
        }
    }

    /// Create config for development and tests (in-memory database, local storage)
    pub fn development() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            jwt_secret: "development_secret_key_for_movies_api".to_string(),
            max_records_per_page: 50,
            ..Self::default()
        }
    }

    /// Create config for production (strict security)
    pub fn production() -> anyhow::Result<Self> {
        let config = Self::from_env();
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("CRITICAL: JWT_SECRET must be set"))?;

        Ok(Self {
            jwt_secret,
            ..config
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.token_lifetime_days, 365);
        assert_eq!(config.max_records_per_page, 50);
        assert_eq!(config.storage_backend, StorageBackend::Local);
    }

    #[test]
    fn test_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_ne!(config.jwt_secret, "secret");
    }

    #[test]
    fn test_storage_backend_parse() {
        assert_eq!(StorageBackend::parse("S3"), StorageBackend::S3);
        assert_eq!(StorageBackend::parse("minio"), StorageBackend::S3);
        assert_eq!(StorageBackend::parse("local"), StorageBackend::Local);
        assert_eq!(StorageBackend::parse("anything"), StorageBackend::Local);
    }

    #[test]
    fn test_from_env_cors_fallback() {
        unsafe { env::remove_var("ALLOWED_ORIGINS") };
        let config = AppConfig::from_env();
        let default_config = AppConfig::default();
        assert_eq!(config.allowed_origins, default_config.allowed_origins);
    }
}
