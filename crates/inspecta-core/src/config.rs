//! Configuration module
//!
//! Environment-driven configuration for the picture service: database, object store,
//! upload limits, pagination bounds and the orphan sweep.

use std::env;
use std::str::FromStr;

use crate::storage_types::StorageBackend;

const SERVER_PORT: u16 = 4000;
const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const PRESIGNED_URL_TTL_SECS: u64 = 15 * 60;
const MAX_FILES_PER_REQUEST: usize = 20;
const DEFAULT_PAGE_SIZE: usize = 20;
const MAX_PAGE_SIZE: usize = 100;
const ORPHAN_SWEEP_INTERVAL_SECS: u64 = 3600;
const ORPHAN_GRACE_PERIOD_SECS: u64 = 24 * 3600;
const DEV_CURSOR_SECRET: &str = "inspecta-dev-cursor-secret";

/// Settings every Inspecta process needs
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub environment: String,
}

impl Default for BaseConfig {
    fn default() -> Self {
        Self {
            server_port: SERVER_PORT,
            cors_origins: vec!["*".to_string()],
            db_max_connections: MAX_CONNECTIONS,
            db_timeout_seconds: CONNECTION_TIMEOUT_SECS,
            environment: "development".to_string(),
        }
    }
}

/// Picture ingestion and retrieval configuration
#[derive(Clone, Debug)]
pub struct PictureServiceConfig {
    pub base: BaseConfig,
    pub database_url: String,
    // Object store
    pub storage_backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // MinIO, DigitalOcean Spaces, ...
    pub aws_region: Option<String>,
    pub memory_storage_base_url: String,
    // Issuer / registrar
    pub presigned_url_ttl_secs: u64,
    pub max_files_per_request: usize,
    pub verify_uploaded_objects: bool,
    // Pagination
    pub default_page_size: usize,
    pub max_page_size: usize,
    pub cursor_secret: String,
    // Orphan sweep
    pub orphan_sweep_enabled: bool,
    pub orphan_sweep_dry_run: bool,
    pub orphan_sweep_interval_secs: u64,
    pub orphan_grace_period_secs: u64,
}

impl Default for PictureServiceConfig {
    fn default() -> Self {
        Self {
            base: BaseConfig::default(),
            database_url: String::new(),
            storage_backend: StorageBackend::Memory,
            s3_bucket: None,
            s3_region: None,
            s3_endpoint: None,
            aws_region: None,
            memory_storage_base_url: "http://localhost:4000/store".to_string(),
            presigned_url_ttl_secs: PRESIGNED_URL_TTL_SECS,
            max_files_per_request: MAX_FILES_PER_REQUEST,
            verify_uploaded_objects: false,
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
            cursor_secret: DEV_CURSOR_SECRET.to_string(),
            orphan_sweep_enabled: false,
            orphan_sweep_dry_run: false,
            orphan_sweep_interval_secs: ORPHAN_SWEEP_INTERVAL_SECS,
            orphan_grace_period_secs: ORPHAN_GRACE_PERIOD_SECS,
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn env_flag(key: &str, default: bool) -> bool {
    env::var(key)
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

impl PictureServiceConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let base = BaseConfig {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            db_max_connections: env_or("DB_MAX_CONNECTIONS", MAX_CONNECTIONS),
            db_timeout_seconds: env_or("DB_TIMEOUT_SECONDS", CONNECTION_TIMEOUT_SECS),
            environment,
        };

        let storage_backend = match env::var("STORAGE_BACKEND") {
            Ok(s) => s.parse::<StorageBackend>()?,
            Err(_) => StorageBackend::S3,
        };

        Ok(PictureServiceConfig {
            base,
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            storage_backend,
            s3_bucket: env::var("S3_BUCKET").ok(),
            s3_region: env::var("S3_REGION").ok(),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            aws_region: env::var("AWS_REGION").ok(),
            memory_storage_base_url: env::var("MEMORY_STORAGE_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:4000/store".to_string()),
            presigned_url_ttl_secs: env_or("PRESIGNED_URL_TTL_SECS", PRESIGNED_URL_TTL_SECS),
            max_files_per_request: env_or("MAX_FILES_PER_REQUEST", MAX_FILES_PER_REQUEST),
            verify_uploaded_objects: env_flag("VERIFY_UPLOADED_OBJECTS", false),
            default_page_size: env_or("DEFAULT_PAGE_SIZE", DEFAULT_PAGE_SIZE),
            max_page_size: env_or("MAX_PAGE_SIZE", MAX_PAGE_SIZE),
            cursor_secret: env::var("CURSOR_SECRET")
                .unwrap_or_else(|_| DEV_CURSOR_SECRET.to_string()),
            orphan_sweep_enabled: env_flag("ORPHAN_SWEEP_ENABLED", false),
            orphan_sweep_dry_run: env_flag("ORPHAN_SWEEP_DRY_RUN", false),
            orphan_sweep_interval_secs: env_or(
                "ORPHAN_SWEEP_INTERVAL_SECS",
                ORPHAN_SWEEP_INTERVAL_SECS,
            ),
            orphan_grace_period_secs: env_or("ORPHAN_GRACE_PERIOD_SECS", ORPHAN_GRACE_PERIOD_SECS),
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.database_url.is_empty() {
            return Err(anyhow::anyhow!("DATABASE_URL must not be empty"));
        }

        if self.storage_backend == StorageBackend::S3 {
            if self.s3_bucket.is_none() {
                return Err(anyhow::anyhow!("S3_BUCKET is required for the s3 backend"));
            }
            if self.s3_region.is_none() && self.aws_region.is_none() {
                return Err(anyhow::anyhow!(
                    "S3_REGION or AWS_REGION is required for the s3 backend"
                ));
            }
        }

        if self.presigned_url_ttl_secs == 0 || self.presigned_url_ttl_secs > 7 * 24 * 3600 {
            return Err(anyhow::anyhow!(
                "PRESIGNED_URL_TTL_SECS must be between 1 second and 7 days"
            ));
        }

        if self.max_files_per_request == 0 {
            return Err(anyhow::anyhow!("MAX_FILES_PER_REQUEST must be at least 1"));
        }

        if self.max_page_size == 0 || self.default_page_size == 0 {
            return Err(anyhow::anyhow!("Page sizes must be at least 1"));
        }
        if self.default_page_size > self.max_page_size {
            return Err(anyhow::anyhow!(
                "DEFAULT_PAGE_SIZE ({}) must not exceed MAX_PAGE_SIZE ({})",
                self.default_page_size,
                self.max_page_size
            ));
        }

        let is_production = self.base.environment.eq_ignore_ascii_case("production")
            || self.base.environment.eq_ignore_ascii_case("prod");
        if is_production {
            if self.cursor_secret == DEV_CURSOR_SECRET || self.cursor_secret.len() < 32 {
                return Err(anyhow::anyhow!(
                    "CURSOR_SECRET must be set to at least 32 characters in production"
                ));
            }
            if self.base.cors_origins.iter().any(|o| o == "*") {
                return Err(anyhow::anyhow!(
                    "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
                ));
            }
            if self.storage_backend == StorageBackend::Memory {
                return Err(anyhow::anyhow!(
                    "The memory storage backend is not allowed in production"
                ));
            }
        }

        Ok(())
    }
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config(pub Box<PictureServiceConfig>);

impl Config {
    fn inner(&self) -> &PictureServiceConfig {
        &self.0
    }

    /// Loads `.env` (if present) and reads the process environment.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        let config = PictureServiceConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.inner().validate()
    }

    pub fn is_production(&self) -> bool {
        let env = &self.inner().base.environment;
        env.eq_ignore_ascii_case("production") || env.eq_ignore_ascii_case("prod")
    }

    pub fn server_port(&self) -> u16 {
        self.inner().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.inner().base.cors_origins
    }

    pub fn db_max_connections(&self) -> u32 {
        self.inner().base.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.inner().base.db_timeout_seconds
    }

    pub fn database_url(&self) -> &str {
        &self.inner().database_url
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.inner().storage_backend
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.inner().s3_bucket.as_deref()
    }

    /// S3_REGION, falling back to AWS_REGION
    pub fn s3_region(&self) -> Option<&str> {
        self.inner()
            .s3_region
            .as_deref()
            .or(self.inner().aws_region.as_deref())
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.inner().s3_endpoint.as_deref()
    }

    pub fn memory_storage_base_url(&self) -> &str {
        &self.inner().memory_storage_base_url
    }

    pub fn presigned_url_ttl_secs(&self) -> u64 {
        self.inner().presigned_url_ttl_secs
    }

    pub fn max_files_per_request(&self) -> usize {
        self.inner().max_files_per_request
    }

    pub fn verify_uploaded_objects(&self) -> bool {
        self.inner().verify_uploaded_objects
    }

    pub fn default_page_size(&self) -> usize {
        self.inner().default_page_size
    }

    pub fn max_page_size(&self) -> usize {
        self.inner().max_page_size
    }

    pub fn cursor_secret(&self) -> &str {
        &self.inner().cursor_secret
    }

    pub fn orphan_sweep_enabled(&self) -> bool {
        self.inner().orphan_sweep_enabled
    }

    pub fn orphan_sweep_dry_run(&self) -> bool {
        self.inner().orphan_sweep_dry_run
    }

    pub fn orphan_sweep_interval_secs(&self) -> u64 {
        self.inner().orphan_sweep_interval_secs
    }

    pub fn orphan_grace_period_secs(&self) -> u64 {
        self.inner().orphan_grace_period_secs
    }
}

impl From<PictureServiceConfig> for Config {
    fn from(config: PictureServiceConfig) -> Self {
        Config(Box::new(config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> PictureServiceConfig {
        PictureServiceConfig {
            database_url: "postgres://localhost/inspecta".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn default_development_config_is_valid() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn s3_backend_requires_bucket_and_region() {
        let mut config = valid();
        config.storage_backend = StorageBackend::S3;
        assert!(config.validate().is_err());

        config.s3_bucket = Some("pictures".to_string());
        assert!(config.validate().is_err());

        config.aws_region = Some("eu-west-1".to_string());
        assert!(config.validate().is_ok());
        assert_eq!(Config::from(config).s3_region(), Some("eu-west-1"));
    }

    #[test]
    fn default_page_size_cannot_exceed_max() {
        let mut config = valid();
        config.default_page_size = 150;
        assert!(config.validate().is_err());
    }

    #[test]
    fn production_rejects_dev_cursor_secret() {
        let mut config = valid();
        config.base.environment = "production".to_string();
        config.base.cors_origins = vec!["https://dashboard.example.com".to_string()];
        config.storage_backend = StorageBackend::S3;
        config.s3_bucket = Some("pictures".to_string());
        config.s3_region = Some("eu-west-1".to_string());
        assert!(config.validate().is_err());

        config.cursor_secret = "x".repeat(48);
        assert!(config.validate().is_ok());
    }
}
