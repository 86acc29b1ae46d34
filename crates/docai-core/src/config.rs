//! Configuration module
//!
//! Environment-driven configuration for the HTTP server, storage backend,
//! conversion worker and cleanup task.

use std::env;
use std::time::Duration;

use crate::constants::{DEFAULT_MAX_UPLOAD_SIZE_MB, DEFAULT_PORT};
use crate::storage_types::StorageKind;

const LOCAL_STORAGE_PATH: &str = "./storage";
const SIGNED_URL_EXPIRY_SECS: u64 = 3600;
const CONVERSION_TIMEOUT_SECS: u64 = 600;
const CONVERSION_MAX_CONCURRENT: usize = 2;
const CLEANUP_INTERVAL_SECS: u64 = 3600;
const CLEANUP_MAX_AGE_HOURS: u64 = 24;
const HTTP_CONCURRENCY_LIMIT: usize = 1024;

/// Log output format for the tracing subscriber.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Server configuration
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub port: u16,
    /// URL prefix for subpath hosting, normalised to `/prefix` or empty.
    pub root_path: String,
    pub environment: String,
    pub cors_origins: Vec<String>,
    pub http_concurrency_limit: usize,
    pub log_format: LogFormat,
}

/// Storage backend configuration
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub backend: StorageKind,
    pub local_storage_path: String,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>,
    pub aws_region: Option<String>,
    pub signed_url_expiry_secs: u64,
}

/// Conversion worker configuration
#[derive(Clone, Debug)]
pub struct ConversionConfig {
    /// External program; `None` selects the passthrough converter.
    pub command: Option<String>,
    pub timeout_secs: u64,
    pub max_concurrent: usize,
}

/// Cleanup task configuration
#[derive(Clone, Debug)]
pub struct CleanupConfig {
    /// Seconds between sweeps after the startup sweep. 0 = startup only.
    pub interval_secs: u64,
    pub max_age_hours: u64,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub conversion: ConversionConfig,
    pub cleanup: CleanupConfig,
    pub max_upload_size_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        if is_production_environment(&environment) && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let server = ServerConfig {
            port: env::var("PORT")
                .unwrap_or_else(|_| DEFAULT_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            root_path: normalize_root_path(&env::var("ROOT_PATH").unwrap_or_default()),
            environment,
            cors_origins,
            http_concurrency_limit: env::var("HTTP_CONCURRENCY_LIMIT")
                .unwrap_or_else(|_| HTTP_CONCURRENCY_LIMIT.to_string())
                .parse()
                .unwrap_or(HTTP_CONCURRENCY_LIMIT),
            log_format: match env::var("LOG_FORMAT")
                .unwrap_or_default()
                .to_lowercase()
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Text,
            },
        };

        let backend = match env::var("STORAGE_BACKEND") {
            Ok(value) => value.parse::<StorageKind>()?,
            Err(_) => StorageKind::Local,
        };

        let storage = StorageConfig {
            backend,
            local_storage_path: env::var("LOCAL_STORAGE_PATH")
                .unwrap_or_else(|_| LOCAL_STORAGE_PATH.to_string()),
            s3_bucket: env::var("S3_BUCKET").ok().filter(|s| !s.is_empty()),
            s3_region: env::var("S3_REGION").ok().filter(|s| !s.is_empty()),
            s3_endpoint: env::var("S3_ENDPOINT").ok().filter(|s| !s.is_empty()),
            aws_region: env::var("AWS_REGION").ok().filter(|s| !s.is_empty()),
            signed_url_expiry_secs: env::var("SIGNED_URL_EXPIRY_SECS")
                .unwrap_or_else(|_| SIGNED_URL_EXPIRY_SECS.to_string())
                .parse()
                .unwrap_or(SIGNED_URL_EXPIRY_SECS),
        };

        let conversion = ConversionConfig {
            command: env::var("CONVERTER_COMMAND")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            timeout_secs: env::var("CONVERSION_TIMEOUT_SECS")
                .unwrap_or_else(|_| CONVERSION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONVERSION_TIMEOUT_SECS),
            max_concurrent: env::var("CONVERSION_MAX_CONCURRENT")
                .unwrap_or_else(|_| CONVERSION_MAX_CONCURRENT.to_string())
                .parse()
                .unwrap_or(CONVERSION_MAX_CONCURRENT),
        };

        let cleanup = CleanupConfig {
            interval_secs: env::var("CLEANUP_INTERVAL_SECS")
                .unwrap_or_else(|_| CLEANUP_INTERVAL_SECS.to_string())
                .parse()
                .unwrap_or(CLEANUP_INTERVAL_SECS),
            max_age_hours: env::var("CLEANUP_MAX_AGE_HOURS")
                .unwrap_or_else(|_| CLEANUP_MAX_AGE_HOURS.to_string())
                .parse()
                .unwrap_or(CLEANUP_MAX_AGE_HOURS),
        };

        let max_upload_size_mb = env::var("MAX_UPLOAD_SIZE_MB")
            .unwrap_or_else(|_| DEFAULT_MAX_UPLOAD_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(DEFAULT_MAX_UPLOAD_SIZE_MB);

        let config = Config {
            server,
            storage,
            conversion,
            cleanup,
            max_upload_size_bytes: upload_limit_bytes(max_upload_size_mb)?,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.max_upload_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_UPLOAD_SIZE_MB must be greater than 0"));
        }

        if self.cleanup.max_age_hours.checked_mul(3600).is_none() {
            return Err(anyhow::anyhow!(
                "CLEANUP_MAX_AGE_HOURS is too large: {}",
                self.cleanup.max_age_hours
            ));
        }

        if self.conversion.max_concurrent == 0 {
            return Err(anyhow::anyhow!(
                "CONVERSION_MAX_CONCURRENT must be greater than 0"
            ));
        }

        match self.storage.backend {
            StorageKind::S3 => {
                if self.storage.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 storage backend"
                    ));
                }
                if self.storage.s3_region.is_none() && self.storage.aws_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageKind::Local => {
                if self.storage.local_storage_path.trim().is_empty() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must not be empty when using local storage backend"
                    ));
                }
            }
        }

        Ok(())
    }

    pub fn server_port(&self) -> u16 {
        self.server.port
    }

    pub fn root_path(&self) -> &str {
        &self.server.root_path
    }

    pub fn s3_region(&self) -> Option<&str> {
        self.storage
            .s3_region
            .as_deref()
            .or(self.storage.aws_region.as_deref())
    }

    pub fn signed_url_expiry(&self) -> Duration {
        Duration::from_secs(self.storage.signed_url_expiry_secs)
    }

    pub fn cleanup_interval(&self) -> Option<Duration> {
        match self.cleanup.interval_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    pub fn cleanup_max_age(&self) -> Duration {
        Duration::from_secs(self.cleanup.max_age_hours.saturating_mul(3600))
    }

    pub fn conversion_timeout(&self) -> Duration {
        Duration::from_secs(self.conversion.timeout_secs)
    }

    /// Configuration for tests and embedding: local storage under `path`,
    /// defaults everywhere else.
    pub fn local(path: impl Into<String>) -> Self {
        Config {
            server: ServerConfig {
                port: DEFAULT_PORT,
                root_path: String::new(),
                environment: "development".to_string(),
                cors_origins: vec!["*".to_string()],
                http_concurrency_limit: HTTP_CONCURRENCY_LIMIT,
                log_format: LogFormat::Text,
            },
            storage: StorageConfig {
                backend: StorageKind::Local,
                local_storage_path: path.into(),
                s3_bucket: None,
                s3_region: None,
                s3_endpoint: None,
                aws_region: None,
                signed_url_expiry_secs: SIGNED_URL_EXPIRY_SECS,
            },
            conversion: ConversionConfig {
                command: None,
                timeout_secs: CONVERSION_TIMEOUT_SECS,
                max_concurrent: CONVERSION_MAX_CONCURRENT,
            },
            cleanup: CleanupConfig {
                interval_secs: CLEANUP_INTERVAL_SECS,
                max_age_hours: CLEANUP_MAX_AGE_HOURS,
            },
            max_upload_size_bytes: DEFAULT_MAX_UPLOAD_SIZE_MB * 1024 * 1024,
        }
    }
}

/// `ENVIRONMENT` / `APP_ENV` values that hide error details and forbid
/// wildcard CORS.
pub fn is_production_environment(environment: &str) -> bool {
    matches!(
        environment.trim().to_lowercase().as_str(),
        "production" | "prod"
    )
}

/// `MAX_UPLOAD_SIZE_MB` in bytes. Values that do not fit in `usize` are
/// rejected instead of wrapping.
pub fn upload_limit_bytes(megabytes: usize) -> Result<usize, anyhow::Error> {
    megabytes
        .checked_mul(1024 * 1024)
        .ok_or_else(|| anyhow::anyhow!("MAX_UPLOAD_SIZE_MB is too large: {}", megabytes))
}

/// Normalise a URL prefix: `""`, `"/"` → `""`; `"docai/"` → `"/docai"`.
pub fn normalize_root_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}
