//! Configuration module
//!
//! This module provides the site configuration: server, database, authentication,
//! remote media store, upload pipeline and contact mail settings.

use std::env;

use crate::storage_types::StorageBackend;

// Common constants
const SERVER_PORT: u16 = 3000;
const MAX_CONNECTIONS: u32 = 10;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const JWT_EXPIRY_HOURS: i64 = 24;
const MAX_FILE_SIZE_MB: usize = 10;
const TEAM_PHOTO_LIMIT: i64 = 2;
const UPLOAD_MAX_ATTEMPTS: u32 = 5;
const UPLOAD_BACKOFF_BASE_MS: u64 = 500;
const UPLOAD_BACKOFF_JITTER_MS: u64 = 200;
const UPLOAD_ATTEMPT_TIMEOUT_SECS: u64 = 30;
const SMTP_PORT: u16 = 587;

pub const DEFAULT_MEDIA_ROOT_FOLDER: &str = "utkrisht";
pub const DEFAULT_CLOUDINARY_API_BASE_URL: &str = "https://api.cloudinary.com/v1_1";

/// Upload retry settings as read from the environment
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadRetrySettings {
    pub max_attempts: u32,
    pub backoff_base_ms: u64,
    pub backoff_jitter_ms: u64,
    pub attempt_timeout_secs: u64,
}

impl Default for UploadRetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: UPLOAD_MAX_ATTEMPTS,
            backoff_base_ms: UPLOAD_BACKOFF_BASE_MS,
            backoff_jitter_ms: UPLOAD_BACKOFF_JITTER_MS,
            attempt_timeout_secs: UPLOAD_ATTEMPT_TIMEOUT_SECS,
        }
    }
}

/// Cloudinary credentials. All values are trimmed on load.
#[derive(Clone, Debug, Default)]
pub struct CloudinarySettings {
    pub cloud_name: Option<String>,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub api_base_url: String,
}

impl CloudinarySettings {
    pub fn is_configured(&self) -> bool {
        self.cloud_name.is_some() && self.api_key.is_some() && self.api_secret.is_some()
    }
}

/// SMTP settings for contact notifications
#[derive(Clone, Debug, Default)]
pub struct SmtpSettings {
    pub host: Option<String>,
    pub port: u16,
    pub user: Option<String>,
    pub password: Option<String>,
    pub tls: bool,
    pub contact_email: Option<String>,
    pub contact_from: Option<String>,
}

impl SmtpSettings {
    /// Mail goes out only when host, credentials and a recipient are all present.
    pub fn is_configured(&self) -> bool {
        self.host.is_some()
            && self.user.is_some()
            && self.password.is_some()
            && self.contact_email.is_some()
    }
}

/// Site backend configuration
#[derive(Clone, Debug)]
pub struct SiteConfig {
    pub environment: String,
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub jwt_secret: String,
    pub jwt_expiry_hours: i64,
    pub storage_backend: StorageBackend,
    pub cloudinary: CloudinarySettings,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    pub media_root_folder: String,
    pub max_file_size_bytes: usize,
    pub team_photo_limit: i64,
    pub upload_retry: UploadRetrySettings,
    pub smtp: SmtpSettings,
    pub log_format: String,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<SiteConfig>);

impl Config {
    fn as_site(&self) -> &SiteConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_name(&self.as_site().environment)
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = SiteConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_site().validate()
    }

    pub fn environment(&self) -> &str {
        &self.as_site().environment
    }

    pub fn server_port(&self) -> u16 {
        self.as_site().server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.as_site().cors_origins
    }

    pub fn database_url(&self) -> &str {
        &self.as_site().database_url
    }

    pub fn db_max_connections(&self) -> u32 {
        self.as_site().db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.as_site().db_timeout_seconds
    }

    pub fn jwt_secret(&self) -> &str {
        &self.as_site().jwt_secret
    }

    pub fn jwt_expiry_hours(&self) -> i64 {
        self.as_site().jwt_expiry_hours
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.as_site().storage_backend
    }

    pub fn cloudinary(&self) -> &CloudinarySettings {
        &self.as_site().cloudinary
    }

    pub fn local_storage_path(&self) -> Option<&str> {
        self.as_site().local_storage_path.as_deref()
    }

    pub fn local_storage_base_url(&self) -> Option<&str> {
        self.as_site().local_storage_base_url.as_deref()
    }

    pub fn media_root_folder(&self) -> &str {
        &self.as_site().media_root_folder
    }

    pub fn max_file_size_bytes(&self) -> usize {
        self.as_site().max_file_size_bytes
    }

    pub fn team_photo_limit(&self) -> i64 {
        self.as_site().team_photo_limit
    }

    pub fn upload_retry(&self) -> &UploadRetrySettings {
        &self.as_site().upload_retry
    }

    pub fn smtp(&self) -> &SmtpSettings {
        &self.as_site().smtp
    }

    pub fn log_format(&self) -> &str {
        &self.as_site().log_format
    }
}

fn is_production_name(environment: &str) -> bool {
    let env = environment.to_lowercase();
    env == "production" || env == "prod"
}

fn non_empty_trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

impl SiteConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(var: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = var("ENVIRONMENT")
            .or_else(|| var("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let cors_origins_str = var("CORS_ORIGINS").unwrap_or_else(|| "*".to_string());
        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let storage_backend = match var("STORAGE_BACKEND") {
            Some(raw) => raw.parse::<StorageBackend>()?,
            None => StorageBackend::Cloudinary,
        };

        let max_file_size_mb = var("MAX_FILE_SIZE_MB")
            .unwrap_or_else(|| MAX_FILE_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_FILE_SIZE_MB);

        let config = SiteConfig {
            environment,
            server_port: var("PORT")
                .unwrap_or_else(|| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            database_url: var("DATABASE_URL")
                .ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set"))?,
            db_max_connections: var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            jwt_secret: var("JWT_SECRET")
                .or_else(|| var("NEXTAUTH_SECRET"))
                .ok_or_else(|| {
                    anyhow::anyhow!("JWT_SECRET (or NEXTAUTH_SECRET) must be set for authentication")
                })?,
            jwt_expiry_hours: var("JWT_EXPIRY_HOURS")
                .unwrap_or_else(|| JWT_EXPIRY_HOURS.to_string())
                .parse()
                .unwrap_or(JWT_EXPIRY_HOURS),
            storage_backend,
            cloudinary: CloudinarySettings {
                cloud_name: non_empty_trimmed(var("CLOUDINARY_CLOUD_NAME")),
                api_key: non_empty_trimmed(var("CLOUDINARY_API_KEY")),
                api_secret: non_empty_trimmed(var("CLOUDINARY_API_SECRET")),
                api_base_url: non_empty_trimmed(var("CLOUDINARY_API_BASE_URL"))
                    .unwrap_or_else(|| DEFAULT_CLOUDINARY_API_BASE_URL.to_string()),
            },
            local_storage_path: non_empty_trimmed(var("LOCAL_STORAGE_PATH")),
            local_storage_base_url: non_empty_trimmed(var("LOCAL_STORAGE_BASE_URL")),
            media_root_folder: non_empty_trimmed(var("MEDIA_ROOT_FOLDER"))
                .map(|s| s.trim_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_MEDIA_ROOT_FOLDER.to_string()),
            max_file_size_bytes: max_file_size_mb * 1024 * 1024,
            team_photo_limit: var("TEAM_PHOTO_LIMIT")
                .unwrap_or_else(|| TEAM_PHOTO_LIMIT.to_string())
                .parse()
                .unwrap_or(TEAM_PHOTO_LIMIT),
            upload_retry: UploadRetrySettings {
                max_attempts: var("UPLOAD_MAX_ATTEMPTS")
                    .unwrap_or_else(|| UPLOAD_MAX_ATTEMPTS.to_string())
                    .parse()
                    .unwrap_or(UPLOAD_MAX_ATTEMPTS),
                backoff_base_ms: var("UPLOAD_BACKOFF_BASE_MS")
                    .unwrap_or_else(|| UPLOAD_BACKOFF_BASE_MS.to_string())
                    .parse()
                    .unwrap_or(UPLOAD_BACKOFF_BASE_MS),
                backoff_jitter_ms: var("UPLOAD_BACKOFF_JITTER_MS")
                    .unwrap_or_else(|| UPLOAD_BACKOFF_JITTER_MS.to_string())
                    .parse()
                    .unwrap_or(UPLOAD_BACKOFF_JITTER_MS),
                attempt_timeout_secs: var("UPLOAD_ATTEMPT_TIMEOUT_SECS")
                    .unwrap_or_else(|| UPLOAD_ATTEMPT_TIMEOUT_SECS.to_string())
                    .parse()
                    .unwrap_or(UPLOAD_ATTEMPT_TIMEOUT_SECS),
            },
            smtp: SmtpSettings {
                host: non_empty_trimmed(var("SMTP_HOST")),
                port: var("SMTP_PORT")
                    .and_then(|s| s.parse().ok())
                    .filter(|&p| p > 0)
                    .unwrap_or(SMTP_PORT),
                user: non_empty_trimmed(var("SMTP_USER")),
                password: var("SMTP_PASSWORD").filter(|s| !s.is_empty()),
                tls: var("SMTP_TLS")
                    .unwrap_or_else(|| "true".to_string())
                    .to_lowercase()
                    .parse()
                    .unwrap_or(true),
                contact_email: non_empty_trimmed(var("CONTACT_EMAIL")),
                contact_from: non_empty_trimmed(var("CONTACT_FROM")),
            },
            log_format: var("LOG_FORMAT")
                .unwrap_or_else(|| "compact".to_string())
                .to_lowercase(),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if is_production_name(&self.environment) && self.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        if self.jwt_secret.len() < 32 {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least 32 characters long"
            ));
        }

        if !self.database_url.starts_with("postgres://")
            && !self.database_url.starts_with("postgresql://")
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        if self.upload_retry.max_attempts == 0 {
            return Err(anyhow::anyhow!("UPLOAD_MAX_ATTEMPTS must be at least 1"));
        }

        if self.team_photo_limit < 0 {
            return Err(anyhow::anyhow!("TEAM_PHOTO_LIMIT cannot be negative"));
        }

        // Cloudinary credentials are checked lazily at upload time.
        if self.storage_backend == StorageBackend::Local {
            if self.local_storage_path.is_none() {
                return Err(anyhow::anyhow!(
                    "LOCAL_STORAGE_PATH must be set when using local storage backend"
                ));
            }
            if self.local_storage_base_url.is_none() {
                return Err(anyhow::anyhow!(
                    "LOCAL_STORAGE_BASE_URL must be set when using local storage backend"
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn load(vars: &[(&str, &str)]) -> Result<SiteConfig, anyhow::Error> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        SiteConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[
            ("DATABASE_URL", "postgres://localhost/utkrisht"),
            ("JWT_SECRET", SECRET),
        ])
        .unwrap();

        assert_eq!(config.server_port, 3000);
        assert_eq!(config.storage_backend, StorageBackend::Cloudinary);
        assert_eq!(config.media_root_folder, "utkrisht");
        assert_eq!(config.max_file_size_bytes, 10 * 1024 * 1024);
        assert_eq!(config.team_photo_limit, 2);
        assert_eq!(config.upload_retry, UploadRetrySettings::default());
        assert_eq!(config.smtp.port, 587);
        assert_eq!(
            config.cloudinary.api_base_url,
            DEFAULT_CLOUDINARY_API_BASE_URL
        );
        assert!(!config.cloudinary.is_configured());
    }

    #[test]
    fn test_nextauth_secret_fallback() {
        let config = load(&[
            ("DATABASE_URL", "postgresql://localhost/utkrisht"),
            ("NEXTAUTH_SECRET", SECRET),
        ])
        .unwrap();
        assert_eq!(config.jwt_secret, SECRET);
    }

    #[test]
    fn test_short_secret_rejected() {
        let err = load(&[
            ("DATABASE_URL", "postgres://localhost/utkrisht"),
            ("JWT_SECRET", "short"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("32 characters"));
    }

    #[test]
    fn test_non_postgres_url_rejected() {
        assert!(load(&[("DATABASE_URL", "mysql://localhost/db"), ("JWT_SECRET", SECRET)]).is_err());
    }

    #[test]
    fn test_wildcard_cors_rejected_in_production() {
        let err = load(&[
            ("DATABASE_URL", "postgres://localhost/utkrisht"),
            ("JWT_SECRET", SECRET),
            ("ENVIRONMENT", "production"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("CORS_ORIGINS"));
    }

    #[test]
    fn test_cloudinary_values_are_trimmed() {
        let config = load(&[
            ("DATABASE_URL", "postgres://localhost/utkrisht"),
            ("JWT_SECRET", SECRET),
            ("CLOUDINARY_CLOUD_NAME", "  demo \n"),
            ("CLOUDINARY_API_KEY", " 1234 "),
            ("CLOUDINARY_API_SECRET", "secret\t"),
        ])
        .unwrap();
        assert_eq!(config.cloudinary.cloud_name.as_deref(), Some("demo"));
        assert_eq!(config.cloudinary.api_key.as_deref(), Some("1234"));
        assert_eq!(config.cloudinary.api_secret.as_deref(), Some("secret"));
        assert!(config.cloudinary.is_configured());
    }

    #[test]
    fn test_local_backend_requires_path() {
        let err = load(&[
            ("DATABASE_URL", "postgres://localhost/utkrisht"),
            ("JWT_SECRET", SECRET),
            ("STORAGE_BACKEND", "local"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("LOCAL_STORAGE_PATH"));
    }

    #[test]
    fn test_smtp_requires_recipient() {
        let config = load(&[
            ("DATABASE_URL", "postgres://localhost/utkrisht"),
            ("JWT_SECRET", SECRET),
            ("SMTP_HOST", "smtp.example.com"),
            ("SMTP_USER", "mailer"),
            ("SMTP_PASSWORD", "pw"),
        ])
        .unwrap();
        assert!(!config.smtp.is_configured());
    }
}
