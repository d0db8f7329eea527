//! Configuration module
//!
//! Environment-driven configuration with fail-fast validation. Every knob
//! the service needs is resolved once at startup; nothing reads the
//! environment after boot.

use std::env;
use std::time::Duration;

// Defaults
const SERVER_PORT: u16 = 4000;
const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const UPLOAD_URL_EXPIRES_SECS: u64 = 900;
const COLLABORATOR_TIMEOUT_SECS: u64 = 10;

/// Bounds on the presigned-URL lifetime, enforced at load.
pub const MIN_UPLOAD_URL_EXPIRES_SECS: u64 = 60;
pub const MAX_UPLOAD_URL_EXPIRES_SECS: u64 = 3600;

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    // Database
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    // Object storage
    pub s3_bucket: String,
    pub s3_region: Option<String>,
    pub aws_region: Option<String>,
    /// Custom endpoint for S3-compatible providers (MinIO, Spaces, ...)
    pub s3_endpoint: Option<String>,
    // Queue
    pub sqs_queue_url: String,
    // Upload lifecycle
    pub upload_url_expires_seconds: u64,
    /// Deadline applied to every store/storage/queue call.
    pub collaborator_timeout_seconds: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins: Vec<String> = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let config = Config {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            environment,
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            s3_bucket: env::var("S3_BUCKET")
                .map_err(|_| anyhow::anyhow!("S3_BUCKET must be set"))?,
            s3_region: env::var("S3_REGION").ok(),
            aws_region: env::var("AWS_REGION").ok(),
            s3_endpoint: env::var("S3_ENDPOINT_URL").ok(),
            sqs_queue_url: env::var("SQS_QUEUE_URL")
                .map_err(|_| anyhow::anyhow!("SQS_QUEUE_URL must be set"))?,
            upload_url_expires_seconds: env::var("UPLOAD_URL_EXPIRES_SECONDS")
                .unwrap_or_else(|_| UPLOAD_URL_EXPIRES_SECS.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("UPLOAD_URL_EXPIRES_SECONDS must be a number"))?,
            collaborator_timeout_seconds: env::var("COLLABORATOR_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| COLLABORATOR_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(COLLABORATOR_TIMEOUT_SECS),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !self.database_url.starts_with("postgresql://")
            && !self.database_url.starts_with("postgres://")
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        if self.s3_region.is_none() && self.aws_region.is_none() {
            return Err(anyhow::anyhow!("S3_REGION or AWS_REGION must be set"));
        }

        if self.upload_url_expires_seconds < MIN_UPLOAD_URL_EXPIRES_SECS
            || self.upload_url_expires_seconds > MAX_UPLOAD_URL_EXPIRES_SECS
        {
            return Err(anyhow::anyhow!(
                "UPLOAD_URL_EXPIRES_SECONDS must be between {} and {}",
                MIN_UPLOAD_URL_EXPIRES_SECS,
                MAX_UPLOAD_URL_EXPIRES_SECS
            ));
        }

        if self.is_production() && self.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        Ok(())
    }

    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    /// Effective storage region (S3_REGION wins over AWS_REGION).
    pub fn region(&self) -> &str {
        self.s3_region
            .as_deref()
            .or(self.aws_region.as_deref())
            .unwrap_or("us-east-1")
    }

    pub fn upload_url_ttl(&self) -> Duration {
        Duration::from_secs(self.upload_url_expires_seconds)
    }

    pub fn collaborator_timeout(&self) -> Duration {
        Duration::from_secs(self.collaborator_timeout_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            server_port: 4000,
            cors_origins: vec!["*".to_string()],
            environment: "development".to_string(),
            database_url: "postgresql://localhost/audiogate".to_string(),
            db_max_connections: 20,
            db_timeout_seconds: 30,
            s3_bucket: "audiogate-uploads".to_string(),
            s3_region: Some("us-east-1".to_string()),
            aws_region: None,
            s3_endpoint: None,
            sqs_queue_url: "https://sqs.us-east-1.amazonaws.com/123/audiogate".to_string(),
            upload_url_expires_seconds: 900,
            collaborator_timeout_seconds: 10,
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(test_config().validate().is_ok());
    }

    #[test]
    fn test_expiry_bounds_enforced() {
        let mut config = test_config();
        config.upload_url_expires_seconds = 59;
        assert!(config.validate().is_err());
        config.upload_url_expires_seconds = 3601;
        assert!(config.validate().is_err());
        config.upload_url_expires_seconds = 60;
        assert!(config.validate().is_ok());
        config.upload_url_expires_seconds = 3600;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_non_postgres_url() {
        let mut config = test_config();
        config.database_url = "mysql://localhost/db".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_requires_a_region() {
        let mut config = test_config();
        config.s3_region = None;
        config.aws_region = None;
        assert!(config.validate().is_err());
        config.aws_region = Some("eu-west-1".to_string());
        assert!(config.validate().is_ok());
        assert_eq!(config.region(), "eu-west-1");
    }

    #[test]
    fn test_wildcard_cors_rejected_in_production() {
        let mut config = test_config();
        config.environment = "production".to_string();
        assert!(config.validate().is_err());
        config.cors_origins = vec!["https://app.example.com".to_string()];
        assert!(config.validate().is_ok());
    }
}
