/// Configuration management for the Shareon backend
use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Main server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub service: ServiceConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub email: Option<EmailConfig>,
    pub logging: LoggingConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub hostname: String,
    pub port: u16,
    /// Base URL of the web client, used when building confirmation and
    /// password-reset links embedded in outbound emails.
    pub client_base_url: String,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Registration gate. A literal placeholder standing in for a real
    /// invite-code registry.
    pub invite_code: String,
}

/// SMTP transport configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub username: String,
    pub password: String,
    pub use_ssl: bool,
    pub from_address: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> AppResult<Self> {
        dotenv::dotenv().ok();

        let hostname = env::var("SHAREON_HOSTNAME").unwrap_or_else(|_| "localhost".to_string());
        let port = env::var("SHAREON_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|_| AppError::validation("Invalid port number"))?;
        let client_base_url = env::var("SHAREON_CLIENT_BASE_URL")
            .unwrap_or_else(|_| format!("http://{}:{}", hostname, port));

        let path: PathBuf = env::var("SHAREON_DB_PATH")
            .unwrap_or_else(|_| "./data/shareon.sqlite".to_string())
            .into();

        let jwt_secret = env::var("SHAREON_JWT_SECRET")
            .map_err(|_| AppError::validation("JWT secret required"))?;
        let invite_code =
            env::var("SHAREON_INVITE_CODE").unwrap_or_else(|_| "VALID_CODE".to_string());

        let email = if let Ok(smtp_host) = env::var("SHAREON_SMTP_HOST") {
            Some(EmailConfig {
                smtp_host,
                smtp_port: env::var("SHAREON_SMTP_PORT")
                    .unwrap_or_else(|_| "587".to_string())
                    .parse()
                    .map_err(|_| AppError::validation("Invalid SMTP port"))?,
                username: env::var("SHAREON_SMTP_USERNAME").unwrap_or_default(),
                password: env::var("SHAREON_SMTP_PASSWORD").unwrap_or_default(),
                use_ssl: env::var("SHAREON_SMTP_SSL")
                    .unwrap_or_else(|_| "true".to_string())
                    .parse()
                    .unwrap_or(true),
                from_address: env::var("SHAREON_SMTP_FROM")
                    .unwrap_or_else(|_| format!("noreply@{}", hostname)),
            })
        } else {
            None
        };

        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Ok(ServerConfig {
            service: ServiceConfig {
                hostname,
                port,
                client_base_url,
            },
            database: DatabaseConfig { path },
            auth: AuthConfig {
                jwt_secret,
                invite_code,
            },
            email,
            logging: LoggingConfig { level: log_level },
        })
    }

    /// Validate configuration. A weak signing secret is a startup failure,
    /// never something to paper over at signing time.
    pub fn validate(&self) -> AppResult<()> {
        if self.service.hostname.is_empty() {
            return Err(AppError::validation("Hostname cannot be empty"));
        }

        if self.auth.jwt_secret.len() < 32 {
            return Err(AppError::validation(
                "JWT secret must be at least 32 characters",
            ));
        }

        if self.auth.invite_code.is_empty() {
            return Err(AppError::validation("Invite code cannot be empty"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config(secret: &str) -> ServerConfig {
        ServerConfig {
            service: ServiceConfig {
                hostname: "localhost".into(),
                port: 8080,
                client_base_url: "http://localhost:8080".into(),
            },
            database: DatabaseConfig {
                path: "./data/test.sqlite".into(),
            },
            auth: AuthConfig {
                jwt_secret: secret.into(),
                invite_code: "VALID_CODE".into(),
            },
            email: None,
            logging: LoggingConfig {
                level: "info".into(),
            },
        }
    }

    #[test]
    fn short_jwt_secret_is_rejected() {
        let config = sample_config("too-short");
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_jwt_secret_is_rejected() {
        let config = sample_config("");
        assert!(config.validate().is_err());
    }

    #[test]
    fn full_config_validates() {
        let config = sample_config("0123456789abcdef0123456789abcdef");
        assert!(config.validate().is_ok());
    }
}
