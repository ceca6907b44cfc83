//! # API Configuration Module
//!
//! Loads configuration for the EduVate auth server from environment
//! variables, with defaults where appropriate.
//!
//! ## Environment Variables
//!
//! - `API_HOST`: The host address to bind the server to (default: "0.0.0.0")
//! - `API_PORT`: The port to listen on (default: 3000)
//! - `DATABASE_URL`: PostgreSQL connection string (required)
//! - `LOG_LEVEL`: Logging level (default: "info")
//! - `API_CORS_ORIGINS`: Comma-separated list of allowed CORS origins
//!   (default: open CORS, matching the original deployment)
//! - `APP_BASE_URL`: Base URL of the web client, used to build activation
//!   and reset links (default: "http://localhost:5173")
//! - `MAIL_ENDPOINT`: HTTP mail-provider endpoint; mail is logged and
//!   dropped when unset
//! - `MAIL_API_KEY`: Bearer token for the mail provider
//! - `MAIL_FROM`: Sender address (default: "no-reply@eduvate.app")
//! - `API_REQUEST_TIMEOUT_SECONDS`: Request timeout (default: 30)

use eyre::{Result, WrapErr};
use std::env;
use tracing::Level;

/// Configuration for the EduVate API server.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host address for the API server (e.g., "127.0.0.1", "0.0.0.0")
    pub host: String,

    /// Port for the API server to listen on
    pub port: u16,

    /// PostgreSQL database connection string
    pub database_url: String,

    /// Log level for the application
    pub log_level: Level,

    /// CORS allowed origins; `None` means fully open CORS
    pub cors_origins: Option<Vec<String>>,

    /// Base URL used when building activation/reset links
    pub app_base_url: String,

    /// HTTP mail-provider endpoint (optional)
    pub mail_endpoint: Option<String>,

    /// Bearer token for the mail provider (optional)
    pub mail_api_key: Option<String>,

    /// Sender address for outbound mail
    pub mail_from: String,

    /// Request timeout in seconds
    pub request_timeout: u64,
}

impl ApiConfig {
    /// Creates a new ApiConfig from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `DATABASE_URL` is unset or `API_PORT` cannot be
    /// parsed as a u16.
    pub fn from_env() -> Result<Self> {
        // Network settings
        let host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("API_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .wrap_err("Invalid API_PORT value")?;

        // Database settings
        let database_url = env::var("DATABASE_URL")
            .wrap_err("DATABASE_URL environment variable must be set")?;

        // Logging settings
        let log_level = match env::var("LOG_LEVEL")
            .unwrap_or_else(|_| "info".to_string())
            .as_str()
        {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        };

        // CORS settings
        let cors_origins = env::var("API_CORS_ORIGINS")
            .ok()
            .map(|origins| origins.split(',').map(|s| s.trim().to_string()).collect());

        // Link building
        let app_base_url = env::var("APP_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:5173".to_string());

        // Mail provider
        let mail_endpoint = env::var("MAIL_ENDPOINT").ok();
        let mail_api_key = env::var("MAIL_API_KEY").ok();
        let mail_from =
            env::var("MAIL_FROM").unwrap_or_else(|_| "no-reply@eduvate.app".to_string());

        // Performance settings
        let request_timeout = env::var("API_REQUEST_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .unwrap_or(30);

        Ok(Self {
            host,
            port,
            database_url,
            log_level,
            cors_origins,
            app_base_url,
            mail_endpoint,
            mail_api_key,
            mail_from,
            request_timeout,
        })
    }

    /// Returns the server address as a string (e.g., "127.0.0.1:3000").
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
