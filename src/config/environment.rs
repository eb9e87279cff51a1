// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Handles environment variables, deployment modes, and runtime configuration parsing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Air Lab

//! Environment-based configuration management for production deployment

use crate::constants::{defaults, env_config, limits};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

/// Environment type for security and other configurations
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Production deployment
    Production,
    /// Automated tests
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Connection string (`sqlite:` path or `postgres://` URL)
    pub url: String,
}

impl DatabaseConfig {
    /// Check if this is a `SQLite` database
    #[must_use]
    pub fn is_sqlite(&self) -> bool {
        self.url.starts_with("sqlite:")
    }
}

/// Session authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret for session tokens, `None` means one is generated per process
    #[serde(skip_serializing)]
    pub session_secret: Option<String>,
    /// Session lifetime in hours
    pub session_ttl_hours: i64,
    /// Admin account created at startup when missing
    pub bootstrap_admin_email: Option<String>,
    /// Password of the bootstrap admin
    #[serde(skip_serializing)]
    pub bootstrap_admin_password: Option<String>,
}

/// `OpenAI` API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// API key
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Base URL of the REST API
    pub base_url: String,
    /// Default model for new assistants
    pub default_model: String,
    /// Model used for summaries and analysis
    pub summary_model: String,
    /// Request timeout
    pub timeout_secs: u64,
}

/// Object storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root of private object storage
    pub private_object_dir: PathBuf,
    /// Directories served without authentication
    pub public_search_paths: Vec<PathBuf>,
    /// Maximum accepted upload size
    pub max_upload_bytes: usize,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Allowed origins (`*` for any)
    pub allowed_origins: Vec<String>,
}

/// Run polling configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunPollConfig {
    /// Maximum number of status checks
    pub max_attempts: u32,
    /// Sleep between checks in milliseconds
    pub interval_ms: u64,
}

impl RunPollConfig {
    /// Interval as a `Duration`
    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for RunPollConfig {
    fn default() -> Self {
        Self {
            max_attempts: limits::RUN_POLL_MAX_ATTEMPTS,
            interval_ms: limits::RUN_POLL_INTERVAL_MS,
        }
    }
}

/// Server configuration loaded from the environment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP listen host
    pub host: String,
    /// HTTP API port
    pub http_port: u16,
    /// Deployment environment
    pub environment: Environment,
    /// Public base URL used in generated widget snippets
    pub public_base_url: String,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Authentication configuration
    pub auth: AuthConfig,
    /// `OpenAI` configuration
    pub openai: OpenAiConfig,
    /// Object storage configuration
    pub storage: StorageConfig,
    /// CORS configuration
    pub cors: CorsConfig,
    /// Run polling configuration
    pub run_poll: RunPollConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric variable cannot be parsed or validation fails
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let http_port: u16 = env_var_or(env_config::HTTP_PORT, &defaults::HTTP_PORT.to_string())
            .parse()
            .context("Invalid HTTP_PORT value")?;
        let host = env_var_or(env_config::HOST, defaults::HOST);

        let config = Self {
            public_base_url: env::var(env_config::PUBLIC_BASE_URL)
                .unwrap_or_else(|_| format!("http://localhost:{http_port}")),
            host,
            http_port,
            environment: Environment::from_str_or_default(&env_var_or(
                env_config::ENVIRONMENT,
                "development",
            )),
            database: DatabaseConfig {
                url: env_var_or(env_config::DATABASE_URL, defaults::DATABASE_URL),
            },
            auth: AuthConfig {
                session_secret: non_empty_var(env_config::SESSION_SECRET),
                session_ttl_hours: env_var_or(
                    env_config::SESSION_TTL_HOURS,
                    &limits::SESSION_TTL_HOURS.to_string(),
                )
                .parse()
                .context("Invalid SESSION_TTL_HOURS value")?,
                bootstrap_admin_email: non_empty_var(env_config::ADMIN_EMAIL),
                bootstrap_admin_password: non_empty_var(env_config::ADMIN_PASSWORD),
            },
            openai: OpenAiConfig {
                api_key: non_empty_var(env_config::OPENAI_API_KEY),
                base_url: env_var_or(env_config::OPENAI_BASE_URL, defaults::OPENAI_BASE_URL),
                default_model: env_var_or(env_config::DEFAULT_MODEL, defaults::MODEL),
                summary_model: defaults::SUMMARY_MODEL.to_owned(),
                timeout_secs: limits::UPSTREAM_TIMEOUT_SECS,
            },
            storage: StorageConfig {
                private_object_dir: PathBuf::from(env_var_or(
                    env_config::PRIVATE_OBJECT_DIR,
                    defaults::PRIVATE_OBJECT_DIR,
                )),
                public_search_paths: parse_list(&env_var_or(
                    env_config::PUBLIC_OBJECT_SEARCH_PATHS,
                    "",
                ))
                .into_iter()
                .map(PathBuf::from)
                .collect(),
                max_upload_bytes: env_var_or(
                    env_config::MAX_UPLOAD_BYTES,
                    &limits::MAX_UPLOAD_BYTES.to_string(),
                )
                .parse()
                .context("Invalid MAX_UPLOAD_BYTES value")?,
            },
            cors: CorsConfig {
                allowed_origins: parse_origins(&env_var_or(env_config::CORS_ALLOWED_ORIGINS, "*")),
            },
            run_poll: RunPollConfig {
                max_attempts: env_var_or(
                    env_config::RUN_POLL_MAX_ATTEMPTS,
                    &limits::RUN_POLL_MAX_ATTEMPTS.to_string(),
                )
                .parse()
                .context("Invalid RUN_POLL_MAX_ATTEMPTS value")?,
                interval_ms: env_var_or(
                    env_config::RUN_POLL_INTERVAL_MS,
                    &limits::RUN_POLL_INTERVAL_MS.to_string(),
                )
                .parse()
                .context("Invalid RUN_POLL_INTERVAL_MS value")?,
            },
        };

        config.validate()?;
        info!("Configuration loaded successfully");
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns an error when production runs without a session secret or the
    /// run poller is configured to never poll
    pub fn validate(&self) -> Result<()> {
        if self.environment.is_production() && self.auth.session_secret.is_none() {
            return Err(anyhow::anyhow!(
                "SESSION_SECRET must be set in production"
            ));
        }
        if self.run_poll.max_attempts == 0 {
            return Err(anyhow::anyhow!("RUN_POLL_MAX_ATTEMPTS must be at least 1"));
        }
        if self.auth.session_ttl_hours <= 0 {
            return Err(anyhow::anyhow!("SESSION_TTL_HOURS must be positive"));
        }
        if self.openai.api_key.is_none() {
            warn!("OPENAI_API_KEY is not set; OpenAI calls will fail");
        }
        if self.auth.bootstrap_admin_email.is_some() != self.auth.bootstrap_admin_password.is_some()
        {
            warn!("ADMIN_EMAIL and ADMIN_PASSWORD must both be set to bootstrap an admin");
        }
        Ok(())
    }

    /// Get a summary of the configuration for logging (without secrets)
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Air Lab Assistant Builder Configuration:\n\
             - Environment: {}\n\
             - HTTP: {}:{}\n\
             - Database: {}\n\
             - OpenAI: {} ({})\n\
             - Object storage: {}\n\
             - Session TTL: {}h\n\
             - Run polling: {} x {}ms\n\
             - CORS origins: {}",
            self.environment,
            self.host,
            self.http_port,
            if self.database.is_sqlite() {
                "SQLite"
            } else {
                "PostgreSQL"
            },
            self.openai.base_url,
            if self.openai.api_key.is_some() {
                "key configured"
            } else {
                "no key"
            },
            self.storage.private_object_dir.display(),
            self.auth.session_ttl_hours,
            self.run_poll.max_attempts,
            self.run_poll.interval_ms,
            self.cors.allowed_origins.join(", "),
        )
    }
}

/// Get environment variable or default value
fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Environment variable that is set and not blank
fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Parse a comma-separated list
fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Parse comma-separated CORS origins
fn parse_origins(origins_str: &str) -> Vec<String> {
    if origins_str.trim() == "*" {
        vec!["*".to_owned()]
    } else {
        parse_list(origins_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins() {
        assert_eq!(parse_origins("*"), vec!["*"]);
        assert_eq!(
            parse_origins("http://localhost:3000, https://app.example.com"),
            vec!["http://localhost:3000", "https://app.example.com"]
        );
    }

    #[test]
    fn test_environment_parsing() {
        assert_eq!(
            Environment::from_str_or_default("PROD"),
            Environment::Production
        );
        assert_eq!(
            Environment::from_str_or_default("test"),
            Environment::Testing
        );
        assert_eq!(
            Environment::from_str_or_default("invalid"),
            Environment::Development
        );
    }

    #[test]
    fn test_run_poll_defaults() {
        let poll = RunPollConfig::default();
        assert_eq!(poll.max_attempts, 30);
        assert_eq!(poll.interval(), Duration::from_secs(1));
    }
}
