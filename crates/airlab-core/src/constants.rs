// ABOUTME: Application constants organized by domain (limits, billing, defaults, env names)
// ABOUTME: Single source for tunables shared by the server crate and its tests
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Air Lab

/// Service identity used in logs and health responses
pub mod service_names {
    /// Service name for structured logging
    pub const AIRLAB_SERVER: &str = "airlab-assistant-builder";
}

/// Environment variable names
pub mod env_config {
    /// `OpenAI` API key
    pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
    /// `OpenAI` base URL override
    pub const OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";
    /// Database connection string
    pub const DATABASE_URL: &str = "DATABASE_URL";
    /// Secret used to sign session tokens
    pub const SESSION_SECRET: &str = "SESSION_SECRET";
    /// Session lifetime in hours
    pub const SESSION_TTL_HOURS: &str = "SESSION_TTL_HOURS";
    /// Root directory of private object storage
    pub const PRIVATE_OBJECT_DIR: &str = "PRIVATE_OBJECT_DIR";
    /// Comma-separated public object directories
    pub const PUBLIC_OBJECT_SEARCH_PATHS: &str = "PUBLIC_OBJECT_SEARCH_PATHS";
    /// HTTP listen port
    pub const HTTP_PORT: &str = "HTTP_PORT";
    /// HTTP listen host
    pub const HOST: &str = "HOST";
    /// Deployment environment
    pub const ENVIRONMENT: &str = "ENVIRONMENT";
    /// Default chat model
    pub const DEFAULT_MODEL: &str = "DEFAULT_MODEL";
    /// Allowed CORS origins
    pub const CORS_ALLOWED_ORIGINS: &str = "CORS_ALLOWED_ORIGINS";
    /// Public base URL used in widget snippets
    pub const PUBLIC_BASE_URL: &str = "PUBLIC_BASE_URL";
    /// Maximum upload size in bytes
    pub const MAX_UPLOAD_BYTES: &str = "MAX_UPLOAD_BYTES";
    /// Run poll attempts
    pub const RUN_POLL_MAX_ATTEMPTS: &str = "RUN_POLL_MAX_ATTEMPTS";
    /// Run poll interval in milliseconds
    pub const RUN_POLL_INTERVAL_MS: &str = "RUN_POLL_INTERVAL_MS";
    /// Bootstrap admin email
    pub const ADMIN_EMAIL: &str = "ADMIN_EMAIL";
    /// Bootstrap admin password
    pub const ADMIN_PASSWORD: &str = "ADMIN_PASSWORD";
}

/// Default configuration values
pub mod defaults {
    /// Default `OpenAI` API base URL
    pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
    /// Default database URL
    pub const DATABASE_URL: &str = "sqlite:./data/airlab.db";
    /// Default object storage root
    pub const PRIVATE_OBJECT_DIR: &str = "./data/objects";
    /// Default HTTP port
    pub const HTTP_PORT: u16 = 5000;
    /// Default listen host
    pub const HOST: &str = "0.0.0.0";
    /// Default chat model for new assistants
    pub const MODEL: &str = "gpt-4o-mini";
    /// Model used for Google Docs summarization and analysis
    pub const SUMMARY_MODEL: &str = "gpt-4o-mini";
    /// Default temperature for new assistants
    pub const TEMPERATURE: f32 = 0.7;
    /// Default image generation model
    pub const IMAGE_GENERATION_MODEL: &str = "dall-e-3";
    /// Default image edit model
    pub const IMAGE_EDIT_MODEL: &str = "dall-e-2";
    /// Default image size
    pub const IMAGE_SIZE: &str = "1024x1024";
}

/// Limits and timeouts
pub mod limits {
    /// Session lifetime in hours (one week)
    pub const SESSION_TTL_HOURS: i64 = 168;
    /// Minimum password length
    pub const MIN_PASSWORD_LENGTH: usize = 8;
    /// Maximum assistant name length
    pub const MAX_ASSISTANT_NAME_LENGTH: usize = 256;
    /// Maximum temperature accepted by the Assistants API
    pub const MAX_TEMPERATURE: f32 = 2.0;
    /// Maximum upload size (20 MiB)
    pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;
    /// Run poll attempts before giving up
    pub const RUN_POLL_MAX_ATTEMPTS: u32 = 30;
    /// Interval between run polls
    pub const RUN_POLL_INTERVAL_MS: u64 = 1000;
    /// Maximum characters of document text sent for summarization
    pub const MAX_SUMMARY_INPUT_CHARS: usize = 100_000;
    /// Maximum message length accepted by chat endpoints
    pub const MAX_MESSAGE_CHARS: usize = 32_000;
    /// HTTP request timeout for upstream APIs
    pub const UPSTREAM_TIMEOUT_SECS: u64 = 120;
    /// Default page size for list endpoints
    pub const DEFAULT_PAGE_SIZE: i64 = 50;
}

/// Billing plans and quotas
pub mod billing {
    /// Monthly message quota on the free plan
    pub const FREE_MONTHLY_MESSAGES: i64 = 100;
    /// Monthly message quota on the pro plan
    pub const PRO_MONTHLY_MESSAGES: i64 = 5_000;
    /// Monthly price of the pro plan in cents
    pub const PRO_PRICE_CENTS: i64 = 1_900;
    /// Monthly price of the business plan in cents
    pub const BUSINESS_PRICE_CENTS: i64 = 9_900;
}

/// HTTP-level names
pub mod http {
    /// Session cookie name
    pub const SESSION_COOKIE: &str = "airlab_session";
    /// Beta header required by the Assistants v2 API
    pub const OPENAI_BETA_HEADER: &str = "OpenAI-Beta";
    /// Beta header value
    pub const OPENAI_BETA_VALUE: &str = "assistants=v2";
}
