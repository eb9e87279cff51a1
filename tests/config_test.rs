// ABOUTME: Tests for environment-driven server configuration
// ABOUTME: Runs serially because every test mutates process environment variables
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Air Lab

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use airlab_assistant_builder::config::{Environment, ServerConfig};
use airlab_assistant_builder::constants::env_config;
use serial_test::serial;
use std::env;
use std::path::PathBuf;

const ALL_VARS: &[&str] = &[
    env_config::OPENAI_API_KEY,
    env_config::OPENAI_BASE_URL,
    env_config::DATABASE_URL,
    env_config::SESSION_SECRET,
    env_config::SESSION_TTL_HOURS,
    env_config::PRIVATE_OBJECT_DIR,
    env_config::PUBLIC_OBJECT_SEARCH_PATHS,
    env_config::HTTP_PORT,
    env_config::HOST,
    env_config::ENVIRONMENT,
    env_config::DEFAULT_MODEL,
    env_config::CORS_ALLOWED_ORIGINS,
    env_config::PUBLIC_BASE_URL,
    env_config::MAX_UPLOAD_BYTES,
    env_config::RUN_POLL_MAX_ATTEMPTS,
    env_config::RUN_POLL_INTERVAL_MS,
    env_config::ADMIN_EMAIL,
    env_config::ADMIN_PASSWORD,
];

fn clear_env() {
    for var in ALL_VARS {
        env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_defaults_without_environment() {
    clear_env();

    let config = ServerConfig::from_env().unwrap();

    assert_eq!(config.http_port, 5000);
    assert_eq!(config.host, "0.0.0.0");
    assert_eq!(config.environment, Environment::Development);
    assert_eq!(config.public_base_url, "http://localhost:5000");
    assert!(config.database.is_sqlite());
    assert_eq!(config.openai.base_url, "https://api.openai.com/v1");
    assert_eq!(config.openai.default_model, "gpt-4o-mini");
    assert!(config.openai.api_key.is_none());
    assert!(config.auth.session_secret.is_none());
    assert_eq!(config.auth.session_ttl_hours, 168);
    assert_eq!(config.cors.allowed_origins, vec!["*"]);
    assert!(config.storage.public_search_paths.is_empty());
    assert_eq!(config.run_poll.max_attempts, 30);
    assert_eq!(config.run_poll.interval_ms, 1000);
}

#[test]
#[serial]
fn test_reads_overrides() {
    clear_env();
    env::set_var(env_config::HTTP_PORT, "8080");
    env::set_var(env_config::ENVIRONMENT, "testing");
    env::set_var(env_config::OPENAI_API_KEY, "sk-live");
    env::set_var(env_config::DATABASE_URL, "postgresql://airlab@db/airlab");
    env::set_var(env_config::PUBLIC_OBJECT_SEARCH_PATHS, "/srv/public, /srv/assets,");
    env::set_var(
        env_config::CORS_ALLOWED_ORIGINS,
        "https://app.example.com, http://localhost:3000",
    );
    env::set_var(env_config::RUN_POLL_MAX_ATTEMPTS, "5");
    env::set_var(env_config::SESSION_SECRET, "   ");

    let config = ServerConfig::from_env().unwrap();
    clear_env();

    assert_eq!(config.http_port, 8080);
    assert_eq!(config.public_base_url, "http://localhost:8080");
    assert_eq!(config.environment, Environment::Testing);
    assert_eq!(config.openai.api_key.as_deref(), Some("sk-live"));
    assert!(!config.database.is_sqlite());
    assert_eq!(
        config.storage.public_search_paths,
        vec![PathBuf::from("/srv/public"), PathBuf::from("/srv/assets")]
    );
    assert_eq!(
        config.cors.allowed_origins,
        vec!["https://app.example.com", "http://localhost:3000"]
    );
    assert_eq!(config.run_poll.max_attempts, 5);
    // Blank secrets count as unset
    assert!(config.auth.session_secret.is_none());
}

#[test]
#[serial]
fn test_invalid_numbers_are_rejected() {
    clear_env();
    env::set_var(env_config::HTTP_PORT, "not-a-port");
    let err = ServerConfig::from_env().unwrap_err();
    assert!(err.to_string().contains("HTTP_PORT"), "{err}");

    clear_env();
    env::set_var(env_config::RUN_POLL_MAX_ATTEMPTS, "0");
    let err = ServerConfig::from_env().unwrap_err();
    assert!(err.to_string().contains("RUN_POLL_MAX_ATTEMPTS"), "{err}");
    clear_env();
}

#[test]
#[serial]
fn test_production_requires_session_secret() {
    clear_env();
    env::set_var(env_config::ENVIRONMENT, "production");
    let err = ServerConfig::from_env().unwrap_err();
    assert!(err.to_string().contains("SESSION_SECRET"), "{err}");

    env::set_var(env_config::SESSION_SECRET, "a-long-random-secret");
    let config = ServerConfig::from_env().unwrap();
    clear_env();

    assert!(config.environment.is_production());
}

#[test]
#[serial]
fn test_summary_hides_secrets() {
    clear_env();
    env::set_var(env_config::OPENAI_API_KEY, "sk-very-secret");
    env::set_var(env_config::SESSION_SECRET, "session-very-secret");
    let config = ServerConfig::from_env().unwrap();
    clear_env();

    let summary = config.summary();
    assert!(summary.contains("key configured"));
    assert!(!summary.contains("sk-very-secret"));
    assert!(!summary.contains("session-very-secret"));

    let json = serde_json::to_string(&config).unwrap();
    assert!(!json.contains("sk-very-secret"));
    assert!(!json.contains("session-very-secret"));
}
