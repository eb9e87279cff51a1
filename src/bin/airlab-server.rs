// ABOUTME: Air Lab server binary wiring configuration, logging, database and HTTP routes
// ABOUTME: Supports --http-port and --database-url overrides on top of the environment
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Air Lab

//! # Air Lab Assistant Builder Server Binary
//!
//! Loads `ServerConfig` from the environment, opens the database (creating
//! the schema), bootstraps the admin account and serves the HTTP API.

use airlab_assistant_builder::{
    config::environment::ServerConfig,
    database_plugins::factory::Database,
    logging,
    resources::ServerResources,
    server,
};
use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "airlab-server")]
#[command(about = "Air Lab Assistant Builder - build and deploy OpenAI assistants")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override database URL
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    if let Some(database_url) = args.database_url {
        config.database.url = database_url;
    }
    config.validate()?;

    logging::init_from_env()?;
    info!("Starting Air Lab Assistant Builder");
    info!("{}", config.summary());

    let database = Database::new(&config.database.url).await?;
    info!("Database initialized: {}", database.backend_info());

    let resources = Arc::new(ServerResources::from_config(database, Arc::new(config)).await?);
    server::bootstrap_admin(&resources).await?;
    server::purge_expired_sessions(&resources).await?;

    if let Err(e) = server::run(resources).await {
        error!("Server error: {e}");
        return Err(e.into());
    }
    info!("Server stopped");
    Ok(())
}
