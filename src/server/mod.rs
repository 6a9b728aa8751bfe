pub mod app;
pub mod handlers;
pub mod identity;
pub mod response;

use std::path::Path;

use anyhow::Result;
use clap::Subcommand;
use sea_orm_migration::MigratorTrait;
use tracing::info;

use crate::config::AppConfig;
use crate::database::{connection::*, migrations::Migrator};

#[derive(Subcommand, Debug, Clone, Copy)]
pub enum MigrateDirection {
    Up,
    Down,
    Fresh,
}

pub async fn start_server(
    port: u16,
    database_path: &str,
    cors_origin: Option<&str>,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = AppConfig::load(config_path)?;
    if config.google_script_url.is_none() {
        tracing::warn!("INTERNAL_APPLICATION_GOOGLE_SCRIPT_URL not set; spreadsheet export disabled");
    }

    let database_url = get_database_url(Some(database_path));
    let db = establish_connection(&database_url).await?;

    Migrator::up(&db, None).await?;
    info!("Database migrations completed");

    let state = app::AppState::new(db, config)?;
    let app = app::create_app(state, cors_origin).await?;

    log_routes();

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    info!("Server running on http://0.0.0.0:{}", port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", err);
    }
    info!("Shutting down");
}

fn log_routes() {
    info!("API Endpoints:");
    info!("  /health                     - Health check");
    info!("  /api-docs/openapi.json      - OpenAPI document");
    info!("  /api/v1/account/*           - Farm profile, zones, users, password");
    info!("  /api/v1/application/*       - Internal application, submission, export");
}

pub async fn migrate_database(database_path: &str, direction: MigrateDirection) -> Result<()> {
    let database_url = get_database_url(Some(database_path));
    let db = establish_connection(&database_url).await?;

    match direction {
        MigrateDirection::Up => {
            info!("Running migrations up");
            Migrator::up(&db, None).await?;
        }
        MigrateDirection::Down => {
            info!("Running migrations down");
            Migrator::down(&db, None).await?;
        }
        MigrateDirection::Fresh => {
            info!("Running fresh migrations (down then up)");
            Migrator::down(&db, None).await?;
            Migrator::up(&db, None).await?;
        }
    }

    info!("Database migration completed");
    Ok(())
}
