use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use tracing::log::LevelFilter;

pub async fn establish_connection(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(database_url.to_owned());
    // every pooled connection to :memory: would open its own empty database
    let max_connections = if database_url.contains(":memory:") { 1 } else { 16 };
    options
        .max_connections(max_connections)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(8))
        .sqlx_logging(true)
        .sqlx_logging_level(LevelFilter::Debug);
    Database::connect(options).await
}

pub fn get_database_url(database_path: Option<&str>) -> String {
    match database_path {
        Some(":memory:") => "sqlite::memory:".to_string(),
        Some(path) if path.starts_with("sqlite:") => path.to_string(),
        Some(path) => format!("sqlite:{}?mode=rwc", path),
        None => "sqlite:farm-portal.db?mode=rwc".to_string(),
    }
}
