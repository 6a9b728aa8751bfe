use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use farm_portal::database::{establish_connection, get_database_url, seed_data};
use farm_portal::server::{self, MigrateDirection};
use farm_portal::services::{write_applications_csv, ApplicationService};

#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    #[clap(short, long, global = true)]
    log_level: Option<String>,
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Serve {
        #[clap(short, long, default_value = "3000")]
        port: u16,
        #[clap(short, long, default_value = "farm-portal.db")]
        database: String,
        #[clap(long)]
        cors_origin: Option<String>,
        /// TOML configuration file
        #[clap(short, long)]
        config: Option<PathBuf>,
    },
    Db {
        #[clap(subcommand)]
        command: DbCommands,
    },
    /// Dump every stored internal application as CSV
    ExportCsv {
        #[clap(short, long, default_value = "farm-portal.db")]
        database: String,
        /// Output file; stdout when omitted
        #[clap(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
enum DbCommands {
    Init {
        #[clap(short, long, default_value = "farm-portal.db")]
        database: String,
    },
    Migrate {
        #[clap(subcommand)]
        direction: MigrateDirection,
        #[clap(short, long, default_value = "farm-portal.db")]
        database: String,
    },
    /// Create a demo farm and print the owner's invitation token
    Seed {
        #[clap(short, long, default_value = "farm-portal.db")]
        database: String,
        #[clap(long, default_value = "owner@demo.example")]
        owner_email: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    setup_logging(&args.log_level);

    match args.command {
        Commands::Serve {
            port,
            database,
            cors_origin,
            config,
        } => {
            info!("Starting server on port {}", port);
            server::start_server(port, &database, cors_origin.as_deref(), config.as_deref())
                .await?;
        }
        Commands::Db { command } => match command {
            DbCommands::Init { database } => {
                info!("Initializing database: {}", database);
                server::migrate_database(&database, MigrateDirection::Up).await?;
            }
            DbCommands::Migrate {
                direction,
                database,
            } => {
                info!("Running database migration: {:?}", direction);
                server::migrate_database(&database, direction).await?;
            }
            DbCommands::Seed {
                database,
                owner_email,
            } => {
                server::migrate_database(&database, MigrateDirection::Up).await?;
                let db = establish_connection(&get_database_url(Some(&database))).await?;
                let summary = seed_data::create_demo_farm(&db, &owner_email).await?;
                info!(farm_id = summary.farm_id, owner_id = summary.owner_id, "Seed complete");
                if let Some(token) = summary.invitation_token {
                    println!("Owner invitation token: {}", token);
                }
            }
        },
        Commands::ExportCsv { database, output } => {
            let db = establish_connection(&get_database_url(Some(&database))).await?;
            let records = ApplicationService::new(db, Default::default())
                .all_applications()
                .await?;
            let written = match output {
                Some(path) => {
                    let file = File::create(&path)
                        .with_context(|| format!("Failed to create {}", path.display()))?;
                    write_applications_csv(&records, file)?
                }
                None => write_applications_csv(&records, std::io::stdout().lock())?,
            };
            info!("Exported {} applications", written);
        }
    }

    Ok(())
}

fn setup_logging(log_level: &Option<String>) {
    let log_level = match log_level
        .as_ref()
        .unwrap_or(&"info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(format!("sqlx=warn,{}", log_level)))
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}
