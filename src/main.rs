use std::path::{Path, PathBuf};

use actix_web::{middleware::DefaultHeaders, web, App, HttpServer};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sqlx::MySqlPool;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod api;
mod config;
mod db;
mod error;
mod export;
mod locate;
mod matcher;
mod model;
mod page;
mod plot;

#[derive(Debug, Parser)]
struct Cli {
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the room map and the JSON API
    Serve {
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Place one client from three signal readings
    Locate {
        label: String,
        #[arg(num_args = 3, allow_negative_numbers = true)]
        readings: Vec<f64>,
    },
    /// Write the placement of every known device to stdout as CSV
    Export,
    /// Create the measurement tables if they don't exist yet
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let path = match cli.config.as_deref() {
        Some(x) => x,
        None => Path::new("config.toml"),
    };
    let config = config::load(path)?;

    let pool = MySqlPool::connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Command::Serve { port } => {
            let port = port.unwrap_or(config.http_port);
            let palette = config.palette();

            info!("listening on {}:{port}", config.bind);
            HttpServer::new(move || {
                App::new()
                    .app_data(web::Data::new(pool.clone()))
                    .app_data(web::Data::new(palette.clone()))
                    .wrap(DefaultHeaders::new().add(("Access-Control-Allow-Origin", "*")))
                    .service(page::service)
                    .service(api::snapshot_service)
                    .service(api::locate_service)
            })
            .bind((config.bind.as_str(), port))?
            .run()
            .await?;
        }

        Command::Locate { label, readings } => {
            let snapshot = db::snapshot(&pool).await?;
            let placement = locate::place(&snapshot, &label, &readings)?;
            println!(
                "{} is at measurement #{} ({}, {}), distance {:.2}",
                placement.label,
                placement.measurement.id,
                placement.measurement.x,
                placement.measurement.y,
                placement.distance
            );
        }

        Command::Export => export::run(&pool).await?,
        Command::Migrate => {
            sqlx::migrate!().run(&pool).await?;
            info!("migrations applied");
        }
    };

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_port_flag() {
        let cli = Cli::try_parse_from(["roomfix", "serve", "--port", "8080"]).unwrap();
        assert!(matches!(cli.command, Command::Serve { port: Some(8080) }));

        let cli = Cli::try_parse_from(["roomfix", "-c", "room.toml", "serve"]).unwrap();
        assert_eq!(cli.config.as_deref(), Some(Path::new("room.toml")));
        assert!(matches!(cli.command, Command::Serve { port: None }));
    }

    #[test]
    fn locate_takes_negative_readings() {
        let cli = Cli::try_parse_from(["roomfix", "locate", "phone", "-40", "-61.5", "-70"]).unwrap();
        match cli.command {
            Command::Locate { label, readings } => {
                assert_eq!(label, "phone");
                assert_eq!(readings, [-40.0, -61.5, -70.0]);
            }
            other => panic!("unexpected command {other:?}"),
        }

        assert!(Cli::try_parse_from(["roomfix", "locate", "phone", "-40", "-61"]).is_err());
    }
}
