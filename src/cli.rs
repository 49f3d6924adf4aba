// src/cli.rs
use crate::config::AppConfig;
use crate::core::{upload_image, CloudinaryClient, Database, ImageSource};
use crate::start_web_server;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "portfolio")]
#[command(about = "Personal portfolio site and digital CV")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[arg(long, global = true, default_value = "config.yaml")]
    pub config: PathBuf,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Run the web server (default)
    Serve,
    /// Create the content tables in the configured database
    InitDb,
    /// Upload an image to the asset host and print its secure URL
    UploadImage {
        path: PathBuf,
        /// Target folder on the asset host (defaults to the configured folder)
        #[arg(long)]
        folder: Option<String>,
    },
}

pub async fn handle_command(cli: Cli) -> Result<()> {
    let config = AppConfig::load(&cli.config)?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => start_web_server(config).await,

        Command::InitDb => {
            Database::new(&config.database_path).await?;
            info!("Schema ready at {}", config.database_path.display());
            Ok(())
        }

        Command::UploadImage { path, folder } => {
            let folder = folder.unwrap_or_else(|| config.cloudinary.default_folder.clone());
            let host = CloudinaryClient::new(&config.cloudinary)?;

            match upload_image(&host, ImageSource::Path(path.clone()), &folder).await {
                Ok(asset) => {
                    println!("{}", asset.secure_url);
                    Ok(())
                }
                Err(e) => {
                    error!("Failed to upload {}: {:#}", path.display(), e);
                    Err(e)
                }
            }
        }
    }
}
