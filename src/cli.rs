use std::path::PathBuf;

use anyhow::Context;
use chrono::Duration;
use clap::{Parser, Subcommand};
use secrecy::SecretString;
use tokio::fs;

use greencart::storage::{location_uris, Ingestor};
use greencart::token::TokenAuthority;
use greencart::{AppConfig, FileTypeDetector, RawUpload};

#[derive(Parser)]
#[command(name = "greencart")]
#[command(about = "GreenCart media ingestion and token tool", long_about = None)]
pub struct Cli {
    /// Directory that stored assets are written to
    #[arg(long, env = "GREENCART_STORAGE_ROOT", default_value = "./uploads")]
    storage_root: PathBuf,

    /// Prefix for the returned asset locations
    #[arg(long, env = "GREENCART_PUBLIC_BASE_URL", default_value = "/uploads")]
    public_base_url: String,

    /// Token signing secret
    #[arg(long, env = "GREENCART_TOKEN_SECRET", hide_env_values = true)]
    secret: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ingest local image files into the storage root
    Upload {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Declared MIME type for every file (sniffed from content otherwise)
        #[arg(long)]
        mime: Option<String>,
    },

    /// List stored assets
    List,

    /// Issue or verify tokens
    #[command(subcommand)]
    Token(TokenCommand),
}

#[derive(Subcommand)]
pub enum TokenCommand {
    /// Sign a JSON payload
    Issue {
        #[arg(short, long)]
        payload: String,

        /// Lifetime in seconds
        #[arg(long)]
        ttl: Option<u64>,
    },

    /// Check a token and print its payload
    Verify { token: String },
}

impl Cli {
    pub fn config(&self) -> AppConfig {
        AppConfig {
            storage_root: self.storage_root.clone(),
            public_base_url: self.public_base_url.clone(),
            token_secret: self.secret.clone().map(SecretString::new),
            ..AppConfig::default()
        }
    }
}

pub async fn execute_command(config: &AppConfig, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Upload { files, mime } => {
            let mut uploads = Vec::with_capacity(files.len());
            for path in &files {
                let data = fs::read(path).await.with_context(|| format!("reading {}", path.display()))?;
                let file_name = path
                    .file_name()
                    .and_then(|name| name.to_str())
                    .unwrap_or_default()
                    .to_string();
                let mime_type = match &mime {
                    Some(mime) => mime.clone(),
                    None => FileTypeDetector::detect(&data).mime_type().to_string(),
                };
                uploads.push(RawUpload::new(file_name, mime_type, data));
            }

            let ingestor = Ingestor::from_config(config).await?;
            let assets = ingestor.ingest(&uploads).await?;
            for uri in location_uris(&assets) {
                println!("{}", uri);
            }
        }
        Commands::List => {
            let ingestor = Ingestor::from_config(config).await?;
            for asset in ingestor.backend().list_assets().await? {
                println!("{}\t{}\t{}", asset.stored_name, asset.size_bytes, asset.mime_type);
            }
        }
        Commands::Token(TokenCommand::Issue { payload, ttl }) => {
            let authority = TokenAuthority::from_config(config)?;
            let payload: serde_json::Value = serde_json::from_str(&payload).context("payload must be valid JSON")?;
            let ttl = match ttl {
                Some(secs) => Some(
                    i64::try_from(secs)
                        .ok()
                        .and_then(Duration::try_seconds)
                        .context("ttl out of range")?,
                ),
                None => None,
            };
            println!("{}", authority.issue(&payload, ttl)?);
        }
        Commands::Token(TokenCommand::Verify { token }) => {
            let authority = TokenAuthority::from_config(config)?;
            let payload: serde_json::Value = authority.verify(token.trim())?;
            println!("{}", payload);
        }
    }

    Ok(())
}
