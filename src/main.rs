use clap::Parser;
use tracing_subscriber::EnvFilter;


mod cli;


use cli::{Cli, execute_command};




#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config();
    config.validate()?;

    if let Some(command) = cli.command {
        execute_command(&config, command).await?;
    }

    Ok(())
}
