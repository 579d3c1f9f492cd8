use tracing_subscriber::EnvFilter;

#[rocket::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let rocket = greencart_server::build(greencart_server::config::figment()).await?;
    rocket
        .launch()
        .await
        .map_err(|e| anyhow::anyhow!("server failed: {}", e))?;
    Ok(())
}
