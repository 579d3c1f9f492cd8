pub mod auth;
pub mod config;
pub mod error;
pub mod routes;

use anyhow::Context;
use rocket::figment::Figment;
use rocket::fs::FileServer;
use rocket::{catchers, routes, Build, Rocket};
use tracing::info;

use greencart::storage::Ingestor;
use greencart::token::TokenAuthority;
use greencart::AppConfig;

use auth::ServerSettings;

/// Builds the server from `figment`. Fails when the configuration is
/// invalid or no token secret is set.
pub async fn build(figment: Figment) -> anyhow::Result<Rocket<Build>> {
    let config: AppConfig = figment.extract().context("invalid GreenCart configuration")?;
    config.validate()?;

    let authority = TokenAuthority::from_config(&config)?;
    let ingestor = Ingestor::from_config(&config)
        .await
        .with_context(|| format!("cannot open storage root {}", config.storage_root.display()))?;

    let assets_path = config::mount_path(&config.public_base_url);
    info!(
        storage_root = %config.storage_root.display(),
        assets_path = %assets_path,
        max_files = config.ingest.max_files,
        max_file_size = config.ingest.max_file_size,
        require_auth = config.require_auth,
        "GreenCart server configured"
    );

    let figment = figment.merge(("limits", config::upload_limits(&config.ingest)));

    Ok(rocket::custom(figment)
        .manage(ingestor)
        .manage(authority)
        .manage(ServerSettings { require_auth: config.require_auth })
        .mount("/", routes![routes::upload, routes::upload_without_form, routes::session])
        .mount(assets_path.as_str(), FileServer::from(&config.storage_root))
        .register("/", catchers![error::unauthorized, error::default_catcher]))
}
