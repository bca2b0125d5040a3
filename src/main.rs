use ekarte_api::config::AppConfig;
use ekarte_api::{logging, run_server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    logging::init(&config.logging);

    log::info!(
        "Configuration loaded: server={} database={}:{}/{}",
        config.server_address(),
        config.database.host,
        config.database.port,
        config.database.name
    );

    run_server(config).await
}
