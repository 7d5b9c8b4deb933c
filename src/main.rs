use anyhow::Result;
use blog_translate::{config::Config, server, translation::TranslationGateway};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored when the variables come from the host)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("blog_translate=info".parse()?),
        )
        .init();

    let config = Config::from_env()?;
    info!(
        "Starting translation gateway (environment={}, TRANSLATION_ENABLED={})",
        config.environment, config.translation_enabled
    );

    let gateway = Arc::new(TranslationGateway::from_config(&config)?);
    info!("Provider pipeline: {}", gateway.provider_names().join(" -> "));

    server::serve(&config, gateway).await
}
