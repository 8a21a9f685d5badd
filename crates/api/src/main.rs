use anyhow::Context;

use shopfront_api::ApiConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    shopfront_observability::init();

    let config = ApiConfig::from_env();
    if config.debug {
        tracing::warn!("APP_DEBUG is on; store error details will be returned to clients");
    }

    let app = shopfront_api::app::build_app(&config).await?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
