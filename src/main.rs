use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use onewhat_api::config::config_manager::{ConfigManager, DEFAULT_CONFIG_PATH};
use onewhat_api::logging::{init_logging, LogConfig};
use onewhat_api::routes::create_app;
use onewhat_api::state::app_state::AppState;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    // File + console
    let _guards = init_logging(LogConfig::from_env())?;

    let config_path =
        std::env::var("CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config_manager = Arc::new(ConfigManager::new(&config_path).await?);

    let config = config_manager.get_config().await;
    if config.upstream.resolve_api_key().is_none() {
        tracing::warn!(
            "No upstream API key configured (set {} or upstream.api_key); requests go out unauthenticated",
            config.upstream.api_key_env
        );
    }

    let app_state = Arc::new(AppState::new(config_manager));
    let app = create_app(app_state);

    let port: u16 = std::env::var("SERVER_PORT")
        .unwrap_or_else(|_| "8000".to_string())
        .parse()
        .map_err(|e| format!("SERVER_PORT must be a number: {}", e))?;
    // IPv6 "any" (::), dual-stack on most systems
    let addr = SocketAddr::from(([0, 0, 0, 0, 0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
