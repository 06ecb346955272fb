use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use waterwise::config::app::AppConfig;
use waterwise::services::gemini::GeminiClient;
use waterwise::AppState;

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => tracing::error!("Failed to install SIGTERM handler: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env()?;

    if config.api_key.is_none() {
        tracing::warn!("API_KEY is not set; /chat requests will fail until it is provided");
    }

    let llm = Arc::new(GeminiClient::from_config(&config));
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    let state = AppState {
        config: Arc::new(config),
        llm,
    };

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Server listening on port {}", addr.port());

    axum::serve(listener, waterwise::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
