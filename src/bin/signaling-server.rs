//! Standalone signaling server for the share views.

use screenshare_host_lib::signaling::{self, SignalingConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| screenshare_host_lib::config::DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = SignalingConfig::from_env();
    tracing::info!("Starting signaling server v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = signaling::serve(&config).await {
        tracing::error!("Signaling server stopped: {}", e);
        std::process::exit(1);
    }
}
