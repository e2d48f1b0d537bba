use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use sentiment_proxy::{
    config::Config,
    api::routes::create_router,
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sentiment_proxy=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Refuse to start without an API key.
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            error!("{}. Stopping.", e);
            return Err(e.into());
        }
    };
    let server_addr = config.server_addr;
    info!(
        static_dir = %config.static_dir.display(),
        upstream = %config.sentiment_api_base_url,
        "Starting server on {}", server_addr
    );

    let app_state = AppState::new(config)?;
    let app = create_router(app_state);

    let listener = TcpListener::bind(server_addr).await?;

    info!("Listening on {}", server_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
