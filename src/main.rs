use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use huntboard::config::AppConfig;
use huntboard::routes;
use huntboard::state::AppState;
use huntboard::store::HostedStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    tracing::info!(
        store_url = %config.store_url,
        store_api_key = %config.redacted_store_api_key(),
        server_host = %config.server_host,
        server_port = config.server_port,
        public_base_url = %config.public_base_url,
        "loaded huntboard configuration"
    );

    let store = Arc::new(HostedStore::new(&config)?);
    let listen_addr: SocketAddr = format!("{}:{}", config.server_host, config.server_port).parse()?;

    let state = AppState::new(config, store);
    let router = routes::create_router(state);

    let listener = TcpListener::bind(listen_addr).await?;
    tracing::info!("listening on {}", listen_addr);

    axum::serve(listener, router).await?;
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
