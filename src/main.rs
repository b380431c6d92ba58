use std::sync::Arc;

use anyhow::Context;
use property_desk::store::{seed, JsonFileStore, Store};
use property_desk::{router, AppState, Config};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "property_desk=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("🏠 Property Desk API");
    info!("====================");

    let config = Config::from_env().context("Invalid configuration")?;

    let file_store = JsonFileStore::new(&config.database_dir);
    info!("Using database directory {}", file_store.dir().display());
    let store: Arc<dyn Store> = Arc::new(file_store);

    seed::ensure_seed_data(store.as_ref())
        .await
        .context("Failed to initialize database")?;

    let app = router(AppState::new(store, &config));

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("✅ Server running on port {}", config.port);
    info!("API available at http://localhost:{}/api", config.port);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
