use std::sync::{Arc, Mutex};

use serde::Deserialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use stockroom::error::{Result, StoreError};
use stockroom::notify::ChangeHub;
use stockroom::persist::Store;
use stockroom::provider::InventoryProvider;
use stockroom::router::Router;
use stockroom::server;

#[derive(Debug, Deserialize)]
struct Settings {
    database: String,
    listen: String,
    authority: String,
}

// Settings come from stockroom.toml next to the binary, overridable with
// STOCKROOM_* environment variables.
fn settings() -> Result<Settings> {
    config::Config::builder()
        .set_default("database", "stockroom.db")
        .map_err(|e| StoreError::Config(e.to_string()))?
        .set_default("listen", "127.0.0.1:8580")
        .map_err(|e| StoreError::Config(e.to_string()))?
        .set_default("authority", "net.stockroom.local")
        .map_err(|e| StoreError::Config(e.to_string()))?
        .add_source(config::File::with_name("stockroom").required(false))
        .add_source(config::Environment::with_prefix("STOCKROOM"))
        .build()
        .map_err(|e| StoreError::Config(e.to_string()))?
        .try_deserialize()
        .map_err(|e| StoreError::Config(e.to_string()))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = settings()?;
    info!(?settings, "starting");

    let store = if settings.database == ":memory:" {
        Store::open_in_memory()?
    } else {
        Store::open(&settings.database)?
    };
    let provider = InventoryProvider::new(
        Router::new(&settings.authority)?,
        store,
        Arc::new(ChangeHub::new()),
    );

    let app = server::router(Arc::new(Mutex::new(provider)));
    let listener = tokio::net::TcpListener::bind(&settings.listen)
        .await
        .map_err(|e| StoreError::Config(format!("cannot bind {}: {e}", settings.listen)))?;
    info!(listen = %settings.listen, "serving");
    axum::serve(listener, app)
        .await
        .map_err(|e| StoreError::Config(e.to_string()))
}
