//! Sixstone server binary.
//!
//! Configuration comes from the environment:
//!
//! - `SIXSTONE_BIND` — listen address (default `0.0.0.0:8080`)
//! - `SIXSTONE_DATA_DIR` — enables persistence of counters and boards
//! - `SIXSTONE_ADMIN_KEY` — enables the remote shutdown operation
//! - `RUST_LOG` — tracing filter, e.g. `sixstone=debug`

use sixstone_hub::HubConfig;
use sixstone_server::{ServerError, SixstoneServer};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let bind = std::env::var("SIXSTONE_BIND").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let hub_config = HubConfig {
        admin_key: std::env::var("SIXSTONE_ADMIN_KEY").ok(),
        ..HubConfig::default()
    };

    let mut builder = SixstoneServer::builder().bind(&bind).hub_config(hub_config);
    if let Ok(dir) = std::env::var("SIXSTONE_DATA_DIR") {
        builder = builder.data_dir(dir);
    }

    let server = builder.build().await?;
    tracing::info!(%bind, "starting Sixstone server");
    server.run().await
}
