//! Clinic back office server
//!
//! Reads `CLINIC_CONFIG` (YAML) when set and applies `CLINIC_JWT_SECRET` /
//! `CLINIC_MONGODB_URI` overrides. Log level follows `RUST_LOG`.

use anyhow::Result;
use clinic::config::{AppConfig, StorageConfig};
use clinic::prelude::*;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::load()?;
    if config.auth.uses_dev_secret() {
        tracing::warn!("using the development JWT secret; set CLINIC_JWT_SECRET");
    }

    let module = ClinicModule;
    tracing::info!(
        "Starting {} v{} ({} entities)",
        module.name(),
        module.version(),
        module.entity_types().len()
    );

    let store = open_store(&config.storage).await?;

    ServerBuilder::new()
        .with_shared_store(store)
        .with_auth_provider(JwtAuthProvider::new(&config.auth.jwt_secret))
        .with_pagination_defaults(config.pagination.clone())
        .register_module(module)
        .serve(&config.server.address())
        .await
}

async fn open_store(storage: &StorageConfig) -> Result<Arc<dyn DocumentStore>> {
    match storage {
        StorageConfig::Memory => {
            tracing::info!("Using in-memory storage");
            Ok(Arc::new(InMemoryStore::new()))
        }
        #[cfg(feature = "mongodb_backend")]
        StorageConfig::Mongodb { uri, database } => {
            tracing::info!(%database, "Connecting to MongoDB");
            Ok(Arc::new(MongoStore::connect(uri, database).await?))
        }
        #[cfg(not(feature = "mongodb_backend"))]
        StorageConfig::Mongodb { .. } => anyhow::bail!(
            "MongoDB storage requested but the server was built without the `mongodb_backend` feature"
        ),
    }
}
