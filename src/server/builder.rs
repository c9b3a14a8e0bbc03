//! ServerBuilder for fluent API to build HTTP servers

use super::entity_registry::EntityRegistry;
use super::exposure::RestExposure;
use super::host::ServerHost;
use crate::core::auth::{AuthProvider, NoAuthProvider};
use crate::core::module::Module;
use crate::core::query::PaginationDefaults;
use crate::core::store::DocumentStore;
use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Builder for creating HTTP servers with auto-registered routes
///
/// # Example
///
/// ```ignore
/// ServerBuilder::new()
///     .with_store(InMemoryStore::new())
///     .with_auth_provider(JwtAuthProvider::new(secret))
///     .register_module(ClinicModule)
///     .serve("127.0.0.1:3000")
///     .await?;
/// ```
pub struct ServerBuilder {
    store: Option<Arc<dyn DocumentStore>>,
    auth: Option<Arc<dyn AuthProvider>>,
    pagination: PaginationDefaults,
    entity_registry: EntityRegistry,
    custom_routes: Vec<Router>,
}

impl ServerBuilder {
    pub fn new() -> Self {
        Self {
            store: None,
            auth: None,
            pagination: PaginationDefaults::default(),
            entity_registry: EntityRegistry::new(),
            custom_routes: Vec::new(),
        }
    }

    /// Set the document store (required)
    pub fn with_store(self, store: impl DocumentStore + 'static) -> Self {
        self.with_shared_store(Arc::new(store))
    }

    /// Set an already shared document store
    pub fn with_shared_store(mut self, store: Arc<dyn DocumentStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the auth provider
    ///
    /// Without one every caller is anonymous, so only operations that require
    /// no permission are reachable.
    pub fn with_auth_provider(mut self, provider: impl AuthProvider + 'static) -> Self {
        self.auth = Some(Arc::new(provider));
        self
    }

    /// Override the sort used by list requests that name none
    pub fn with_pagination_defaults(mut self, defaults: PaginationDefaults) -> Self {
        self.pagination = defaults;
        self
    }

    /// Add routes that don't fit the CRUD pattern
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Register all entities of a module
    pub fn register_module(mut self, module: impl Module) -> Self {
        module.register_entities(&mut self.entity_registry);

        tracing::debug!(
            module = module.name(),
            version = module.version(),
            entities = module.entity_types().len(),
            "module registered"
        );
        self
    }

    /// Build the host shared by every route
    pub fn build_host(mut self) -> Result<ServerHost> {
        let store = self
            .store
            .take()
            .ok_or_else(|| anyhow::anyhow!("DocumentStore is required. Call .with_store()"))?;
        let auth = self
            .auth
            .take()
            .unwrap_or_else(|| Arc::new(NoAuthProvider));

        Ok(ServerHost::from_builder_components(
            store,
            auth,
            self.pagination,
            self.entity_registry,
        ))
    }

    /// Build the final REST router
    pub fn build(mut self) -> Result<Router> {
        let custom_routes = std::mem::take(&mut self.custom_routes);
        let host = Arc::new(self.build_host()?);
        Ok(RestExposure::build_router(host, custom_routes))
    }

    /// Serve the application with graceful shutdown
    ///
    /// Handles SIGTERM and SIGINT (Ctrl+C).
    pub async fn serve(self, addr: &str) -> Result<()> {
        let app = self.build()?;
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
