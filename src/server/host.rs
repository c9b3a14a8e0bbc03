//! Server host holding the state shared by every route
//!
//! The host is built once by the [`ServerBuilder`](super::builder::ServerBuilder)
//! and handed to the REST exposure, which derives per-entity router state
//! from it.

use crate::core::auth::AuthProvider;
use crate::core::query::PaginationDefaults;
use crate::core::store::DocumentStore;
use crate::server::entity_registry::EntityRegistry;
use std::sync::Arc;

/// Host context containing all framework state
pub struct ServerHost {
    /// Document store backing every collection
    pub store: Arc<dyn DocumentStore>,

    /// Turns request headers into a caller identity
    pub auth: Arc<dyn AuthProvider>,

    /// Sort applied to list requests that name none
    pub pagination: Arc<PaginationDefaults>,

    /// Entity registry for CRUD routes
    pub entity_registry: EntityRegistry,
}

impl ServerHost {
    pub fn from_builder_components(
        store: Arc<dyn DocumentStore>,
        auth: Arc<dyn AuthProvider>,
        pagination: PaginationDefaults,
        entity_registry: EntityRegistry,
    ) -> Self {
        Self {
            store,
            auth,
            pagination: Arc::new(pagination),
            entity_registry,
        }
    }

    /// Get entity types registered in the host
    pub fn entity_types(&self) -> Vec<&str> {
        self.entity_registry.entity_types()
    }
}

#[cfg(test)]
impl ServerHost {
    pub(crate) fn in_memory(entity_registry: EntityRegistry) -> Self {
        Self::from_builder_components(
            Arc::new(crate::storage::InMemoryStore::new()),
            Arc::new(crate::core::auth::NoAuthProvider),
            PaginationDefaults::default(),
            entity_registry,
        )
    }
}
