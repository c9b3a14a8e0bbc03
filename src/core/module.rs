//! Module system grouping related entities

use crate::server::entity_registry::EntityRegistry;

/// A set of entities registered together
pub trait Module: Send + Sync {
    /// Unique module name
    fn name(&self) -> &str;

    /// Module version
    fn version(&self) -> &str {
        "1.0.0"
    }

    /// Singular names of the entity types managed by this module
    fn entity_types(&self) -> Vec<&str>;

    /// Register entity descriptors; each one contributes the CRUD routes for its entity
    fn register_entities(&self, registry: &mut EntityRegistry);
}
