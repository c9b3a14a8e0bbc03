//! Server module for building HTTP servers with auto-registered routes
//!
//! The `ServerBuilder` collects a document store, an auth provider and the
//! modules whose entities get CRUD routes.

pub mod builder;
pub mod entity_registry;
pub mod exposure;
pub mod host;

pub use builder::ServerBuilder;
pub use entity_registry::{EntityDescriptor, EntityRegistry, RecordDescriptor};
pub use exposure::RestExposure;
pub use host::ServerHost;
