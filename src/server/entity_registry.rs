//! Entity registry for managing entity descriptors and generating CRUD routes

use crate::core::entity::Entity;
use crate::server::exposure::rest::handlers::{self, CrudState};
use crate::server::host::ServerHost;
use axum::Router;
use axum::routing::get;
use std::collections::HashMap;
use std::marker::PhantomData;

/// Describes how to build the routes of one record type
pub trait EntityDescriptor: Send + Sync {
    /// The entity type name (singular, e.g. "doctor")
    fn entity_type(&self) -> &str;

    /// The collection name (e.g. "doctors")
    fn plural(&self) -> &str;

    /// Build the CRUD routes for this entity
    ///
    /// - GET/POST `/{plural}`
    /// - GET/PATCH/PUT/DELETE `/{plural}/{id}`
    fn build_routes(&self, host: &ServerHost) -> Router;
}

/// Registry of every record type exposed by the server
#[derive(Default)]
pub struct EntityRegistry {
    descriptors: HashMap<String, Box<dyn EntityDescriptor>>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self {
            descriptors: HashMap::new(),
        }
    }

    /// Register an entity descriptor, keyed by its entity type
    pub fn register(&mut self, descriptor: Box<dyn EntityDescriptor>) {
        let entity_type = descriptor.entity_type().to_string();
        self.descriptors.insert(entity_type, descriptor);
    }

    /// Merge the routes of all registered entities
    pub fn build_routes(&self, host: &ServerHost) -> Router {
        let mut router = Router::new();

        for descriptor in self.descriptors.values() {
            router = router.merge(descriptor.build_routes(host));
        }

        router
    }

    pub fn entity_types(&self) -> Vec<&str> {
        self.descriptors.keys().map(|s| s.as_str()).collect()
    }
}

/// Descriptor wiring the generic CRUD handlers to a record type
pub struct RecordDescriptor<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> RecordDescriptor<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for RecordDescriptor<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> EntityDescriptor for RecordDescriptor<T> {
    fn entity_type(&self) -> &str {
        T::resource_name_singular()
    }

    fn plural(&self) -> &str {
        T::resource_name()
    }

    fn build_routes(&self, host: &ServerHost) -> Router {
        let state = CrudState::<T>::new(
            host.store.collection(T::resource_name()),
            host.auth.clone(),
            host.pagination.clone(),
        );
        let path = T::route_path();

        Router::new()
            .route(&path, get(handlers::list::<T>).post(handlers::create::<T>))
            .route(
                &format!("{}/{{id}}", path),
                get(handlers::get_one::<T>)
                    .patch(handlers::update::<T>)
                    .put(handlers::update::<T>)
                    .delete(handlers::delete::<T>),
            )
            .with_state(state)
    }
}
