//! Document store traits consumed by the query layer
//!
//! Records travel through the store as JSON documents. Each backend decides
//! how to evaluate a [`FilterSpec`] and how to expand [`Relation`]s.

use crate::core::filter::FilterSpec;
use crate::core::query::SortSpec;
use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

/// A reference field expanded in place with the referenced document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relation {
    /// Field holding the referenced record's id (e.g. "doctor")
    pub field: &'static str,

    /// Collection the id points into (e.g. "doctors")
    pub collection: &'static str,
}

impl Relation {
    pub const fn new(field: &'static str, collection: &'static str) -> Self {
        Self { field, collection }
    }
}

/// Options for a bounded fetch
#[derive(Debug, Clone, Default)]
pub struct FindOptions {
    /// Sort key; the record id is always the secondary key
    pub sort: Option<SortSpec>,

    /// Records to skip before the window
    pub skip: u64,

    /// Maximum number of records; `None` fetches everything
    pub limit: Option<u64>,

    /// Relations to expand on every returned record
    pub populate: Vec<Relation>,
}

impl FindOptions {
    pub fn sorted(sort: SortSpec) -> Self {
        Self {
            sort: Some(sort),
            ..Self::default()
        }
    }

    pub fn window(mut self, skip: u64, limit: u64) -> Self {
        self.skip = skip;
        self.limit = Some(limit);
        self
    }

    pub fn populate(mut self, relations: &[Relation]) -> Self {
        self.populate = relations.to_vec();
        self
    }
}

/// A collection of JSON documents keyed by `id`
///
/// Transport failures surface as `Err`; a missing record is `Ok(None)` /
/// `Ok(false)`.
#[async_trait]
pub trait Collection: Send + Sync {
    /// Collection name (e.g. "patients")
    fn name(&self) -> &str;

    /// Count documents matching the filter
    async fn count(&self, filter: &FilterSpec) -> Result<u64>;

    /// Fetch matching documents, sorted and windowed
    async fn find(&self, filter: &FilterSpec, options: &FindOptions) -> Result<Vec<Value>>;

    /// Fetch one document by id
    async fn find_by_id(&self, id: &Uuid, populate: &[Relation]) -> Result<Option<Value>>;

    /// Insert a new document; its `id` must be unique
    async fn insert(&self, document: Value) -> Result<Value>;

    /// Replace an existing document, returning `None` if it does not exist
    async fn replace(&self, id: &Uuid, document: Value) -> Result<Option<Value>>;

    /// Delete a document, returning whether it existed
    async fn delete(&self, id: &Uuid) -> Result<bool>;
}

/// Hands out collections by name
pub trait DocumentStore: Send + Sync {
    fn collection(&self, name: &str) -> Arc<dyn Collection>;
}
