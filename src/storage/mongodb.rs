//! MongoDB storage backend using the official MongoDB async driver.
//!
//! # Feature flag
//!
//! This module is gated behind the `mongodb_backend` feature flag.
//!
//! # Storage model
//!
//! One collection per entity type, named after `Entity::resource_name()`
//! (e.g., "patients", "medical_records"). Documents arrive as
//! `serde_json::Value`, are converted to BSON and back, and the `id` field is
//! mapped to MongoDB's `_id` convention. Ids and timestamps are stored as
//! strings; the fixed-width timestamp format keeps string comparison
//! chronological.
//!
//! Lists run as an aggregation pipeline:
//! `$match` → `$sort` → `$skip` → `$limit` → (`$lookup` + `$unwind` + `$set`) per relation.

use crate::core::filter::{Comparison, Condition, FilterSpec, escaped_pattern, numeric_reading};
use crate::core::query::{SortDirection, SortSpec};
use crate::core::store::{Collection, DocumentStore, FindOptions, Relation};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{Bson, Document, doc};
use mongodb::{Client, Database};
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Conversion helpers
// ---------------------------------------------------------------------------

/// Convert a serde_json::Value (expected to be an Object) into a BSON Document,
/// renaming `id` → `_id` for MongoDB convention.
fn json_to_document(json: Value) -> Result<Document> {
    let bson_val = mongodb::bson::to_bson(&json)
        .map_err(|e| anyhow!("Failed to convert JSON to BSON: {}", e))?;

    let mut doc = match bson_val {
        Bson::Document(d) => d,
        _ => return Err(anyhow!("Expected BSON document, got non-object")),
    };

    if let Some(id) = doc.remove("id") {
        doc.insert("_id", id);
    }

    Ok(doc)
}

fn rename_id(doc: &mut Document) {
    if let Some(id) = doc.remove("_id") {
        doc.insert("id", id);
    }
}

/// Convert a BSON Document back into a serde_json::Value,
/// renaming `_id` → `id` on the document and on every expanded relation.
fn document_to_json(mut doc: Document, relations: &[Relation]) -> Value {
    rename_id(&mut doc);
    for relation in relations {
        if let Ok(nested) = doc.get_document_mut(relation.field) {
            rename_id(nested);
        }
    }

    Bson::Document(doc).into_relaxed_extjson()
}

fn uuid_bson(id: &Uuid) -> Bson {
    Bson::String(id.to_string())
}

fn json_to_bson(value: &Value) -> Result<Bson> {
    mongodb::bson::to_bson(value).map_err(|e| anyhow!("Failed to convert filter value: {}", e))
}

fn storage_field(field: &str) -> &str {
    if field == "id" { "_id" } else { field }
}

fn regex_bson(term: &str) -> Document {
    doc! { "$regex": escaped_pattern(term), "$options": "i" }
}

/// An operand as given, followed by its numeric reading when it has one
fn readings(operand: &Value) -> Result<Vec<Bson>> {
    let mut readings = vec![json_to_bson(operand)?];
    if let Some(number) = numeric_reading(operand) {
        readings.push(json_to_bson(&number)?);
    }
    Ok(readings)
}

/// Range operators with every bound read as given, or every bound read as a
/// number; `None` when there is no bound or a bound has no such reading
fn range_bson(comparison: &Comparison, numeric: bool) -> Result<Option<Document>> {
    let mut operators = Document::new();
    for (operator, bound) in [
        ("$gt", &comparison.gt),
        ("$gte", &comparison.gte),
        ("$lt", &comparison.lt),
        ("$lte", &comparison.lte),
    ] {
        let Some(bound) = bound else { continue };
        let operand = if numeric {
            match numeric_reading(bound) {
                Some(number) => number,
                None => return Ok(None),
            }
        } else {
            bound.clone()
        };
        operators.insert(operator, json_to_bson(&operand)?);
    }
    Ok((!operators.is_empty()).then_some(operators))
}

/// Operators for one compared field, plus an `$or` over the text and numeric
/// readings of its range when both exist
fn comparison_bson(field: &str, comparison: &Comparison) -> Result<(Document, Option<Document>)> {
    let mut operators = Document::new();
    let mut either = None;

    match (range_bson(comparison, false)?, range_bson(comparison, true)?) {
        (Some(text), Some(number)) => {
            either = Some(doc! { "$or": [ { field: text }, { field: number } ] });
        }
        (Some(text), None) => operators.extend(text),
        _ => {}
    }

    if let Some(excluded) = &comparison.ne {
        let mut excluded = readings(excluded)?;
        if excluded.len() == 1 {
            operators.insert("$ne", excluded.remove(0));
        } else {
            operators.insert("$nin", excluded);
        }
    }
    if let Some(options) = &comparison.one_of {
        let mut members = Vec::new();
        for option in options {
            members.extend(readings(option)?);
        }
        operators.insert("$in", members);
    }

    Ok((operators, either))
}

/// Translate a [`FilterSpec`] into a MongoDB query document
pub fn filter_to_document(filter: &FilterSpec) -> Result<Document> {
    let mut query = Document::new();
    let mut all_of = Vec::new();

    for (field, condition) in filter.clauses() {
        let field = storage_field(field);
        let value = match condition {
            Condition::Equals(value) => json_to_bson(value)?,
            Condition::Contains(term) => Bson::Document(regex_bson(term)),
            Condition::Compare(comparison) => {
                let (operators, either) = comparison_bson(field, comparison)?;
                all_of.extend(either);
                if operators.is_empty() {
                    continue;
                }
                Bson::Document(operators)
            }
        };
        query.insert(field, value);
    }

    if let Some(group) = filter.search() {
        let alternatives: Vec<Document> = group
            .fields
            .iter()
            .map(|field| doc! { storage_field(field): regex_bson(&group.term) })
            .collect();
        query.insert("$or", alternatives);
    }

    if !all_of.is_empty() {
        query.insert("$and", all_of);
    }

    Ok(query)
}

/// Sort on the requested key, then on `_id` ascending
pub fn sort_to_document(sort: &SortSpec) -> Document {
    let direction = match sort.direction {
        SortDirection::Asc => 1,
        SortDirection::Desc => -1,
    };
    let field = storage_field(&sort.field);
    if field == "_id" {
        doc! { "_id": direction }
    } else {
        doc! { field: direction, "_id": 1 }
    }
}

fn lookup_stages(relations: &[Relation]) -> Vec<Document> {
    relations
        .iter()
        .flat_map(|relation| {
            let field = relation.field;
            [
                doc! {
                    "$lookup": {
                        "from": relation.collection,
                        "localField": relation.field,
                        "foreignField": "_id",
                        "as": relation.field,
                    }
                },
                doc! {
                    "$unwind": {
                        "path": format!("${}", relation.field),
                        "preserveNullAndEmptyArrays": true,
                    }
                },
                // A dangling reference leaves no field after the unwind
                doc! {
                    "$set": {
                        field: { "$ifNull": [format!("${}", field), Bson::Null] }
                    }
                },
            ]
        })
        .collect()
}

// ---------------------------------------------------------------------------
// MongoStore
// ---------------------------------------------------------------------------

/// Document store backed by a MongoDB database.
///
/// # Example
///
/// ```rust,ignore
/// let store = MongoStore::connect("mongodb://localhost:27017", "clinic").await?;
/// let patients = store.collection("patients");
/// ```
#[derive(Clone, Debug)]
pub struct MongoStore {
    database: Database,
}

impl MongoStore {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    /// Connect to a server and select a database
    pub async fn connect(uri: &str, database: &str) -> Result<Self> {
        let client = Client::with_uri_str(uri)
            .await
            .map_err(|e| anyhow!("Failed to connect to MongoDB: {}", e))?;
        Ok(Self::new(client.database(database)))
    }

    pub fn database(&self) -> &Database {
        &self.database
    }
}

impl DocumentStore for MongoStore {
    fn collection(&self, name: &str) -> Arc<dyn Collection> {
        Arc::new(MongoCollection {
            name: name.to_string(),
            inner: self.database.collection(name),
        })
    }
}

/// One MongoDB collection
pub struct MongoCollection {
    name: String,
    inner: mongodb::Collection<Document>,
}

impl MongoCollection {
    async fn aggregate(&self, pipeline: Vec<Document>, relations: &[Relation]) -> Result<Vec<Value>> {
        let cursor = self
            .inner
            .aggregate(pipeline)
            .await
            .map_err(|e| anyhow!("Failed to query '{}': {}", self.name, e))?;

        let docs: Vec<Document> = cursor
            .try_collect()
            .await
            .map_err(|e| anyhow!("Failed to collect '{}' results: {}", self.name, e))?;

        Ok(docs
            .into_iter()
            .map(|doc| document_to_json(doc, relations))
            .collect())
    }
}

#[async_trait]
impl Collection for MongoCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn count(&self, filter: &FilterSpec) -> Result<u64> {
        self.inner
            .count_documents(filter_to_document(filter)?)
            .await
            .map_err(|e| anyhow!("Failed to count '{}': {}", self.name, e))
    }

    async fn find(&self, filter: &FilterSpec, options: &FindOptions) -> Result<Vec<Value>> {
        let mut pipeline = vec![doc! { "$match": filter_to_document(filter)? }];
        if let Some(sort) = &options.sort {
            pipeline.push(doc! { "$sort": sort_to_document(sort) });
        }
        if options.skip > 0 {
            let skip = i64::try_from(options.skip).unwrap_or(i64::MAX);
            pipeline.push(doc! { "$skip": skip });
        }
        if let Some(limit) = options.limit {
            let limit = i64::try_from(limit).unwrap_or(i64::MAX);
            pipeline.push(doc! { "$limit": limit });
        }
        pipeline.extend(lookup_stages(&options.populate));

        tracing::debug!(collection = %self.name, ?pipeline, "aggregate");
        self.aggregate(pipeline, &options.populate).await
    }

    async fn find_by_id(&self, id: &Uuid, relations: &[Relation]) -> Result<Option<Value>> {
        let mut pipeline = vec![doc! { "$match": { "_id": uuid_bson(id) } }, doc! { "$limit": 1 }];
        pipeline.extend(lookup_stages(relations));

        Ok(self.aggregate(pipeline, relations).await?.into_iter().next())
    }

    async fn insert(&self, document: Value) -> Result<Value> {
        let doc = json_to_document(document.clone())?;
        self.inner
            .insert_one(doc)
            .await
            .map_err(|e| anyhow!("Failed to insert into '{}': {}", self.name, e))?;
        Ok(document)
    }

    async fn replace(&self, id: &Uuid, document: Value) -> Result<Option<Value>> {
        let doc = json_to_document(document.clone())?;
        let result = self
            .inner
            .replace_one(doc! { "_id": uuid_bson(id) }, doc)
            .await
            .map_err(|e| anyhow!("Failed to update '{}': {}", self.name, e))?;

        Ok((result.matched_count > 0).then_some(document))
    }

    async fn delete(&self, id: &Uuid) -> Result<bool> {
        let result = self
            .inner
            .delete_one(doc! { "_id": uuid_bson(id) })
            .await
            .map_err(|e| anyhow!("Failed to delete from '{}': {}", self.name, e))?;

        Ok(result.deleted_count > 0)
    }
}
