//! In-memory document store for testing and development

use crate::core::filter::{Comparison, Condition, FilterSpec, escaped_pattern, numeric_reading};
use crate::core::query::SortDirection;
use crate::core::store::{Collection, DocumentStore, FindOptions, Relation};
use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use regex::{Regex, RegexBuilder};
use serde_json::Value;
use std::borrow::Cow;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

type Collections = Arc<RwLock<HashMap<String, Vec<Value>>>>;

/// In-memory document store
///
/// Collections are created on first use. Documents keep insertion order,
/// which is the natural order before sorting. Uses RwLock for thread-safe
/// access; the lock is never held across an await point.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    collections: Collections,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for InMemoryStore {
    fn collection(&self, name: &str) -> Arc<dyn Collection> {
        Arc::new(InMemoryCollection {
            name: name.to_string(),
            collections: self.collections.clone(),
        })
    }
}

/// Handle on one named collection of an [`InMemoryStore`]
pub struct InMemoryCollection {
    name: String,
    collections: Collections,
}

fn document_id(document: &Value) -> Option<&str> {
    document.get("id").and_then(Value::as_str)
}

#[async_trait]
impl Collection for InMemoryCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn count(&self, filter: &FilterSpec) -> Result<u64> {
        let matcher = Matcher::compile(filter)?;
        let collections = self
            .collections
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        let count = collections
            .get(&self.name)
            .map(|docs| docs.iter().filter(|doc| matcher.matches(doc)).count())
            .unwrap_or(0);
        Ok(count as u64)
    }

    async fn find(&self, filter: &FilterSpec, options: &FindOptions) -> Result<Vec<Value>> {
        let matcher = Matcher::compile(filter)?;
        let collections = self
            .collections
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        let mut matched: Vec<&Value> = collections
            .get(&self.name)
            .map(|docs| docs.iter().filter(|doc| matcher.matches(doc)).collect())
            .unwrap_or_default();

        if let Some(sort) = &options.sort {
            matched.sort_by(|a, b| {
                let primary = sort_order(a.get(&sort.field), b.get(&sort.field));
                let primary = match sort.direction {
                    SortDirection::Asc => primary,
                    SortDirection::Desc => primary.reverse(),
                };
                primary.then_with(|| document_id(a).cmp(&document_id(b)))
            });
        }

        let window = matched
            .into_iter()
            .skip(options.skip as usize)
            .take(options.limit.map(|l| l as usize).unwrap_or(usize::MAX));

        Ok(window
            .map(|doc| populate(doc.clone(), &options.populate, &collections))
            .collect())
    }

    async fn find_by_id(&self, id: &Uuid, relations: &[Relation]) -> Result<Option<Value>> {
        let collections = self
            .collections
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        let id = id.to_string();
        Ok(collections
            .get(&self.name)
            .and_then(|docs| docs.iter().find(|doc| document_id(doc) == Some(id.as_str())))
            .map(|doc| populate(doc.clone(), relations, &collections)))
    }

    async fn insert(&self, document: Value) -> Result<Value> {
        let Some(id) = document_id(&document).map(str::to_string) else {
            bail!("document inserted into '{}' has no string id", self.name);
        };

        let mut collections = self
            .collections
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let docs = collections.entry(self.name.clone()).or_default();
        if docs.iter().any(|doc| document_id(doc) == Some(id.as_str())) {
            bail!("duplicate id '{}' in '{}'", id, self.name);
        }
        docs.push(document.clone());

        Ok(document)
    }

    async fn replace(&self, id: &Uuid, document: Value) -> Result<Option<Value>> {
        let mut collections = self
            .collections
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let id = id.to_string();
        let Some(slot) = collections
            .get_mut(&self.name)
            .and_then(|docs| docs.iter_mut().find(|doc| document_id(doc) == Some(id.as_str())))
        else {
            return Ok(None);
        };

        *slot = document.clone();
        Ok(Some(document))
    }

    async fn delete(&self, id: &Uuid) -> Result<bool> {
        let mut collections = self
            .collections
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let id = id.to_string();
        let Some(docs) = collections.get_mut(&self.name) else {
            return Ok(false);
        };

        let before = docs.len();
        docs.retain(|doc| document_id(doc) != Some(id.as_str()));
        Ok(docs.len() < before)
    }
}

/// Replace each relation's id with the referenced document, or null when dangling
fn populate(
    mut document: Value,
    relations: &[Relation],
    collections: &HashMap<String, Vec<Value>>,
) -> Value {
    if let Some(fields) = document.as_object_mut() {
        for relation in relations {
            let Some(reference) = fields
                .get(relation.field)
                .and_then(Value::as_str)
                .map(str::to_string)
            else {
                continue;
            };
            let target = collections
                .get(relation.collection)
                .and_then(|docs| docs.iter().find(|doc| document_id(doc) == Some(reference.as_str())))
                .cloned()
                .unwrap_or(Value::Null);
            fields.insert(relation.field.to_string(), target);
        }
    }

    document
}

/// A [`FilterSpec`] with its text patterns compiled
struct Matcher<'a> {
    clauses: Vec<(&'a str, CompiledCondition<'a>)>,
    search: Option<(Regex, &'a [String])>,
}

enum CompiledCondition<'a> {
    Equals(&'a Value),
    Contains(Regex),
    Compare(&'a Comparison),
}

fn substring_pattern(term: &str) -> Result<Regex> {
    RegexBuilder::new(&escaped_pattern(term))
        .case_insensitive(true)
        .build()
        .map_err(|e| anyhow!("invalid search pattern '{}': {}", term, e))
}

impl<'a> Matcher<'a> {
    fn compile(filter: &'a FilterSpec) -> Result<Self> {
        let clauses = filter
            .clauses()
            .iter()
            .map(|(field, condition)| -> Result<(&'a str, CompiledCondition<'a>)> {
                let compiled = match condition {
                    Condition::Equals(value) => CompiledCondition::Equals(value),
                    Condition::Contains(term) => CompiledCondition::Contains(substring_pattern(term)?),
                    Condition::Compare(comparison) => CompiledCondition::Compare(comparison),
                };
                Ok((field.as_str(), compiled))
            })
            .collect::<Result<Vec<_>>>()?;

        let search = filter
            .search()
            .map(|group| Ok::<_, anyhow::Error>((substring_pattern(&group.term)?, group.fields.as_slice())))
            .transpose()?;

        Ok(Self { clauses, search })
    }

    fn matches(&self, document: &Value) -> bool {
        let clauses_hold = self.clauses.iter().all(|(field, condition)| {
            let value = document.get(*field);
            match condition {
                CompiledCondition::Equals(expected) => equals(value, expected),
                CompiledCondition::Contains(pattern) => contains(value, pattern),
                CompiledCondition::Compare(comparison) => compare(value, comparison),
            }
        });

        clauses_hold
            && self.search.as_ref().is_none_or(|(pattern, fields)| {
                fields
                    .iter()
                    .any(|field| contains(document.get(field.as_str()), pattern))
            })
    }
}

fn same_value(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

/// Read a text operand as a number when the stored value is numeric
fn aligned<'v>(stored: &Value, operand: &'v Value) -> Cow<'v, Value> {
    match (stored, numeric_reading(operand)) {
        (Value::Number(_), Some(number)) => Cow::Owned(number),
        _ => Cow::Borrowed(operand),
    }
}

/// Exact match; an array field matches when any element does
fn equals(value: Option<&Value>, expected: &Value) -> bool {
    match value {
        None => expected.is_null(),
        Some(Value::Array(items)) if !expected.is_array() => items
            .iter()
            .any(|item| same_value(item, &aligned(item, expected))),
        Some(value) => same_value(value, &aligned(value, expected)),
    }
}

fn contains(value: Option<&Value>, pattern: &Regex) -> bool {
    match value {
        Some(Value::String(text)) => pattern.is_match(text),
        Some(Value::Array(items)) => items
            .iter()
            .any(|item| item.as_str().is_some_and(|text| pattern.is_match(text))),
        _ => false,
    }
}

/// Order two values of the same kind; values of different kinds are incomparable
fn ordering(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

fn compare(value: Option<&Value>, comparison: &Comparison) -> bool {
    let value = value.filter(|v| !v.is_null());

    let bound = |limit: &Option<Value>, accept: fn(Ordering) -> bool| {
        limit.as_ref().is_none_or(|limit| {
            value
                .and_then(|v| ordering(v, &aligned(v, limit)))
                .is_some_and(accept)
        })
    };

    bound(&comparison.gt, Ordering::is_gt)
        && bound(&comparison.gte, Ordering::is_ge)
        && bound(&comparison.lt, Ordering::is_lt)
        && bound(&comparison.lte, Ordering::is_le)
        && comparison
            .ne
            .as_ref()
            .is_none_or(|excluded| !equals(value, excluded))
        && comparison
            .one_of
            .as_ref()
            .is_none_or(|options| options.iter().any(|option| equals(value, option)))
}

/// Rank of a value's kind in sort order
fn kind_rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Number(_)) => 1,
        Some(Value::String(_)) => 2,
        Some(Value::Object(_)) => 3,
        Some(Value::Array(_)) => 4,
        Some(Value::Bool(_)) => 5,
    }
}

fn sort_order(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => ordering(x, y).unwrap_or_else(|| kind_rank(a).cmp(&kind_rank(b))),
        _ => kind_rank(a).cmp(&kind_rank(b)),
    }
}
