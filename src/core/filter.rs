//! Translation of raw query filters into a structured predicate
//!
//! [`QueryFilterBuilder`] turns a flat map of query-string filters (plus an
//! optional free-text search term) into a [`FilterSpec`]. The spec is a plain
//! value: storage backends interpret it, the builder never touches a store.
//!
//! # Key conventions
//!
//! - `field_gt=v`, `field_lt=v` → range bounds on `field`, merged together
//! - `field_ne=v` → not-equal on `field`
//! - `field_in=v` → membership; a single value is wrapped in a list
//! - operands keep their text; backends also try [`numeric_reading`] against
//!   numeric fields
//! - `field=true` → exact boolean match
//! - `field=text` → case-insensitive substring match
//!
//! Empty strings and nulls never produce a clause.

use crate::core::timestamp;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::BTreeMap;

/// A raw filter value as it arrives from the transport layer
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    /// Explicit null / undefined
    Null,

    /// Boolean flag (`"true"` / `"false"` after coercion)
    Bool(bool),

    /// Free text
    Text(String),

    /// Repeated or comma-separated values
    List(Vec<String>),

    /// Already-typed scalar (numbers, reference ids)
    Scalar(Value),
}

impl RawValue {
    fn is_blank(&self) -> bool {
        match self {
            RawValue::Null => true,
            RawValue::Text(text) => text.is_empty(),
            RawValue::List(items) => items.is_empty(),
            RawValue::Scalar(value) => value.is_null(),
            RawValue::Bool(_) => false,
        }
    }

    /// Operand for a comparison operator
    fn to_operand(&self) -> Value {
        match self {
            RawValue::Null => Value::Null,
            RawValue::Bool(flag) => Value::Bool(*flag),
            RawValue::Text(text) => Value::String(text.clone()),
            RawValue::List(items) => items.last().cloned().map(Value::String).unwrap_or(Value::Null),
            RawValue::Scalar(value) => value.clone(),
        }
    }

    fn to_operands(&self) -> Vec<Value> {
        match self {
            RawValue::List(items) => items.iter().cloned().map(Value::String).collect(),
            RawValue::Scalar(Value::Array(values)) => values.clone(),
            other => vec![other.to_operand()],
        }
    }
}

/// Raw filters keyed by query parameter name
pub type RawFilters = BTreeMap<String, RawValue>;

/// Numeric reading of a text operand
///
/// Only text that prints back unchanged qualifies, so `"0501234567"` or
/// `"1.50"` stay text-only. Non-text operands have no alternate reading.
pub fn numeric_reading(operand: &Value) -> Option<Value> {
    let text = operand.as_str()?;
    if let Ok(int) = text.parse::<i64>() {
        return (int.to_string() == text).then(|| Value::from(int));
    }
    let float = text.parse::<f64>().ok().filter(|f| f.to_string() == text)?;
    serde_json::Number::from_f64(float).map(Value::Number)
}

/// Escape a search term so it can be compiled as a literal regex
pub fn escaped_pattern(term: &str) -> String {
    regex::escape(term)
}

/// Comparison bounds on a single field
///
/// All present bounds must hold (logical AND).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Comparison {
    pub gt: Option<Value>,
    pub gte: Option<Value>,
    pub lt: Option<Value>,
    pub lte: Option<Value>,
    pub ne: Option<Value>,
    pub one_of: Option<Vec<Value>>,
}

impl Comparison {
    pub fn gt(value: Value) -> Self {
        Self {
            gt: Some(value),
            ..Self::default()
        }
    }

    pub fn gte(value: Value) -> Self {
        Self {
            gte: Some(value),
            ..Self::default()
        }
    }

    pub fn lt(value: Value) -> Self {
        Self {
            lt: Some(value),
            ..Self::default()
        }
    }

    pub fn lte(value: Value) -> Self {
        Self {
            lte: Some(value),
            ..Self::default()
        }
    }

    pub fn ne(value: Value) -> Self {
        Self {
            ne: Some(value),
            ..Self::default()
        }
    }

    pub fn one_of(values: Vec<Value>) -> Self {
        Self {
            one_of: Some(values),
            ..Self::default()
        }
    }

    /// Overlay the bounds present in `other`
    fn merge(&mut self, other: Comparison) {
        if other.gt.is_some() {
            self.gt = other.gt;
        }
        if other.gte.is_some() {
            self.gte = other.gte;
        }
        if other.lt.is_some() {
            self.lt = other.lt;
        }
        if other.lte.is_some() {
            self.lte = other.lte;
        }
        if other.ne.is_some() {
            self.ne = other.ne;
        }
        if other.one_of.is_some() {
            self.one_of = other.one_of;
        }
    }
}

/// Condition applied to one field
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Exact match
    Equals(Value),

    /// Case-insensitive substring match on text fields
    Contains(String),

    /// Range / inequality / membership
    Compare(Comparison),
}

/// Free-text search across several fields (OR)
#[derive(Debug, Clone, PartialEq)]
pub struct SearchGroup {
    pub term: String,
    pub fields: Vec<String>,
}

/// Structured filter predicate
///
/// Field clauses are ANDed together and with the optional search group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
    clauses: BTreeMap<String, Condition>,
    search: Option<SearchGroup>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clauses(&self) -> &BTreeMap<String, Condition> {
        &self.clauses
    }

    pub fn clause(&self, field: &str) -> Option<&Condition> {
        self.clauses.get(field)
    }

    pub fn search(&self) -> Option<&SearchGroup> {
        self.search.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty() && self.search.is_none()
    }

    /// Set the condition for a field, replacing any previous one
    pub fn with_clause(mut self, field: impl Into<String>, condition: Condition) -> Self {
        self.clauses.insert(field.into(), condition);
        self
    }

    /// Merge comparison bounds into a field, keeping bounds already present
    pub fn with_comparison(mut self, field: impl Into<String>, comparison: Comparison) -> Self {
        self.merge_comparison(field.into(), comparison);
        self
    }

    /// Restrict a date field to `[start, end-of-day(end)]`
    ///
    /// Either bound may be absent. The upper bound covers the whole local day
    /// of `end`, so records stamped after midnight on that day are included.
    pub fn with_date_range(
        self,
        field: impl Into<String>,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Self {
        let mut range = Comparison::default();
        if let Some(start) = start {
            range.gte = Some(Value::String(timestamp::format(&start)));
        }
        if let Some(end) = end {
            range.lte = Some(Value::String(timestamp::format(&timestamp::end_of_day(end))));
        }

        if range == Comparison::default() {
            return self;
        }
        self.with_comparison(field, range)
    }

    fn merge_comparison(&mut self, field: String, comparison: Comparison) {
        match self.clauses.get_mut(&field) {
            Some(Condition::Compare(existing)) => existing.merge(comparison),
            _ => {
                self.clauses.insert(field, Condition::Compare(comparison));
            }
        }
    }
}

/// Builds a [`FilterSpec`] from raw query filters
pub struct QueryFilterBuilder;

impl QueryFilterBuilder {
    /// Build a filter predicate
    ///
    /// # Parameters
    /// - `raw`: query filters keyed by parameter name (suffixes included)
    /// - `search_term`: optional free-text term
    /// - `searchable_fields`: fields the free-text term is matched against
    ///
    /// The input is never modified; a fresh spec is returned.
    pub fn build(
        raw: &RawFilters,
        search_term: Option<&str>,
        searchable_fields: &[&str],
    ) -> FilterSpec {
        let mut spec = FilterSpec::new();

        for (key, value) in raw {
            if value.is_blank() {
                continue;
            }

            if let Some(field) = strip_operator(key, "_gt") {
                spec.merge_comparison(field.to_string(), Comparison::gt(value.to_operand()));
            } else if let Some(field) = strip_operator(key, "_lt") {
                spec.merge_comparison(field.to_string(), Comparison::lt(value.to_operand()));
            } else if let Some(field) = strip_operator(key, "_ne") {
                spec.merge_comparison(field.to_string(), Comparison::ne(value.to_operand()));
            } else if let Some(field) = strip_operator(key, "_in") {
                spec.merge_comparison(field.to_string(), Comparison::one_of(value.to_operands()));
            } else {
                let condition = match value {
                    RawValue::Bool(flag) => Condition::Equals(Value::Bool(*flag)),
                    RawValue::Text(text) => Condition::Contains(text.clone()),
                    RawValue::List(items) => Condition::Equals(Value::from(items.clone())),
                    RawValue::Scalar(scalar) => Condition::Equals(scalar.clone()),
                    RawValue::Null => continue,
                };
                spec.clauses.insert(key.clone(), condition);
            }
        }

        if let Some(term) = search_term.map(str::trim).filter(|t| !t.is_empty())
            && !searchable_fields.is_empty()
        {
            spec.search = Some(SearchGroup {
                term: term.to_string(),
                fields: searchable_fields.iter().map(|f| f.to_string()).collect(),
            });
        }

        spec
    }
}

fn strip_operator<'a>(key: &'a str, suffix: &str) -> Option<&'a str> {
    key.strip_suffix(suffix).filter(|field| !field.is_empty())
}
