//! Query parameters and pagination utilities

use crate::core::filter::{FilterSpec, QueryFilterBuilder, RawFilters, RawValue};
use crate::core::timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;

/// Query keys consumed by pagination, sorting and search; never treated as filters
const RESERVED_KEYS: &[&str] = &[
    "page",
    "limit",
    "allData",
    "sortBy",
    "order",
    "search",
    "startDate",
    "endDate",
];

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    /// Parse `asc` / `desc` (case-insensitive)
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" => Some(SortDirection::Asc),
            "desc" => Some(SortDirection::Desc),
            _ => None,
        }
    }
}

/// A single sort key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Asc)
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Desc)
    }
}

/// Sorting used when a request does not specify one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationDefaults {
    /// Field sorted on when `sortBy` is absent
    pub sort_by: String,

    /// Direction used when `order` is absent or unrecognized
    pub order: SortDirection,
}

impl Default for PaginationDefaults {
    fn default() -> Self {
        Self {
            sort_by: "createdAt".to_string(),
            order: SortDirection::Desc,
        }
    }
}

/// Normalized pagination window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u64,
    limit: u64,
    all_data: bool,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            all_data: false,
        }
    }
}

impl PageRequest {
    /// Build a request, flooring page and limit at 1
    pub fn new(page: i64, limit: i64, all_data: bool) -> Self {
        Self {
            page: page.max(1) as u64,
            limit: limit.max(1) as u64,
            all_data,
        }
    }

    /// Build a request from raw query text, substituting defaults for anything unparseable
    pub fn parse(page: Option<&str>, limit: Option<&str>, all_data: Option<&str>) -> Self {
        let page = page
            .and_then(|p| p.trim().parse::<i64>().ok())
            .unwrap_or(DEFAULT_PAGE as i64);
        let limit = limit
            .and_then(|l| l.trim().parse::<i64>().ok())
            .unwrap_or(DEFAULT_LIMIT as i64);
        let all_data = all_data.and_then(parse_flag).unwrap_or(false);

        Self::new(page, limit, all_data)
    }

    /// Request every matching record
    pub fn all() -> Self {
        Self {
            all_data: true,
            ..Self::default()
        }
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn all_data(&self) -> bool {
        self.all_data
    }

    /// Number of records before the window
    pub fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

/// Parsed list request
///
/// Built from the raw query pairs of a list endpoint. Repeated keys become
/// lists, `_in` values are split on commas, `"true"`/`"false"` become
/// booleans and UUIDs become exact-match ids.
///
/// # Example
/// ```text
/// GET /patients?page=2&limit=10&sortBy=name&order=asc
/// GET /appointments?status_in=scheduled,confirmed&startDate=2024-03-01
/// GET /doctors?search=ali&isActive=true
/// ```
#[derive(Debug, Clone)]
pub struct ListQuery {
    pub page: PageRequest,
    pub sort: SortSpec,
    pub search: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub filters: RawFilters,
}

impl ListQuery {
    /// Parse raw `key=value` pairs, applying defaults for sorting
    pub fn from_pairs(pairs: Vec<(String, String)>, defaults: &PaginationDefaults) -> Self {
        let mut reserved: HashMap<&'static str, String> = HashMap::new();
        let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();

        for (key, value) in pairs {
            match RESERVED_KEYS.iter().find(|k| **k == key) {
                Some(name) => {
                    reserved.insert(*name, value);
                }
                None => grouped.entry(key).or_default().push(value),
            }
        }

        let page = PageRequest::parse(
            reserved.get("page").map(String::as_str),
            reserved.get("limit").map(String::as_str),
            reserved.get("allData").map(String::as_str),
        );

        let field = reserved
            .get("sortBy")
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.sort_by.as_str())
            .to_string();
        let direction = reserved
            .get("order")
            .and_then(|o| SortDirection::parse(o))
            .unwrap_or(defaults.order);

        let filters = grouped
            .into_iter()
            .map(|(key, values)| {
                let value = raw_value(&key, values);
                (key, value)
            })
            .collect();

        Self {
            page,
            sort: SortSpec::new(field, direction),
            search: reserved.get("search").cloned(),
            start_date: reserved.get("startDate").and_then(|d| timestamp::parse(d)),
            end_date: reserved.get("endDate").and_then(|d| timestamp::parse(d)),
            filters,
        }
    }

    /// Build the filter predicate for an entity
    pub fn filter_spec(&self, searchable_fields: &[&str], date_field: &str) -> FilterSpec {
        QueryFilterBuilder::build(&self.filters, self.search.as_deref(), searchable_fields)
            .with_date_range(date_field, self.start_date, self.end_date)
    }
}

fn raw_value(key: &str, mut values: Vec<String>) -> RawValue {
    if key.ends_with("_in") {
        let items: Vec<String> = values
            .iter()
            .flat_map(|v| v.split(','))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        return match items.len() {
            0 => RawValue::Null,
            1 => RawValue::Text(items.into_iter().next().unwrap_or_default()),
            _ => RawValue::List(items),
        };
    }

    if values.len() > 1 {
        return RawValue::List(values);
    }

    let value = values.pop().unwrap_or_default();
    if let Some(flag) = match value.as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    } {
        return RawValue::Bool(flag);
    }
    if Uuid::parse_str(&value).is_ok() {
        return RawValue::Scalar(Value::String(value.to_ascii_lowercase()));
    }
    RawValue::Text(value)
}

/// Paginated response structure
#[derive(Debug, Clone, Serialize)]
pub struct PageResult<T> {
    /// The records in the window (or every record for `allData`)
    pub data: Vec<T>,

    /// Number of records matching the filter, ignoring the window
    pub total: u64,

    /// Pagination metadata; `None` for `allData` requests
    pub pagination: Option<PaginationMeta>,
}

/// Pagination metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMeta {
    /// Current page number (starts at 1)
    pub current_page: u64,

    /// Total number of pages
    pub total_pages: u64,

    /// Total number of items (after filters)
    pub total_items: u64,

    /// Number of items per page
    pub items_per_page: u64,

    /// Whether there is a next page
    pub has_next_page: bool,

    /// Whether there is a previous page
    pub has_previous_page: bool,
}

impl PaginationMeta {
    /// Create pagination metadata from calculation
    pub fn new(page: u64, limit: u64, total: u64) -> Self {
        let page = page.max(1);
        let limit = limit.max(1);

        Self {
            current_page: page,
            total_pages: total.div_ceil(limit),
            total_items: total,
            items_per_page: limit,
            has_next_page: page.saturating_mul(limit) < total,
            has_previous_page: page > 1,
        }
    }
}
