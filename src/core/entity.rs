//! Entity trait describing a clinic record type

use crate::core::auth::{Operation, RequiredPermissions};
use crate::core::store::Relation;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;
use validator::Validate;

/// Base trait for every record type exposed over HTTP.
///
/// All records have:
/// - id: Unique identifier
/// - createdAt / updatedAt: timestamps maintained by the handlers
///
/// Everything else is static metadata consumed by the list and CRUD handlers:
/// which fields free-text search covers, which reference fields are expanded,
/// which date field `startDate` / `endDate` restrict and which permissions
/// guard each operation.
pub trait Entity:
    Serialize + DeserializeOwned + Validate + Clone + Send + Sync + 'static
{
    /// The plural resource name, also the collection name (e.g., "medical_records")
    fn resource_name() -> &'static str;

    /// The singular resource name (e.g., "medical_record")
    fn resource_name_singular() -> &'static str;

    /// Name used in messages (e.g., "Medical record")
    fn display_name() -> &'static str;

    /// Fields matched by the `search` query parameter
    fn searchable_fields() -> &'static [&'static str];

    /// Reference fields expanded on reads
    fn relations() -> &'static [Relation] {
        &[]
    }

    /// Field restricted by `startDate` / `endDate`
    fn date_field() -> &'static str {
        "createdAt"
    }

    /// Permission tokens guarding an operation
    fn required_permissions(operation: Operation) -> RequiredPermissions;

    /// URL path of the collection (underscores become hyphens)
    fn route_path() -> String {
        format!("/{}", Self::resource_name().replace('_', "-"))
    }

    fn id(&self) -> Uuid;

    fn created_at(&self) -> DateTime<Utc>;

    fn updated_at(&self) -> DateTime<Utc>;
}
