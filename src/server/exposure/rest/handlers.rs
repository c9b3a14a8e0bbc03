//! Generic CRUD handlers shared by every record type
//!
//! Each handler runs the [`PermissionGate`] before touching the request body
//! or the store.

use crate::core::auth::{AuthContext, AuthProvider, Operation, PermissionGate};
use crate::core::entity::Entity;
use crate::core::error::{ApiError, EntityError, ValidationError};
use crate::core::paginate::Paginator;
use crate::core::query::{ListQuery, PaginationDefaults};
use crate::core::response::ApiResponse;
use crate::core::store::Collection;
use crate::core::timestamp;
use axum::Json;
use axum::body::Bytes;
use axum::extract::{FromRequestParts, Path, Query, State};
use axum::http::StatusCode;
use axum::http::request::Parts;
use serde_json::{Map, Value, json};
use std::marker::PhantomData;
use std::sync::Arc;
use uuid::Uuid;

/// Fields owned by the server; never taken from a request body
const MANAGED_FIELDS: &[&str] = &["id", "createdAt", "updatedAt"];

/// State for the routes of one record type
pub struct CrudState<T> {
    pub collection: Arc<dyn Collection>,
    pub auth: Arc<dyn AuthProvider>,
    pub pagination: Arc<PaginationDefaults>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> CrudState<T> {
    pub fn new(
        collection: Arc<dyn Collection>,
        auth: Arc<dyn AuthProvider>,
        pagination: Arc<PaginationDefaults>,
    ) -> Self {
        Self {
            collection,
            auth,
            pagination,
            _marker: PhantomData,
        }
    }
}

impl<T> Clone for CrudState<T> {
    fn clone(&self) -> Self {
        Self::new(
            self.collection.clone(),
            self.auth.clone(),
            self.pagination.clone(),
        )
    }
}

/// Router state that can authenticate callers
pub trait HasAuthProvider {
    fn auth_provider(&self) -> &Arc<dyn AuthProvider>;
}

impl<T> HasAuthProvider for CrudState<T> {
    fn auth_provider(&self) -> &Arc<dyn AuthProvider> {
        &self.auth
    }
}

impl HasAuthProvider for Arc<dyn AuthProvider> {
    fn auth_provider(&self) -> &Arc<dyn AuthProvider> {
        self
    }
}

/// The authenticated (or anonymous) caller of a request
///
/// Missing credentials extract as [`AuthContext::Anonymous`]; a malformed or
/// invalid token rejects the request with 401.
pub struct Caller(pub AuthContext);

impl<S> FromRequestParts<S> for Caller
where
    S: HasAuthProvider + Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        state
            .auth_provider()
            .extract_context(&parts.headers)
            .await
            .map(Caller)
            .map_err(|e| {
                tracing::warn!(path = %parts.uri.path(), error = %e, "rejected credentials");
                e.into()
            })
    }
}

fn authorize<T: Entity>(operation: Operation, caller: &AuthContext) -> Result<(), ApiError> {
    PermissionGate::authorize(&T::required_permissions(operation), caller).map_err(|e| {
        tracing::warn!(
            entity = T::resource_name_singular(),
            %operation,
            user = caller.user_id().unwrap_or("anonymous"),
            "permission denied"
        );
        ApiError::from(e)
    })
}

fn parse_id(raw: &str) -> Result<Uuid, ValidationError> {
    Uuid::parse_str(raw).map_err(|_| ValidationError::InvalidId {
        value: raw.to_string(),
    })
}

fn not_found<T: Entity>(id: &Uuid) -> ApiError {
    EntityError::NotFound {
        entity_type: T::resource_name_singular().to_string(),
        id: id.to_string(),
    }
    .into()
}

/// Parse a JSON object body, dropping server-managed fields
fn payload_fields(body: &Bytes) -> Result<Map<String, Value>, ValidationError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| ValidationError::InvalidPayload {
            message: e.to_string(),
        })?;

    let Value::Object(mut fields) = value else {
        return Err(ValidationError::InvalidPayload {
            message: "expected a JSON object".to_string(),
        });
    };
    for field in MANAGED_FIELDS {
        fields.remove(*field);
    }
    Ok(fields)
}

/// Type-check and validate a document, returning its canonical form
fn validated<T: Entity>(fields: Map<String, Value>) -> Result<(T, Value), ApiError> {
    let record: T = serde_json::from_value(Value::Object(fields)).map_err(|e| {
        ValidationError::InvalidPayload {
            message: e.to_string(),
        }
    })?;
    record.validate()?;

    let document = serde_json::to_value(&record)
        .map_err(|e| ApiError::Internal(format!("failed to serialize record: {}", e)))?;
    Ok((record, document))
}

/// `GET /{plural}`
pub async fn list<T: Entity>(
    State(state): State<CrudState<T>>,
    Caller(caller): Caller,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<ApiResponse<Vec<Value>>>, ApiError> {
    authorize::<T>(Operation::List, &caller)?;

    let query = ListQuery::from_pairs(pairs, &state.pagination);
    let filter = query.filter_spec(T::searchable_fields(), T::date_field());
    let result = Paginator::paginate::<Value>(
        state.collection.as_ref(),
        &filter,
        &query.sort,
        query.page,
        T::relations(),
    )
    .await?;

    Ok(Json(ApiResponse::page(
        format!("{} list retrieved", T::display_name()),
        result,
    )))
}

/// `GET /{plural}/{id}`
pub async fn get_one<T: Entity>(
    State(state): State<CrudState<T>>,
    Caller(caller): Caller,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Value>>, ApiError> {
    authorize::<T>(Operation::Get, &caller)?;
    let id = parse_id(&id)?;

    let record = state
        .collection
        .find_by_id(&id, T::relations())
        .await?
        .ok_or_else(|| not_found::<T>(&id))?;

    Ok(Json(ApiResponse::ok(
        format!("{} retrieved", T::display_name()),
        record,
    )))
}

/// `POST /{plural}`
pub async fn create<T: Entity>(
    State(state): State<CrudState<T>>,
    Caller(caller): Caller,
    body: Bytes,
) -> Result<(StatusCode, Json<ApiResponse<Value>>), ApiError> {
    authorize::<T>(Operation::Create, &caller)?;

    let mut fields = payload_fields(&body)?;
    let now = Value::String(timestamp::format(&chrono::Utc::now()));
    fields.insert("id".to_string(), json!(Uuid::new_v4()));
    fields.insert("createdAt".to_string(), now.clone());
    fields.insert("updatedAt".to_string(), now);

    let (record, document) = validated::<T>(fields)?;
    let stored = state.collection.insert(document).await?;

    tracing::info!(
        entity = T::resource_name_singular(),
        id = %record.id(),
        user = caller.user_id().unwrap_or("anonymous"),
        "record created"
    );

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            format!("{} created", T::display_name()),
            stored,
        )),
    ))
}

/// `PATCH /{plural}/{id}` and `PUT /{plural}/{id}`
///
/// Fields present in the body replace the stored ones; everything else is kept.
pub async fn update<T: Entity>(
    State(state): State<CrudState<T>>,
    Caller(caller): Caller,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<ApiResponse<Value>>, ApiError> {
    authorize::<T>(Operation::Update, &caller)?;
    let id = parse_id(&id)?;
    let changes = payload_fields(&body)?;

    let existing = state
        .collection
        .find_by_id(&id, &[])
        .await?
        .ok_or_else(|| not_found::<T>(&id))?;
    let Value::Object(mut fields) = existing else {
        return Err(ApiError::Internal(format!(
            "stored {} '{}' is not an object",
            T::resource_name_singular(),
            id
        )));
    };

    fields.extend(changes);
    fields.insert(
        "updatedAt".to_string(),
        Value::String(timestamp::format(&chrono::Utc::now())),
    );

    let (_, document) = validated::<T>(fields)?;
    let stored = state
        .collection
        .replace(&id, document)
        .await?
        .ok_or_else(|| not_found::<T>(&id))?;

    tracing::info!(
        entity = T::resource_name_singular(),
        %id,
        user = caller.user_id().unwrap_or("anonymous"),
        "record updated"
    );

    Ok(Json(ApiResponse::ok(
        format!("{} updated", T::display_name()),
        stored,
    )))
}

/// `DELETE /{plural}/{id}`
pub async fn delete<T: Entity>(
    State(state): State<CrudState<T>>,
    Caller(caller): Caller,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Value>>, ApiError> {
    authorize::<T>(Operation::Delete, &caller)?;
    let id = parse_id(&id)?;

    if !state.collection.delete(&id).await? {
        return Err(not_found::<T>(&id));
    }

    tracing::info!(
        entity = T::resource_name_singular(),
        %id,
        user = caller.user_id().unwrap_or("anonymous"),
        "record deleted"
    );

    Ok(Json(ApiResponse::ok(
        format!("{} deleted", T::display_name()),
        json!({ "id": id }),
    )))
}

/// `GET /auth/me`
pub async fn me(Caller(caller): Caller) -> Result<Json<ApiResponse<Value>>, ApiError> {
    match caller {
        AuthContext::User {
            user_id,
            email,
            role,
            permissions,
        } => Ok(Json(ApiResponse::ok(
            "Current user",
            json!({
                "id": user_id,
                "email": email,
                "role": role,
                "permissions": permissions,
            }),
        ))),
        AuthContext::Anonymous => Err(crate::core::error::AuthError::Unauthenticated.into()),
    }
}
