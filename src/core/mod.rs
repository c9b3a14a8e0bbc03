//! Core module containing fundamental traits and types for the back office

pub mod auth;
pub mod entity;
pub mod error;
pub mod filter;
pub mod module;
pub mod paginate;
pub mod query;
pub mod response;
pub mod store;
pub mod timestamp;
pub mod token;

pub use auth::{
    AuthContext, AuthProvider, NoAuthProvider, Operation, PermissionGate, PermissionSet,
    RequiredPermissions,
};
pub use entity::Entity;
pub use error::{ApiError, AuthError, EntityError, ValidationError};
pub use filter::{Comparison, Condition, FilterSpec, QueryFilterBuilder, RawFilters, RawValue};
pub use module::Module;
pub use paginate::Paginator;
pub use query::{
    ListQuery, PageRequest, PageResult, PaginationDefaults, PaginationMeta, SortDirection,
    SortSpec,
};
pub use response::ApiResponse;
pub use store::{Collection, DocumentStore, FindOptions, Relation};
pub use token::{Claims, JwtAuthProvider};
