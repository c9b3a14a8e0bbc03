//! # Clinic back office
//!
//! REST API over the records of a group of clinics: companies, clinics,
//! staff, patients, appointments and medical records.
//!
//! ## Features
//!
//! - **Generic CRUD**: one set of routes per record type, generated from its declaration
//! - **Query-string filters**: `_gt`/`_lt`/`_ne`/`_in` suffixes, case-insensitive
//!   substring search and `startDate`/`endDate` ranges
//! - **Pagination**: page windows with a uniform `pagination` block, or `allData`
//! - **Relations**: referenced records are embedded on read
//! - **Permissions**: per-operation tokens checked against bearer JWT claims
//! - **Storage**: in-memory store, or MongoDB behind the `mongodb_backend` feature
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use clinic::prelude::*;
//!
//! ServerBuilder::new()
//!     .with_store(InMemoryStore::new())
//!     .with_auth_provider(JwtAuthProvider::new("secret"))
//!     .register_module(ClinicModule)
//!     .serve("127.0.0.1:3000")
//!     .await?;
//! ```

pub mod config;
pub mod core;
pub mod entities;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        ApiError, ApiResponse, AuthContext, AuthProvider, Claims, Collection, DocumentStore,
        Entity, FilterSpec, JwtAuthProvider, ListQuery, Module, NoAuthProvider, Operation,
        PageRequest, PageResult, PaginationDefaults, PaginationMeta, Paginator, PermissionGate,
        PermissionSet, QueryFilterBuilder, Relation, RequiredPermissions, SortDirection,
        SortSpec,
    };

    // === Entities ===
    pub use crate::entities::ClinicModule;

    // === Storage ===
    pub use crate::storage::InMemoryStore;
    #[cfg(feature = "mongodb_backend")]
    pub use crate::storage::MongoStore;

    // === Server ===
    pub use crate::server::{EntityDescriptor, EntityRegistry, RecordDescriptor, ServerBuilder};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
    pub use serde::{Deserialize, Serialize};
    pub use uuid::Uuid;
}
