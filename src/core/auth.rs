//! Permission-based authorization
//!
//! Every entity operation carries a static list of permission tokens. A caller
//! passes the [`PermissionGate`] when it holds any one of them, or `ADMIN`.

use crate::core::error::AuthError;
use async_trait::async_trait;
use axum::http::HeaderMap;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Permission token that satisfies every check
pub const ADMIN: &str = "ADMIN";

/// The CRUD operations exposed for each entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    List,
    Get,
    Create,
    Update,
    Delete,
}

impl Operation {
    /// Verb used in permission tokens (`READ`, `CREATE`, ...)
    pub fn verb(&self) -> &'static str {
        match self {
            Operation::List | Operation::Get => "READ",
            Operation::Create => "CREATE",
            Operation::Update => "UPDATE",
            Operation::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::List => "list",
            Operation::Get => "get",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// Tokens attached to an operation; holding any one of them is enough
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequiredPermissions(pub &'static [&'static str]);

impl RequiredPermissions {
    /// No permission needed
    pub const NONE: RequiredPermissions = RequiredPermissions(&[]);

    pub fn tokens(&self) -> &'static [&'static str] {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for RequiredPermissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(", "))
    }
}

/// Permissions granted to a caller
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PermissionSet(BTreeSet<String>);

impl PermissionSet {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(tokens.into_iter().map(Into::into).collect())
    }

    pub fn contains(&self, token: &str) -> bool {
        self.0.contains(token)
    }

    pub fn is_admin(&self) -> bool {
        self.contains(ADMIN)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// Caller identity extracted from a request
#[derive(Debug, Clone)]
pub enum AuthContext {
    /// Verified token holder
    User {
        user_id: String,
        email: String,
        role: Option<String>,
        permissions: PermissionSet,
    },

    /// No credentials presented
    Anonymous,
}

impl AuthContext {
    pub fn permissions(&self) -> Option<&PermissionSet> {
        match self {
            AuthContext::User { permissions, .. } => Some(permissions),
            AuthContext::Anonymous => None,
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        match self {
            AuthContext::User { user_id, .. } => Some(user_id),
            AuthContext::Anonymous => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        !matches!(self, AuthContext::Anonymous)
    }
}

/// Decides whether a caller may run an operation
pub struct PermissionGate;

impl PermissionGate {
    /// Evaluated in order: open operation, no caller, `ADMIN`, intersection
    pub fn allow(required: &RequiredPermissions, granted: Option<&PermissionSet>) -> bool {
        if required.is_empty() {
            return true;
        }
        let Some(granted) = granted else {
            return false;
        };
        if granted.is_admin() {
            return true;
        }
        required.tokens().iter().any(|token| granted.contains(token))
    }

    /// Like [`allow`](Self::allow), but says why a caller was turned away
    pub fn authorize(required: &RequiredPermissions, context: &AuthContext) -> Result<(), AuthError> {
        if Self::allow(required, context.permissions()) {
            return Ok(());
        }
        if context.is_authenticated() {
            Err(AuthError::Forbidden {
                required: required.to_string(),
            })
        } else {
            Err(AuthError::Unauthenticated)
        }
    }
}

/// Source of caller identities
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Extract the caller from request headers
    ///
    /// Absent credentials yield [`AuthContext::Anonymous`]; credentials that are
    /// present but unusable are an error.
    async fn extract_context(&self, headers: &HeaderMap) -> Result<AuthContext, AuthError>;
}

/// Provider that treats every request as anonymous
pub struct NoAuthProvider;

#[async_trait]
impl AuthProvider for NoAuthProvider {
    async fn extract_context(&self, _headers: &HeaderMap) -> Result<AuthContext, AuthError> {
        Ok(AuthContext::Anonymous)
    }
}
