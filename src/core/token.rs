//! Bearer JWT authentication

use crate::core::auth::{AuthContext, AuthProvider, PermissionSet};
use crate::core::error::AuthError;
use async_trait::async_trait;
use axum::http::{HeaderMap, header::AUTHORIZATION};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

const TOKEN_EXPIRY_HOURS: i64 = 24;

/// JWT claims carried by staff tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Permission tokens granted to the user
    #[serde(default)]
    pub permissions: Vec<String>,
    /// Expiration (Unix timestamp seconds)
    pub exp: usize,
    /// Issued at (Unix timestamp seconds)
    pub iat: usize,
}

impl Claims {
    /// Claims valid for the default lifetime starting now
    pub fn new(
        user_id: impl Into<String>,
        email: impl Into<String>,
        role: Option<String>,
        permissions: Vec<String>,
    ) -> Self {
        let now = chrono::Utc::now();
        Self {
            sub: user_id.into(),
            email: email.into(),
            role,
            permissions,
            exp: (now + chrono::Duration::hours(TOKEN_EXPIRY_HOURS)).timestamp() as usize,
            iat: now.timestamp() as usize,
        }
    }
}

/// HS256 token verifier and issuer
pub struct JwtAuthProvider {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl JwtAuthProvider {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Sign a token for the given claims
    pub fn issue(&self, claims: &Claims) -> Result<String, AuthError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| AuthError::TokenEncoding(e.to_string()))
    }

    /// Verify a raw token and return its claims
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("JWT validation failed: {e}");
                AuthError::InvalidToken(e.to_string())
            })
    }
}

#[async_trait]
impl AuthProvider for JwtAuthProvider {
    async fn extract_context(&self, headers: &HeaderMap) -> Result<AuthContext, AuthError> {
        let Some(value) = headers.get(AUTHORIZATION) else {
            return Ok(AuthContext::Anonymous);
        };

        let token = value
            .to_str()
            .ok()
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MalformedHeader)?;

        let claims = self.verify(token)?;
        Ok(AuthContext::User {
            user_id: claims.sub,
            email: claims.email,
            role: claims.role,
            permissions: PermissionSet::new(claims.permissions),
        })
    }
}
