//! Authenticated actor, as supplied by the identity collaborator

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppError;

/// Staff roles known to the booking API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    Receptionist,
    Stylist,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Receptionist => "receptionist",
            Role::Stylist => "stylist",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// JWT Claims for authenticated users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub user_id: Uuid,
    pub tenant_id: Uuid,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

/// Tenant and actor threaded explicitly through every core operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestContext {
    pub tenant_id: Uuid,
    pub actor_id: Uuid,
}

impl RequestContext {
    pub fn new(tenant_id: Uuid, actor_id: Uuid) -> Self {
        Self { tenant_id, actor_id }
    }
}

impl UserClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<UserClaims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    pub fn context(&self) -> RequestContext {
        RequestContext::new(self.tenant_id, self.user_id)
    }

    /// Any staff member may book, move, close and read appointments
    pub fn require_booking(&self) -> Result<(), AppError> {
        match self.role {
            Role::Admin | Role::Manager | Role::Receptionist | Role::Stylist => Ok(()),
        }
    }

    /// Schedule windows are maintained by managers only
    pub fn require_schedule_admin(&self) -> Result<(), AppError> {
        match self.role {
            Role::Admin | Role::Manager => Ok(()),
            _ => Err(AppError::Authorization(
                "Administrator or manager privileges required".to_string(),
            )),
        }
    }
}
