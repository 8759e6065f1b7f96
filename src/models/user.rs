//! User model and related types

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::error::AppError;

/// User role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Sees every visit
    Admin,
    /// Salesperson, sees only their own visits
    #[serde(alias = "vendedor")]
    Vendor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Vendor => "vendor",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Stored user record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    pub username: String,
    /// Argon2 PHC string. Older stored lists may still hold plaintext,
    /// see `AuthService::ensure_seeded`.
    pub password: String,
    pub role: Role,
    /// Display name, also the value stored in `Visit::vendor`
    pub name: String,
}

/// Public view of a user (no password)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserProfile {
    pub id: i32,
    pub username: String,
    pub role: Role,
    pub name: String,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            role: user.role,
            name: user.name.clone(),
        }
    }
}

impl From<&UserClaims> for UserProfile {
    fn from(claims: &UserClaims) -> Self {
        Self {
            id: claims.user_id,
            username: claims.sub.clone(),
            role: claims.role,
            name: claims.name.clone(),
        }
    }
}

/// Login request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// JWT Claims for authenticated users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub user_id: i32,
    pub role: Role,
    /// Display name, used for visit ownership
    pub name: String,
    pub exp: i64,
    pub iat: i64,
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
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    /// Check if user is admin
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Require admin privileges
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Authorization("Administrator privileges required".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(role: Role) -> UserClaims {
        let now = chrono::Utc::now().timestamp();
        UserClaims {
            sub: "vendedor".to_string(),
            user_id: 2,
            role,
            name: "Juan Pérez".to_string(),
            exp: now + 3600,
            iat: now,
        }
    }

    #[test]
    fn test_legacy_role_name() {
        let role: Role = serde_json::from_str("\"vendedor\"").unwrap();
        assert_eq!(role, Role::Vendor);
        assert_eq!(serde_json::to_string(&role).unwrap(), "\"vendor\"");
    }

    #[test]
    fn test_token_roundtrip_keeps_identity() {
        let token = claims(Role::Vendor).create_token("secret").unwrap();
        let parsed = UserClaims::from_token(&token, "secret").unwrap();
        assert_eq!(parsed.name, "Juan Pérez");
        assert_eq!(parsed.role, Role::Vendor);

        assert!(UserClaims::from_token(&token, "other-secret").is_err());
    }

    #[test]
    fn test_require_admin() {
        assert!(claims(Role::Admin).require_admin().is_ok());
        assert!(matches!(
            claims(Role::Vendor).require_admin(),
            Err(AppError::Authorization(_))
        ));
    }

    #[test]
    fn test_profile_hides_password() {
        let user = User {
            id: 1,
            username: "admin".to_string(),
            password: "$argon2id$v=19$...".to_string(),
            role: Role::Admin,
            name: "Administrador".to_string(),
        };
        let json = serde_json::to_value(UserProfile::from(&user)).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["role"], "admin");
    }
}
