//! User model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::enums::Role;
use crate::{
    authz::{self, Operation},
    error::AppError,
};

/// Full user model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    /// Hashed password (argon2)
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Display name
    pub name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Provisioning input; the password is already hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub name: String,
    pub role: Role,
}

/// Public user information returned to clients
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: Uuid,
    pub username: String,
    pub name: String,
    pub role: Role,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            name: user.name.clone(),
            role: user.role,
        }
    }
}

/// JWT Claims for authenticated users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub user_id: Uuid,
    pub name: String,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    pub fn for_user(user: &User, issued_at: i64, ttl_hours: u64) -> Self {
        Self {
            sub: user.username.clone(),
            user_id: user.id,
            name: user.name.clone(),
            role: user.role,
            exp: issued_at + (ttl_hours as i64 * 3600),
            iat: issued_at,
        }
    }

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

    /// Pass the authorization gate for `operation`
    pub fn authorize(&self, operation: Operation) -> Result<(), AppError> {
        authz::authorize(self.role, operation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> User {
        User {
            id: Uuid::new_v4(),
            username: "operator".to_string(),
            password_hash: String::new(),
            name: "Operator TIK".to_string(),
            role,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn token_round_trip_keeps_identity() {
        let user = user(Role::Operator);
        let claims = UserClaims::for_user(&user, Utc::now().timestamp(), 1);
        let token = claims.create_token("secret").unwrap();

        let decoded = UserClaims::from_token(&token, "secret").unwrap();
        assert_eq!(decoded.user_id, user.id);
        assert_eq!(decoded.role, Role::Operator);
        assert_eq!(decoded.sub, "operator");
    }

    #[test]
    fn token_with_wrong_secret_is_rejected() {
        let claims = UserClaims::for_user(&user(Role::Admin), Utc::now().timestamp(), 1);
        let token = claims.create_token("secret").unwrap();
        assert!(UserClaims::from_token(&token, "other").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let issued = Utc::now().timestamp() - 10 * 3600;
        let claims = UserClaims::for_user(&user(Role::Admin), issued, 1);
        let token = claims.create_token("secret").unwrap();
        assert!(UserClaims::from_token(&token, "secret").is_err());
    }

    #[test]
    fn password_hash_is_never_serialized() {
        let mut user = user(Role::Viewer);
        user.password_hash = "$argon2id$secret".to_string();
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2"));
        assert!(!json.contains("passwordHash"));
    }
}
