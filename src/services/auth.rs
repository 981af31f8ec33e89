//! Authentication and user provisioning service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    config::{AuthConfig, BootstrapConfig},
    error::{AppError, AppResult},
    models::{
        audit::NewAuditEntry,
        enums::Role,
        user::{NewUser, User, UserClaims, UserInfo},
    },
    repository::{AuditRepository, Repository, UsersRepository},
};

const INVALID_CREDENTIALS: &str = "Invalid username or password";

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Authenticate by username and return a JWT token.
    ///
    /// A successful login is written to the audit ledger.
    pub async fn login(&self, username: &str, password: &str) -> AppResult<(String, User)> {
        let user = self
            .repository
            .users_get_by_username(username)
            .await?
            .ok_or_else(|| AppError::Authentication(INVALID_CREDENTIALS.to_string()))?;

        if !verify_password(&user, password)? {
            tracing::info!(username, "Rejected login attempt");
            return Err(AppError::Authentication(INVALID_CREDENTIALS.to_string()));
        }

        let token = self.create_token_for_user(&user)?;
        self.repository.audit_record(NewAuditEntry::login(&user)).await?;

        tracing::info!(user_id = %user.id, role = %user.role, "User logged in");
        Ok((token, user))
    }

    pub fn create_token_for_user(&self, user: &User) -> AppResult<String> {
        UserClaims::for_user(user, Utc::now().timestamp(), self.config.jwt_expiration_hours)
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    /// Current user profile
    pub async fn me(&self, user_id: Uuid) -> AppResult<UserInfo> {
        let user = self.repository.users_get_by_id(user_id).await?;
        Ok(UserInfo::from(&user))
    }

    /// Create a user with a freshly hashed password
    pub async fn provision_user(&self, username: &str, password: &str, name: &str, role: Role) -> AppResult<User> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(AppError::Validation("Username and password are required".to_string()));
        }

        let user = self
            .repository
            .users_create(&NewUser {
                username: username.trim().to_string(),
                password_hash: hash_password(password)?,
                name: name.to_string(),
                role,
            })
            .await?;

        tracing::info!(user_id = %user.id, username = %user.username, role = %user.role, "User provisioned");
        Ok(user)
    }

    /// Create the configured administrator when no user exists yet
    pub async fn ensure_bootstrap_admin(&self, bootstrap: &BootstrapConfig) -> AppResult<Option<User>> {
        if self.repository.users_count().await? > 0 {
            return Ok(None);
        }

        let Some(password) = bootstrap.admin_password.as_deref() else {
            tracing::warn!("No users exist and no bootstrap admin password is configured");
            return Ok(None);
        };

        let admin = self
            .provision_user(&bootstrap.admin_username, password, &bootstrap.admin_name, Role::Admin)
            .await?;
        Ok(Some(admin))
    }
}

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

fn verify_password(user: &User, password: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
