//! User account service: registration, authentication and role management

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};

use crate::{
    config::AppConfig,
    error::{AppError, AppResult},
    models::user::{LoginRequest, LoginResponse, RegisterUser, Role, User, UserClaims},
    repository::Repository,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    config: Arc<AppConfig>,
}

impl UsersService {
    pub fn new(repository: Repository, config: Arc<AppConfig>) -> Self {
        Self { repository, config }
    }

    /// Register a new account. Everyone self-registers as a plain user;
    /// librarians are made by an admin afterwards.
    pub async fn register(&self, request: &RegisterUser) -> AppResult<User> {
        if self.repository.users.username_exists(&request.username).await? {
            return Err(AppError::Conflict("Username is already taken".to_string()));
        }
        if self.repository.users.email_exists(&request.email).await? {
            return Err(AppError::Conflict("Email is already registered".to_string()));
        }

        let password_hash = hash_password(&request.password)?;

        let user = self
            .repository
            .users
            .create(
                &request.username,
                &request.email,
                &password_hash,
                Role::User,
                request.full_name.as_deref(),
                request.contact_number.as_deref(),
            )
            .await?;

        tracing::info!(username = %user.username, "user registered");
        Ok(user)
    }

    /// Authenticate by username and password and mint a bearer token
    pub async fn authenticate(&self, request: &LoginRequest) -> AppResult<LoginResponse> {
        let user = self
            .repository
            .users
            .get_by_username(&request.username)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid username or password".to_string()))?;

        verify_password(&request.password, &user.password_hash)?;

        let now = Utc::now();
        let claims = UserClaims {
            sub: user.username.clone(),
            user_id: user.id,
            role: user.role,
            iat: now.timestamp(),
            exp: (now + Duration::hours(self.config.auth.jwt_expiration_hours as i64)).timestamp(),
        };

        let token = claims
            .create_token(&self.config.auth.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Token creation failed: {}", e)))?;

        Ok(LoginResponse {
            token,
            token_type: "Bearer".to_string(),
            user,
        })
    }

    pub async fn get(&self, id: i32) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    /// Paged user listing for the admin console
    pub async fn list(&self, page: Option<i64>, per_page: Option<i64>) -> AppResult<(Vec<User>, i64)> {
        let page = page.unwrap_or(1).max(1);
        let per_page = per_page.unwrap_or(20).clamp(1, 100);
        self.repository.users.list(page, per_page).await
    }

    /// Toggle a user between the user and librarian roles. Admin accounts
    /// are not toggled; the request is rejected instead of ignored.
    pub async fn promote(&self, id: i32) -> AppResult<User> {
        let user = self.repository.users.get_by_id(id).await?;

        let new_role = user.role.toggled().ok_or_else(|| {
            AppError::BusinessRule("Administrator accounts cannot be demoted".to_string())
        })?;

        let updated = self.repository.users.update_role(id, new_role).await?;
        tracing::info!(username = %updated.username, role = %updated.role, "role changed");
        Ok(updated)
    }

    /// Create the initial admin account if none exists yet
    pub async fn ensure_admin(&self, username: &str, email: &str, password: &str) -> AppResult<()> {
        if self.repository.users.admin_exists().await? {
            return Ok(());
        }

        let password_hash = hash_password(password)?;
        self.repository
            .users
            .create(username, email, &password_hash, Role::Admin, Some("Administrator"), None)
            .await?;

        tracing::warn!(username, "bootstrapped default admin account, change its password");
        Ok(())
    }
}

fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

fn verify_password(password: &str, hash: &str) -> AppResult<()> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| AppError::Internal(format!("Stored password hash is invalid: {}", e)))?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AppError::Authentication("Invalid username or password".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_round_trip() {
        let hash = hash_password("hunter22").unwrap();
        assert!(verify_password("hunter22", &hash).is_ok());
        assert!(verify_password("hunter23", &hash).is_err());
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_password("same-password").unwrap();
        let b = hash_password("same-password").unwrap();
        assert_ne!(a, b);
    }
}
