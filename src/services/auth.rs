//! Authentication service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{Role, User, UserClaims},
    repository::Repository,
};

/// Accounts created when no user list is stored: (username, password, role, name)
const SEED_USERS: [(&str, &str, Role, &str); 2] = [
    ("admin", "admin123", Role::Admin, "Administrador"),
    ("vendedor", "vendedor123", Role::Vendor, "Juan Pérez"),
];

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

    /// Seed the default users when none are stored, and hash any plaintext
    /// password left by older versions of the dashboard.
    pub async fn ensure_seeded(&self) -> AppResult<()> {
        let Some(mut users) = self.repository.users.load().await? else {
            let users = SEED_USERS
                .iter()
                .zip(1..)
                .map(|(&(username, password, role, name), id)| {
                    Ok(User {
                        id,
                        username: username.to_string(),
                        password: hash_password(password)?,
                        role,
                        name: name.to_string(),
                    })
                })
                .collect::<AppResult<Vec<_>>>()?;
            self.repository.users.save(&users).await?;
            tracing::info!("Seeded {} default users", users.len());
            return Ok(());
        };

        let mut upgraded = 0;
        for user in users.iter_mut() {
            if PasswordHash::new(&user.password).is_err() {
                user.password = hash_password(&user.password)?;
                upgraded += 1;
            }
        }
        if upgraded > 0 {
            self.repository.users.save(&users).await?;
            tracing::warn!("Hashed {} plaintext passwords in stored users", upgraded);
        }
        Ok(())
    }

    /// Authenticate user by username and return a JWT token
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<(String, User)> {
        let user = self
            .repository
            .users
            .get_by_username(username)
            .await?
            .ok_or_else(|| AppError::Authentication(INVALID_CREDENTIALS.to_string()))?;

        if !verify_password(&user, password) {
            tracing::debug!("Rejected login for {}", username);
            return Err(AppError::Authentication(INVALID_CREDENTIALS.to_string()));
        }

        let token = self.create_token_for_user(&user)?;
        tracing::info!("User {} logged in as {}", user.username, user.role);
        Ok((token, user))
    }

    /// Token lifetime in seconds
    pub fn token_lifetime(&self) -> i64 {
        self.config.jwt_expiration_hours as i64 * 3600
    }

    /// Validate a bearer token
    pub fn verify_token(&self, token: &str) -> AppResult<UserClaims> {
        UserClaims::from_token(token, &self.config.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))
    }

    fn create_token_for_user(&self, user: &User) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let claims = UserClaims {
            sub: user.username.clone(),
            user_id: user.id,
            role: user.role,
            name: user.name.clone(),
            exp: now + self.token_lifetime(),
            iat: now,
        };

        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
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

fn verify_password(user: &User, password: &str) -> bool {
    match PasswordHash::new(&user.password) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => {
            tracing::warn!("User {} has no usable password hash", user.username);
            false
        }
    }
}
