// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{Claims, Role, User},
};

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    jwt_secret: String,
    token_ttl: Duration,
}

impl AuthService {
    pub fn new(user_repo: UserRepository, jwt_secret: String, token_ttl: Duration) -> Self {
        Self { user_repo, jwt_secret, token_ttl }
    }

    /// Creates the account and returns a fresh token for it.
    pub async fn register_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<(String, User), AppError> {
        let email = normalize_email(email);

        // 1. Cheap pre-check; the unique constraint still has the last word
        if self.user_repo.find_by_email(&email).await?.is_some() {
            return Err(AppError::EmailAlreadyExists);
        }

        // 2. Hash off the async workers
        let hashed_password = hash_password(password).await?;

        // 3. Insert
        let user = self
            .user_repo
            .create_user(name.trim(), &email, &hashed_password, role)
            .await?;

        tracing::info!(user_id = %user.id, role = ?user.role, "user registered");

        let token = self.create_token(&user)?;
        Ok((token, user))
    }

    pub async fn login_user(&self, email: &str, password: &str) -> Result<(String, User), AppError> {
        let user = self
            .user_repo
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_clone = password.to_owned();
        let password_hash_clone = user.password_hash.clone();

        let is_password_valid = tokio::task::spawn_blocking(move || {
            verify(&password_clone, &password_hash_clone)
        })
        .await
        .map_err(|e| anyhow::anyhow!("password verification task failed: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }
        if !user.is_active {
            return Err(AppError::AccountDisabled);
        }

        let user = self
            .user_repo
            .record_login(user.id)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let token = self.create_token(&user)?;
        Ok((token, user))
    }

    /// Resolves a bearer token to the current user record.
    /// The user is reloaded so role changes and deactivation apply immediately.
    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let claims = self.decode_claims(token)?;

        let user = self
            .user_repo
            .find_by_id(claims.sub)
            .await?
            .ok_or(AppError::InvalidToken)?;

        if !user.is_active {
            return Err(AppError::AccountDisabled);
        }
        Ok(user)
    }

    pub async fn update_profile(&self, user_id: Uuid, name: &str) -> Result<User, AppError> {
        self.user_repo
            .update_name(user_id, name.trim())
            .await?
            .ok_or(AppError::UserNotFound)
    }

    /// Makes sure an admin account exists for `email`.
    /// An existing account with that email is promoted; its password is left untouched.
    pub async fn ensure_admin(&self, name: &str, email: &str, password: &str) -> Result<User, AppError> {
        let email = normalize_email(email);

        if let Some(existing) = self.user_repo.find_by_email(&email).await? {
            if existing.role.is_admin() && existing.is_active {
                return Ok(existing);
            }
            let promoted = self
                .user_repo
                .promote_to_admin(existing.id)
                .await?
                .ok_or(AppError::UserNotFound)?;
            tracing::info!(user_id = %promoted.id, "existing account promoted to admin");
            return Ok(promoted);
        }

        let hashed_password = hash_password(password).await?;
        let admin = self
            .user_repo
            .create_user(name, &email, &hashed_password, Role::Admin)
            .await?;
        tracing::info!(user_id = %admin.id, "bootstrap admin account created");
        Ok(admin)
    }

    fn create_token(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + self.token_ttl;

        let claims = Claims {
            sub: user.id,
            role: user.role,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }

    fn decode_claims(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::new(Algorithm::HS256),
        )
        .map(|data| data.claims)
        .map_err(|_| AppError::InvalidToken)
    }
}

async fn hash_password(password: &str) -> Result<String, AppError> {
    let password_clone = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("password hashing task failed: {}", e))??;
    Ok(hashed)
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
