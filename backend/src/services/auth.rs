//! Authentication service for user registration, login, and token management

use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{User, UserRole};

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    db: PgPool,
    jwt_secret: String,
    access_token_expiry: i64,
    refresh_token_expiry: i64,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInput {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    pub role: Option<UserRole>,

    pub warehouse_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginInput {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: String,
    pub email: String,
    pub role: UserRole,
    pub permissions: Vec<String>,
    pub exp: i64,
    pub iat: i64,
}

/// Tokens returned by register, login and refresh
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub email: String,
    pub role: UserRole,
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    password_hash: String,
    role: UserRole,
}

/// Sign an access token for a user
pub fn encode_access_token(
    secret: &str,
    expiry_secs: i64,
    user_id: Uuid,
    email: &str,
    role: UserRole,
    now: DateTime<Utc>,
) -> AppResult<String> {
    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        role,
        permissions: role.permissions(),
        exp: (now + Duration::seconds(expiry_secs)).timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
}

/// Verify an access token's signature and expiry
pub fn decode_access_token(token: &str, secret: &str) -> AppResult<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AppError::TokenExpired,
        _ => AppError::InvalidToken,
    })
}

/// Role a new account receives. Elevated roles need an admin registrar,
/// except for the very first account of an empty install.
pub fn granted_role(
    requested: Option<UserRole>,
    registrar: Option<UserRole>,
    first_account: bool,
) -> AppResult<UserRole> {
    match requested.unwrap_or_default() {
        UserRole::User => Ok(UserRole::User),
        role if first_account || registrar == Some(UserRole::Admin) => Ok(role),
        _ => Err(AppError::InsufficientPermissions),
    }
}

/// Refresh tokens are stored as SHA-256 digests
fn hash_token(token: &str) -> String {
    Sha256::digest(token.as_bytes())
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

impl AuthService {
    pub fn new(db: PgPool, config: &Config) -> Self {
        Self {
            db,
            jwt_secret: config.jwt.secret.clone(),
            access_token_expiry: config.jwt.access_token_expiry,
            refresh_token_expiry: config.jwt.refresh_token_expiry,
        }
    }

    /// Create an account and sign it in. `registrar` is the role of the
    /// signed-in caller, if any.
    pub async fn register(
        &self,
        input: RegisterInput,
        registrar: Option<UserRole>,
    ) -> AppResult<AuthResponse> {
        input.validate()?;

        let email = input.email.trim().to_lowercase();

        let existing = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE email = $1")
            .bind(&email)
            .fetch_one(&self.db)
            .await?;

        if existing > 0 {
            return Err(AppError::DuplicateEntry("email".to_string()));
        }

        let first_account = !sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users)")
            .fetch_one(&self.db)
            .await?;

        let role = granted_role(input.role, registrar, first_account).map_err(|err| {
            tracing::warn!(
                email = %email,
                requested = ?input.role,
                registrar = ?registrar,
                "Elevated role refused at registration"
            );
            err
        })?;

        let password_hash = hash(&input.password, DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        let user_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO users (email, password_hash, role, warehouse_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&email)
        .bind(&password_hash)
        .bind(role)
        .bind(input.warehouse_id)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(user_id = %user_id, role = %role, "User registered");

        self.issue_tokens(user_id, &email, role).await
    }

    /// Authenticate user with email and password
    pub async fn login(&self, input: LoginInput) -> AppResult<AuthResponse> {
        input.validate()?;

        let email = input.email.trim().to_lowercase();

        let user = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, password_hash, role FROM users WHERE email = $1",
        )
        .bind(&email)
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

        let valid = verify(&input.password, &user.password_hash)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;

        if !valid {
            tracing::warn!(email = %email, "Failed login attempt");
            return Err(AppError::InvalidCredentials);
        }

        self.issue_tokens(user.id, &user.email, user.role).await
    }

    /// Exchange a refresh token for a new token pair, revoking the old one
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<AuthResponse> {
        let token_hash = hash_token(refresh_token);

        let mut tx = self.db.begin().await?;

        let user = sqlx::query_as::<_, (Uuid, String, UserRole)>(
            r#"
            UPDATE refresh_tokens rt
            SET revoked_at = NOW()
            FROM users u
            WHERE rt.token_hash = $1
              AND u.id = rt.user_id
              AND rt.expires_at > NOW()
              AND rt.revoked_at IS NULL
            RETURNING u.id, u.email, u.role
            "#,
        )
        .bind(&token_hash)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::InvalidToken)?;

        tx.commit().await?;

        let (user_id, email, role) = user;
        self.issue_tokens(user_id, &email, role).await
    }

    pub async fn get_user(&self, user_id: Uuid) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "SELECT id, email, role, warehouse_id, created_at, updated_at FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))
    }

    async fn issue_tokens(&self, user_id: Uuid, email: &str, role: UserRole) -> AppResult<AuthResponse> {
        let now = Utc::now();
        let token = encode_access_token(
            &self.jwt_secret,
            self.access_token_expiry,
            user_id,
            email,
            role,
            now,
        )?;

        let refresh_token = Uuid::new_v4().to_string();
        self.store_refresh_token(user_id, &refresh_token).await?;

        Ok(AuthResponse {
            token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.access_token_expiry,
            email: email.to_string(),
            role,
        })
    }

    async fn store_refresh_token(&self, user_id: Uuid, token: &str) -> AppResult<()> {
        let expires_at = Utc::now() + Duration::seconds(self.refresh_token_expiry);

        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (user_id, token_hash, expires_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(user_id)
        .bind(hash_token(token))
        .bind(expires_at)
        .execute(&self.db)
        .await?;

        Ok(())
    }
}
