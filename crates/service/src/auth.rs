//! JWT authentication service.
//!
//! Issues and verifies HS256 access/refresh token pairs and resolves the
//! account behind a token. JWTs are stateless; logout is purely client-side.

use chrono::{Duration, Utc};
use domain::{Role, UserAccount};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use store::{InstructorStore, StoreError, StudentStore};
use thiserror::Error;
use uuid::Uuid;

/// Issuer carried in every token.
pub const TOKEN_ISSUER: &str = "elearning-api";

/// Errors raised by authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email or wrong password; deliberately indistinguishable.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The token failed signature or expiry validation.
    #[error("Invalid or expired token")]
    InvalidToken,

    /// A non-refresh token was presented to the refresh endpoint.
    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    /// The token is valid but its subject no longer exists.
    #[error("User not found")]
    UserNotFound,

    /// Token signing failed.
    #[error("Token encoding error: {0}")]
    TokenEncoding(jsonwebtoken::errors::Error),

    /// Password hashing failed.
    #[error("Password hashing error: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    /// The persistence layer failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Hashes a plaintext password with bcrypt.
pub fn hash_password(plain: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(plain, bcrypt::DEFAULT_COST)
}

/// JWT claims structure.
///
/// Access tokens carry the identity fields; refresh tokens carry only the
/// subject and are marked by `token_type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Issuer.
    pub iss: String,

    /// Subject: the account's numeric identifier.
    pub sub: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Issued at (Unix timestamp).
    pub iat: i64,

    /// Expiration (Unix timestamp).
    pub exp: i64,

    /// Unique identifier for this token.
    pub jti: String,

    /// Token type: `"access"` or `"refresh"`.
    pub token_type: String,
}

/// Token lifetime configuration.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub access_token_ttl_secs: i64,
    pub refresh_token_ttl_secs: i64,
}

impl AuthConfig {
    /// Creates a config with one-hour access and seven-day refresh tokens.
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            access_token_ttl_secs: 3600,
            refresh_token_ttl_secs: 7 * 24 * 3600,
        }
    }
}

/// A freshly issued access/refresh token pair.
#[derive(Debug, Clone)]
pub struct IssuedTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub user: UserAccount,
}

/// An access token minted from a refresh token.
#[derive(Debug, Clone)]
pub struct RefreshedToken {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

/// Login, token refresh, and token verification.
#[derive(Clone)]
pub struct AuthService<S> {
    store: S,
    config: AuthConfig,
}

impl<S: StudentStore + InstructorStore> AuthService<S> {
    /// Creates a new auth service over the given store.
    pub fn new(store: S, config: AuthConfig) -> Self {
        Self { store, config }
    }

    /// Authenticates a user and issues an access/refresh token pair.
    #[tracing::instrument(skip(self, password))]
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<IssuedTokens, AuthError> {
        let user = match role {
            Role::Student => self
                .store
                .find_student_by_email(email)
                .await?
                .map(UserAccount::Student),
            Role::Instructor => self
                .store
                .find_instructor_by_email(email)
                .await?
                .map(UserAccount::Instructor),
        }
        .ok_or(AuthError::InvalidCredentials)?;

        if !bcrypt::verify(password, user.password_hash())? {
            return Err(AuthError::InvalidCredentials);
        }

        let access_token = self.issue_access_token(&user)?;
        let refresh_token = self.issue_refresh_token(&user)?;

        tracing::info!(%role, "login successful");
        Ok(IssuedTokens {
            access_token,
            refresh_token,
            token_type: "Bearer",
            expires_in: self.config.access_token_ttl_secs,
            user,
        })
    }

    /// Mints a new access token from a valid refresh token.
    #[tracing::instrument(skip(self, refresh_token))]
    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshedToken, AuthError> {
        let claims = self.verify_token(refresh_token)?;

        if claims.token_type != "refresh" {
            return Err(AuthError::InvalidRefreshToken);
        }

        let user = self
            .find_user_by_id(claims.sub)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        Ok(RefreshedToken {
            access_token: self.issue_access_token(&user)?,
            token_type: "Bearer",
            expires_in: self.config.access_token_ttl_secs,
        })
    }

    /// Validates a token's signature and expiry and returns its claims.
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[TOKEN_ISSUER]);

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|_| AuthError::InvalidToken)
    }

    /// Resolves the account behind a token.
    pub async fn current_user(&self, token: &str) -> Result<UserAccount, AuthError> {
        let claims = self.verify_token(token)?;
        self.find_user_by_id(claims.sub)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    fn issue_access_token(&self, user: &UserAccount) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.config.access_token_ttl_secs);

        let claims = Claims {
            iss: TOKEN_ISSUER.to_string(),
            sub: user.id().unwrap_or_default(),
            email: Some(user.email().to_string()),
            role: Some(user.role()),
            name: Some(user.name().to_string()),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
            token_type: "access".to_string(),
        };

        self.encode_claims(&claims)
    }

    fn issue_refresh_token(&self, user: &UserAccount) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.config.refresh_token_ttl_secs);

        let claims = Claims {
            iss: TOKEN_ISSUER.to_string(),
            sub: user.id().unwrap_or_default(),
            email: None,
            role: None,
            name: None,
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
            token_type: "refresh".to_string(),
        };

        self.encode_claims(&claims)
    }

    fn encode_claims(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(AuthError::TokenEncoding)
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<UserAccount>, AuthError> {
        if let Some(student) = self.store.find_student(id.into()).await? {
            return Ok(Some(UserAccount::Student(student)));
        }
        if let Some(instructor) = self.store.find_instructor(id.into()).await? {
            return Ok(Some(UserAccount::Instructor(instructor)));
        }
        Ok(None)
    }
}
