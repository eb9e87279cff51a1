// ABOUTME: Session-based user authentication with bcrypt passwords and signed session tokens
// ABOUTME: Issues HS256 tokens bound to a sessions row so logout revokes them immediately
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Air Lab

//! # Authentication and Session Management
//!
//! Login creates a row in `sessions` and returns a token whose `sid` claim
//! references it. A token is accepted only while its signature and expiry
//! verify, the session row exists and is unexpired, and the user is active.

use crate::database_plugins::shared::validation::validate_not_expired;
use crate::database_plugins::{factory::Database, DatabaseProvider};
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::models::{Session, User};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Session token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: String,
    /// Session ID
    pub sid: String,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
}

/// Authenticated request context
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// The authenticated user
    pub user: User,
    /// The session the token belongs to
    pub session_id: Uuid,
}

impl AuthContext {
    /// Shortcut for the user ID
    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        self.user.id
    }
}

/// Authentication manager for session tokens and password hashing
#[derive(Clone)]
pub struct AuthManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    session_ttl_hours: i64,
    bcrypt_cost: u32,
}

impl AuthManager {
    /// Create a new authentication manager from an HMAC secret
    #[must_use]
    pub fn new(secret: &[u8], session_ttl_hours: i64) -> Self {
        // Minimum bcrypt cost outside release builds
        let bcrypt_cost = if cfg!(debug_assertions) {
            4
        } else {
            bcrypt::DEFAULT_COST
        };
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            session_ttl_hours,
            bcrypt_cost,
        }
    }

    /// Session lifetime in hours
    #[must_use]
    pub const fn session_ttl_hours(&self) -> i64 {
        self.session_ttl_hours
    }

    /// Hash a password off the async runtime
    ///
    /// # Errors
    ///
    /// Returns an error if hashing fails or the blocking task panics
    pub async fn hash_password(&self, password: &str) -> AppResult<String> {
        let password = password.to_owned();
        let cost = self.bcrypt_cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| AppError::internal(format!("Password hashing task failed: {e}")))?
            .map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))
    }

    /// Verify a password against a stored hash; malformed hashes never match
    pub async fn verify_password(&self, password: &str, hash: &str) -> bool {
        let password = password.to_owned();
        let hash = hash.to_owned();
        tokio::task::spawn_blocking(move || bcrypt::verify(&password, &hash).unwrap_or(false))
            .await
            .unwrap_or(false)
    }

    /// Sign a token for an existing session
    ///
    /// # Errors
    ///
    /// Returns an error if JWT encoding fails
    pub fn sign_session_token(&self, session: &Session) -> AppResult<String> {
        let claims = Claims {
            sub: session.user_id.to_string(),
            sid: session.id.to_string(),
            iat: session.created_at.timestamp(),
            exp: session.expires_at.timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to sign session token: {e}")))
    }

    /// Decode and verify a token's signature and expiry
    ///
    /// # Errors
    ///
    /// Returns `AUTH_EXPIRED` for expired tokens and `AUTH_INVALID` otherwise
    pub fn decode_token(&self, token: &str) -> AppResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                use jsonwebtoken::errors::ErrorKind;
                match e.kind() {
                    ErrorKind::ExpiredSignature => AppError::auth_expired(),
                    _ => {
                        tracing::debug!("Session token rejected: {e}");
                        AppError::auth_invalid("Invalid session token")
                    }
                }
            })
    }

    /// Create a session for `user` and return its signed token
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be stored or signed
    pub async fn login(
        &self,
        database: &Database,
        user: &User,
        user_agent: Option<String>,
    ) -> AppResult<(String, Session)> {
        let session = Session::new(user.id, self.session_ttl_hours, user_agent);
        database.create_session(&session).await?;
        let token = self.sign_session_token(&session)?;
        Ok((token, session))
    }

    /// Resolve a token to an authenticated user
    ///
    /// # Errors
    ///
    /// Returns `AUTH_INVALID`/`AUTH_EXPIRED` for bad tokens or revoked sessions
    /// and `PERMISSION_DENIED` for deactivated accounts
    pub async fn authenticate(&self, database: &Database, token: &str) -> AppResult<AuthContext> {
        let claims = self.decode_token(token)?;
        let session_id = Uuid::parse_str(&claims.sid)
            .map_err(|_| AppError::auth_invalid("Invalid session token"))?;
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::auth_invalid("Invalid session token"))?;

        let session = database
            .get_session(session_id)
            .await?
            .ok_or_else(|| AppError::auth_invalid("Session has been revoked"))?;
        if session.user_id != user_id {
            return Err(AppError::auth_invalid("Invalid session token"));
        }
        validate_not_expired(session.expires_at, Utc::now(), "Session")
            .map_err(|_| AppError::auth_expired())?;

        let user = database
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::auth_invalid("User no longer exists"))?;
        if !user.is_active {
            return Err(AppError::new(
                ErrorCode::PermissionDenied,
                "Account is deactivated",
            ));
        }

        Ok(AuthContext { user, session_id })
    }

    /// Revoke a session
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails
    pub async fn logout(&self, database: &Database, session_id: Uuid) -> AppResult<()> {
        database.delete_session(session_id).await?;
        Ok(())
    }
}

/// Generate a random session signing secret
#[must_use]
pub fn generate_session_secret() -> [u8; 64] {
    let mut secret = [0u8; 64];
    rand::thread_rng().fill_bytes(&mut secret);
    secret
}
