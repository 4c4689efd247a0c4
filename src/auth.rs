use std::future::{ready, Ready};

use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AuthSettings;
use crate::models::ErrorResponse;
use crate::routes::AppState;

/// Errors from token or password handling
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Password hashing error: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("Invalid token subject")]
    InvalidSubject,
}

/// JWT claims structure
///
/// The subject is the user id rendered as a string, matching what JWT
/// libraries expect for `sub`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
}

/// Token issuer/verifier and password hasher
pub struct AuthService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_expiry_hours: i64,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(settings: &AuthSettings) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(settings.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(settings.jwt_secret.as_bytes()),
            token_expiry_hours: settings.token_expiry_hours,
            bcrypt_cost: settings.bcrypt_cost,
        }
    }

    /// Hash a password with bcrypt
    pub fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        Ok(bcrypt::hash(password, self.bcrypt_cost)?)
    }

    /// Verify a password against its stored hash
    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        Ok(bcrypt::verify(password, hash)?)
    }

    /// Issue an access token for a user id
    pub fn issue_token(&self, user_id: i64) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            exp: (now + Duration::hours(self.token_expiry_hours)).timestamp(),
            iat: now.timestamp(),
        };

        Ok(encode(&Header::default(), &claims, &self.encoding_key)?)
    }

    /// Verify an access token and return the user id it was issued for
    pub fn verify_token(&self, token: &str) -> Result<i64, AuthError> {
        let data = decode::<Claims>(token, &self.decoding_key, &Validation::default())?;
        data.claims
            .sub
            .parse::<i64>()
            .map_err(|_| AuthError::InvalidSubject)
    }
}

/// A verified caller identity, extracted from the Authorization header
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: i64,
}

fn extract_user(req: &HttpRequest) -> Result<AuthUser, ErrorResponse> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| ErrorResponse::internal("state_missing", "Application state not configured"))?;

    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ErrorResponse::unauthorized("Missing Authorization header"))?;

    let token = header_value
        .strip_prefix("Bearer ")
        .ok_or_else(|| ErrorResponse::unauthorized("Authorization header must be a Bearer token"))?;

    let user_id = state
        .auth
        .verify_token(token)
        .map_err(|e| ErrorResponse::unauthorized(format!("Invalid token: {}", e)))?;

    Ok(AuthUser { user_id })
}

impl FromRequest for AuthUser {
    type Error = ErrorResponse;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(extract_user(req))
    }
}
