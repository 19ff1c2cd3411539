//! Access tokens and password hashing.
//!
//! Callers log in with an email and password and receive an HS256-signed JWT. Protected handlers take a
//! [`JwtClaims`] argument; actix extracts it from the `Authorization: Bearer <token>` header and rejects the request
//! with a 401 if the token is missing, malformed, forged or expired. The `user_id` in verified claims is the only
//! caller identity the engine ever sees.
//!
//! The bus webhook is for other services, not for users. Its callers present a shared secret instead
//! ([`WebhookCaller`]).
use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Argon2,
    PasswordHash,
    PasswordHasher,
    PasswordVerifier,
};
use chrono::{Duration, Utc};
use futures::future::{ready, Ready};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use log::*;
use serde::{Deserialize, Serialize};
use store_common::Secret;
use store_engine::db_types::{User, UserId};

use crate::{
    config::AuthConfig,
    errors::{AuthError, ServerError},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    pub user_id: UserId,
    pub email: String,
    /// Issued at, in unix seconds
    pub iat: i64,
    /// Expiry, in unix seconds
    pub exp: i64,
}

pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.jwt_secret.reveal().as_bytes();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl: config.token_ttl,
        }
    }

    /// Issue a new access token for the given user.
    /// This method DOES NOT check the user's credentials. That must be done prior to calling `issue_token`.
    pub fn issue_token(&self, user: &User) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = JwtClaims {
            user_id: user.id,
            email: user.email.clone(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        self.sign(&claims)
    }

    pub fn sign(&self, claims: &JwtClaims) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AuthError::CouldNotIssueToken(e.to_string()))
    }

    pub fn verify_token(&self, token: &str) -> Result<JwtClaims, AuthError> {
        let data = decode::<JwtClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| AuthError::ValidationError(e.to_string()))?;
        Ok(data.claims)
    }
}

impl FromRequest for JwtClaims {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(claims_from_request(req))
    }
}

fn claims_from_request(req: &HttpRequest) -> Result<JwtClaims, ServerError> {
    let issuer = req
        .app_data::<web::Data<TokenIssuer>>()
        .ok_or_else(|| ServerError::ConfigurationError("No token issuer has been configured".into()))?;
    let token = bearer_token(req)?;
    let claims = issuer.verify_token(token).map_err(|e| {
        debug!("💻️ Rejecting access token. {e}");
        e
    })?;
    trace!("💻️ Access token verified for user {}", claims.user_id);
    Ok(claims)
}

fn bearer_token(req: &HttpRequest) -> Result<&str, AuthError> {
    let value = req.headers().get(header::AUTHORIZATION).ok_or(AuthError::MissingToken)?;
    value
        .to_str()
        .ok()
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(AuthError::PoorlyFormattedToken)
}

//----------------------------------------------   Bus webhook  ----------------------------------------------------
/// The shared secret for the bus webhook. The webhook rejects every request if this is not in the app data.
#[derive(Clone)]
pub struct WebhookToken(Secret<String>);

impl WebhookToken {
    pub fn new(token: Secret<String>) -> Self {
        Self(token)
    }

    /// Compares in constant time for tokens of the same length.
    fn matches(&self, candidate: &str) -> bool {
        let expected = self.0.reveal().as_bytes();
        let candidate = candidate.as_bytes();
        expected.len() == candidate.len() && expected.iter().zip(candidate).fold(0u8, |acc, (a, b)| acc | (a ^ b)) == 0
    }
}

/// Proof that a request carried the bus webhook's shared secret.
#[derive(Debug, Clone, Copy)]
pub struct WebhookCaller;

impl FromRequest for WebhookCaller {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(webhook_caller_from_request(req).map_err(ServerError::from))
    }
}

fn webhook_caller_from_request(req: &HttpRequest) -> Result<WebhookCaller, AuthError> {
    let expected = req.app_data::<web::Data<WebhookToken>>().ok_or(AuthError::WebhookDisabled)?;
    let token = bearer_token(req)?;
    if !expected.matches(token) {
        warn!("💻️ Rejecting a bus webhook call with the wrong token from {:?}", req.peer_addr());
        return Err(AuthError::InvalidWebhookToken);
    }
    Ok(WebhookCaller)
}

//----------------------------------------------   Passwords  ----------------------------------------------------
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::HashingError(e.to_string()))?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        warn!("💻️ A stored password hash could not be parsed");
        return false;
    };
    Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok()
}
