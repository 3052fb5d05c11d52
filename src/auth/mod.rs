use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::SecurityConfig;
use crate::database::models::{Role, Session, User};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: Uuid,
    pub role: Option<Role>,
    /// Session id; the session row must still exist for the token to be accepted
    pub jti: Uuid,
    pub exp: i64,
    pub iat: i64,
}

/// Longest token lifetime honoured; larger configured values are clamped to it
pub const MAX_EXPIRY_HOURS: u64 = 24 * 365 * 10;

fn lifetime(expiry_hours: u64) -> Duration {
    let hours = i64::try_from(expiry_hours.min(MAX_EXPIRY_HOURS)).unwrap_or_default();
    Duration::hours(hours)
}

impl Claims {
    pub fn new(user: &User, session_id: Uuid, issued_at: DateTime<Utc>, expiry_hours: u64) -> Self {
        let exp = issued_at + lifetime(expiry_hours);

        Self {
            sub: user.id,
            role: user.role,
            jti: session_id,
            exp: exp.timestamp(),
            iat: issued_at.timestamp(),
        }
    }
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid JWT secret")]
    InvalidSecret,

    #[error("Invalid token: {0}")]
    Invalid(String),

    #[error("Token has expired")]
    Expired,

    #[error("Password hashing failed: {0}")]
    Hashing(String),
}

pub fn generate_jwt(security: &SecurityConfig, claims: &Claims) -> Result<String, JwtError> {
    if security.jwt_secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(security.jwt_secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key)
        .map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

pub fn validate_jwt(security: &SecurityConfig, token: &str) -> Result<Claims, JwtError> {
    if security.jwt_secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(security.jwt_secret.as_bytes());
    decode::<Claims>(token, &decoding_key, &Validation::default())
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => JwtError::Expired,
            _ => JwtError::Invalid(e.to_string()),
        })
}

/// Open a session for `user` and sign a token bound to it.
///
/// The caller persists the returned session before handing out the token.
pub fn issue_token(security: &SecurityConfig, user: &User) -> Result<(Session, String), JwtError> {
    let now = Utc::now();
    let session = Session {
        id: Uuid::new_v4(),
        user_id: user.id,
        issued_at: now,
        expires_at: now + lifetime(security.jwt_expiry_hours),
    };
    let token = generate_jwt(security, &Claims::new(user, session.id, now, security.jwt_expiry_hours))?;
    Ok((session, token))
}

pub async fn hash_password(password: String, cost: u32) -> Result<String, JwtError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| JwtError::Hashing(e.to_string()))?
        .map_err(|e| JwtError::Hashing(e.to_string()))
}

/// A malformed stored hash counts as a mismatch
pub async fn verify_password(password: String, password_hash: String) -> Result<bool, JwtError> {
    let verified = tokio::task::spawn_blocking(move || bcrypt::verify(password, &password_hash))
        .await
        .map_err(|e| JwtError::Hashing(e.to_string()))?;
    Ok(verified.unwrap_or(false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppConfig, Environment};

    fn security() -> SecurityConfig {
        AppConfig::for_environment(Environment::Development).security
    }

    fn officer() -> User {
        User {
            id: Uuid::new_v4(),
            username: "div".into(),
            email: String::new(),
            password_hash: String::new(),
            role: Some(Role::Divisional),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn issued_token_carries_user_role_and_session() {
        let user = officer();
        let (session, token) = issue_token(&security(), &user).unwrap();

        let claims = validate_jwt(&security(), &token).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.role, Some(Role::Divisional));
        assert_eq!(claims.jti, session.id);
        assert!(session.expires_at > session.issued_at);
    }

    #[test]
    fn rejects_tokens_signed_with_another_secret() {
        let (_, token) = issue_token(&security(), &officer()).unwrap();
        let mut other = security();
        other.jwt_secret = "another-secret".into();
        assert!(matches!(validate_jwt(&other, &token), Err(JwtError::Invalid(_))));
    }

    #[test]
    fn rejects_expired_tokens() {
        let user = officer();
        let issued = Utc::now() - Duration::hours(48);
        let token = generate_jwt(&security(), &Claims::new(&user, Uuid::new_v4(), issued, 1)).unwrap();
        assert!(matches!(validate_jwt(&security(), &token), Err(JwtError::Expired)));
    }

    #[test]
    fn oversized_expiry_is_clamped() {
        let mut s = security();
        s.jwt_expiry_hours = u64::MAX;
        let (session, token) = issue_token(&s, &officer()).unwrap();
        assert_eq!(session.expires_at - session.issued_at, Duration::hours(MAX_EXPIRY_HOURS as i64));

        let claims = validate_jwt(&s, &token).unwrap();
        assert_eq!(claims.exp - claims.iat, MAX_EXPIRY_HOURS as i64 * 3600);
    }

    #[test]
    fn empty_secret_is_refused() {
        let mut s = security();
        s.jwt_secret.clear();
        assert!(matches!(issue_token(&s, &officer()), Err(JwtError::InvalidSecret)));
    }

    #[tokio::test]
    async fn password_hash_verifies() {
        let hash = hash_password("s3cret".into(), 4).await.unwrap();
        assert!(verify_password("s3cret".into(), hash.clone()).await.unwrap());
        assert!(!verify_password("wrong".into(), hash).await.unwrap());
        assert!(!verify_password("s3cret".into(), "not-a-hash".into()).await.unwrap());
    }
}
