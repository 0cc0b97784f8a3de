//! Signed session tokens (HS256).
//!
//! The same token is stored in the session cookie after a form login and
//! handed to API clients by the token endpoint.

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};

use yatube_core::domain::User;
use yatube_core::ports::{AuthError, SessionClaims, TokenService};

const INSECURE_SECRET: &str = "change-me-in-production";

/// Signing settings for session tokens.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiration_hours: i64,
    pub issuer: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: INSECURE_SECRET.to_string(),
            expiration_hours: 24,
            issuer: "yatube".to_string(),
        }
    }
}

impl JwtConfig {
    /// Read `JWT_SECRET`, `JWT_EXPIRATION_HOURS` and `JWT_ISSUER`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let config = Self {
            secret: std::env::var("JWT_SECRET").unwrap_or(defaults.secret),
            expiration_hours: std::env::var("JWT_EXPIRATION_HOURS")
                .ok()
                .and_then(|hours| hours.parse().ok())
                .filter(|hours: &i64| *hours > 0)
                .unwrap_or(defaults.expiration_hours),
            issuer: std::env::var("JWT_ISSUER").unwrap_or(defaults.issuer),
        };

        if config.secret == INSECURE_SECRET {
            tracing::warn!("JWT_SECRET is not set; sessions are signed with a public default key");
        }
        config
    }
}

/// Registered claims plus the account fields the pages need.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    name: String,
    #[serde(default)]
    staff: bool,
    iat: i64,
    exp: i64,
    iss: String,
}

pub struct JwtTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lifetime: TimeDelta,
    issuer: String,
}

impl JwtTokenService {
    pub fn new(config: JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&config.issuer]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            lifetime: TimeDelta::hours(config.expiration_hours),
            issuer: config.issuer,
        }
    }
}

impl TokenService for JwtTokenService {
    fn issue(&self, user: &User) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            name: user.username.clone(),
            staff: user.is_staff,
            iat: now.timestamp(),
            exp: (now + self.lifetime).timestamp(),
            iss: self.issuer.clone(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }

    fn parse(&self, token: &str) -> Result<SessionClaims, AuthError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken(e.to_string()),
            })?
            .claims;

        let user_id = claims
            .sub
            .parse()
            .map_err(|_| AuthError::InvalidToken(format!("bad subject '{}'", claims.sub)))?;
        let expires_at = DateTime::from_timestamp(claims.exp, 0)
            .ok_or_else(|| AuthError::InvalidToken("bad expiry".to_string()))?;

        Ok(SessionClaims {
            user_id,
            username: claims.name,
            is_staff: claims.staff,
            expires_at,
        })
    }

    fn lifetime(&self) -> TimeDelta {
        self.lifetime
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(expiration_hours: i64, issuer: &str) -> JwtTokenService {
        JwtTokenService::new(JwtConfig {
            secret: "test-secret-key".to_string(),
            expiration_hours,
            issuer: issuer.to_string(),
        })
    }

    fn user(id: i64, username: &str, is_staff: bool) -> User {
        User {
            id,
            username: username.to_string(),
            password_hash: String::new(),
            is_staff,
            date_joined: Utc::now(),
        }
    }

    #[test]
    fn test_token_carries_the_account() {
        let tokens = service(1, "yatube");

        let token = tokens.issue(&user(17, "UserTest", false)).unwrap();
        let claims = tokens.parse(&token).unwrap();

        assert_eq!(claims.user_id, 17);
        assert_eq!(claims.username, "UserTest");
        assert!(!claims.is_staff);
        assert!(claims.expires_at > Utc::now());
    }

    #[test]
    fn test_staff_flag_survives() {
        let tokens = service(1, "yatube");
        let token = tokens.issue(&user(1, "admin", true)).unwrap();
        assert!(tokens.parse(&token).unwrap().is_staff);
    }

    #[test]
    fn test_garbage_is_rejected() {
        let tokens = service(1, "yatube");
        assert!(matches!(
            tokens.parse("not-a-token"),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let tokens = service(-2, "yatube");
        let token = tokens.issue(&user(1, "old", false)).unwrap();

        assert!(matches!(tokens.parse(&token), Err(AuthError::TokenExpired)));
    }

    #[test]
    fn test_foreign_issuer_is_rejected() {
        let token = service(1, "elsewhere").issue(&user(1, "someone", false)).unwrap();
        assert!(service(1, "yatube").parse(&token).is_err());
    }

    #[test]
    fn test_lifetime() {
        assert_eq!(service(24, "yatube").lifetime(), TimeDelta::seconds(86_400));
    }
}
