use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod password;

/// Claims embedded in a session token.
///
/// The token is stateless: nothing is persisted server-side, so validity rests
/// entirely on the signature and the `exp` timestamp.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub email: String,
    pub name: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(email: String, name: String, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            email,
            name,
            exp,
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("token generation error: {0}")]
    TokenGeneration(String),

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("JWT secret is empty")]
    InvalidSecret,
}

/// Sign a session token for the given claims.
pub fn generate_jwt(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    let header = Header::default();

    encode(&header, claims, &encoding_key).map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

/// Verify a session token's signature and expiry, returning its claims.
pub fn validate_jwt(token: &str, secret: &str) -> Result<Claims, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();

    let token_data = decode::<Claims>(token, &decoding_key, &validation)
        .map_err(|e| JwtError::InvalidToken(e.to_string()))?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret";

    #[test]
    fn token_round_trips_claims() {
        let claims = Claims::new("mia@example.com".to_string(), "Mia".to_string(), 24);
        let token = generate_jwt(&claims, SECRET).expect("token should sign");

        let decoded = validate_jwt(&token, SECRET).expect("token should verify");
        assert_eq!(decoded.email, "mia@example.com");
        assert_eq!(decoded.name, "Mia");
        assert_eq!(decoded.exp, claims.exp);
    }

    #[test]
    fn expired_token_is_rejected() {
        // Expiry well in the past, beyond the default validation leeway.
        let now = Utc::now();
        let claims = Claims {
            email: "mia@example.com".to_string(),
            name: "Mia".to_string(),
            exp: (now - Duration::hours(2)).timestamp(),
            iat: (now - Duration::hours(3)).timestamp(),
        };
        let token = generate_jwt(&claims, SECRET).expect("token should sign");

        assert!(matches!(
            validate_jwt(&token, SECRET),
            Err(JwtError::InvalidToken(_))
        ));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let claims = Claims::new("mia@example.com".to_string(), "Mia".to_string(), 24);
        let token = generate_jwt(&claims, SECRET).expect("token should sign");

        assert!(validate_jwt(&token, "some-other-secret").is_err());
    }

    #[test]
    fn empty_secret_is_rejected() {
        let claims = Claims::new("mia@example.com".to_string(), "Mia".to_string(), 24);
        assert!(matches!(
            generate_jwt(&claims, ""),
            Err(JwtError::InvalidSecret)
        ));
    }
}
