use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(admin_id: Uuid, email: String, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: admin_id,
            email,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }
}

pub fn encode_token(claims: &Claims, secret: &str) -> Result<String, String> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| format!("JWT encode failed: {e}"))
}

pub fn decode_token(token: &str, secret: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| format!("JWT decode failed: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret";

    #[test]
    fn token_roundtrip_keeps_identity() {
        let id = Uuid::now_v7();
        let claims = Claims::new(id, "admin@test.com".to_string(), Duration::hours(1));
        let token = encode_token(&claims, SECRET).unwrap();

        let decoded = decode_token(&token, SECRET).unwrap();
        assert_eq!(decoded.sub, id);
        assert_eq!(decoded.email, "admin@test.com");
    }

    #[test]
    fn wrong_secret_rejected() {
        let claims = Claims::new(Uuid::now_v7(), "a@b.co".to_string(), Duration::hours(1));
        let token = encode_token(&claims, SECRET).unwrap();
        assert!(decode_token(&token, "another-secret").is_err());
    }

    #[test]
    fn expired_token_rejected() {
        let mut claims = Claims::new(Uuid::now_v7(), "a@b.co".to_string(), Duration::hours(1));
        claims.exp = (Utc::now() - Duration::hours(2)).timestamp();
        let token = encode_token(&claims, SECRET).unwrap();
        assert!(decode_token(&token, SECRET).is_err());
    }
}
