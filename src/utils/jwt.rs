use crate::config::jwt::JwtConfig;
use anyhow::Result;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Token payload: the user's id and email plus standard timing claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub id: i32,
    pub email: String,
    pub exp: usize, // expiration time
    pub iat: usize, // issued at
}

pub fn encode_access_token(config: &JwtConfig, user_id: i32, email: &str) -> Result<String> {
    let now = chrono::Utc::now().timestamp() as usize;
    let exp = usize::try_from(config.expiry_secs)
        .ok()
        .and_then(|secs| now.checked_add(secs))
        .ok_or_else(|| anyhow::anyhow!("Token expiry out of range"))?;
    let claims = Claims {
        id: user_id,
        email: email.to_owned(),
        exp,
        iat: now,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(|e| anyhow::anyhow!("Failed to encode access token: {}", e))
}

/// Verifies signature and expiry (no leeway).
pub fn decode_jwt(config: &JwtConfig, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::default();
    validation.leeway = 0;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
}
