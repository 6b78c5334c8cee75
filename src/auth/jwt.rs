use std::time::{SystemTime, UNIX_EPOCH};

use crate::model::role::Role;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User email, the registry key.
    pub sub: String,
    /// Display name as the identity provider reported it.
    pub name: String,
    pub role: Role,
    pub exp: usize,
    pub jti: String,
    pub token_type: TokenType,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub enum TokenType {
    Access,
    Refresh,
}

fn now() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before unix epoch")
        .as_secs() as usize
}

fn generate(email: &str, name: &str, role: Role, token_type: TokenType, secret: &str, ttl: usize) -> String {
    let claims = Claims {
        sub: email.to_string(),
        name: name.to_string(),
        role,
        exp: now() + ttl,
        jti: Uuid::new_v4().to_string(),
        token_type,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("jwt encoding with hmac secret cannot fail")
}

pub fn generate_access_token(
    email: &str,
    name: &str,
    role: Role,
    secret: &str,
    ttl: usize,
) -> String {
    generate(email, name, role, TokenType::Access, secret, ttl)
}

pub fn generate_refresh_token(
    email: &str,
    name: &str,
    role: Role,
    secret: &str,
    ttl: usize,
) -> String {
    generate(email, name, role, TokenType::Refresh, secret, ttl)
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())
}
