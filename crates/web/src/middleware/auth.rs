use std::collections::HashSet;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::WebError;

/// Token claims issued by the identity provider; `sub` is the user id
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub exp: usize,
}

/// Authenticated caller, placed in request extensions by [`require_user`]
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser {
    pub user_id: Uuid,
}

/// HS256 verification key shared with the identity provider
#[derive(Clone)]
pub struct AuthKeys {
    decoding: DecodingKey,
    validation: Validation,
}

impl AuthKeys {
    pub fn from_secret(secret: &[u8]) -> Self {
        Self {
            decoding: DecodingKey::from_secret(secret),
            validation: Validation::default(),
        }
    }

    pub fn verify(&self, token: &str) -> Option<CurrentUser> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .ok()
            .map(|data| CurrentUser {
                user_id: data.claims.sub,
            })
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}

pub async fn require_user(
    State(keys): State<AuthKeys>,
    mut req: Request,
    next: Next,
) -> Result<Response, WebError> {
    let user = bearer_token(req.headers())
        .and_then(|token| keys.verify(token))
        .ok_or(WebError::Unauthorized)?;

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

pub async fn require_api_key(
    State(api_keys): State<ApiKeys>,
    req: Request,
    next: Next,
) -> Result<Response, WebError> {
    match bearer_token(req.headers()) {
        Some(key) if api_keys.is_valid(key) => Ok(next.run(req).await),
        _ => {
            tracing::warn!("Invalid API key attempt");
            Err(WebError::Unauthorized)
        }
    }
}

#[derive(Clone)]
pub struct ApiKeys {
    keys: HashSet<String>,
}

impl ApiKeys {
    pub fn from_comma_separated(keys_str: &str) -> Self {
        let keys = keys_str
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();

        Self { keys }
    }

    pub fn is_valid(&self, key: &str) -> bool {
        self.keys.contains(key)
    }
}
