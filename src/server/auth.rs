//! Authentication middleware resolving the owner identity for every API
//! request.
//!
//! Credentials arrive either as HTTP Basic (username/password checked against
//! the config's bcrypt hashes) or as `Authorization: Bearer <api key>` for
//! programmatic access. The resolved owner identifier is the hex SHA-256 of
//! the username, so credentials never appear in storage keys or logs; the
//! rest of the system treats it as opaque.

use axum::{
    body::Body,
    extract::State,
    http::{header, Request},
    middleware::Next,
    response::Response,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use sha2::{Digest, Sha256};

use crate::config::AuthConfig;
use crate::error::Error;
use crate::ids::OwnerId;
use crate::server::{error::AppError, AppContext};

/// Derive the opaque owner identifier for an authenticated username.
pub fn owner_id_for(username: &str) -> OwnerId {
    let digest = Sha256::digest(username.as_bytes());
    OwnerId::new(hex::encode(digest))
}

/// Resolve the owner for a request's Authorization header value.
///
/// With auth disabled, the Basic username is trusted as-is when present so
/// that local development still exercises owner scoping; otherwise a fixed
/// anonymous owner is used.
fn resolve_owner(auth: &AuthConfig, header_value: Option<&str>) -> Result<OwnerId, Error> {
    if !auth.enabled {
        let username = header_value
            .and_then(|v| v.strip_prefix("Basic "))
            .and_then(decode_basic)
            .map(|(user, _)| user)
            .unwrap_or_else(|| "anonymous".to_string());
        return Ok(owner_id_for(&username));
    }

    let header_value = header_value.ok_or(Error::Unauthorized)?;

    if let Some(token) = header_value.strip_prefix("Bearer ") {
        let user = auth
            .users
            .iter()
            .find(|u| u.api_key.as_deref() == Some(token))
            .ok_or(Error::Unauthorized)?;
        return Ok(owner_id_for(&user.username));
    }

    if let Some(encoded) = header_value.strip_prefix("Basic ") {
        let (username, password) = decode_basic(encoded).ok_or(Error::Unauthorized)?;
        let user = auth
            .users
            .iter()
            .find(|u| u.username == username)
            .ok_or(Error::Unauthorized)?;
        if bcrypt::verify(&password, &user.password_hash).unwrap_or(false) {
            return Ok(owner_id_for(&user.username));
        }
        return Err(Error::Unauthorized);
    }

    Err(Error::Unauthorized)
}

/// Decode a Basic credential payload into (username, password).
fn decode_basic(encoded: &str) -> Option<(String, String)> {
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, pass) = decoded.split_once(':')?;
    Some((user.to_string(), pass.to_string()))
}

/// Middleware that authenticates the request and stashes the resolved
/// [`OwnerId`] in the request extensions.
pub async fn auth_middleware(
    State(ctx): State<AppContext>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let header_value = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string());

    let owner = resolve_owner(&ctx.config.server.auth, header_value.as_deref())?;
    request.extensions_mut().insert(owner);
    Ok(next.run(request).await)
}

/// Generate a bcrypt password hash
pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
}

/// Generate a random API key
pub fn generate_api_key() -> String {
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use rand::Rng;
    let mut rng = rand::thread_rng();
    let bytes: [u8; 32] = rng.gen();
    URL_SAFE_NO_PAD.encode(bytes)
}
