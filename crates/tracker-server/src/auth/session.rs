//! Stateless session tokens.
//!
//! A session is a client-held cookie, not a database row. The cookie value is
//! `base64url(JSON claims) "." hex(HMAC-SHA256 over the base64 part)`. There
//! is no server-side store, no rotation, and no refresh-on-access: whoever
//! holds the signing secret can mint tokens for any account until they
//! expire. Known trade-off, kept deliberately small.

use axum_extra::extract::cookie::{Cookie, SameSite};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::SessionUser;

pub const SESSION_COOKIE: &str = "session";

const SESSION_DURATION_DAYS: i64 = 7;

type HmacSha256 = Hmac<Sha256>;

#[derive(Serialize, Deserialize)]
struct Claims {
    id: i64,
    username: String,
    name: String,
    exp: i64,
}

/// Serialize and sign a session token for `user`, valid for 7 days.
pub fn seal(secret: &str, user: &SessionUser) -> AppResult<String> {
    let claims = Claims {
        id: user.id,
        username: user.username.clone(),
        name: user.name.clone(),
        exp: (Utc::now() + Duration::days(SESSION_DURATION_DAYS)).timestamp(),
    };
    let json = serde_json::to_vec(&claims)
        .map_err(|e| AppError::Internal(format!("Session serialization failed: {e}")))?;
    let payload = URL_SAFE_NO_PAD.encode(json);
    let tag = sign(secret, &payload);
    Ok(format!("{payload}.{tag}"))
}

/// Extract the identity from a token. Returns `None` for anything short of a
/// well-formed, correctly signed, unexpired token. Callers must treat every
/// `None` identically to an absent cookie.
pub fn open(secret: &str, token: &str) -> Option<SessionUser> {
    let (payload, tag) = token.split_once('.')?;

    let mut mac = mac(secret);
    mac.update(payload.as_bytes());
    let tag_bytes = hex::decode(tag).ok()?;
    mac.verify_slice(&tag_bytes).ok()?;

    let json = URL_SAFE_NO_PAD.decode(payload).ok()?;
    let claims: Claims = serde_json::from_slice(&json).ok()?;

    if claims.exp <= Utc::now().timestamp() {
        return None;
    }

    Some(SessionUser {
        id: claims.id,
        username: claims.username,
        name: claims.name,
    })
}

pub fn build_session_cookie(config: &Config, token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .max_age(time::Duration::days(SESSION_DURATION_DAYS))
        .http_only(true)
        .secure(config.secure_cookies)
        .same_site(SameSite::Lax)
        .build()
}

pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE)
        .path("/")
        .max_age(time::Duration::ZERO)
        .http_only(true)
        .build()
}

fn sign(secret: &str, payload: &str) -> String {
    let mut mac = mac(secret);
    mac.update(payload.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

fn mac(secret: &str) -> HmacSha256 {
    // HMAC accepts keys of any length
    HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC key")
}
