use axum::{extract::State, response::IntoResponse, Extension, Json};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use serde_json::json;

use crate::auth::{password, session};
use crate::error::{AppError, AppResult};
use crate::models::{SessionUser, User};
use crate::routes::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<RegisterRequest>,
) -> AppResult<impl IntoResponse> {
    if body.username.is_empty() || body.password.is_empty() || body.name.is_empty() {
        return Err(AppError::BadRequest(
            "Username, password and name are required".to_string(),
        ));
    }

    let password_hash = password::hash_password(&body.password)?;

    // The UNIQUE constraint is the duplicate check, so a racing second
    // registration can never leave two rows behind
    let conn = state.db.get()?;
    let result = conn.execute(
        "INSERT INTO users (username, password_hash, name) VALUES (?1, ?2, ?3)",
        rusqlite::params![body.username, password_hash, body.name],
    );

    match result {
        Ok(_) => {}
        Err(rusqlite::Error::SqliteFailure(err, _))
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            return Err(AppError::BadRequest("Username already taken".to_string()));
        }
        Err(e) => return Err(AppError::Database(e)),
    }

    let user = SessionUser {
        id: conn.last_insert_rowid(),
        username: body.username,
        name: body.name,
    };

    let token = session::seal(&state.config.session_secret, &user)?;
    let cookie = session::build_session_cookie(&state.config, token);

    Ok((jar.add(cookie), Json(json!({ "user": user }))))
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    if body.username.is_empty() || body.password.is_empty() {
        return Err(AppError::BadRequest(
            "Username and password are required".to_string(),
        ));
    }

    let conn = state.db.get()?;
    let row = conn.query_row(
        "SELECT id, username, name, password_hash, goal_weight, created_at FROM users WHERE username = ?1",
        rusqlite::params![body.username],
        |row| {
            Ok(User {
                id: row.get(0)?,
                username: row.get(1)?,
                name: row.get(2)?,
                password_hash: row.get(3)?,
                goal_weight: row.get(4)?,
                created_at: row.get(5)?,
            })
        },
    );

    // Unknown username and wrong password are indistinguishable on purpose
    let user = match row {
        Ok(u) => u,
        Err(rusqlite::Error::QueryReturnedNoRows) => return Err(AppError::Unauthorized),
        Err(e) => return Err(AppError::Database(e)),
    };

    if !password::verify_password(&body.password, &user.password_hash)? {
        return Err(AppError::Unauthorized);
    }

    let user = SessionUser::from(user);
    let token = session::seal(&state.config.session_secret, &user)?;
    let cookie = session::build_session_cookie(&state.config, token);

    Ok((jar.add(cookie), Json(json!({ "user": user }))))
}

pub async fn logout(jar: CookieJar) -> AppResult<impl IntoResponse> {
    // Nothing to revoke server-side; the removal cookie ends the session
    Ok((
        jar.add(session::removal_cookie()),
        Json(json!({ "success": true })),
    ))
}

pub async fn me(Extension(user): Extension<SessionUser>) -> Json<SessionUser> {
    Json(user)
}
