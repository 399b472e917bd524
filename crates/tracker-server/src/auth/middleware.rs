use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;

use crate::auth::session::{self, SESSION_COOKIE};
use crate::error::AppError;
use crate::routes::AppState;

/// Route guard for the protected API. A missing, malformed, or expired
/// cookie all read as "no session" and get a uniform 401.
pub async fn require_auth(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = jar
        .get(SESSION_COOKIE)
        .and_then(|c| session::open(&state.config.session_secret, c.value()))
        .ok_or(AppError::Unauthorized)?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}
