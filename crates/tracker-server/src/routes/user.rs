use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Deserializer};
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::models::SessionUser;
use crate::routes::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct GoalRequest {
    #[serde(rename = "goalWeight", default, deserialize_with = "some_or_null")]
    pub goal_weight: Option<Option<f64>>,
}

/// Keeps an absent field (`None`) apart from an explicit `null`
/// (`Some(None)`): only the latter clears the goal.
fn some_or_null<'de, D>(deserializer: D) -> Result<Option<Option<f64>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<f64>::deserialize(deserializer).map(Some)
}

pub async fn get_goal(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
) -> AppResult<Json<serde_json::Value>> {
    let conn = state.db.get()?;
    let goal: Option<f64> = conn.query_row(
        "SELECT goal_weight FROM users WHERE id = ?1",
        rusqlite::params![user.id],
        |row| row.get(0),
    )?;

    Ok(Json(json!({ "goalWeight": goal })))
}

pub async fn set_goal(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Json(body): Json<GoalRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let goal = body
        .goal_weight
        .ok_or_else(|| AppError::BadRequest("Invalid goal weight".to_string()))?;

    // null explicitly clears the goal
    if let Some(goal) = goal {
        if goal <= 0.0 {
            return Err(AppError::BadRequest(
                "Goal weight must be a positive number".to_string(),
            ));
        }
    }

    let conn = state.db.get()?;
    conn.execute(
        "UPDATE users SET goal_weight = ?1 WHERE id = ?2",
        rusqlite::params![goal, user.id],
    )?;

    Ok(Json(json!({ "success": true, "goalWeight": goal })))
}
