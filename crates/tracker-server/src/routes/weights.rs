use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::models::{SessionUser, WeightEntry};
use crate::routes::AppState;
use crate::services::stats::{self, Period, WeightStats};

const WEIGHT_COLS: &str = "id, date, weight, notes, created_at";

fn row_to_entry(row: &rusqlite::Row) -> rusqlite::Result<WeightEntry> {
    Ok(WeightEntry {
        id: row.get(0)?,
        date: row.get(1)?,
        weight: row.get(2)?,
        notes: row.get(3)?,
        created_at: row.get(4)?,
    })
}

#[derive(Debug, Deserialize)]
pub struct UpsertWeightRequest {
    #[serde(default)]
    pub date: String,
    pub weight: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateWeightRequest {
    pub id: Option<i64>,
    #[serde(default)]
    pub date: String,
    pub weight: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteWeightQuery {
    pub id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub period: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
) -> AppResult<Json<serde_json::Value>> {
    let conn = state.db.get()?;
    let mut stmt = conn.prepare(&format!(
        "SELECT {WEIGHT_COLS} FROM weights WHERE user_id = ?1 ORDER BY date DESC"
    ))?;
    let rows = stmt.query_map(rusqlite::params![user.id], row_to_entry)?;
    let weights: Result<Vec<_>, _> = rows.collect();

    Ok(Json(json!({ "weights": weights? })))
}

pub async fn upsert(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Json(body): Json<UpsertWeightRequest>,
) -> AppResult<Json<WeightEntry>> {
    if body.date.is_empty() {
        return Err(AppError::BadRequest("Date is required".to_string()));
    }
    let weight = validate_weight(body.weight)?;

    // One row per (user, date): a second submission for the same day
    // overwrites every non-key field, including an omitted notes
    let conn = state.db.get()?;
    conn.execute(
        "INSERT INTO weights (user_id, date, weight, notes) VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(user_id, date) DO UPDATE SET
           weight = excluded.weight,
           notes = excluded.notes",
        rusqlite::params![user.id, body.date, weight, body.notes],
    )?;

    let entry = conn.query_row(
        &format!("SELECT {WEIGHT_COLS} FROM weights WHERE user_id = ?1 AND date = ?2"),
        rusqlite::params![user.id, body.date],
        row_to_entry,
    )?;

    Ok(Json(entry))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Json(body): Json<UpdateWeightRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let id = body
        .id
        .ok_or_else(|| AppError::BadRequest("ID is required".to_string()))?;
    if body.date.is_empty() {
        return Err(AppError::BadRequest("Date is required".to_string()));
    }
    let weight = validate_weight(body.weight)?;

    // The user_id filter makes a foreign id match zero rows; the response
    // does not reveal whether the row exists
    let conn = state.db.get()?;
    conn.execute(
        "UPDATE weights SET date = ?1, weight = ?2, notes = ?3 WHERE id = ?4 AND user_id = ?5",
        rusqlite::params![body.date, weight, body.notes, id, user.id],
    )?;

    Ok(Json(json!({
        "id": id,
        "date": body.date,
        "weight": weight,
        "notes": body.notes,
    })))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Query(query): Query<DeleteWeightQuery>,
) -> AppResult<Json<serde_json::Value>> {
    let id = query
        .id
        .ok_or_else(|| AppError::BadRequest("ID is required".to_string()))?;

    let conn = state.db.get()?;
    conn.execute(
        "DELETE FROM weights WHERE id = ?1 AND user_id = ?2",
        rusqlite::params![id, user.id],
    )?;

    Ok(Json(json!({ "success": true })))
}

pub async fn stats(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Query(query): Query<StatsQuery>,
) -> AppResult<Json<WeightStats>> {
    let period = match query.period.as_deref() {
        None => Period::All,
        Some(s) => Period::parse(s).ok_or_else(|| {
            AppError::BadRequest("Invalid period; expected 7, 30, 90 or all".to_string())
        })?,
    };

    let conn = state.db.get()?;
    let mut stmt = conn.prepare(&format!(
        "SELECT {WEIGHT_COLS} FROM weights WHERE user_id = ?1 ORDER BY date DESC"
    ))?;
    let rows = stmt.query_map(rusqlite::params![user.id], row_to_entry)?;
    let entries: Result<Vec<_>, _> = rows.collect();

    let goal: Option<f64> = conn.query_row(
        "SELECT goal_weight FROM users WHERE id = ?1",
        rusqlite::params![user.id],
        |row| row.get(0),
    )?;

    let today = Utc::now().date_naive();
    Ok(Json(stats::compute(&entries?, goal, period, today)))
}

fn validate_weight(weight: Option<f64>) -> AppResult<f64> {
    let weight = weight.ok_or_else(|| AppError::BadRequest("Weight is required".to_string()))?;
    if weight <= 0.0 {
        return Err(AppError::BadRequest(
            "Weight must be a positive number".to_string(),
        ));
    }
    Ok(weight)
}
