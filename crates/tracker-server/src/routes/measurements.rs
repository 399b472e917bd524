use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::models::{Measurement, SessionUser};
use crate::routes::AppState;

const MEASUREMENT_COLS: &str = "id, date, chest, waist, hips, thigh, arm, notes, created_at";

fn row_to_measurement(row: &rusqlite::Row) -> rusqlite::Result<Measurement> {
    Ok(Measurement {
        id: row.get(0)?,
        date: row.get(1)?,
        chest: row.get(2)?,
        waist: row.get(3)?,
        hips: row.get(4)?,
        thigh: row.get(5)?,
        arm: row.get(6)?,
        notes: row.get(7)?,
        created_at: row.get(8)?,
    })
}

/// All five body fields are independently optional; a record carrying only a
/// date is valid.
#[derive(Debug, Deserialize)]
pub struct UpsertMeasurementRequest {
    #[serde(default)]
    pub date: String,
    pub chest: Option<f64>,
    pub waist: Option<f64>,
    pub hips: Option<f64>,
    pub thigh: Option<f64>,
    pub arm: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMeasurementRequest {
    pub id: Option<i64>,
    #[serde(default)]
    pub date: String,
    pub chest: Option<f64>,
    pub waist: Option<f64>,
    pub hips: Option<f64>,
    pub thigh: Option<f64>,
    pub arm: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteMeasurementQuery {
    pub id: Option<i64>,
}

pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
) -> AppResult<Json<serde_json::Value>> {
    let conn = state.db.get()?;
    let mut stmt = conn.prepare(&format!(
        "SELECT {MEASUREMENT_COLS} FROM measurements WHERE user_id = ?1 ORDER BY date DESC"
    ))?;
    let rows = stmt.query_map(rusqlite::params![user.id], row_to_measurement)?;
    let measurements: Result<Vec<_>, _> = rows.collect();

    Ok(Json(json!({ "measurements": measurements? })))
}

pub async fn upsert(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Json(body): Json<UpsertMeasurementRequest>,
) -> AppResult<Json<Measurement>> {
    if body.date.is_empty() {
        return Err(AppError::BadRequest("Date is required".to_string()));
    }

    // Full-field overwrite on conflict: omitted fields become NULL rather
    // than keeping the previous day's values
    let conn = state.db.get()?;
    conn.execute(
        "INSERT INTO measurements (user_id, date, chest, waist, hips, thigh, arm, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         ON CONFLICT(user_id, date) DO UPDATE SET
           chest = excluded.chest,
           waist = excluded.waist,
           hips = excluded.hips,
           thigh = excluded.thigh,
           arm = excluded.arm,
           notes = excluded.notes",
        rusqlite::params![
            user.id, body.date, body.chest, body.waist, body.hips, body.thigh, body.arm,
            body.notes
        ],
    )?;

    let measurement = conn.query_row(
        &format!("SELECT {MEASUREMENT_COLS} FROM measurements WHERE user_id = ?1 AND date = ?2"),
        rusqlite::params![user.id, body.date],
        row_to_measurement,
    )?;

    Ok(Json(measurement))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Json(body): Json<UpdateMeasurementRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let id = body
        .id
        .ok_or_else(|| AppError::BadRequest("ID is required".to_string()))?;
    if body.date.is_empty() {
        return Err(AppError::BadRequest("Date is required".to_string()));
    }

    // Foreign ids match zero rows and still return 200
    let conn = state.db.get()?;
    conn.execute(
        "UPDATE measurements
         SET date = ?1, chest = ?2, waist = ?3, hips = ?4, thigh = ?5, arm = ?6, notes = ?7
         WHERE id = ?8 AND user_id = ?9",
        rusqlite::params![
            body.date, body.chest, body.waist, body.hips, body.thigh, body.arm, body.notes,
            id, user.id
        ],
    )?;

    Ok(Json(json!({
        "id": id,
        "date": body.date,
        "chest": body.chest,
        "waist": body.waist,
        "hips": body.hips,
        "thigh": body.thigh,
        "arm": body.arm,
        "notes": body.notes,
    })))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Query(query): Query<DeleteMeasurementQuery>,
) -> AppResult<Json<serde_json::Value>> {
    let id = query
        .id
        .ok_or_else(|| AppError::BadRequest("ID is required".to_string()))?;

    let conn = state.db.get()?;
    conn.execute(
        "DELETE FROM measurements WHERE id = ?1 AND user_id = ?2",
        rusqlite::params![id, user.id],
    )?;

    Ok(Json(json!({ "success": true })))
}
