//! Daily bulletin handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::NaiveDate;
use popo_core::{DataRecord, DateInputError, FieldName, FieldValue, parse_date_input};
use std::sync::Arc;
use tracing::debug;

use super::error_response;
use crate::state::AppState;

type DailyResult<T> = Result<Json<T>, (StatusCode, String)>;

fn parse_date(input: &str) -> Result<NaiveDate, (StatusCode, String)> {
    parse_date_input(input).map_err(|e: DateInputError| (StatusCode::BAD_REQUEST, e.to_string()))
}

fn not_found(date: NaiveDate) -> (StatusCode, String) {
    (
        StatusCode::NOT_FOUND,
        format!("No bulletin available for {date}"),
    )
}

/// `GET /daily` without a date.
pub async fn missing_date() -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, DateInputError::Missing.to_string())
}

/// `GET /daily/{date}` and `GET /daily/{date}/{field}`.
pub async fn get_daily(State(state): State<Arc<AppState>>, Path(path): Path<String>) -> Response {
    match split_daily_path(&path) {
        Some((date, None)) => daily(&state, &date).await.into_response(),
        Some((date, Some(field))) => daily_field(&state, &date, field).await.into_response(),
        None => (StatusCode::NOT_FOUND, format!("No route for /daily/{path}")).into_response(),
    }
}

/// Split the path after `/daily/` into a date and an optional field. A
/// `DD/MM/YYYY` date spans three segments.
fn split_daily_path(path: &str) -> Option<(String, Option<&str>)> {
    let segments: Vec<&str> = path.trim_end_matches('/').split('/').collect();
    match segments.as_slice() {
        [date] => Some((date.to_string(), None)),
        [date, field] => Some((date.to_string(), Some(field))),
        [day, month, year] => Some((format!("{day}/{month}/{year}"), None)),
        [day, month, year, field] => Some((format!("{day}/{month}/{year}"), Some(field))),
        _ => None,
    }
}

async fn daily(state: &AppState, date: &str) -> DailyResult<DataRecord> {
    let date = parse_date(date)?;

    let record = state
        .cache
        .get(date)
        .await
        .map_err(error_response)?
        .ok_or_else(|| not_found(date))?;

    debug!(%date, resolved = record.resolved_count(), "Serving bulletin");
    Ok(Json(DataRecord::clone(&record)))
}

async fn daily_field(state: &AppState, date: &str, field: &str) -> DailyResult<FieldValue> {
    let date = parse_date(date)?;
    let field: FieldName = field.parse().map_err(error_response)?;

    let value = state
        .cache
        .get_field(date, field)
        .await
        .map_err(error_response)?
        .ok_or_else(|| not_found(date))?;

    Ok(Json(value))
}
