//! Expense API endpoints - JSON API

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use khata_core::{ExpenseEntry, FactorySummary, NewExpenseEntry};

use crate::error::{ApiError, ApiResult};
use crate::routes::range::RangeQuery;
use crate::AppState;

pub async fn api_expenses(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> ApiResult<Json<Vec<ExpenseEntry>>> {
    let range = query.resolve_now(state.config.time_range.default_range)?;
    let entries = state
        .khata
        .list_expenses()
        .await
        .map_err(|e| ApiError::from(e).logged("list_expenses"))?;
    Ok(Json(range.apply(&entries)))
}

pub async fn api_create_expense(
    State(state): State<AppState>,
    body: Result<Json<NewExpenseEntry>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ExpenseEntry>)> {
    let Json(entry) = body?;
    let entry = state
        .khata
        .add_expense_entry(entry)
        .await
        .map_err(|e| ApiError::from(e).logged("add_expense_entry"))?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// Organization-wide totals
pub async fn api_summary(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> ApiResult<Json<FactorySummary>> {
    let range = query.resolve_now(state.config.time_range.default_range)?;
    let summary = state
        .khata
        .factory_summary(range)
        .await
        .map_err(|e| ApiError::from(e).logged("factory_summary"))?;
    Ok(Json(summary))
}
