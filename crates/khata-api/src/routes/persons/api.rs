//! Person API endpoints - JSON API

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use khata_core::{ErrorContext, ExpenseEntry, Person, PersonSummary};
use serde::Deserialize;
use serde_json::json;

use crate::error::{ApiError, ApiResult};
use crate::routes::range::RangeQuery;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreatePerson {
    pub name: String,
}

fn person_context(operation: &str, id: i64) -> ErrorContext {
    ErrorContext::new(operation).with_data("person_id", json!(id))
}

pub async fn api_persons(State(state): State<AppState>) -> ApiResult<Json<Vec<Person>>> {
    let persons = state
        .khata
        .list_persons()
        .await
        .map_err(|e| ApiError::from(e).logged("list_persons"))?;
    Ok(Json(persons))
}

pub async fn api_create_person(
    State(state): State<AppState>,
    body: Result<Json<CreatePerson>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Person>)> {
    let Json(body) = body?;
    let person = state
        .khata
        .add_person(&body.name)
        .await
        .map_err(|e| ApiError::from(e).logged("add_person"))?;
    Ok((StatusCode::CREATED, Json(person)))
}

pub async fn api_person_expenses(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<RangeQuery>,
) -> ApiResult<Json<Vec<ExpenseEntry>>> {
    let range = query.resolve_now(state.config.time_range.default_range)?;
    let entries = state
        .khata
        .list_expenses_by_person(id)
        .await
        .map_err(|e| ApiError::from(e).logged_with(person_context("list_expenses_by_person", id)))?;
    Ok(Json(range.apply(&entries)))
}

pub async fn api_person_summary(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<RangeQuery>,
) -> ApiResult<Json<PersonSummary>> {
    let range = query.resolve_now(state.config.time_range.default_range)?;
    let summary = state
        .khata
        .person_summary(id, range)
        .await
        .map_err(|e| ApiError::from(e).logged_with(person_context("person_summary", id)))?;
    Ok(Json(summary))
}
