//! Settings API endpoints - JSON API

use axum::extract::State;
use axum::Json;
use serde_json::Value;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Effective configuration. The remote API key never serializes.
pub async fn api_settings(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let remote_configured = state.config.storage.active_remote().is_some();
    let mut settings =
        serde_json::to_value(&state.config).map_err(|e| ApiError::from(e).logged("settings"))?;
    settings["storage"]["remote_configured"] = Value::Bool(remote_configured);
    Ok(Json(settings))
}
