// Operation tracking endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde_json::{json, Value};
use tracing::info;

use super::common::{ApiResponse, ApiResult, CleanupQuery};
use crate::bulk::report::render_not_found;
use crate::bulk::types::Operation;
use crate::operation_tracker::OperationSummary;
use crate::web::AppState;

/// All tracked operations, newest first
pub async fn list_operations(State(state): State<AppState>) -> ApiResult<Vec<OperationSummary>> {
    let operations = state.tools.tracker().list_operations().await;
    Ok(Json(ApiResponse::success(operations)))
}

/// Full record of one operation, including items
///
/// Unknown IDs are not an error: the store is in memory, so the reply
/// carries no data and explains why the operation may be gone.
pub async fn get_operation(
    Path(operation_id): Path<String>,
    State(state): State<AppState>,
) -> ApiResult<Operation> {
    Ok(Json(
        match state.tools.tracker().get_operation(&operation_id).await {
            Some(operation) => ApiResponse::success(operation),
            None => ApiResponse::notice(render_not_found(&operation_id)),
        },
    ))
}

/// Drop finished operations older than `max_hours`
pub async fn cleanup_operations(
    Query(query): Query<CleanupQuery>,
    State(state): State<AppState>,
) -> ApiResult<Value> {
    if query.max_hours < 0 {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error(format!(
                "max_hours must not be negative (got {})",
                query.max_hours
            ))),
        ));
    }

    info!(
        "Cleanup requested for operations older than {} hours",
        query.max_hours
    );

    let cleaned_count = state
        .tools
        .tracker()
        .cleanup_old_operations(query.max_hours)
        .await;

    Ok(Json(ApiResponse::success(json!({
        "message": format!("Cleanup completed: {} operations removed", cleaned_count),
        "cleaned_count": cleaned_count
    }))))
}
