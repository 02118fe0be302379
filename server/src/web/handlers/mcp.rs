// JSON-RPC over HTTP

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use tracing::warn;

use crate::mcp::protocol::{error_codes, JsonRpcError, JsonRpcRequest, JsonRpcResponse};
use crate::web::AppState;

/// `POST /mcp`: one JSON-RPC message per request; notifications get 202
pub async fn handle_mcp(State(state): State<AppState>, body: String) -> Response {
    let request: JsonRpcRequest = match serde_json::from_str(&body) {
        Ok(request) => request,
        Err(e) => {
            warn!("Rejected malformed MCP request: {}", e);
            let response = JsonRpcResponse::failure(
                None,
                JsonRpcError {
                    code: error_codes::PARSE_ERROR,
                    message: format!("Parse error: {}", e),
                    data: None,
                },
            );
            return (StatusCode::BAD_REQUEST, Json(response)).into_response();
        }
    };

    match state.mcp.handle_request(request).await {
        Some(response) => Json(response).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}
