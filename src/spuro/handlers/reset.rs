use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use utoipa::ToSchema;

use super::error_response;
use crate::auth::AuthService;

#[derive(ToSchema, Serialize, Deserialize)]
pub struct ResetRequest {
    pub identity: String,
    pub token: String,
    pub pattern: String,
}

#[utoipa::path(
    post,
    path= "/api/reset",
    request_body = ResetRequest,
    responses (
        (status = 200, description = "Pattern updated"),
        (status = 401, description = "Invalid or expired reset token", body = String),
        (status = 404, description = "Account not found", body = String),
    ),
    tag= "accounts"
)]
pub async fn reset(
    service: Extension<Arc<AuthService>>,
    payload: Option<Json<ResetRequest>>,
) -> impl IntoResponse {
    let request: ResetRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    match service
        .consume_reset(&request.identity, &request.token, &request.pattern)
        .await
    {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "message": "pattern updated" })),
        )
            .into_response(),
        Err(err) => error_response(&err),
    }
}
