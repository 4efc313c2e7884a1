use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use utoipa::ToSchema;

use super::error_response;
use crate::auth::AuthService;

#[derive(ToSchema, Serialize, Deserialize)]
pub struct OtpRequest {
    pub identity: String,
    pub code: String,
}

#[utoipa::path(
    post,
    path= "/api/verify-otp",
    request_body = OtpRequest,
    responses (
        (status = 200, description = "One-time code accepted"),
        (status = 401, description = "Invalid one-time code", body = String),
        (status = 404, description = "Account not found", body = String),
    ),
    tag= "accounts"
)]
pub async fn verify_otp(
    service: Extension<Arc<AuthService>>,
    payload: Option<Json<OtpRequest>>,
) -> impl IntoResponse {
    let request: OtpRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    match service.confirm_otp(&request.identity, &request.code).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "message": "login successful" })),
        )
            .into_response(),
        Err(err) => error_response(&err),
    }
}
