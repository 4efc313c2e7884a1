use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use utoipa::ToSchema;

use super::error_response;
use crate::auth::AuthService;

#[derive(ToSchema, Serialize, Deserialize)]
pub struct LoginRequest {
    pub identity: String,
    pub address: String,
    pub pattern: String,
}

#[utoipa::path(
    post,
    path= "/api/login",
    request_body = LoginRequest,
    responses (
        (status = 200, description = "Pattern accepted, one-time code sent"),
        (status = 401, description = "Invalid credentials", body = String),
        (status = 404, description = "Account not found", body = String),
        (status = 423, description = "Account temporarily locked"),
    ),
    tag= "accounts"
)]
pub async fn login(
    service: Extension<Arc<AuthService>>,
    payload: Option<Json<LoginRequest>>,
) -> impl IntoResponse {
    let request: LoginRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    match service
        .verify_login(&request.identity, &request.address, &request.pattern)
        .await
    {
        Ok(address) => (
            StatusCode::OK,
            Json(json!({ "message": format!("one-time code sent to {address}") })),
        )
            .into_response(),
        Err(err) => error_response(&err),
    }
}
