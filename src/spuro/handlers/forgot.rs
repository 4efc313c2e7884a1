use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use utoipa::ToSchema;

use super::error_response;
use crate::auth::AuthService;

#[derive(ToSchema, Serialize, Deserialize)]
pub struct ForgotRequest {
    pub identity: String,
    pub address: String,
}

#[utoipa::path(
    post,
    path= "/api/forgot",
    request_body = ForgotRequest,
    responses (
        (status = 202, description = "Reset link sent"),
        (status = 401, description = "Invalid credentials", body = String),
        (status = 404, description = "Account not found", body = String),
    ),
    tag= "accounts"
)]
pub async fn forgot(
    service: Extension<Arc<AuthService>>,
    payload: Option<Json<ForgotRequest>>,
) -> impl IntoResponse {
    let request: ForgotRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    match service
        .request_reset(&request.identity, &request.address)
        .await
    {
        Ok(address) => (
            StatusCode::ACCEPTED,
            Json(json!({ "message": format!("reset link sent to {address}") })),
        )
            .into_response(),
        Err(err) => error_response(&err),
    }
}
