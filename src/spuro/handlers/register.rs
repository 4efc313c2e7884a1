use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use utoipa::ToSchema;

use super::error_response;
use crate::auth::AuthService;

#[derive(ToSchema, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub identity: String,
    pub address: String,
    pub pattern: String,
}

#[utoipa::path(
    post,
    path= "/api/register",
    request_body = RegisterRequest,
    responses (
        (status = 201, description = "Account created"),
        (status = 400, description = "Malformed identity, address, or pattern", body = String),
        (status = 409, description = "Account with the specified identity already exists", body = String),
    ),
    tag= "accounts"
)]
pub async fn register(
    service: Extension<Arc<AuthService>>,
    payload: Option<Json<RegisterRequest>>,
) -> impl IntoResponse {
    let request: RegisterRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    match service
        .register(&request.identity, &request.address, &request.pattern)
        .await
    {
        Ok(()) => (
            StatusCode::CREATED,
            Json(json!({ "message": "account created" })),
        )
            .into_response(),
        Err(err) => error_response(&err),
    }
}
