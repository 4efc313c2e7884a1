use axum::response::{IntoResponse, Json};
use utoipa::OpenApi;

use super::handlers::{forgot, health, login, otp, register, reset};

#[derive(OpenApi)]
#[openapi(
    info(description = "Pattern-based authentication service"),
    paths(
        health::health,
        register::register,
        login::login,
        otp::verify_otp,
        forgot::forgot,
        reset::reset,
    ),
    components(schemas(
        health::Health,
        register::RegisterRequest,
        login::LoginRequest,
        otp::OtpRequest,
        forgot::ForgotRequest,
        reset::ResetRequest,
    )),
    tags(
        (name = "accounts", description = "Registration, login, and pattern recovery"),
        (name = "health", description = "Service health"),
    )
)]
pub struct ApiDoc;

// axum handler serving the generated spec
pub async fn serve() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}
