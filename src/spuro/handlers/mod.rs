pub mod health;
pub use self::health::health;

pub mod register;
pub use self::register::register;

pub mod login;
pub use self::login::login;

pub mod otp;
pub use self::otp::verify_otp;

pub mod forgot;
pub use self::forgot::forgot;

pub mod reset;
pub use self::reset::reset;

// common functions for the handlers
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use tracing::error;

use crate::auth::AuthError;

/// Map a service error onto the wire. Pattern and address mismatches share
/// one message so a response never reveals which part was wrong.
pub(crate) fn error_response(err: &AuthError) -> Response {
    match err {
        AuthError::Validation(msg) => {
            (StatusCode::BAD_REQUEST, (*msg).to_string()).into_response()
        }
        AuthError::NotFound => {
            (StatusCode::NOT_FOUND, "Account not found".to_string()).into_response()
        }
        AuthError::AlreadyExists => {
            (StatusCode::CONFLICT, "Account already exists".to_string()).into_response()
        }
        AuthError::PatternMismatch | AuthError::AddressMismatch => {
            (StatusCode::UNAUTHORIZED, "Invalid credentials".to_string()).into_response()
        }
        AuthError::InvalidOtp => {
            (StatusCode::UNAUTHORIZED, "Invalid one-time code".to_string()).into_response()
        }
        AuthError::InvalidResetToken => (
            StatusCode::UNAUTHORIZED,
            "Invalid or expired reset token".to_string(),
        )
            .into_response(),
        AuthError::Locked { until } => (
            StatusCode::LOCKED,
            Json(json!({
                "error": "account temporarily locked",
                "locked_until": until.to_rfc3339(),
            })),
        )
            .into_response(),
        AuthError::Delivery(err) => {
            error!("Failed to send email: {err:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to send email".to_string(),
            )
                .into_response()
        }
        AuthError::Store(err) => {
            error!("Store failure: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
                .into_response()
        }
        AuthError::Internal(err) => {
            error!("Internal failure: {err:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthConfig;
    use crate::auth::AuthService;
    use crate::notify::LogNotifier;
    use crate::store::{CredentialStore, MemoryStore};
    use axum::Extension;
    use std::sync::Arc;

    fn service_with_store() -> (Extension<Arc<AuthService>>, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let service = Arc::new(AuthService::new(
            store.clone(),
            Arc::new(LogNotifier),
            AuthConfig::new("http://localhost:8080".to_string()),
        ));
        (Extension(service), store)
    }

    fn register_payload() -> Json<register::RegisterRequest> {
        Json(register::RegisterRequest {
            identity: "alice".to_string(),
            address: "a@x.com".to_string(),
            pattern: "3-1-4".to_string(),
        })
    }

    #[tokio::test]
    async fn register_created_then_conflict() {
        let (service, _) = service_with_store();

        let response = register(service.clone(), Some(register_payload()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = register(service, Some(register_payload()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn missing_payload_is_bad_request() {
        let (service, _) = service_with_store();
        let response = register(service, None).await.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn login_unknown_identity_is_not_found() {
        let (service, _) = service_with_store();
        let payload = Json(login::LoginRequest {
            identity: "nobody".to_string(),
            address: "a@x.com".to_string(),
            pattern: "3-1-4".to_string(),
        });
        let response = login(service, Some(payload)).await.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn login_wrong_pattern_is_unauthorized_then_locked() {
        let (service, _) = service_with_store();
        register(service.clone(), Some(register_payload())).await;

        let payload = || {
            Some(Json(login::LoginRequest {
                identity: "alice".to_string(),
                address: "a@x.com".to_string(),
                pattern: "9-9-9".to_string(),
            }))
        };

        for _ in 0..4 {
            let response = login(service.clone(), payload()).await.into_response();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        }

        let response = login(service, payload()).await.into_response();
        assert_eq!(response.status(), StatusCode::LOCKED);
    }

    #[tokio::test]
    async fn login_then_otp_roundtrip() {
        let (service, store) = service_with_store();
        register(service.clone(), Some(register_payload())).await;

        let payload = Json(login::LoginRequest {
            identity: "alice".to_string(),
            address: "a@x.com".to_string(),
            pattern: "3-1-4".to_string(),
        });
        let response = login(service.clone(), Some(payload)).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let account = store.find("alice").await.unwrap().unwrap();
        let code = crate::auth::otp::issue(&account.otp_secret, "Spuro", "alice").unwrap();
        let payload = Json(otp::OtpRequest {
            identity: "alice".to_string(),
            code,
        });
        let response = verify_otp(service, Some(payload)).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn forgot_accepted_and_bogus_reset_rejected() {
        let (service, _) = service_with_store();
        register(service.clone(), Some(register_payload())).await;

        let payload = Json(forgot::ForgotRequest {
            identity: "alice".to_string(),
            address: "a@x.com".to_string(),
        });
        let response = forgot(service.clone(), Some(payload)).await.into_response();
        assert_eq!(response.status(), StatusCode::ACCEPTED);

        let payload = Json(reset::ResetRequest {
            identity: "alice".to_string(),
            token: "bogus".to_string(),
            pattern: "5-5-5".to_string(),
        });
        let response = reset(service, Some(payload)).await.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
