//! Admin API key middleware.
//!
//! Guards catalog writes with `Authorization: Bearer <key>`.
//!
//! | Key configured | Environment | Header | Result |
//! |----------------|-------------|--------|--------|
//! | yes | any | matching | request passes |
//! | yes | any | missing or wrong | 401 `Unauthorized` |
//! | no | production | any | 503 `Admin access not configured` |
//! | no | other | any | request passes |

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use secrecy::{ExposeSecret, SecretString};
use subtle::ConstantTimeEq;

use crate::config::{AdminConfig, Environment};

use crate::adapters::http::error::ErrorResponse;

/// Admin key policy shared with the middleware.
#[derive(Clone)]
pub struct AdminAccess {
    key: Option<SecretString>,
    environment: Environment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AdminDecision {
    Allow,
    Unauthorized,
    NotConfigured,
}

impl AdminAccess {
    pub fn new(config: &AdminConfig, environment: Environment) -> Self {
        let key = config
            .api_key
            .as_ref()
            .filter(|k| !k.expose_secret().is_empty())
            .cloned();
        Self { key, environment }
    }

    fn decide(&self, authorization: Option<&str>) -> AdminDecision {
        let Some(expected) = &self.key else {
            return if self.environment == Environment::Production {
                AdminDecision::NotConfigured
            } else {
                AdminDecision::Allow
            };
        };

        let presented = authorization.and_then(|h| h.strip_prefix("Bearer "));
        match presented {
            Some(token) if bool::from(token.as_bytes().ct_eq(expected.expose_secret().as_bytes())) => {
                AdminDecision::Allow
            }
            _ => AdminDecision::Unauthorized,
        }
    }
}

/// Rejects catalog writes that do not carry the admin key.
pub async fn require_admin_key(
    State(access): State<AdminAccess>,
    request: Request,
    next: Next,
) -> Response {
    let authorization = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    match access.decide(authorization) {
        AdminDecision::Allow => next.run(request).await,
        AdminDecision::Unauthorized => {
            tracing::warn!(path = %request.uri().path(), "Rejected admin request");
            (StatusCode::UNAUTHORIZED, Json(ErrorResponse::new("Unauthorized"))).into_response()
        }
        AdminDecision::NotConfigured => {
            tracing::error!("Admin request refused: no admin API key configured");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse::new("Admin access not configured")),
            )
                .into_response()
        }
    }
}
