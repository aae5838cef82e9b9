use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use common::prelude::AuthError;

use crate::http_server::paths::PathError;

pub const CODE_OK: i32 = 1;
pub const CODE_FAILED: i32 = -1;
pub const CODE_DISABLED: i32 = -2;
pub const CODE_UNAUTHORIZED: i32 = -3;

const MSG_OK: &str = "operation succeeded";
const MSG_FAILED: &str = "operation failed";

/// JSON body shared by every API handler
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub code: i32,
    pub msg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub err: Option<String>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            code: CODE_OK,
            msg: MSG_OK.to_string(),
            data: Some(data),
            err: None,
        }
    }

    pub fn failure(code: i32, err: impl Into<String>) -> Self {
        Self {
            code,
            msg: MSG_FAILED.to_string(),
            data: None,
            err: Some(err.into()),
        }
    }
}

impl Envelope<()> {
    /// Success without a payload
    pub fn done() -> Self {
        Self {
            code: CODE_OK,
            msg: MSG_OK.to_string(),
            data: None,
            err: None,
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("feature is not enabled")]
    Disabled,
    #[error("invalid path: {0}")]
    Path(#[from] PathError),
    #[error("{0}")]
    BadRequest(String),
    #[error("multipart error: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    pub fn code(&self) -> i32 {
        match self {
            ApiError::Auth(AuthError::RandomnessUnavailable(_)) => CODE_FAILED,
            ApiError::Auth(_) => CODE_UNAUTHORIZED,
            ApiError::Disabled => CODE_DISABLED,
            ApiError::Path(_)
            | ApiError::BadRequest(_)
            | ApiError::Multipart(_)
            | ApiError::Io(_) => CODE_FAILED,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Auth(AuthError::RandomnessUnavailable(e)) => {
                tracing::error!("api: could not mint session: {}", e)
            }
            ApiError::Auth(e) => tracing::warn!("api: rejected request: {}", e),
            ApiError::Disabled => tracing::warn!("api: rejected request for disabled feature"),
            ApiError::Io(e) => tracing::error!("api: operation failed: {}", e),
            e => tracing::warn!("api: bad request: {}", e),
        }
        Envelope::<()>::failure(self.code(), self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_omits_empty_fields() {
        let body = serde_json::to_value(Envelope::done()).unwrap();
        assert_eq!(body, serde_json::json!({"code": 1, "msg": MSG_OK}));

        let body = serde_json::to_value(Envelope::<()>::failure(CODE_DISABLED, "off")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"code": -2, "msg": MSG_FAILED, "err": "off"})
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(ApiError::from(AuthError::Expired).code(), CODE_UNAUTHORIZED);
        assert_eq!(ApiError::from(AuthError::InvalidSecret).code(), CODE_UNAUTHORIZED);
        assert_eq!(ApiError::Disabled.code(), CODE_DISABLED);
        assert_eq!(
            ApiError::from(AuthError::RandomnessUnavailable("no entropy".into())).code(),
            CODE_FAILED
        );
        assert_eq!(
            ApiError::from(PathError::Traversal("..".into())).code(),
            CODE_FAILED
        );
    }

    #[test]
    fn test_errors_answer_with_http_ok() {
        let response = ApiError::Disabled.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
