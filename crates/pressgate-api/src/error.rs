//! API 에러 타입.
//!
//! 모든 엔드포인트가 같은 에러 본문을 사용합니다.
//!
//! ```json
//! {
//!   "code": "TOKEN_EXPIRED",
//!   "message": "토큰이 만료되었습니다",
//!   "timestamp": 1738300800
//! }
//! ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pressgate_core::{DuplicateField, StoreError};
use serde::{Deserialize, Serialize};

use crate::auth::{CodecError, VerifyError};

/// 에러 응답 본문.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// 에러 코드 (예: "MISSING_TOKEN", "DUPLICATE")
    pub code: String,
    /// 사람이 읽을 수 있는 에러 메시지
    pub message: String,
    /// 에러 발생 타임스탬프 (Unix timestamp)
    pub timestamp: i64,
}

impl ApiErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

impl std::fmt::Display for ApiErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

/// API 에러.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("필수 항목이 누락되었습니다: {0}")]
    MissingField(&'static str),

    #[error("{field} 값이 올바르지 않습니다")]
    InvalidField { field: String },

    #[error("요청을 해석할 수 없습니다: {0}")]
    InvalidRequest(String),

    #[error("이미 사용 중인 {}입니다", .0.as_str())]
    Duplicate(DuplicateField),

    #[error("사용자 이름 또는 비밀번호가 올바르지 않습니다")]
    InvalidCredentials,

    #[error(transparent)]
    Verify(#[from] VerifyError),

    #[error("발급된 API 토큰이 없습니다")]
    TokenNotFound,

    #[error("찾을 수 없습니다: {0}")]
    NotFound(String),

    #[error("토큰을 발급할 수 없습니다: {0}")]
    Encode(String),

    #[error("저장소 오류: {0}")]
    Store(String),
}

impl ApiError {
    /// 안정적인 에러 코드.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::MissingField(_) => "MISSING_FIELD",
            ApiError::InvalidField { .. } => "INVALID_FIELD",
            ApiError::InvalidRequest(_) => "INVALID_REQUEST",
            ApiError::Duplicate(_) => "DUPLICATE",
            ApiError::InvalidCredentials => "INVALID_CREDENTIALS",
            ApiError::Verify(e) => e.code(),
            ApiError::TokenNotFound => "TOKEN_NOT_FOUND",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Encode(_) => "ENCODE_ERROR",
            ApiError::Store(_) => "STORE_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingField(_)
            | ApiError::InvalidField { .. }
            | ApiError::InvalidRequest(_)
            | ApiError::Duplicate(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials | ApiError::Verify(_) | ApiError::TokenNotFound => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Encode(_) | ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn invalid_field(field: impl Into<String>) -> Self {
        ApiError::InvalidField {
            field: field.into(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => ApiError::NotFound(what),
            StoreError::Duplicate(field) => ApiError::Duplicate(field),
            StoreError::InvalidCredentials => ApiError::InvalidCredentials,
            StoreError::Hashing(msg) | StoreError::Backend(msg) => ApiError::Store(msg),
        }
    }
}

impl From<CodecError> for ApiError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::Encode(msg) => ApiError::Encode(msg),
            other => ApiError::Verify(VerifyError::from(other)),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(code = self.code(), error = %self, "Request failed");
        }

        let body = ApiErrorResponse::new(self.code(), self.to_string());
        (status, Json(body)).into_response()
    }
}

/// API 핸들러 Result 타입.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_and_status() {
        let cases = vec![
            (ApiError::MissingField("email"), "MISSING_FIELD", 400),
            (ApiError::invalid_field("email"), "INVALID_FIELD", 400),
            (ApiError::InvalidRequest("bad json".into()), "INVALID_REQUEST", 400),
            (ApiError::Duplicate(DuplicateField::Email), "DUPLICATE", 400),
            (ApiError::InvalidCredentials, "INVALID_CREDENTIALS", 401),
            (VerifyError::MissingToken.into(), "MISSING_TOKEN", 401),
            (VerifyError::MalformedHeader.into(), "MALFORMED_HEADER", 401),
            (VerifyError::MalformedToken.into(), "MALFORMED_TOKEN", 401),
            (VerifyError::InvalidSignature.into(), "INVALID_SIGNATURE", 401),
            (VerifyError::TokenExpired.into(), "TOKEN_EXPIRED", 401),
            (ApiError::TokenNotFound, "TOKEN_NOT_FOUND", 401),
            (ApiError::NotFound("post 1".into()), "NOT_FOUND", 404),
            (ApiError::Encode("no key".into()), "ENCODE_ERROR", 500),
            (ApiError::Store("down".into()), "STORE_ERROR", 500),
        ];

        for (error, code, status) in cases {
            assert_eq!(error.code(), code);
            assert_eq!(error.status().as_u16(), status, "{}", code);
        }
    }

    #[test]
    fn test_store_error_mapping() {
        assert!(matches!(
            ApiError::from(StoreError::Duplicate(DuplicateField::Username)),
            ApiError::Duplicate(DuplicateField::Username)
        ));
        assert!(matches!(
            ApiError::from(StoreError::InvalidCredentials),
            ApiError::InvalidCredentials
        ));
        assert!(matches!(
            ApiError::from(StoreError::Hashing("x".into())),
            ApiError::Store(_)
        ));
    }

    #[test]
    fn test_codec_error_mapping() {
        assert_eq!(ApiError::from(CodecError::Encode("x".into())).code(), "ENCODE_ERROR");
        assert_eq!(
            ApiError::from(CodecError::AlgorithmMismatch).code(),
            "INVALID_SIGNATURE"
        );
        assert_eq!(ApiError::from(CodecError::MalformedToken).code(), "MALFORMED_TOKEN");
    }

    #[tokio::test]
    async fn test_into_response_body() {
        let response = VerifyError::TokenExpired.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let error: ApiErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.code, "TOKEN_EXPIRED");
        assert!(error.timestamp > 0);
    }

    #[test]
    fn test_display() {
        let error = ApiErrorResponse::new("NOT_FOUND", "missing");
        assert_eq!(error.to_string(), "[NOT_FOUND] missing");
    }
}
