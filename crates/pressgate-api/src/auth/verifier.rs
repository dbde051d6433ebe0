//! Bearer 토큰 검증.
//!
//! `Authorization: Bearer <token>` 헤더를 검증하고 요청 주체를 식별합니다.
//! 폐기 목록은 없으므로 만료 전 토큰은 재로그인이나 비밀번호 변경 후에도
//! 계속 유효합니다.

use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use pressgate_core::UserId;

use super::codec::{ClaimSet, CodecError, TokenCodec};
use crate::error::ApiError;

/// 검증된 요청 주체.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
}

/// 토큰 검증 에러.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum VerifyError {
    #[error("인증 토큰이 필요합니다")]
    MissingToken,
    #[error("잘못된 Authorization 헤더 형식")]
    MalformedHeader,
    #[error("잘못된 토큰 형식")]
    MalformedToken,
    #[error("토큰 서명이 유효하지 않습니다")]
    InvalidSignature,
    #[error("토큰이 만료되었습니다")]
    TokenExpired,
}

impl VerifyError {
    pub fn code(&self) -> &'static str {
        match self {
            VerifyError::MissingToken => "MISSING_TOKEN",
            VerifyError::MalformedHeader => "MALFORMED_HEADER",
            VerifyError::MalformedToken => "MALFORMED_TOKEN",
            VerifyError::InvalidSignature => "INVALID_SIGNATURE",
            VerifyError::TokenExpired => "TOKEN_EXPIRED",
        }
    }

    /// 메트릭 라벨용 소문자 이름.
    pub fn label(&self) -> &'static str {
        match self {
            VerifyError::MissingToken => "missing_token",
            VerifyError::MalformedHeader => "malformed_header",
            VerifyError::MalformedToken => "malformed_token",
            VerifyError::InvalidSignature => "invalid_signature",
            VerifyError::TokenExpired => "token_expired",
        }
    }
}

impl From<CodecError> for VerifyError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::MalformedToken => VerifyError::MalformedToken,
            // 알고리즘 불일치도 서명 실패로 응답
            CodecError::InvalidSignature
            | CodecError::AlgorithmMismatch
            | CodecError::Encode(_) => VerifyError::InvalidSignature,
        }
    }
}

impl IntoResponse for VerifyError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}

/// Bearer 토큰 검증기.
#[derive(Debug, Clone)]
pub struct TokenVerifier {
    codec: Arc<TokenCodec>,
}

impl TokenVerifier {
    pub fn new(codec: Arc<TokenCodec>) -> Self {
        Self { codec }
    }

    /// 현재 시각 기준 검증.
    pub fn verify(&self, header: Option<&str>) -> Result<Identity, VerifyError> {
        self.verify_at(header, Utc::now().timestamp())
    }

    /// 주어진 시각 기준 검증.
    pub fn verify_at(&self, header: Option<&str>, now: i64) -> Result<Identity, VerifyError> {
        let claims = self.claims_at(header, now)?;
        Ok(Identity {
            user_id: claims.user_id,
        })
    }

    /// 요청 헤더에서 Authorization 값을 꺼내 검증.
    ///
    /// UTF-8이 아닌 헤더 값은 `MalformedHeader`로 처리합니다.
    pub fn verify_headers(&self, headers: &HeaderMap) -> Result<Identity, VerifyError> {
        let header = headers
            .get(AUTHORIZATION)
            .map(|value: &HeaderValue| value.to_str().map_err(|_| VerifyError::MalformedHeader))
            .transpose()?;
        self.verify(header)
    }

    /// 검증 후 전체 Claim 반환.
    pub fn claims_at(&self, header: Option<&str>, now: i64) -> Result<ClaimSet, VerifyError> {
        let token = bearer_token(header.ok_or(VerifyError::MissingToken)?)?;
        let claims = self.codec.decode(token)?;

        if claims.is_expired_at(now) {
            return Err(VerifyError::TokenExpired);
        }
        Ok(claims)
    }
}

/// `Bearer ` 접두사 뒤 첫 번째 공백 구분 단어.
fn bearer_token(header: &str) -> Result<&str, VerifyError> {
    header
        .strip_prefix("Bearer ")
        .and_then(|rest| rest.split_whitespace().next())
        .ok_or(VerifyError::MalformedHeader)
}

/// 라우트 가드가 요청 확장에 넣어 둔 [`Identity`] 추출기.
///
/// 가드가 없는 라우트에서 사용하면 `MissingToken`으로 거부됩니다.
///
/// ```rust,ignore
/// async fn create_post(VerifiedIdentity(identity): VerifiedIdentity) -> impl IntoResponse {
///     format!("author = {}", identity.user_id)
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct VerifiedIdentity(pub Identity);

impl<S> FromRequestParts<S> for VerifiedIdentity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .copied()
            .map(VerifiedIdentity)
            .ok_or(ApiError::Verify(VerifyError::MissingToken))
    }
}
