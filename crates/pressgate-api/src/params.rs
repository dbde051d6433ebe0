//! 요청 파라미터 추출.
//!
//! 같은 엔드포인트에 JSON 본문, form 본문, 쿼리 문자열이 모두 올 수 있으므로
//! `Content-Type`에 따라 추출 방식을 고릅니다.

use axum::{
    extract::{FromRequest, Query, Request},
    http::header::CONTENT_TYPE,
    Form, Json,
};
use serde::{de::DeserializeOwned, Deserialize};

use crate::error::{ApiError, ApiResult};

/// JSON / form / 쿼리 문자열 통합 추출기.
///
/// - `application/json` → JSON 본문
/// - `application/x-www-form-urlencoded` → form 본문
/// - 그 외 → 쿼리 문자열
///
/// 해석 실패는 `INVALID_REQUEST`(400)로 응답합니다.
#[derive(Debug, Clone)]
pub struct Params<T>(pub T);

impl<S, T> FromRequest<S> for Params<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("application/json") {
            let Json(value) = Json::<T>::from_request(req, state)
                .await
                .map_err(|e| ApiError::InvalidRequest(e.body_text()))?;
            Ok(Params(value))
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(value) = Form::<T>::from_request(req, state)
                .await
                .map_err(|e| ApiError::InvalidRequest(e.body_text()))?;
            Ok(Params(value))
        } else {
            let Query(value) = Query::<T>::try_from_uri(req.uri())
                .map_err(|e| ApiError::InvalidRequest(e.body_text()))?;
            Ok(Params(value))
        }
    }
}

/// 숫자 또는 문자열로 전달되는 ID.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum IdParam {
    Number(u64),
    Text(String),
}

impl IdParam {
    /// 양의 정수 ID로 변환.
    pub fn parse(&self, field: &'static str) -> ApiResult<u64> {
        let id = match self {
            IdParam::Number(n) => Some(*n),
            IdParam::Text(s) => s.trim().parse::<u64>().ok(),
        };
        id.filter(|id| *id > 0)
            .ok_or_else(|| ApiError::invalid_field(field))
    }
}

/// 필수 ID 파라미터.
pub fn required_id(value: Option<&IdParam>, field: &'static str) -> ApiResult<u64> {
    match value {
        None => Err(ApiError::MissingField(field)),
        Some(IdParam::Text(s)) if s.trim().is_empty() => Err(ApiError::MissingField(field)),
        Some(id) => id.parse(field),
    }
}

/// 비어 있지 않은 선택 문자열. 공백만 있으면 `None`.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
