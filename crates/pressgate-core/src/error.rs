//! 저장소 계층 에러 타입.
//!
//! Credential Store / Content Store 구현이 반환하는 에러를 정의합니다.
//! HTTP 상태 코드로의 매핑은 API 크레이트가 담당합니다.

use thiserror::Error;

/// 중복이 발생한 사용자 필드.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateField {
    /// 로그인 이름
    Username,
    /// 이메일 주소
    Email,
}

impl DuplicateField {
    /// 필드 이름 반환.
    pub fn as_str(&self) -> &'static str {
        match self {
            DuplicateField::Username => "username",
            DuplicateField::Email => "email",
        }
    }
}

/// 저장소 에러.
#[derive(Debug, Error)]
pub enum StoreError {
    /// 대상 레코드가 없음
    #[error("찾을 수 없음: {0}")]
    NotFound(String),

    /// 사용자 이름 또는 이메일 중복
    #[error("이미 존재하는 {}", .0.as_str())]
    Duplicate(DuplicateField),

    /// 인증 실패 (사용자 없음과 비밀번호 불일치를 구분하지 않음)
    #[error("잘못된 사용자 이름 또는 비밀번호")]
    InvalidCredentials,

    /// 비밀번호 해싱 실패
    #[error("비밀번호 해싱 실패: {0}")]
    Hashing(String),

    /// 하위 저장소 장애
    #[error("저장소 에러: {0}")]
    Backend(String),
}

/// 저장소 작업을 위한 Result 타입.
pub type StoreResult<T> = Result<T, StoreError>;

impl From<crate::password::PasswordError> for StoreError {
    fn from(err: crate::password::PasswordError) -> Self {
        StoreError::Hashing(err.to_string())
    }
}
