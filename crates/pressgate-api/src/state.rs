//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! 저장소는 `Arc<dyn …>`로 공유되며, 코덱은 한 번 생성되어
//! 발급기와 검증기가 함께 사용합니다.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use pressgate_core::{AuthConfig, ContentStore, CredentialStore, MemoryStore};

use crate::auth::{SessionMinter, TokenCodec, TokenVerifier};

/// 애플리케이션 공유 상태.
#[derive(Clone)]
pub struct AppState {
    /// 사용자 자격증명 저장소
    pub credentials: Arc<dyn CredentialStore>,

    /// 게시물/카테고리 저장소
    pub content: Arc<dyn ContentStore>,

    /// 불투명 토큰 / Claim 토큰 발급기
    pub minter: SessionMinter,

    /// Bearer 토큰 검증기
    pub verifier: TokenVerifier,

    /// 로그인 시 설정하는 쿠키 이름
    pub session_cookie_name: String,

    /// 로그인 쿠키 Max-Age (초)
    pub session_cookie_ttl_secs: i64,

    /// 서버 시작 시간
    pub started_at: DateTime<Utc>,

    /// API 버전
    pub version: String,
}

impl AppState {
    /// 인증 설정과 저장소로 상태 생성.
    pub fn new(
        auth: &AuthConfig,
        credentials: Arc<dyn CredentialStore>,
        content: Arc<dyn ContentStore>,
    ) -> Self {
        let codec = Arc::new(TokenCodec::new(&auth.jwt_secret));

        Self {
            credentials,
            content,
            minter: SessionMinter::from_config(Arc::clone(&codec), auth),
            verifier: TokenVerifier::new(codec),
            session_cookie_name: auth.session_cookie_name.clone(),
            session_cookie_ttl_secs: auth.session_cookie_ttl_secs,
            started_at: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// 인메모리 저장소 하나를 자격증명/콘텐츠 양쪽에 사용하는 상태.
    pub fn in_memory(auth: &AuthConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::new(auth, store.clone(), store)
    }

    /// 서버 업타임(초) 반환.
    pub fn uptime_secs(&self) -> i64 {
        Utc::now().signed_duration_since(self.started_at).num_seconds()
    }

    /// 로그인 응답의 `Set-Cookie` 값.
    pub fn session_cookie(&self, token: &str) -> String {
        format!(
            "{}={}; Max-Age={}; Path=/",
            self.session_cookie_name, token, self.session_cookie_ttl_secs
        )
    }
}

/// 테스트용 AppState 생성 헬퍼.
///
/// 고정 비밀 키와 빈 인메모리 저장소를 사용합니다.
#[cfg(any(test, feature = "test-utils"))]
pub fn create_test_state() -> AppState {
    AppState::in_memory(&AuthConfig::with_secret(TEST_JWT_SECRET))
}

#[cfg(any(test, feature = "test-utils"))]
pub const TEST_JWT_SECRET: &str = "test-secret-key-for-jwt-testing-minimum-32-chars";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_format() {
        let state = create_test_state();
        assert_eq!(
            state.session_cookie("abc"),
            "custom_token=abc; Max-Age=3600; Path=/"
        );
    }

    #[test]
    fn test_state_can_sign_with_secret() {
        assert!(create_test_state().minter.can_sign());
        assert!(!AppState::in_memory(&AuthConfig::default()).minter.can_sign());
    }
}
