//! 토큰 인증 JSON API 서버.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - HS256 Claim 토큰 코덱과 불투명 세션 토큰 발급
//! - Bearer 토큰 검증 및 permission key 기반 라우트 가드
//! - 가입/로그인 흐름과 게시물 API
//! - 헬스 체크 엔드포인트
//! - Prometheus 메트릭
//!
//! # 모듈 구성
//!
//! - [`auth`]: 코덱, 발급기, 검증기, 가드, 가입/로그인 흐름
//! - [`state`]: 애플리케이션 공유 상태 (AppState)
//! - [`routes`]: 라우트 선언과 핸들러
//! - [`params`]: JSON/form/쿼리 파라미터 추출
//! - [`metrics`]: Prometheus 메트릭 수집
//! - [`middleware`]: HTTP 미들웨어

pub mod auth;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod params;
pub mod routes;
pub mod state;

pub use auth::{
    ClaimSet, CodecError, Identity, SessionMinter, TokenCodec, TokenVerifier, VerifiedIdentity,
    VerifyError,
};
pub use error::{ApiError, ApiErrorResponse, ApiResult};
pub use metrics::setup_metrics_recorder;
pub use middleware::metrics_layer;
pub use routes::{create_api_router, route_table};
pub use state::AppState;

#[cfg(any(test, feature = "test-utils"))]
pub use state::{create_test_state, TEST_JWT_SECRET};
