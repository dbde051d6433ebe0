//! 토큰 인증 및 요청 권한 부여.
//!
//! # 구성 요소
//!
//! - [`codec`]: HS256 Claim 토큰 인코딩/디코딩
//! - [`minter`]: 불투명 토큰과 Claim 토큰 발급
//! - [`verifier`]: Bearer 토큰 검증, [`VerifiedIdentity`] 추출기
//! - [`guard`]: permission key 기반 라우트 정책
//! - [`flow`]: 가입/로그인 흐름
//!
//! 불투명 토큰과 Claim 토큰은 서로 연결되어 있지 않습니다. 어느 쪽을
//! 검사할지는 라우트마다 다릅니다.
//!
//! # 사용 예시
//!
//! ```rust,ignore
//! RouteDecl::get("/fetch-books", fetch_books).permission(VERIFY_JWT_TOKEN)
//! ```

pub mod codec;
pub mod flow;
pub mod guard;
pub mod minter;
pub mod verifier;

pub use codec::{ClaimSet, CodecError, TokenCodec};
pub use guard::{build_router, require_identity, Policy, PolicyRegistry, RouteDecl, VERIFY_JWT_TOKEN};
pub use minter::SessionMinter;
pub use verifier::{Identity, TokenVerifier, VerifiedIdentity, VerifyError};
