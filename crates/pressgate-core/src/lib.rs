//! # Pressgate Core
//!
//! 인증 API 서버의 핵심 도메인 모델과 공용 인프라를 제공합니다.
//!
//! 이 크레이트는 다음을 포함합니다:
//! - 사용자/역할/게시물/카테고리 도메인 타입
//! - Credential Store / Content Store 계약 (trait) 및 인메모리 구현
//! - Argon2 비밀번호 해싱
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod password;
pub mod store;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::{init_logging, LogFormat};
pub use password::{hash_password, verify_password, PasswordError};
pub use store::{ContentStore, CredentialStore, MemoryStore};
