//! Credential Store / Content Store 추상화.
//!
//! 인증 계층은 이 trait들을 통해서만 사용자와 콘텐츠에 접근합니다.
//! 각 메서드는 짧은 read-modify-write 단위이며, 단일 메타데이터 쓰기는
//! 구현체 내부에서 원자적으로 처리된다고 가정합니다. 필드 간 트랜잭션은
//! 제공하지 않습니다.

use async_trait::async_trait;

use crate::domain::{
    CategoryWithPosts, NewPost, Post, PostId, PostPatch, PostType, User, UserField, UserId,
};
use crate::error::StoreResult;

mod memory;

pub use memory::MemoryStore;

// =============================================================================
// CredentialStore Trait
// =============================================================================

/// 사용자 자격증명 저장소.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// 필드 값으로 사용자 조회.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound`: 일치하는 사용자 없음
    async fn find_user_by(&self, field: UserField, value: &str) -> StoreResult<User>;

    /// 사용자 생성.
    ///
    /// 비밀번호는 저장 전에 해싱됩니다. 새 사용자의 역할은 `Subscriber`입니다.
    ///
    /// # Errors
    ///
    /// - `StoreError::Duplicate`: 사용자 이름 또는 이메일이 이미 존재
    async fn create_user(&self, username: &str, email: &str, password: &str)
        -> StoreResult<UserId>;

    /// 메타데이터 조회. 키가 없으면 `None`.
    async fn get_metadata(&self, user_id: UserId, key: &str) -> StoreResult<Option<String>>;

    /// 메타데이터 저장. 기존 값은 덮어씁니다.
    async fn set_metadata(&self, user_id: UserId, key: &str, value: &str) -> StoreResult<()>;

    /// 로그인 이름(또는 이메일)과 비밀번호로 인증.
    ///
    /// # Errors
    ///
    /// - `StoreError::InvalidCredentials`: 사용자가 없거나 비밀번호 불일치
    ///   (두 경우를 구분하지 않음)
    async fn authenticate(&self, username: &str, password: &str) -> StoreResult<User>;

    /// 전체 사용자 목록 (ID 순).
    async fn list_users(&self) -> StoreResult<Vec<User>>;

    /// 저장소 상태 확인.
    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}

// =============================================================================
// ContentStore Trait
// =============================================================================

/// 게시물/카테고리 저장소.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// 유형별 게시된(publish) 게시물 목록.
    async fn list_posts(&self, post_type: PostType) -> StoreResult<Vec<Post>>;

    /// 게시물 단건 조회.
    async fn get_post(&self, id: PostId) -> StoreResult<Option<Post>>;

    /// 게시물 생성. 카테고리가 없으면 이름으로 새로 만듭니다.
    async fn create_post(&self, post: NewPost) -> StoreResult<PostId>;

    /// 게시물 부분 수정.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound`: 게시물 없음
    async fn update_post(&self, id: PostId, patch: PostPatch) -> StoreResult<Post>;

    /// 게시물 삭제 후 삭제된 레코드 반환.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound`: 게시물 없음
    async fn delete_post(&self, id: PostId) -> StoreResult<Post>;

    /// 전체 카테고리와 각 카테고리에 속한 게시된 일반 게시물.
    async fn categories_with_posts(&self) -> StoreResult<Vec<CategoryWithPosts>>;

    /// 저장소 상태 확인.
    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}
