//! 인메모리 저장소.
//!
//! 단일 프로세스 서버와 테스트에서 사용하는 Credential/Content Store 구현입니다.
//! 모든 상태는 하나의 `RwLock` 뒤에 있으며 각 메서드는 잠금을 한 번만 잡습니다.
//! 비밀번호 해싱/검증은 잠금 밖에서 수행합니다.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{ContentStore, CredentialStore};
use crate::domain::{
    category_slug, nicename_for, Category, CategoryWithPosts, NewPost, Post, PostId, PostPatch,
    PostStatus, PostSummary, PostType, Role, User, UserField, UserId,
};
use crate::error::{DuplicateField, StoreError, StoreResult};
use crate::password::{hash_password, verify_password};

#[derive(Debug)]
struct Inner {
    users: BTreeMap<UserId, User>,
    next_user_id: UserId,
    posts: BTreeMap<PostId, Post>,
    next_post_id: PostId,
    categories: Vec<Category>,
}

impl Inner {
    fn find_user(&self, field: UserField, value: &str) -> Option<&User> {
        match field {
            UserField::Id => value
                .trim()
                .parse::<UserId>()
                .ok()
                .and_then(|id| self.users.get(&id)),
            UserField::Login => self
                .users
                .values()
                .find(|u| u.username.eq_ignore_ascii_case(value.trim())),
            UserField::Email => self
                .users
                .values()
                .find(|u| u.email.eq_ignore_ascii_case(value.trim())),
        }
    }

    /// 이름으로 카테고리를 찾고, 없으면 새로 만든 뒤 slug 반환.
    fn ensure_category(&mut self, name: &str) -> String {
        let slug = category_slug(name);
        if !self.categories.iter().any(|c| c.slug == slug) {
            let id = self.categories.iter().map(|c| c.id).max().unwrap_or(0) + 1;
            self.categories.push(Category {
                id,
                name: name.trim().to_string(),
                slug: slug.clone(),
                description: String::new(),
            });
        }
        slug
    }
}

/// 인메모리 Credential/Content Store.
#[derive(Debug)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// 빈 저장소 생성. 기본 카테고리 `Uncategorized`만 존재합니다.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                users: BTreeMap::new(),
                next_user_id: 1,
                posts: BTreeMap::new(),
                next_post_id: 1,
                categories: vec![Category {
                    id: 1,
                    name: "Uncategorized".to_string(),
                    slug: "uncategorized".to_string(),
                    description: String::new(),
                }],
            }),
        }
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn find_user_by(&self, field: UserField, value: &str) -> StoreResult<User> {
        self.inner
            .read()
            .await
            .find_user(field, value)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("user {:?}={}", field, value)))
    }

    async fn create_user(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> StoreResult<UserId> {
        let username = username.trim();
        let email = email.trim();
        let password_hash = hash_password(password)?;

        let mut inner = self.inner.write().await;
        if inner.find_user(UserField::Login, username).is_some() {
            return Err(StoreError::Duplicate(DuplicateField::Username));
        }
        if inner.find_user(UserField::Email, email).is_some() {
            return Err(StoreError::Duplicate(DuplicateField::Email));
        }

        let id = inner.next_user_id;
        inner.next_user_id += 1;
        inner.users.insert(
            id,
            User {
                id,
                username: username.to_string(),
                email: email.to_string(),
                password_hash,
                role: Role::Subscriber,
                nicename: nicename_for(username),
                display_name: username.to_string(),
                metadata: HashMap::new(),
            },
        );

        tracing::debug!(user_id = id, "User created");
        Ok(id)
    }

    async fn get_metadata(&self, user_id: UserId, key: &str) -> StoreResult<Option<String>> {
        let inner = self.inner.read().await;
        let user = inner
            .users
            .get(&user_id)
            .ok_or_else(|| StoreError::NotFound(format!("user {}", user_id)))?;
        Ok(user.metadata.get(key).cloned())
    }

    async fn set_metadata(&self, user_id: UserId, key: &str, value: &str) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        let user = inner
            .users
            .get_mut(&user_id)
            .ok_or_else(|| StoreError::NotFound(format!("user {}", user_id)))?;
        user.metadata.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn authenticate(&self, username: &str, password: &str) -> StoreResult<User> {
        let candidate = {
            let inner = self.inner.read().await;
            inner
                .find_user(UserField::Login, username)
                .or_else(|| {
                    username
                        .contains('@')
                        .then(|| inner.find_user(UserField::Email, username))
                        .flatten()
                })
                .cloned()
        };

        let user = candidate.ok_or(StoreError::InvalidCredentials)?;
        verify_password(password, &user.password_hash)
            .map_err(|_| StoreError::InvalidCredentials)?;
        Ok(user)
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        Ok(self.inner.read().await.users.values().cloned().collect())
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn list_posts(&self, post_type: PostType) -> StoreResult<Vec<Post>> {
        Ok(self
            .inner
            .read()
            .await
            .posts
            .values()
            .filter(|p| p.post_type == post_type && p.status == PostStatus::Publish)
            .cloned()
            .collect())
    }

    async fn get_post(&self, id: PostId) -> StoreResult<Option<Post>> {
        Ok(self.inner.read().await.posts.get(&id).cloned())
    }

    async fn create_post(&self, post: NewPost) -> StoreResult<PostId> {
        let mut inner = self.inner.write().await;
        let categories = match post.category.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => vec![inner.ensure_category(name)],
            _ => vec!["uncategorized".to_string()],
        };

        let id = inner.next_post_id;
        inner.next_post_id += 1;
        inner.posts.insert(
            id,
            Post {
                id,
                author: post.author,
                date: Utc::now(),
                title: post.title,
                content: post.content,
                status: post.status,
                post_type: post.post_type,
                categories,
            },
        );
        Ok(id)
    }

    async fn update_post(&self, id: PostId, patch: PostPatch) -> StoreResult<Post> {
        let mut inner = self.inner.write().await;
        if !inner.posts.contains_key(&id) {
            return Err(StoreError::NotFound(format!("post {}", id)));
        }

        let category = match patch.category.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => Some(inner.ensure_category(name)),
            _ => None,
        };

        let post = inner
            .posts
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("post {}", id)))?;
        if let Some(title) = patch.title {
            post.title = title;
        }
        if let Some(content) = patch.content {
            post.content = content;
        }
        if let Some(slug) = category {
            post.categories = vec![slug];
        }
        Ok(post.clone())
    }

    async fn delete_post(&self, id: PostId) -> StoreResult<Post> {
        self.inner
            .write()
            .await
            .posts
            .remove(&id)
            .ok_or_else(|| StoreError::NotFound(format!("post {}", id)))
    }

    async fn categories_with_posts(&self) -> StoreResult<Vec<CategoryWithPosts>> {
        let inner = self.inner.read().await;
        Ok(inner
            .categories
            .iter()
            .map(|category| CategoryWithPosts {
                id: category.id,
                name: category.name.clone(),
                slug: category.slug.clone(),
                description: category.description.clone(),
                posts: inner
                    .posts
                    .values()
                    .filter(|p| {
                        p.post_type == PostType::Post
                            && p.status == PostStatus::Publish
                            && p.categories.contains(&category.slug)
                    })
                    .map(|p| PostSummary {
                        id: p.id,
                        title: p.title.clone(),
                        content: p.content.clone(),
                    })
                    .collect(),
            })
            .collect())
    }
}

// =============================================================================
// 테스트
// =============================================================================
