//! 게시물/카테고리 endpoint.
//!
//! 조회 응답은 `{success, data}` 형태로 감쌉니다. 생성/삭제는 문자열
//! 메시지를 JSON으로 반환합니다.

use std::sync::Arc;

use axum::{extract::State, Json};
use pressgate_core::{
    CategoryWithPosts, NewPost, Post, PostId, PostPatch, PostStatus, PostType,
    DEFAULT_POST_CATEGORY,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::VerifiedIdentity;
use crate::error::{ApiError, ApiResult};
use crate::params::{non_blank, required_id, IdParam, Params};
use crate::state::AppState;

/// 조회 응답.
#[derive(Debug, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub success: bool,
    pub data: Vec<T>,
}

impl<T> ListResponse<T> {
    fn ok(data: Vec<T>) -> Json<Self> {
        Json(Self {
            success: true,
            data,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CreatePostParams {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdatePostParams {
    pub post_id: Option<IdParam>,
    pub post_title: Option<String>,
    pub post_content: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PostIdParams {
    pub post_id: Option<IdParam>,
}

/// 게시물 수정 응답.
#[derive(Debug, Serialize, Deserialize)]
pub struct UpdatePostResponse {
    pub message: String,
    pub post_id: PostId,
}

async fn list(state: &AppState, post_type: PostType) -> ApiResult<Json<ListResponse<Post>>> {
    let posts = state.content.list_posts(post_type).await?;
    Ok(ListResponse::ok(posts))
}

/// GET /fetch-posts
pub async fn fetch_posts(State(state): State<Arc<AppState>>) -> ApiResult<Json<ListResponse<Post>>> {
    list(&state, PostType::Post).await
}

/// GET /fetch-books
pub async fn fetch_books(State(state): State<Arc<AppState>>) -> ApiResult<Json<ListResponse<Post>>> {
    list(&state, PostType::Book).await
}

/// GET /fetch-playlist
pub async fn fetch_playlist(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<ListResponse<Post>>> {
    list(&state, PostType::Playlist).await
}

/// 카테고리와 소속 게시물 요약.
///
/// GET /fetch-categories
pub async fn fetch_categories(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<ListResponse<CategoryWithPosts>>> {
    let categories = state.content.categories_with_posts().await?;
    Ok(ListResponse::ok(categories))
}

/// 게시물 생성. 작성자는 검증된 주체입니다.
///
/// POST /create-post
pub async fn create_post(
    State(state): State<Arc<AppState>>,
    VerifiedIdentity(identity): VerifiedIdentity,
    Params(params): Params<CreatePostParams>,
) -> ApiResult<Json<&'static str>> {
    let category = non_blank(params.category)
        .unwrap_or_else(|| DEFAULT_POST_CATEGORY.to_string());

    let post_id = state
        .content
        .create_post(NewPost {
            post_type: PostType::Post,
            title: params.title.unwrap_or_default().trim().to_string(),
            content: params.content.unwrap_or_default(),
            author: identity.user_id,
            status: PostStatus::Publish,
            category: Some(category),
        })
        .await?;

    info!(post_id, author = identity.user_id, "Post created");
    Ok(Json("Post created successfully"))
}

/// 게시물 수정. 전달되지 않은 필드는 유지됩니다.
///
/// POST /update-post
pub async fn update_post(
    State(state): State<Arc<AppState>>,
    Params(params): Params<UpdatePostParams>,
) -> ApiResult<Json<UpdatePostResponse>> {
    let post_id = required_id(params.post_id.as_ref(), "post_id")?;

    state
        .content
        .update_post(
            post_id,
            PostPatch {
                title: params.post_title,
                content: params.post_content,
                category: non_blank(params.category),
            },
        )
        .await?;

    Ok(Json(UpdatePostResponse {
        message: "Post updated successfully".to_string(),
        post_id,
    }))
}

/// 게시물 삭제.
///
/// 라우트 선언의 permission key 오타(`varify_jwt_token`) 때문에 실제로는
/// 인증 없이 호출됩니다.
///
/// POST /delete-post
pub async fn delete_post(
    State(state): State<Arc<AppState>>,
    Params(params): Params<PostIdParams>,
) -> ApiResult<Json<&'static str>> {
    let post_id = required_id(params.post_id.as_ref(), "post_id")?;

    if state.content.get_post(post_id).await?.is_none() {
        return Err(ApiError::NotFound(format!("post {}", post_id)));
    }
    state.content.delete_post(post_id).await?;

    info!(post_id, "Post deleted");
    Ok(Json("Post deleted successfully"))
}
