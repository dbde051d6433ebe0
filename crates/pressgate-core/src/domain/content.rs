//! 게시물 및 카테고리.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::user::UserId;

/// 게시물 식별자.
pub type PostId = u64;

/// 카테고리를 지정하지 않고 게시물을 만들 때 사용하는 기본 카테고리.
pub const DEFAULT_POST_CATEGORY: &str = "shopping";

/// 게시물 유형.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PostType {
    #[serde(rename = "post")]
    Post,
    #[serde(rename = "book")]
    Book,
    #[serde(rename = "bb_playlist_player")]
    Playlist,
}

impl PostType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostType::Post => "post",
            PostType::Book => "book",
            PostType::Playlist => "bb_playlist_player",
        }
    }
}

/// 게시 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Publish,
    Draft,
}

/// 게시물 레코드.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    #[serde(rename = "ID")]
    pub id: PostId,
    #[serde(rename = "post_author")]
    pub author: UserId,
    #[serde(rename = "post_date")]
    pub date: DateTime<Utc>,
    #[serde(rename = "post_title")]
    pub title: String,
    #[serde(rename = "post_content")]
    pub content: String,
    #[serde(rename = "post_status")]
    pub status: PostStatus,
    pub post_type: PostType,
    /// 연결된 카테고리 slug 목록
    pub categories: Vec<String>,
}

/// 새 게시물 입력.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub post_type: PostType,
    pub title: String,
    pub content: String,
    pub author: UserId,
    pub status: PostStatus,
    /// 카테고리 이름 (없으면 자동 생성)
    pub category: Option<String>,
}

/// 게시물 부분 수정 입력.
///
/// `None`인 필드는 변경하지 않습니다.
#[derive(Debug, Clone, Default)]
pub struct PostPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    /// 지정 시 기존 카테고리를 이 카테고리 하나로 교체
    pub category: Option<String>,
}

/// 카테고리 레코드.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: u64,
    pub name: String,
    pub slug: String,
    pub description: String,
}

/// 카테고리 목록 응답에 포함되는 게시물 요약.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostSummary {
    pub id: PostId,
    pub title: String,
    pub content: String,
}

/// 게시물 요약을 포함한 카테고리.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryWithPosts {
    pub id: u64,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub posts: Vec<PostSummary>,
}

/// 카테고리 이름에서 slug 생성.
pub fn category_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.trim().chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_type_wire_names() {
        assert_eq!(PostType::Playlist.as_str(), "bb_playlist_player");
        assert_eq!(
            serde_json::to_string(&PostType::Book).unwrap(),
            r#""book""#
        );
    }

    #[test]
    fn test_category_slug() {
        assert_eq!(category_slug("Shopping"), "shopping");
        assert_eq!(category_slug("  Home & Garden "), "home-garden");
        assert_eq!(category_slug("Sci-Fi"), "sci-fi");
    }

    #[test]
    fn test_post_serializes_with_wp_field_names() {
        let post = Post {
            id: 3,
            author: 1,
            date: Utc::now(),
            title: "Hello".to_string(),
            content: "World".to_string(),
            status: PostStatus::Publish,
            post_type: PostType::Post,
            categories: vec!["shopping".to_string()],
        };
        let json = serde_json::to_value(&post).unwrap();
        assert_eq!(json["ID"], 3);
        assert_eq!(json["post_title"], "Hello");
        assert_eq!(json["post_status"], "publish");
        assert_eq!(json["post_type"], "post");
    }
}
