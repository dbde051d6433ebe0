//! 사용자 및 역할.
//!
//! 사용자 레코드는 비밀번호 해시와 임의의 key-value 메타데이터를 가집니다.
//! 불투명 토큰은 메타데이터에 저장됩니다 ([`OpaqueSlot`] 참고).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 사용자 식별자.
pub type UserId = u64;

/// 이름(first name)이 저장되는 메타데이터 키.
pub const FIRST_NAME_KEY: &str = "first_name";

/// 사용자 역할.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// 구독자 - 신규 가입 기본 역할
    #[default]
    Subscriber,
    /// 기고자
    Contributor,
    /// 작성자
    Author,
    /// 편집자
    Editor,
    /// 관리자
    Administrator,
}

/// 불투명 토큰 저장 위치.
///
/// 두 슬롯은 서로 독립적입니다. 로그인 흐름은 `Session`을, 레거시 가입/로그인은
/// `Api`를 사용합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpaqueSlot {
    /// 로그인 시 발급되어 쿠키로도 전달되는 토큰 (`custom_token`)
    Session,
    /// 레거시 가입 시 발급되고 레거시 로그인이 돌려주는 토큰 (`custom_api_token`)
    Api,
}

impl OpaqueSlot {
    /// 메타데이터 키.
    pub fn meta_key(&self) -> &'static str {
        match self {
            OpaqueSlot::Session => "custom_token",
            OpaqueSlot::Api => "custom_api_token",
        }
    }
}

/// 사용자 조회 기준 필드.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserField {
    Id,
    Login,
    Email,
}

/// 사용자 레코드.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    /// PHC 형식 Argon2 해시
    pub password_hash: String,
    pub role: Role,
    /// URL용 사용자 이름 (소문자 slug)
    pub nicename: String,
    pub display_name: String,
    pub metadata: HashMap<String, String>,
}

impl User {
    /// 메타데이터 값 조회.
    pub fn meta(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    /// 이름 (메타데이터에 없으면 빈 문자열).
    pub fn first_name(&self) -> &str {
        self.meta(FIRST_NAME_KEY).unwrap_or_default()
    }

    /// 응답용 프로필.
    pub fn profile(&self) -> Profile {
        Profile {
            user_id: self.id,
            user_email: self.email.clone(),
            user_nicename: self.nicename.clone(),
            user_display_name: self.display_name.clone(),
            first_name: self.first_name().to_string(),
        }
    }
}

/// 가입/로그인 응답에 포함되는 사용자 프로필.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: UserId,
    pub user_email: String,
    pub user_nicename: String,
    pub user_display_name: String,
    pub first_name: String,
}

/// 사용자 조회 응답.
///
/// 비밀번호 해시와 메타데이터(토큰 포함)는 노출하지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserView {
    #[serde(rename = "ID")]
    pub id: UserId,
    pub user_login: String,
    pub user_email: String,
    pub user_nicename: String,
    pub display_name: String,
    pub roles: Vec<Role>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            user_login: user.username.clone(),
            user_email: user.email.clone(),
            user_nicename: user.nicename.clone(),
            display_name: user.display_name.clone(),
            roles: vec![user.role],
        }
    }
}

/// 사용자 이름에서 nicename slug 생성.
///
/// 소문자로 바꾸고 영숫자/`-`/`_` 이외의 문자는 `-`로 치환합니다.
pub fn nicename_for(username: &str) -> String {
    let slug: String = username
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();
    slug.trim_matches('-').to_string()
}
