//! API 라우트.
//!
//! # 라우트 구조
//!
//! | Method | Path | Permission |
//! |--------|------|------------|
//! | POST | `/create-user`, `/sign-in`, `/login`, `/add-user` | - |
//! | GET | `/get-user`, `/get-users`, `/fetch-posts` | - |
//! | GET | `/fetch-books`, `/fetch-playlist`, `/fetch-categories` | `verify_jwt_token` |
//! | POST | `/create-post`, `/update-post` | `verify_jwt_token` |
//! | POST | `/delete-post` | `varify_jwt_token` (미등록 key → 인증 없음) |
//! | GET | `/health`, `/health/ready` | - |

pub mod accounts;
pub mod content;
pub mod health;

pub use content::{ListResponse, UpdatePostResponse};
pub use health::{health_router, ComponentHealth, ComponentStatus, HealthResponse};

use axum::Router;
use std::sync::Arc;

use crate::auth::{build_router, PolicyRegistry, RouteDecl, VERIFY_JWT_TOKEN};
use crate::state::AppState;

/// `/delete-post`에 선언된 permission key. 등록된 key와 철자가 다릅니다.
pub const DELETE_POST_PERMISSION: &str = "varify_jwt_token";

/// 라우트 선언 목록.
pub fn route_table() -> Vec<RouteDecl> {
    vec![
        // 계정
        RouteDecl::post("/create-user", accounts::create_user),
        RouteDecl::post("/sign-in", accounts::sign_in),
        RouteDecl::post("/login", accounts::login),
        RouteDecl::post("/add-user", accounts::add_user),
        RouteDecl::get("/get-user", accounts::get_user),
        RouteDecl::get("/get-users", accounts::get_users),
        // 콘텐츠
        RouteDecl::get("/fetch-posts", content::fetch_posts),
        RouteDecl::get("/fetch-books", content::fetch_books).permission(VERIFY_JWT_TOKEN),
        RouteDecl::get("/fetch-playlist", content::fetch_playlist).permission(VERIFY_JWT_TOKEN),
        RouteDecl::get("/fetch-categories", content::fetch_categories)
            .permission(VERIFY_JWT_TOKEN),
        RouteDecl::post("/create-post", content::create_post).permission(VERIFY_JWT_TOKEN),
        RouteDecl::post("/update-post", content::update_post).permission(VERIFY_JWT_TOKEN),
        RouteDecl::post("/delete-post", content::delete_post).permission(DELETE_POST_PERMISSION),
    ]
}

/// 전체 API 라우터 생성.
pub fn create_api_router(state: Arc<AppState>) -> Router {
    let registry = PolicyRegistry::default();

    build_router(route_table(), &registry, Arc::clone(&state))
        .nest("/health", health_router())
        .with_state(state)
}
