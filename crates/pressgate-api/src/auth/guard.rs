//! 라우트 가드.
//!
//! 각 라우트는 `(method, path, permission key, handler)` 선언으로 등록되고,
//! permission key는 [`PolicyRegistry`]를 통해 [`Policy`]로 해석됩니다.
//! 알 수 없는 key는 경고만 남기고 `Open`으로 처리됩니다.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    handler::Handler,
    http::Method,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{self, MethodRouter},
    Router,
};
use tracing::{debug, warn};

use crate::metrics::record_verification;
use crate::state::AppState;

/// 검증된 주체를 요구하는 permission key.
pub const VERIFY_JWT_TOKEN: &str = "verify_jwt_token";

/// 라우트 접근 정책.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// 인증 없이 접근 가능
    Open,
    /// 유효한 Bearer 토큰 필요
    IdentityRequired,
}

/// permission key → 정책 매핑.
#[derive(Debug, Clone)]
pub struct PolicyRegistry {
    policies: HashMap<&'static str, Policy>,
}

impl Default for PolicyRegistry {
    fn default() -> Self {
        let mut policies = HashMap::new();
        policies.insert(VERIFY_JWT_TOKEN, Policy::IdentityRequired);
        Self { policies }
    }
}

impl PolicyRegistry {
    pub fn register(&mut self, key: &'static str, policy: Policy) {
        self.policies.insert(key, policy);
    }

    /// permission key 해석.
    ///
    /// key가 없으면 `Open`. 등록되지 않은 key도 `Open`이며 경고를 남깁니다.
    pub fn resolve(&self, key: Option<&str>) -> Policy {
        match key {
            None => Policy::Open,
            Some(key) => self.policies.get(key).copied().unwrap_or_else(|| {
                warn!(
                    permission = key,
                    "Unknown permission key, route will be served without authentication"
                );
                Policy::Open
            }),
        }
    }
}

/// 라우트 선언.
pub struct RouteDecl {
    pub method: Method,
    pub path: &'static str,
    pub permission: Option<&'static str>,
    route: MethodRouter<Arc<AppState>>,
}

impl RouteDecl {
    pub fn get<H, T>(path: &'static str, handler: H) -> Self
    where
        H: Handler<T, Arc<AppState>>,
        T: 'static,
    {
        Self {
            method: Method::GET,
            path,
            permission: None,
            route: routing::get(handler),
        }
    }

    pub fn post<H, T>(path: &'static str, handler: H) -> Self
    where
        H: Handler<T, Arc<AppState>>,
        T: 'static,
    {
        Self {
            method: Method::POST,
            path,
            permission: None,
            route: routing::post(handler),
        }
    }

    #[must_use]
    pub fn permission(mut self, key: &'static str) -> Self {
        self.permission = Some(key);
        self
    }
}

/// 라우트 선언 목록으로 라우터 구성.
///
/// `IdentityRequired` 라우트에는 [`require_identity`]가 route layer로 붙습니다.
pub fn build_router(
    routes: Vec<RouteDecl>,
    registry: &PolicyRegistry,
    state: Arc<AppState>,
) -> Router<Arc<AppState>> {
    routes.into_iter().fold(Router::new(), |router, decl| {
        let policy = registry.resolve(decl.permission);
        debug!(method = %decl.method, path = decl.path, ?policy, "Route registered");

        let route = match policy {
            Policy::Open => decl.route,
            Policy::IdentityRequired => decl.route.route_layer(middleware::from_fn_with_state(
                Arc::clone(&state),
                require_identity,
            )),
        };
        router.route(decl.path, route)
    })
}

/// Bearer 토큰을 검증하고 [`Identity`](super::Identity)를 요청 확장에 저장.
///
/// 실패하면 핸들러를 호출하지 않고 401을 반환합니다.
pub async fn require_identity(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    match state.verifier.verify_headers(request.headers()) {
        Ok(identity) => {
            record_verification("success");
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(e) => {
            record_verification(e.label());
            warn!(
                path = request.uri().path(),
                kind = e.code(),
                "Request rejected by route guard"
            );
            e.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Identity, VerifiedIdentity};
    use crate::state::create_test_state;
    use axum::{body::Body, http::StatusCode};
    use pressgate_core::UserField;
    use tower::ServiceExt;

    async fn whoami(VerifiedIdentity(identity): VerifiedIdentity) -> String {
        identity.user_id.to_string()
    }

    async fn open_handler(request: Request) -> String {
        request.extensions().get::<Identity>().is_some().to_string()
    }

    #[test]
    fn test_registry_resolution() {
        let registry = PolicyRegistry::default();
        assert_eq!(registry.resolve(None), Policy::Open);
        assert_eq!(
            registry.resolve(Some("verify_jwt_token")),
            Policy::IdentityRequired
        );
        assert_eq!(registry.resolve(Some("varify_jwt_token")), Policy::Open);
    }

    #[test]
    fn test_registry_custom_key() {
        let mut registry = PolicyRegistry::default();
        registry.register("members_only", Policy::IdentityRequired);
        assert_eq!(
            registry.resolve(Some("members_only")),
            Policy::IdentityRequired
        );
    }

    #[tokio::test]
    async fn test_guarded_route() {
        let state = Arc::new(create_test_state());
        let user_id = state
            .credentials
            .create_user("alice", "alice@x.com", "pw123")
            .await
            .unwrap();
        let user = state
            .credentials
            .find_user_by(UserField::Id, &user_id.to_string())
            .await
            .unwrap();
        let token = state.minter.mint_claim(&user).unwrap();

        let app = build_router(
            vec![
                RouteDecl::get("/me", whoami).permission(VERIFY_JWT_TOKEN),
                RouteDecl::get("/open", open_handler),
            ],
            &PolicyRegistry::default(),
            Arc::clone(&state),
        )
        .with_state(state);

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/me").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/me")
                    .header("Authorization", format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], user_id.to_string().as_bytes());

        // Open 라우트는 토큰이 있어도 주체를 붙이지 않음
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/open")
                    .header("Authorization", format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"false");
    }

    #[tokio::test]
    async fn test_unknown_permission_key_is_open() {
        let state = Arc::new(create_test_state());
        let app = build_router(
            vec![RouteDecl::post("/typo", open_handler).permission("varify_jwt_token")],
            &PolicyRegistry::default(),
            Arc::clone(&state),
        )
        .with_state(state);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/typo")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
