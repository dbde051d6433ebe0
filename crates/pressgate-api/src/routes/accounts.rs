//! 가입/로그인/사용자 조회 endpoint.
//!
//! - `POST /create-user`: 가입 + Claim 토큰
//! - `POST /sign-in`: 로그인 + 세션 쿠키 + Claim 토큰
//! - `POST /login`, `POST /add-user`: 레거시 불투명 토큰 흐름
//! - `GET /get-user`, `GET /get-users`: 사용자 조회 (인증 없음)

use std::sync::Arc;

use axum::{extract::State, http::header::SET_COOKIE, response::IntoResponse, Json};
use pressgate_core::{StoreError, UserField, UserView};
use serde::Deserialize;

use crate::auth::flow::{self, AuthSuccess, Credentials, LegacyTokenResponse, RegisterInput};
use crate::error::{ApiError, ApiResult};
use crate::params::{required_id, IdParam, Params};
use crate::state::AppState;

/// 가입 요청 파라미터.
#[derive(Debug, Default, Deserialize)]
pub struct RegisterParams {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl RegisterParams {
    fn into_input(self) -> ApiResult<RegisterInput> {
        RegisterInput::new(
            self.username.as_deref().unwrap_or_default(),
            self.email.as_deref().unwrap_or_default(),
            self.password.as_deref().unwrap_or_default(),
        )
    }
}

/// 로그인 요청 파라미터.
#[derive(Debug, Default, Deserialize)]
pub struct LoginParams {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl LoginParams {
    fn into_credentials(self) -> ApiResult<Credentials> {
        Credentials::new(
            self.username.as_deref().unwrap_or_default(),
            self.password.as_deref().unwrap_or_default(),
        )
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UserIdParams {
    pub user_id: Option<IdParam>,
}

/// 가입.
///
/// POST /create-user
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Params(params): Params<RegisterParams>,
) -> ApiResult<Json<AuthSuccess>> {
    let input = params.into_input()?;
    Ok(Json(flow::register(&state, input).await?))
}

/// 로그인. 세션 토큰은 쿠키로, Claim 토큰은 본문으로 전달됩니다.
///
/// POST /sign-in
pub async fn sign_in(
    State(state): State<Arc<AppState>>,
    Params(params): Params<LoginParams>,
) -> ApiResult<impl IntoResponse> {
    let outcome = flow::sign_in(&state, params.into_credentials()?).await?;
    let cookie = state.session_cookie(&outcome.session_token);
    Ok(([(SET_COOKIE, cookie)], Json(outcome.body)))
}

/// 레거시 로그인.
///
/// POST /login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Params(params): Params<LoginParams>,
) -> ApiResult<Json<LegacyTokenResponse>> {
    let response = flow::legacy_login(&state, params.into_credentials()?).await?;
    Ok(Json(response))
}

/// 레거시 가입.
///
/// POST /add-user
pub async fn add_user(
    State(state): State<Arc<AppState>>,
    Params(params): Params<RegisterParams>,
) -> ApiResult<Json<LegacyTokenResponse>> {
    let response = flow::legacy_register(&state, params.into_input()?).await?;
    Ok(Json(response))
}

/// 사용자 단건 조회. 요청한 `user_id`를 그대로 신뢰합니다.
///
/// GET /get-user
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Params(params): Params<UserIdParams>,
) -> ApiResult<Json<UserView>> {
    let user_id = required_id(params.user_id.as_ref(), "user_id")?;
    let user = state
        .credentials
        .find_user_by(UserField::Id, &user_id.to_string())
        .await
        .map_err(|e| match e {
            StoreError::NotFound(_) => ApiError::NotFound(format!("user {}", user_id)),
            other => other.into(),
        })?;
    Ok(Json(UserView::from(&user)))
}

/// 전체 사용자 조회.
///
/// GET /get-users
pub async fn get_users(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<UserView>>> {
    let users = state.credentials.list_users().await?;
    Ok(Json(users.iter().map(UserView::from).collect()))
}
