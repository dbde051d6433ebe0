//! 가입/로그인 흐름.
//!
//! Credential Store와 [`SessionMinter`](super::SessionMinter)를 조합합니다.
//!
//! | 흐름 | 자격증명 |
//! |------|----------|
//! | [`register`] | Claim 토큰 |
//! | [`sign_in`] | 불투명 토큰(`custom_token`, 쿠키) + Claim 토큰 |
//! | [`legacy_register`] | 불투명 토큰(`custom_api_token`) |
//! | [`legacy_login`] | 저장된 `custom_api_token` 반환 |

use pressgate_core::{DuplicateField, OpaqueSlot, Profile, StoreError, User, UserField, UserId};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use validator::Validate;

use crate::error::{ApiError, ApiResult};
use crate::metrics::record_login;
use crate::state::AppState;

/// 가입 입력.
#[derive(Debug, Clone, Validate)]
pub struct RegisterInput {
    #[validate(length(min = 1, max = 60))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    pub password: String,
}

impl RegisterInput {
    /// 필드를 정리하고 형식을 검증.
    ///
    /// # Errors
    ///
    /// - `ApiError::MissingField`: 빈 값
    /// - `ApiError::InvalidField`: 이메일 형식 오류, 너무 긴 사용자 이름
    pub fn new(username: &str, email: &str, password: &str) -> ApiResult<Self> {
        let input = Self {
            username: non_empty(username, "username")?.trim().to_string(),
            email: non_empty(email, "email")?.trim().to_string(),
            password: non_empty(password, "password")?.to_string(),
        };

        input.validate().map_err(|errors| {
            let field = errors
                .field_errors()
                .keys()
                .next()
                .map(|k| k.to_string())
                .unwrap_or_else(|| "request".to_string());
            ApiError::invalid_field(field)
        })?;
        Ok(input)
    }
}

/// 로그인 입력.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: &str, password: &str) -> ApiResult<Self> {
        Ok(Self {
            username: non_empty(username, "username")?.trim().to_string(),
            password: non_empty(password, "password")?.to_string(),
        })
    }
}

fn non_empty<'a>(value: &'a str, field: &'static str) -> ApiResult<&'a str> {
    if value.trim().is_empty() {
        Err(ApiError::MissingField(field))
    } else {
        Ok(value)
    }
}

/// 가입/로그인 성공 응답.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSuccess {
    pub success: bool,
    pub token: String,
    pub data: Profile,
}

/// 로그인 결과. 세션 토큰은 쿠키로 전달됩니다.
#[derive(Debug, Clone)]
pub struct SignInOutcome {
    pub session_token: String,
    pub body: AuthSuccess,
}

/// 레거시 가입/로그인 응답.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyTokenResponse {
    pub message: String,
    pub user_id: UserId,
    pub token: String,
}

/// 가입 후 Claim 토큰 발급.
///
/// 서명 가능 여부를 먼저 확인하므로 서명 키가 없으면 사용자를 만들지 않습니다.
pub async fn register(state: &AppState, input: RegisterInput) -> ApiResult<AuthSuccess> {
    if !state.minter.can_sign() {
        return Err(ApiError::Encode(
            "서명 키가 설정되지 않았습니다".to_string(),
        ));
    }

    let user_id = create_unique_user(state, &input).await?;
    let user = state
        .credentials
        .find_user_by(UserField::Id, &user_id.to_string())
        .await?;
    let token = state.minter.mint_claim(&user)?;

    info!(user_id, "User registered");
    Ok(AuthSuccess {
        success: true,
        token,
        data: user.profile(),
    })
}

/// 로그인: 세션 토큰 저장 → Claim 토큰 발급.
///
/// 두 단계는 원자적이지 않습니다. Claim 발급이 실패해도 세션 토큰은
/// 이미 저장된 상태로 남습니다.
pub async fn sign_in(state: &AppState, credentials: Credentials) -> ApiResult<SignInOutcome> {
    let user = authenticate(state, &credentials).await?;

    let session_token = state
        .minter
        .mint_opaque(state.credentials.as_ref(), user.id, OpaqueSlot::Session)
        .await?;
    let token = state.minter.mint_claim(&user).inspect_err(|e| {
        warn!(user_id = user.id, error = %e, "Session token stored but claim token failed");
    })?;

    info!(user_id = user.id, "User signed in");
    Ok(SignInOutcome {
        session_token,
        body: AuthSuccess {
            success: true,
            token,
            data: user.profile(),
        },
    })
}

/// 레거시 가입: 사용자 생성 후 `custom_api_token` 발급.
pub async fn legacy_register(
    state: &AppState,
    input: RegisterInput,
) -> ApiResult<LegacyTokenResponse> {
    let user_id = create_unique_user(state, &input).await?;
    let token = state
        .minter
        .mint_opaque(state.credentials.as_ref(), user_id, OpaqueSlot::Api)
        .await?;

    info!(user_id, "User registered through legacy endpoint");
    Ok(LegacyTokenResponse {
        message: "User created successfully".to_string(),
        user_id,
        token,
    })
}

/// 레거시 로그인: 저장된 `custom_api_token` 반환.
pub async fn legacy_login(
    state: &AppState,
    credentials: Credentials,
) -> ApiResult<LegacyTokenResponse> {
    let user = authenticate(state, &credentials).await?;
    let token = state
        .credentials
        .get_metadata(user.id, OpaqueSlot::Api.meta_key())
        .await?
        .filter(|t| !t.is_empty())
        .ok_or(ApiError::TokenNotFound)?;

    Ok(LegacyTokenResponse {
        message: "User logged in successfully".to_string(),
        user_id: user.id,
        token,
    })
}

async fn authenticate(
    state: &AppState,
    credentials: &Credentials,
) -> ApiResult<User> {
    match state
        .credentials
        .authenticate(&credentials.username, &credentials.password)
        .await
    {
        Ok(user) => {
            record_login("success");
            Ok(user)
        }
        Err(StoreError::InvalidCredentials) => {
            record_login("invalid_credentials");
            warn!("Login failed: invalid credentials");
            Err(ApiError::InvalidCredentials)
        }
        Err(e) => {
            record_login("error");
            Err(e.into())
        }
    }
}

async fn create_unique_user(state: &AppState, input: &RegisterInput) -> ApiResult<UserId> {
    for (field, value) in [
        (UserField::Login, input.username.as_str()),
        (UserField::Email, input.email.as_str()),
    ] {
        match state.credentials.find_user_by(field, value).await {
            Ok(_) => {
                let duplicate = match field {
                    UserField::Email => DuplicateField::Email,
                    _ => DuplicateField::Username,
                };
                return Err(ApiError::Duplicate(duplicate));
            }
            Err(StoreError::NotFound(_)) => {}
            Err(e) => return Err(e.into()),
        }
    }

    Ok(state
        .credentials
        .create_user(&input.username, &input.email, &input.password)
        .await?)
}
