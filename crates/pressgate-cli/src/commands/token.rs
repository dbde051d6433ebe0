//! Claim 토큰 발급/검사 명령.

use anyhow::{bail, Context, Result};
use pressgate_api::{ClaimSet, TokenCodec, VerifyError};
use pressgate_core::{AuthConfig, UserId};
use serde::Serialize;
use tracing::info;

/// `token issue` 입력.
#[derive(Debug, Clone)]
pub struct IssueConfig {
    pub user_id: UserId,
    pub email: String,
    pub nicename: Option<String>,
    pub display_name: Option<String>,
    pub first_name: Option<String>,
    /// 지정하지 않으면 `auth.claim_ttl_secs`
    pub ttl_secs: Option<i64>,
}

impl IssueConfig {
    fn claims(&self, issued_at: i64, default_ttl: i64) -> Result<ClaimSet> {
        if self.user_id == 0 {
            bail!("user_id must be a positive integer");
        }
        let ttl = self.ttl_secs.unwrap_or(default_ttl);
        if ttl <= 0 {
            bail!("ttl must be positive: {}", ttl);
        }

        // nicename/display name을 생략하면 이메일 로컬 파트 사용
        let local_part = self
            .email
            .split('@')
            .next()
            .unwrap_or_default()
            .to_string();
        let nicename = self.nicename.clone().unwrap_or_else(|| local_part.clone());

        Ok(ClaimSet {
            user_id: self.user_id,
            user_email: self.email.clone(),
            user_display_name: self.display_name.clone().unwrap_or_else(|| nicename.clone()),
            user_nicename: nicename,
            first_name: self.first_name.clone().unwrap_or_default(),
            issued_at,
            expires_at: issued_at.saturating_add(ttl),
        })
    }
}

/// 서명된 Claim 토큰 발급.
pub fn issue_token(auth: &AuthConfig, config: &IssueConfig, now: i64) -> Result<String> {
    let codec = TokenCodec::new(&auth.jwt_secret);
    if !codec.can_sign() {
        bail!("auth.jwt_secret is not configured (set PRESSGATE__AUTH__JWT_SECRET or --secret)");
    }

    let claims = config.claims(now, auth.claim_ttl_secs)?;
    let token = codec.encode(&claims).context("failed to sign claim token")?;

    info!(
        user_id = claims.user_id,
        expires_at = claims.expires_at,
        "Claim token issued"
    );
    Ok(token)
}

/// `token inspect` 결과.
#[derive(Debug, Serialize)]
pub struct TokenReport {
    /// "valid" | 검증 오류 코드
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claims: Option<ClaimSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in_secs: Option<i64>,
}

impl TokenReport {
    pub fn is_valid(&self) -> bool {
        self.status == "valid"
    }
}

/// 토큰의 서명과 만료를 검사.
///
/// 서명이 맞지만 만료된 토큰은 `TOKEN_EXPIRED` 상태와 함께 Claim을 보여줍니다.
pub fn inspect_token(auth: &AuthConfig, token: &str, now: i64) -> TokenReport {
    let codec = TokenCodec::new(&auth.jwt_secret);
    let token = token.trim();
    let token = token.strip_prefix("Bearer ").unwrap_or(token);

    match codec.decode(token) {
        Ok(claims) => {
            let status = if claims.is_expired_at(now) {
                VerifyError::TokenExpired.code()
            } else {
                "valid"
            };
            TokenReport {
                status: status.to_string(),
                expires_in_secs: Some(claims.expires_at.saturating_sub(now)),
                claims: Some(claims),
            }
        }
        Err(e) => TokenReport {
            status: VerifyError::from(e).code().to_string(),
            claims: None,
            expires_in_secs: None,
        },
    }
}
