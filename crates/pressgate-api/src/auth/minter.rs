//! 세션 토큰 발급.
//!
//! 두 가지 자격증명을 독립적으로 발급합니다.
//! - 불투명 토큰: OS 난수 → hex, 사용자 메타데이터 슬롯에 저장 (마지막 쓰기 우선)
//! - Claim 토큰: [`TokenCodec`]으로 서명한 HS256 JWT

use std::sync::Arc;

use chrono::Utc;
use pressgate_core::{
    AuthConfig, CredentialStore, OpaqueSlot, StoreResult, User, UserId, MAX_OPAQUE_TOKEN_BYTES,
    MIN_OPAQUE_TOKEN_BYTES,
};
use rand::{rngs::OsRng, RngCore};
use tracing::debug;

use super::codec::{ClaimSet, CodecError, TokenCodec};
use crate::metrics::record_token_issued;

/// 불투명 토큰 / Claim 토큰 발급기.
#[derive(Debug, Clone)]
pub struct SessionMinter {
    codec: Arc<TokenCodec>,
    claim_ttl_secs: i64,
    opaque_bytes: usize,
}

impl SessionMinter {
    /// `opaque_bytes`는 32..=64 바이트 범위로 맞춥니다.
    pub fn new(codec: Arc<TokenCodec>, claim_ttl_secs: i64, opaque_bytes: usize) -> Self {
        Self {
            codec,
            claim_ttl_secs,
            opaque_bytes: opaque_bytes.clamp(MIN_OPAQUE_TOKEN_BYTES, MAX_OPAQUE_TOKEN_BYTES),
        }
    }

    /// 인증 설정으로부터 생성.
    pub fn from_config(codec: Arc<TokenCodec>, config: &AuthConfig) -> Self {
        Self::new(codec, config.claim_ttl_secs, config.opaque_token_bytes)
    }

    /// 서명 키가 설정되어 있는지 여부.
    pub fn can_sign(&self) -> bool {
        self.codec.can_sign()
    }

    pub fn claim_ttl_secs(&self) -> i64 {
        self.claim_ttl_secs
    }

    /// 저장하지 않고 불투명 토큰 문자열만 생성.
    pub fn generate_opaque(&self) -> String {
        let mut bytes = vec![0u8; self.opaque_bytes];
        OsRng.fill_bytes(&mut bytes);
        hex::encode(bytes)
    }

    /// 불투명 토큰을 생성해 사용자 메타데이터 슬롯에 저장 후 반환.
    ///
    /// 기존 값은 덮어씁니다. 동시 발급 시 마지막 쓰기가 남습니다.
    pub async fn mint_opaque(
        &self,
        store: &dyn CredentialStore,
        user_id: UserId,
        slot: OpaqueSlot,
    ) -> StoreResult<String> {
        let token = self.generate_opaque();
        store.set_metadata(user_id, slot.meta_key(), &token).await?;

        debug!(user_id, slot = slot.meta_key(), "Opaque token stored");
        record_token_issued(slot.meta_key());
        Ok(token)
    }

    /// 현재 시각 기준 Claim 토큰 발급.
    pub fn mint_claim(&self, user: &User) -> Result<String, CodecError> {
        self.mint_claim_at(user, Utc::now().timestamp())
    }

    pub fn mint_claim_at(&self, user: &User, now: i64) -> Result<String, CodecError> {
        let claims = ClaimSet::for_user(user, now, self.claim_ttl_secs);
        let token = self.codec.encode(&claims)?;

        debug!(user_id = user.id, expires_at = claims.expires_at, "Claim token issued");
        record_token_issued("jwt");
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pressgate_core::{MemoryStore, UserField};

    const TEST_SECRET: &str = "minter-secret";

    fn minter(secret: &str) -> SessionMinter {
        SessionMinter::new(Arc::new(TokenCodec::from_secret(secret)), 604_800, 32)
    }

    #[test]
    fn test_generate_opaque_is_hex_of_configured_length() {
        let minter = minter(TEST_SECRET);
        let token = minter.generate_opaque();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token, minter.generate_opaque());
    }

    #[test]
    fn test_opaque_entropy_is_clamped() {
        let mut config = AuthConfig::with_secret(TEST_SECRET);
        config.opaque_token_bytes = 2;
        let codec = Arc::new(TokenCodec::new(&config.jwt_secret));
        assert_eq!(
            SessionMinter::from_config(Arc::clone(&codec), &config)
                .generate_opaque()
                .len(),
            64
        );

        let long = SessionMinter::new(codec, 604_800, 1024);
        assert_eq!(long.generate_opaque().len(), 128);
    }

    #[tokio::test]
    async fn test_mint_opaque_overwrites_slot() {
        let store = MemoryStore::new();
        let user_id = store.create_user("alice", "a@x.com", "pw").await.unwrap();
        let minter = minter(TEST_SECRET);

        let first = minter
            .mint_opaque(&store, user_id, OpaqueSlot::Session)
            .await
            .unwrap();
        let second = minter
            .mint_opaque(&store, user_id, OpaqueSlot::Session)
            .await
            .unwrap();

        assert_ne!(first, second);
        assert_eq!(
            store.get_metadata(user_id, "custom_token").await.unwrap(),
            Some(second)
        );
        assert_eq!(
            store.get_metadata(user_id, "custom_api_token").await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_mint_opaque_unknown_user() {
        let store = MemoryStore::new();
        let result = minter(TEST_SECRET)
            .mint_opaque(&store, 99, OpaqueSlot::Api)
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_mint_claim_sets_lifetime() {
        let store = MemoryStore::new();
        let user_id = store.create_user("alice", "a@x.com", "pw").await.unwrap();
        let user = store
            .find_user_by(UserField::Id, &user_id.to_string())
            .await
            .unwrap();

        let token = minter(TEST_SECRET).mint_claim_at(&user, 1_000).unwrap();
        let claims = super::super::codec::decode(&token, TEST_SECRET).unwrap();

        assert_eq!(claims.user_id, user_id);
        assert_eq!(claims.user_email, "a@x.com");
        assert_eq!(claims.issued_at, 1_000);
        assert_eq!(claims.expires_at, 1_000 + 604_800);
    }

    #[tokio::test]
    async fn test_mint_claim_without_secret() {
        let store = MemoryStore::new();
        let user_id = store.create_user("alice", "a@x.com", "pw").await.unwrap();
        let user = store
            .find_user_by(UserField::Id, &user_id.to_string())
            .await
            .unwrap();

        let minter = minter("");
        assert!(!minter.can_sign());
        assert!(matches!(minter.mint_claim(&user), Err(CodecError::Encode(_))));
    }
}
