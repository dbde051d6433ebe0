//! Claim 토큰 인코딩/디코딩.
//!
//! HS256 서명된 JWS compact 형식만 다룹니다. 이 계층은 구조와 서명만
//! 검사하며 만료 여부는 [`TokenVerifier`](super::TokenVerifier)가 판단합니다.

use jsonwebtoken::{
    errors::ErrorKind as JwtErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use pressgate_core::{User, UserId};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// 서명된 Claim 토큰 페이로드.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimSet {
    pub user_id: UserId,
    pub user_email: String,
    pub user_nicename: String,
    pub user_display_name: String,
    pub first_name: String,
    /// 발급 시각 (Unix timestamp)
    #[serde(rename = "iat")]
    pub issued_at: i64,
    /// 만료 시각 (Unix timestamp)
    #[serde(rename = "exp")]
    pub expires_at: i64,
}

impl ClaimSet {
    /// 사용자 레코드로부터 Claim 생성.
    pub fn for_user(user: &User, issued_at: i64, ttl_secs: i64) -> Self {
        Self {
            user_id: user.id,
            user_email: user.email.clone(),
            user_nicename: user.nicename.clone(),
            user_display_name: user.display_name.clone(),
            first_name: user.first_name().to_string(),
            issued_at,
            expires_at: issued_at.saturating_add(ttl_secs),
        }
    }

    /// `now` 기준 만료 여부. `expires_at == now`는 아직 유효합니다.
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expires_at < now
    }
}

/// 코덱 에러.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("토큰 서명 실패: {0}")]
    Encode(String),
    #[error("잘못된 토큰 형식")]
    MalformedToken,
    #[error("토큰 서명이 유효하지 않습니다")]
    InvalidSignature,
    #[error("허용되지 않은 서명 알고리즘")]
    AlgorithmMismatch,
}

impl From<jsonwebtoken::errors::Error> for CodecError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            JwtErrorKind::InvalidSignature => CodecError::InvalidSignature,
            JwtErrorKind::InvalidAlgorithm | JwtErrorKind::InvalidAlgorithmName => {
                CodecError::AlgorithmMismatch
            }
            _ => CodecError::MalformedToken,
        }
    }
}

/// HS256 코덱.
///
/// 생성 시 한 번 키를 만들어 재사용합니다. 비밀 키가 비어 있으면
/// 서명은 `Encode`, 검증은 `InvalidSignature`로 실패합니다.
pub struct TokenCodec {
    keys: Option<(EncodingKey, DecodingKey)>,
    validation: Validation,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("can_sign", &self.keys.is_some())
            .finish()
    }
}

impl TokenCodec {
    pub fn new(secret: &SecretString) -> Self {
        Self::from_secret(secret.expose_secret())
    }

    pub fn from_secret(secret: &str) -> Self {
        let keys = (!secret.is_empty()).then(|| {
            (
                EncodingKey::from_secret(secret.as_bytes()),
                DecodingKey::from_secret(secret.as_bytes()),
            )
        });

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        Self { keys, validation }
    }

    /// 서명 키가 설정되어 있는지 여부.
    pub fn can_sign(&self) -> bool {
        self.keys.is_some()
    }

    pub fn encode(&self, claims: &ClaimSet) -> Result<String, CodecError> {
        let (encoding_key, _) = self
            .keys
            .as_ref()
            .ok_or_else(|| CodecError::Encode("서명 키가 설정되지 않았습니다".to_string()))?;

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, encoding_key)
            .map_err(|e| CodecError::Encode(e.to_string()))
    }

    pub fn decode(&self, token: &str) -> Result<ClaimSet, CodecError> {
        let (_, decoding_key) = self.keys.as_ref().ok_or(CodecError::InvalidSignature)?;

        // jsonwebtoken이 모르는 alg ("none" 등)도 불일치로 처리
        if let Some(alg) = header_alg(token) {
            if alg != "HS256" {
                return Err(CodecError::AlgorithmMismatch);
            }
        }

        jsonwebtoken::decode::<ClaimSet>(token, decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(CodecError::from)
    }
}

/// 헤더 세그먼트의 `alg` 값. 헤더를 읽을 수 없으면 `None`.
fn header_alg(token: &str) -> Option<String> {
    use base64::Engine;

    #[derive(Deserialize)]
    struct RawHeader {
        alg: String,
    }

    let segment = token.split('.').next()?;
    let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(segment.trim_end_matches('='))
        .ok()?;
    serde_json::from_slice::<RawHeader>(&bytes)
        .ok()
        .map(|header| header.alg)
}

/// Claim을 HS256 토큰으로 인코딩.
pub fn encode(claims: &ClaimSet, secret: &str) -> Result<String, CodecError> {
    TokenCodec::from_secret(secret).encode(claims)
}

/// 토큰의 구조와 서명을 검증하고 Claim 반환. 만료는 검사하지 않습니다.
pub fn decode(token: &str, secret: &str) -> Result<ClaimSet, CodecError> {
    TokenCodec::from_secret(secret).decode(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const TEST_SECRET: &str = "test-secret-key-for-jwt-testing-minimum-32-chars";

    fn sample_claims() -> ClaimSet {
        ClaimSet {
            user_id: 42,
            user_email: "alice@x.com".to_string(),
            user_nicename: "alice".to_string(),
            user_display_name: "alice".to_string(),
            first_name: String::new(),
            issued_at: 1_700_000_000,
            expires_at: 1_700_604_800,
        }
    }

    #[test]
    fn test_encode_and_decode() {
        let token = encode(&sample_claims(), TEST_SECRET).unwrap();
        assert_eq!(token.split('.').count(), 3);

        let decoded = decode(&token, TEST_SECRET).unwrap();
        assert_eq!(decoded, sample_claims());
    }

    #[test]
    fn test_header_is_hs256() {
        let token = encode(&sample_claims(), TEST_SECRET).unwrap();
        let header = jsonwebtoken::decode_header(&token).unwrap();
        assert_eq!(header.alg, Algorithm::HS256);
    }

    #[test]
    fn test_wire_claim_names() {
        let json = serde_json::to_value(sample_claims()).unwrap();
        assert_eq!(json["iat"], 1_700_000_000);
        assert_eq!(json["exp"], 1_700_604_800);
        assert_eq!(json["user_id"], 42);
        assert!(json.get("issued_at").is_none());
    }

    #[test]
    fn test_decode_does_not_check_expiry() {
        let mut claims = sample_claims();
        claims.issued_at = 1;
        claims.expires_at = 2;

        let token = encode(&claims, TEST_SECRET).unwrap();
        assert_eq!(decode(&token, TEST_SECRET).unwrap().expires_at, 2);
    }

    #[test]
    fn test_wrong_secret() {
        let token = encode(&sample_claims(), TEST_SECRET).unwrap();
        let result = decode(&token, "wrong-secret-key-for-testing-minimum-32-chars");
        assert_eq!(result, Err(CodecError::InvalidSignature));
    }

    #[test]
    fn test_malformed_tokens() {
        assert_eq!(decode("garbage", TEST_SECRET), Err(CodecError::MalformedToken));
        assert_eq!(
            decode("invalid.token.here", TEST_SECRET),
            Err(CodecError::MalformedToken)
        );
        assert_eq!(decode("", TEST_SECRET), Err(CodecError::MalformedToken));
    }

    #[test]
    fn test_algorithm_mismatch() {
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS512),
            &sample_claims(),
            &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .unwrap();

        assert_eq!(decode(&token, TEST_SECRET), Err(CodecError::AlgorithmMismatch));
    }

    fn forged_header_token(header: &str) -> String {
        use base64::Engine;
        let engine = base64::engine::general_purpose::URL_SAFE_NO_PAD;
        let payload = serde_json::to_vec(&sample_claims()).unwrap();
        format!(
            "{}.{}.",
            engine.encode(header.as_bytes()),
            engine.encode(payload)
        )
    }

    #[test]
    fn test_unsupported_algorithm_names() {
        let none = forged_header_token(r#"{"alg":"none","typ":"JWT"}"#);
        assert_eq!(decode(&none, TEST_SECRET), Err(CodecError::AlgorithmMismatch));

        let unknown = forged_header_token(r#"{"alg":"XYZ","typ":"JWT"}"#);
        assert_eq!(
            decode(&unknown, TEST_SECRET),
            Err(CodecError::AlgorithmMismatch)
        );

        // alg 필드가 없는 헤더는 형식 오류
        let no_alg = forged_header_token(r#"{"typ":"JWT"}"#);
        assert_eq!(decode(&no_alg, TEST_SECRET), Err(CodecError::MalformedToken));
    }

    #[test]
    fn test_empty_secret() {
        let codec = TokenCodec::from_secret("");
        assert!(!codec.can_sign());
        assert!(matches!(
            codec.encode(&sample_claims()),
            Err(CodecError::Encode(_))
        ));

        let token = encode(&sample_claims(), TEST_SECRET).unwrap();
        assert_eq!(codec.decode(&token), Err(CodecError::InvalidSignature));
    }

    #[test]
    fn test_codec_from_secret_string() {
        let secret = SecretString::new(TEST_SECRET.to_string().into_boxed_str());
        let codec = TokenCodec::new(&secret);
        let token = codec.encode(&sample_claims()).unwrap();
        assert_eq!(decode(&token, TEST_SECRET).unwrap(), sample_claims());
        assert!(!format!("{:?}", codec).contains(TEST_SECRET));
    }

    #[test]
    fn test_is_expired_at_boundary() {
        let claims = sample_claims();
        assert!(!claims.is_expired_at(claims.expires_at));
        assert!(claims.is_expired_at(claims.expires_at + 1));
    }

    proptest! {
        #[test]
        fn prop_round_trip(
            user_id in any::<u64>(),
            email in ".{0,40}",
            nicename in "[a-z0-9_-]{0,20}",
            display in ".{0,30}",
            first in ".{0,20}",
            issued_at in 0i64..4_000_000_000,
            ttl in 0i64..1_000_000_000,
            secret in "[ -~]{1,64}",
        ) {
            let claims = ClaimSet {
                user_id,
                user_email: email,
                user_nicename: nicename,
                user_display_name: display,
                first_name: first,
                issued_at,
                expires_at: issued_at + ttl,
            };
            let token = encode(&claims, &secret).unwrap();
            prop_assert_eq!(decode(&token, &secret).unwrap(), claims);
        }
    }
}
