//! 설정 관리.
//!
//! 기본값 → TOML 파일 → `PRESSGATE__` 접두사 환경 변수 순으로 병합합니다.
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 8080
//!
//! [auth]
//! jwt_secret = "..."
//! claim_ttl_secs = 604800
//! ```

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};
use std::path::Path;

/// 클레임 토큰 기본 수명 (7일).
pub const DEFAULT_CLAIM_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// 세션 쿠키 기본 수명 (1시간).
pub const DEFAULT_SESSION_COOKIE_TTL_SECS: i64 = 60 * 60;

/// 불투명 토큰 원본 엔트로피 허용 범위 (바이트).
pub const MIN_OPAQUE_TOKEN_BYTES: usize = 32;
pub const MAX_OPAQUE_TOKEN_BYTES: usize = 64;

/// 애플리케이션 설정.
#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    /// 서버 설정
    #[serde(default)]
    pub server: ServerConfig,
    /// 인증 설정
    #[serde(default)]
    pub auth: AuthConfig,
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 서버 설정.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 바인딩할 호스트
    pub host: String,
    /// 리스닝할 포트
    pub port: u16,
    /// 요청 타임아웃 (초)
    pub request_timeout_secs: u64,
    /// CORS 허용 여부
    pub cors_enabled: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            request_timeout_secs: 30,
            cors_enabled: true,
        }
    }
}

impl ServerConfig {
    /// `host:port` 문자열.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 인증 설정.
///
/// 서명 비밀 키와 토큰 수명을 보관합니다. 코덱/발급기/검증기는 생성 시점에
/// 이 구조체를 주입받으며 전역 상태를 참조하지 않습니다.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HS256 서명 비밀 키 (비어 있으면 클레임 토큰 발급 불가)
    #[serde(deserialize_with = "deserialize_secret")]
    pub jwt_secret: SecretString,
    /// 클레임 토큰 수명 (초)
    pub claim_ttl_secs: i64,
    /// 불투명 세션 토큰을 담는 쿠키 이름
    pub session_cookie_name: String,
    /// 세션 쿠키 수명 (초)
    pub session_cookie_ttl_secs: i64,
    /// 불투명 토큰 원본 엔트로피 (바이트)
    pub opaque_token_bytes: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: SecretString::new(String::new().into_boxed_str()),
            claim_ttl_secs: DEFAULT_CLAIM_TTL_SECS,
            session_cookie_name: "custom_token".to_string(),
            session_cookie_ttl_secs: DEFAULT_SESSION_COOKIE_TTL_SECS,
            opaque_token_bytes: 32,
        }
    }
}

impl AuthConfig {
    /// 주어진 비밀 키로 기본 설정 생성.
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: SecretString::new(secret.into().into_boxed_str()),
            ..Default::default()
        }
    }

    /// 서명 비밀 키가 설정되어 있는지 확인.
    pub fn has_secret(&self) -> bool {
        !self.jwt_secret.expose_secret().is_empty()
    }

    /// 값 범위 검증.
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if !(MIN_OPAQUE_TOKEN_BYTES..=MAX_OPAQUE_TOKEN_BYTES).contains(&self.opaque_token_bytes) {
            return Err(config::ConfigError::Message(format!(
                "auth.opaque_token_bytes must be between {} and {}, got {}",
                MIN_OPAQUE_TOKEN_BYTES, MAX_OPAQUE_TOKEN_BYTES, self.opaque_token_bytes
            )));
        }
        if self.claim_ttl_secs <= 0 {
            return Err(config::ConfigError::Message(format!(
                "auth.claim_ttl_secs must be positive, got {}",
                self.claim_ttl_secs
            )));
        }
        Ok(())
    }
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(SecretString::new(raw.into_boxed_str()))
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨 필터 (예: "info", "pressgate_api=debug")
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일이 없으면 건너뛰고 기본값과 환경 변수만 사용합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config: Self = config::Config::builder()
            .add_source(config::File::from(path.as_ref()).required(false))
            .add_source(
                config::Environment::with_prefix("PRESSGATE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.auth.validate()?;
        Ok(config)
    }

    /// 기본 경로(`config/default.toml`)에서 설정을 로드합니다.
    pub fn load_default() -> Result<Self, config::ConfigError> {
        Self::load("config/default.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.auth.claim_ttl_secs, 604_800);
        assert_eq!(config.auth.session_cookie_ttl_secs, 3_600);
        assert_eq!(config.auth.session_cookie_name, "custom_token");
        assert!(!config.auth.has_secret());
    }

    #[test]
    fn test_with_secret() {
        let auth = AuthConfig::with_secret("s3cret");
        assert!(auth.has_secret());
        assert_eq!(auth.jwt_secret.expose_secret(), "s3cret");
    }

    #[test]
    fn test_secret_not_printed_in_debug() {
        let auth = AuthConfig::with_secret("do-not-log-me");
        assert!(!format!("{:?}", auth).contains("do-not-log-me"));
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = std::env::temp_dir().join(format!("pressgate-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("test.toml");
        std::fs::write(
            &path,
            r#"
            [server]
            port = 9090

            [auth]
            jwt_secret = "from-file"
            claim_ttl_secs = 60
            "#,
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.auth.jwt_secret.expose_secret(), "from-file");
        assert_eq!(config.auth.claim_ttl_secs, 60);
        assert_eq!(config.auth.session_cookie_ttl_secs, 3_600);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_opaque_token_bytes_range() {
        let mut auth = AuthConfig::default();
        assert!(auth.validate().is_ok());

        auth.opaque_token_bytes = 2;
        assert!(auth.validate().is_err());
        auth.opaque_token_bytes = 65;
        assert!(auth.validate().is_err());
        auth.opaque_token_bytes = 64;
        assert!(auth.validate().is_ok());
    }

    #[test]
    fn test_load_rejects_short_opaque_token() {
        let dir = std::env::temp_dir().join(format!("pressgate-opaque-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("short.toml");
        std::fs::write(&path, "[auth]\nopaque_token_bytes = 2\n").unwrap();

        let err = AppConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("opaque_token_bytes"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = AppConfig::load("does/not/exist.toml").unwrap();
        assert_eq!(config.logging.level, "info");
    }
}
