//! 비밀번호 해싱 유틸리티.
//!
//! Argon2id 기반 해싱 및 검증. 저장소는 평문 비밀번호를 보관하지 않습니다.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// 비밀번호 처리 에러.
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("비밀번호 해싱 실패")]
    HashingFailed,
    #[error("비밀번호 불일치")]
    Mismatch,
    #[error("잘못된 해시 형식")]
    InvalidHashFormat,
}

/// 비밀번호 해싱.
///
/// 솔트는 호출마다 새로 생성되며, 결과는 PHC 형식 문자열입니다
/// (`$argon2id$v=19$...`).
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| PasswordError::HashingFailed)
}

/// 저장된 PHC 해시와 평문 비밀번호 비교.
pub fn verify_password(password: &str, hash: &str) -> Result<(), PasswordError> {
    let parsed = PasswordHash::new(hash).map_err(|_| PasswordError::InvalidHashFormat)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| PasswordError::Mismatch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("pw123").unwrap();
        assert!(hash.starts_with("$argon2id$"));

        assert!(verify_password("pw123", &hash).is_ok());
        assert!(matches!(
            verify_password("pw124", &hash),
            Err(PasswordError::Mismatch)
        ));
    }

    #[test]
    fn test_same_password_different_salt() {
        let first = hash_password("secret").unwrap();
        let second = hash_password("secret").unwrap();

        assert_ne!(first, second);
        assert!(verify_password("secret", &first).is_ok());
        assert!(verify_password("secret", &second).is_ok());
    }

    #[test]
    fn test_invalid_hash_format() {
        let result = verify_password("password", "plain-text-hash");
        assert!(matches!(result, Err(PasswordError::InvalidHashFormat)));
    }
}
