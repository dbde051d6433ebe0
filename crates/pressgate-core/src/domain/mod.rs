//! 도메인 모델.

pub mod content;
pub mod user;

pub use content::*;
pub use user::*;
