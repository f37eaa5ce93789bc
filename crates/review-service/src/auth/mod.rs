//! 认证模块
//!
//! - `jwt`: 校验身份服务签发的 Token
//! - `extractor`: 从 Authorization 头提取 Bearer Token

mod extractor;
mod jwt;

pub use extractor::BearerToken;
pub use jwt::{Claims, JwtVerifier, TokenVerifier, UserIdClaim, VerifiedToken};

#[cfg(test)]
pub use jwt::MockTokenVerifier;
