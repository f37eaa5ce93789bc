//! JWT Token 校验
//!
//! Token 由身份服务签发，本服务只做校验，不签发。
//! 任何格式错误、过期、签名不符或缺少 `userId` 的 Token 一律拒绝。

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, errors::ErrorKind};
use serde::{Deserialize, Serialize};

use review_shared::config::AuthConfig;

use crate::error::ReviewError;
use crate::models::Role;

/// `userId` 声明
///
/// 身份服务在不同版本中分别以数字和字符串写入，两种形式都接受。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserIdClaim {
    Number(i64),
    Text(String),
}

impl UserIdClaim {
    /// 字符串形式必须是纯十进制数字，否则视为无效
    pub fn to_user_id(&self) -> Option<i64> {
        match self {
            Self::Number(id) => Some(*id),
            Self::Text(text) => {
                if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                text.parse().ok()
            }
        }
    }
}

/// JWT Claims（Token 载荷）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// 用户名
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// 用户 ID
    #[serde(rename = "userId", default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserIdClaim>,
    /// 角色
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// 签发时间
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    /// 过期时间
    pub exp: i64,
    /// 签发者
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

/// 校验通过的 Token 主体
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedToken {
    pub user_id: i64,
    /// Token 中的角色仅作参考，授权判断以身份服务返回为准
    pub role: Option<Role>,
}

/// Token 校验接口
#[cfg_attr(test, mockall::automock)]
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<VerifiedToken, ReviewError>;
}

/// 基于共享密钥（HS256）的 JWT 校验器
#[derive(Clone)]
pub struct JwtVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp"]);
        validation.leeway = config.leeway_secs;
        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer]);
        }

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }
}

impl TokenVerifier for JwtVerifier {
    fn verify(&self, token: &str) -> Result<VerifiedToken, ReviewError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(
            |e| match e.kind() {
                ErrorKind::ExpiredSignature => {
                    ReviewError::Unauthenticated("Token 已过期".to_string())
                }
                ErrorKind::InvalidSignature => {
                    ReviewError::Unauthenticated("Token 签名无效".to_string())
                }
                ErrorKind::InvalidToken => ReviewError::Unauthenticated("无效的 Token".to_string()),
                _ => ReviewError::Unauthenticated(format!("Token 验证失败: {}", e)),
            },
        )?;

        let claims = token_data.claims;
        let user_id = claims
            .user_id
            .as_ref()
            .and_then(UserIdClaim::to_user_id)
            .ok_or_else(|| ReviewError::Unauthenticated("Token 缺少有效的 userId".to_string()))?;

        Ok(VerifiedToken {
            user_id,
            role: claims.role.as_deref().map(Role::parse_lenient),
        })
    }
}
