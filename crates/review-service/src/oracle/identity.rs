//! 身份服务客户端

use async_trait::async_trait;
use tracing::warn;

use review_shared::config::OracleConfig;
use review_shared::error::SharedError;

use super::client::OracleHttp;
use crate::models::IdentitySnapshot;

/// 身份服务接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityOracle: Send + Sync {
    /// 返回 Token 所代表的当前用户（GET /auth/me）
    ///
    /// 任何失败（超时、非 2xx、响应格式错误）都返回错误，调用方据此拒绝。
    async fn who_am_i(&self, token: &str) -> Result<IdentitySnapshot, SharedError>;
}

/// 基于 HTTP 的身份服务客户端
#[derive(Clone)]
pub struct HttpIdentityOracle {
    http: OracleHttp,
}

impl HttpIdentityOracle {
    pub fn new(config: &OracleConfig) -> Result<Self, SharedError> {
        Ok(Self {
            http: OracleHttp::new("identity", &config.identity_base_url, config.timeout())?,
        })
    }
}

#[async_trait]
impl IdentityOracle for HttpIdentityOracle {
    async fn who_am_i(&self, token: &str) -> Result<IdentitySnapshot, SharedError> {
        self.http
            .get_json::<IdentitySnapshot>("/auth/me", Some(token), &[])
            .await
            .map_err(|e| {
                warn!(oracle = self.http.name(), error = %e, "身份服务调用失败");
                e.into()
            })
    }
}
