//! 活动服务客户端

use async_trait::async_trait;
use tracing::{debug, warn};

use review_shared::config::OracleConfig;
use review_shared::error::SharedError;

use super::client::{OracleCallError, OracleHttp};
use crate::models::EventSnapshot;

/// 活动服务接口
///
/// 失败时返回最严格的结果：不存在 / 不可评价 / 无主办方。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventOracle: Send + Sync {
    /// 活动是否存在（公开接口）
    async fn exists(&self, event_id: i64) -> bool;

    /// 活动是否已进入可评价状态
    ///
    /// 活动服务在活动结束次日将其归档，本服务不做日期计算。
    async fn is_eligible_for_review(&self, event_id: i64) -> bool;

    /// 活动的主办方用户 ID（需携带调用方 Token）
    async fn organizer_of(&self, event_id: i64, token: &str) -> Option<i64>;
}

/// 基于 HTTP 的活动服务客户端
#[derive(Clone)]
pub struct HttpEventOracle {
    http: OracleHttp,
}

impl HttpEventOracle {
    pub fn new(config: &OracleConfig) -> Result<Self, SharedError> {
        Ok(Self {
            http: OracleHttp::new("event", &config.event_base_url, config.timeout())?,
        })
    }

    async fn public_snapshot(&self, event_id: i64) -> Result<EventSnapshot, OracleCallError> {
        self.http
            .get_json::<EventSnapshot>(&format!("/events/public/{}", event_id), None, &[])
            .await
    }

    fn log_failure(&self, event_id: i64, err: &OracleCallError) {
        if err.is_not_found() {
            debug!(event_id, "活动不存在");
        } else {
            warn!(oracle = self.http.name(), event_id, error = %err, "活动服务调用失败");
        }
    }
}

#[async_trait]
impl EventOracle for HttpEventOracle {
    async fn exists(&self, event_id: i64) -> bool {
        match self.public_snapshot(event_id).await {
            Ok(_) => true,
            Err(e) => {
                self.log_failure(event_id, &e);
                false
            }
        }
    }

    async fn is_eligible_for_review(&self, event_id: i64) -> bool {
        match self.public_snapshot(event_id).await {
            Ok(snapshot) => snapshot.archived,
            Err(e) => {
                self.log_failure(event_id, &e);
                false
            }
        }
    }

    async fn organizer_of(&self, event_id: i64, token: &str) -> Option<i64> {
        match self
            .http
            .get_json::<EventSnapshot>(&format!("/events/{}", event_id), Some(token), &[])
            .await
        {
            Ok(snapshot) => snapshot.organizer_id,
            Err(e) => {
                self.log_failure(event_id, &e);
                None
            }
        }
    }
}
