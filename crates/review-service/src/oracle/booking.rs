//! 预订服务客户端

use async_trait::async_trait;
use tracing::warn;

use review_shared::config::OracleConfig;
use review_shared::error::SharedError;

use super::client::OracleHttp;

/// 预订服务接口
///
/// 预订事实的唯一来源；调用失败视为未预订。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingOracle: Send + Sync {
    async fn has_booking(&self, user_id: i64, event_id: i64, token: &str) -> bool;
}

/// 基于 HTTP 的预订服务客户端
#[derive(Clone)]
pub struct HttpBookingOracle {
    http: OracleHttp,
}

impl HttpBookingOracle {
    pub fn new(config: &OracleConfig) -> Result<Self, SharedError> {
        Ok(Self {
            http: OracleHttp::new("booking", &config.booking_base_url, config.timeout())?,
        })
    }
}

#[async_trait]
impl BookingOracle for HttpBookingOracle {
    async fn has_booking(&self, user_id: i64, event_id: i64, token: &str) -> bool {
        let query = [
            ("userId", user_id.to_string()),
            ("eventId", event_id.to_string()),
        ];

        match self
            .http
            .get_json::<bool>("/api/bookings/check", Some(token), &query)
            .await
        {
            Ok(booked) => booked,
            Err(e) => {
                warn!(
                    oracle = self.http.name(),
                    user_id,
                    event_id,
                    error = %e,
                    "预订服务调用失败，按未预订处理"
                );
                false
            }
        }
    }
}
