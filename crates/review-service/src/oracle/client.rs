//! 上游 HTTP 调用的公共部分：超时、追踪头注入、结果分类与指标

use std::time::{Duration, Instant};

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::debug;

use review_shared::error::SharedError;
use review_shared::observability::{metrics, tracing::outbound_trace_headers};

/// 单次上游调用失败的原因
#[derive(Debug, thiserror::Error)]
pub enum OracleCallError {
    #[error("{oracle} 请求超时")]
    Timeout { oracle: &'static str },

    #[error("{oracle} 返回状态码 {status}")]
    Status {
        oracle: &'static str,
        status: StatusCode,
    },

    #[error("{oracle} 请求失败: {source}")]
    Transport {
        oracle: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{oracle} 响应无法解析: {source}")]
    Decode {
        oracle: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

impl OracleCallError {
    /// 指标中使用的结果标签
    pub fn outcome(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => "timeout",
            Self::Status { status, .. } if *status == StatusCode::NOT_FOUND => "not_found",
            Self::Status { .. } => "rejected",
            Self::Transport { .. } => "unavailable",
            Self::Decode { .. } => "malformed",
        }
    }

    pub fn oracle(&self) -> &'static str {
        match self {
            Self::Timeout { oracle }
            | Self::Status { oracle, .. }
            | Self::Transport { oracle, .. }
            | Self::Decode { oracle, .. } => *oracle,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status, .. } if *status == StatusCode::NOT_FOUND)
    }
}

impl From<OracleCallError> for SharedError {
    fn from(err: OracleCallError) -> Self {
        match err {
            OracleCallError::Timeout { oracle } => SharedError::ExternalServiceTimeout {
                service: oracle.to_string(),
            },
            other => SharedError::ExternalService {
                service: other.oracle().to_string(),
                message: other.to_string(),
            },
        }
    }
}

/// 单个上游服务的 HTTP 客户端
#[derive(Clone)]
pub(crate) struct OracleHttp {
    name: &'static str,
    base_url: String,
    client: reqwest::Client,
}

impl OracleHttp {
    pub(crate) fn new(
        name: &'static str,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, SharedError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| SharedError::Internal(format!("构建 {} HTTP 客户端失败: {}", name, e)))?;

        Ok(Self {
            name,
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub(crate) fn name(&self) -> &'static str {
        self.name
    }

    /// GET 并解析 JSON；非 2xx 视为失败
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        bearer: Option<&str>,
        query: &[(&str, String)],
    ) -> Result<T, OracleCallError> {
        let start = Instant::now();
        let result = self.send::<T>(path, bearer, query).await;
        let elapsed = start.elapsed().as_secs_f64();

        let outcome = match &result {
            Ok(_) => "ok",
            Err(e) => e.outcome(),
        };
        metrics::record_oracle_call(self.name, outcome, elapsed);
        debug!(oracle = self.name, path, outcome, elapsed_secs = elapsed, "上游调用完成");

        result
    }

    async fn send<T: DeserializeOwned>(
        &self,
        path: &str,
        bearer: Option<&str>,
        query: &[(&str, String)],
    ) -> Result<T, OracleCallError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.get(&url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }
        for (key, value) in outbound_trace_headers() {
            request = request.header(key, value);
        }

        let response = request.send().await.map_err(|e| self.classify(e, false))?;

        let status = response.status();
        if !status.is_success() {
            return Err(OracleCallError::Status {
                oracle: self.name,
                status,
            });
        }

        response.json::<T>().await.map_err(|e| self.classify(e, true))
    }

    fn classify(&self, err: reqwest::Error, reading_body: bool) -> OracleCallError {
        if err.is_timeout() {
            OracleCallError::Timeout { oracle: self.name }
        } else if reading_body {
            OracleCallError::Decode {
                oracle: self.name,
                source: err,
            }
        } else {
            OracleCallError::Transport {
                oracle: self.name,
                source: err,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_labels() {
        let not_found = OracleCallError::Status {
            oracle: "event",
            status: StatusCode::NOT_FOUND,
        };
        assert_eq!(not_found.outcome(), "not_found");
        assert!(not_found.is_not_found());

        let forbidden = OracleCallError::Status {
            oracle: "event",
            status: StatusCode::FORBIDDEN,
        };
        assert_eq!(forbidden.outcome(), "rejected");
        assert!(!forbidden.is_not_found());

        assert_eq!(OracleCallError::Timeout { oracle: "booking" }.outcome(), "timeout");
    }

    #[test]
    fn test_into_shared_error() {
        let timeout: SharedError = OracleCallError::Timeout { oracle: "identity" }.into();
        assert_eq!(timeout.code(), "EXTERNAL_SERVICE_TIMEOUT");

        let status: SharedError = OracleCallError::Status {
            oracle: "identity",
            status: StatusCode::UNAUTHORIZED,
        }
        .into();
        assert_eq!(status.code(), "EXTERNAL_SERVICE_ERROR");
        assert!(status.to_string().contains("identity"));
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let http = OracleHttp::new("event", "http://localhost:8081/", Duration::from_secs(1)).unwrap();
        assert_eq!(http.base_url, "http://localhost:8081");
        assert_eq!(http.name(), "event");
    }
}
