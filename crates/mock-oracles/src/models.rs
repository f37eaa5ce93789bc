//! 上游数据模型
//!
//! 字段命名与真实的身份、活动、预订服务返回保持一致（camelCase）。

use serde::{Deserialize, Serialize};

/// 用户（身份服务 GET /auth/me 的返回体）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockUser {
    pub id: i64,
    pub username: String,
    #[serde(default = "default_role")]
    pub role: String,
    /// 代表该用户的 Bearer Token，不出现在响应中
    #[serde(skip_serializing)]
    pub token: String,
}

fn default_role() -> String {
    "USER".to_string()
}

/// 活动
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MockEvent {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub organizer_id: Option<i64>,
    /// 活动结束次日归档
    #[serde(default)]
    pub archived: bool,
}

/// 预订
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MockBooking {
    pub user_id: i64,
    pub event_id: i64,
}

/// 预置数据（`--seed` 指定的 YAML 文件）
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Seed {
    pub users: Vec<MockUser>,
    pub events: Vec<MockEvent>,
    pub bookings: Vec<MockBooking>,
}
