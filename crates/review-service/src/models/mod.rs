//! 数据模型
//!
//! 评价实体及从上游服务读取的只读快照

mod identity;
mod review;

pub use identity::{IdentitySnapshot, Role};
pub use review::{NewReview, Review, ReviewPatch};

use serde::Deserialize;

/// 活动快照
///
/// 从活动服务读取的只读事实，每次请求重新获取。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSnapshot {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub organizer_id: Option<i64>,
    /// 活动结束次日由活动服务归档，归档后方可评价
    #[serde(default)]
    pub archived: bool,
}
