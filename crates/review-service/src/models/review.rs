//! 评价实体

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 评价记录
///
/// `(user_id, event_id)` 唯一；`user_id` 始终来自已校验的 Token。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: i64,
    pub event_id: i64,
    pub user_id: i64,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 待写入的评价
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReview {
    pub event_id: i64,
    pub user_id: i64,
    pub rating: i32,
    pub comment: Option<String>,
}

/// 评价的部分更新，None 表示保持原值
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewPatch {
    pub rating: Option<i32>,
    pub comment: Option<String>,
}

impl ReviewPatch {
    pub fn is_empty(&self) -> bool {
        self.rating.is_none() && self.comment.is_none()
    }

    /// 将补丁应用到已有评价（内存存储使用）
    pub fn apply_to(&self, review: &mut Review) {
        if let Some(rating) = self.rating {
            review.rating = rating;
        }
        if let Some(comment) = &self.comment {
            review.comment = Some(comment.clone());
        }
        review.updated_at = Utc::now();
    }
}
