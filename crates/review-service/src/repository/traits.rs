//! 仓储 Trait 定义

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{NewReview, Review, ReviewPatch};

/// 评价仓储接口
///
/// `create` 对 `(user_id, event_id)` 原子：同一对并发写入只有一个成功，
/// 其余返回 `ReviewError::DuplicateReview`。按对删除与创建互斥。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewRepositoryTrait: Send + Sync {
    // 查询
    async fn list_all(&self) -> Result<Vec<Review>>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Review>>;
    async fn find_by_event(&self, event_id: i64) -> Result<Vec<Review>>;
    async fn find_by_user(&self, user_id: i64) -> Result<Vec<Review>>;
    async fn find_by_user_and_event(&self, user_id: i64, event_id: i64)
    -> Result<Option<Review>>;
    async fn exists_by_user_and_event(&self, user_id: i64, event_id: i64) -> Result<bool>;

    // 写入
    async fn create(&self, review: &NewReview) -> Result<Review>;
    async fn update(&self, id: i64, patch: &ReviewPatch) -> Result<Option<Review>>;

    // 删除
    async fn delete_by_id(&self, id: i64) -> Result<bool>;
    async fn delete_by_user_and_event(&self, user_id: i64, event_id: i64) -> Result<u64>;
    async fn delete_by_user(&self, user_id: i64) -> Result<u64>;
}
