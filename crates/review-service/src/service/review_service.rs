//! 评价服务
//!
//! Token → 校验请求 → 资格引擎判定 → 读写仓储。本层不直接访问上游服务。

use std::sync::Arc;

use tracing::{info, instrument};
use validator::Validate;

use review_shared::observability::metrics;

use crate::dto::{CreateReviewRequest, UpdateReviewRequest};
use crate::eligibility::{Caller, CreateStage, EligibilityEngine};
use crate::error::{Result, ReviewError};
use crate::models::{Review, ReviewPatch};
use crate::repository::ReviewRepositoryTrait;

/// 评价服务
pub struct ReviewService {
    engine: Arc<EligibilityEngine>,
    reviews: Arc<dyn ReviewRepositoryTrait>,
}

impl ReviewService {
    pub fn new(engine: Arc<EligibilityEngine>, reviews: Arc<dyn ReviewRepositoryTrait>) -> Self {
        Self { engine, reviews }
    }

    pub fn repository(&self) -> &Arc<dyn ReviewRepositoryTrait> {
        &self.reviews
    }

    // ==================== 认证 ====================

    /// 仅校验创建请求的 Token（请求体无法解析时使用）
    pub fn authenticate_create(&self, token: Option<&str>) -> Result<()> {
        self.engine.authenticate_create(token).map(|_| ())
    }

    /// 仅校验 Token 签名与有效期
    pub fn authenticate(&self, token: &str) -> Result<()> {
        self.engine.authenticate(token).map(|_| ())
    }

    // ==================== 创建 ====================

    /// 创建评价
    ///
    /// 资格判定中的重复检查只是提前拒绝；真正的唯一性由仓储原子保证，
    /// 并发写入落败的一方同样得到 `DuplicateReview`。
    #[instrument(skip(self, token, req), fields(event_id = ?req.event_id))]
    pub async fn create_review(
        &self,
        token: Option<&str>,
        req: CreateReviewRequest,
    ) -> Result<Review> {
        let (token, verified) = self.engine.authenticate_create(token)?;
        req.validate()?;

        let clearance = self
            .engine
            .check_create_verified(token, verified, req.user_id, req.event_id)
            .await?;

        let new_review = req.into_new_review(clearance.author_id, clearance.event_id);
        let review = self.reviews.create(&new_review).await.map_err(|e| match e {
            duplicate @ ReviewError::DuplicateReview { .. } => {
                metrics::record_review_denial(duplicate.error_code());
                ReviewError::halted(clearance.stage, duplicate)
            }
            other => other,
        })?;

        metrics::record_review_created();
        info!(
            review_id = review.id,
            user_id = review.user_id,
            event_id = review.event_id,
            stage = %CreateStage::Persisted,
            "评价已创建"
        );

        Ok(review)
    }

    // ==================== 查询 ====================

    /// 全部评价（公开）
    pub async fn list_all(&self) -> Result<Vec<Review>> {
        self.reviews.list_all().await
    }

    /// 某活动的评价（需要查看权限）
    #[instrument(skip(self, token))]
    pub async fn list_for_event(&self, token: &str, event_id: i64) -> Result<Vec<Review>> {
        let caller = self.engine.resolve_caller(token).await?;
        self.engine.check_event_read(&caller, event_id).await?;
        self.reviews.find_by_event(event_id).await
    }

    /// 当前用户的评价
    #[instrument(skip(self, token))]
    pub async fn list_mine(&self, token: &str) -> Result<Vec<Review>> {
        let caller = self.engine.resolve_caller(token).await?;
        self.reviews.find_by_user(caller.user_id).await
    }

    // ==================== 修改 ====================

    /// 按 ID 修改
    #[instrument(skip(self, token, req))]
    pub async fn update_by_id(
        &self,
        token: &str,
        id: i64,
        req: UpdateReviewRequest,
    ) -> Result<Review> {
        let caller = self.engine.resolve_caller(token).await?;
        req.validate()?;
        let review = self.require_review(id).await?;
        self.apply_update(&caller, review, req.into()).await
    }

    /// 按 (用户, 活动) 修改
    #[instrument(skip(self, token, req))]
    pub async fn update_by_user_and_event(
        &self,
        token: &str,
        user_id: i64,
        event_id: i64,
        req: UpdateReviewRequest,
    ) -> Result<Review> {
        let caller = self.engine.resolve_caller(token).await?;
        req.validate()?;
        let review = self
            .reviews
            .find_by_user_and_event(user_id, event_id)
            .await?
            .ok_or_else(|| {
                ReviewError::ReviewNotFound(format!("user={}, event={}", user_id, event_id))
            })?;
        self.apply_update(&caller, review, req.into()).await
    }

    async fn apply_update(&self, caller: &Caller, review: Review, patch: ReviewPatch) -> Result<Review> {
        self.engine.check_update(caller, &review)?;

        if patch.is_empty() {
            return Ok(review);
        }

        let updated = self
            .reviews
            .update(review.id, &patch)
            .await?
            .ok_or_else(|| ReviewError::ReviewNotFound(format!("id={}", review.id)))?;

        info!(review_id = updated.id, by = caller.user_id, "评价已更新");
        Ok(updated)
    }

    // ==================== 删除 ====================

    /// 按 ID 删除
    #[instrument(skip(self, token))]
    pub async fn delete_by_id(&self, token: &str, id: i64) -> Result<()> {
        let caller = self.engine.resolve_caller(token).await?;
        let review = self.require_review(id).await?;
        self.engine.check_delete_by_id(&caller, &review)?;

        if !self.reviews.delete_by_id(id).await? {
            return Err(ReviewError::ReviewNotFound(format!("id={}", id)));
        }

        metrics::record_reviews_deleted("by_id", 1);
        info!(review_id = id, by = caller.user_id, "评价已删除");
        Ok(())
    }

    /// 删除某用户在某活动下的评价
    #[instrument(skip(self, token))]
    pub async fn delete_by_user_and_event(
        &self,
        token: &str,
        user_id: i64,
        event_id: i64,
    ) -> Result<u64> {
        let caller = self.engine.resolve_caller(token).await?;
        self.engine
            .check_pair_sweep(&caller, user_id, event_id)
            .await?;

        let deleted = self
            .reviews
            .delete_by_user_and_event(user_id, event_id)
            .await?;

        metrics::record_reviews_deleted("by_user_event", deleted);
        info!(user_id, event_id, deleted, by = caller.user_id, "按用户与活动删除评价");
        Ok(deleted)
    }

    /// 删除某用户的全部评价
    #[instrument(skip(self, token))]
    pub async fn delete_by_user(&self, token: &str, user_id: i64) -> Result<u64> {
        let caller = self.engine.resolve_caller(token).await?;
        self.engine.check_user_sweep(&caller, user_id)?;

        let deleted = self.reviews.delete_by_user(user_id).await?;

        metrics::record_reviews_deleted("by_user", deleted);
        info!(user_id, deleted, by = caller.user_id, "删除用户全部评价");
        Ok(deleted)
    }

    async fn require_review(&self, id: i64) -> Result<Review> {
        self.reviews
            .find_by_id(id)
            .await?
            .ok_or_else(|| ReviewError::ReviewNotFound(format!("id={}", id)))
    }
}
