//! 资格引擎
//!
//! 所有判定都是"每次请求现查"，不缓存任何中间结论。
//! 上游不可达时按最严格结果处理，即拒绝。

use std::sync::Arc;

use tracing::{info, instrument, warn};

use review_shared::observability::metrics;

use crate::auth::{TokenVerifier, VerifiedToken};
use crate::error::{Result, ReviewError};
use crate::models::{IdentitySnapshot, Review, Role};
use crate::oracle::{BookingOracle, EventOracle, IdentityOracle};
use crate::repository::ReviewRepositoryTrait;

use super::stage::CreateStage;

/// 已确认身份的调用方
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: i64,
    pub username: String,
    pub role: Role,
    /// 原始 Token，透传给需要鉴权的上游接口
    pub token: String,
}

/// 创建评价的放行结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateClearance {
    /// 评价作者，始终取自已校验的 Token
    pub author_id: i64,
    pub event_id: i64,
    pub stage: CreateStage,
}

/// 资格引擎
pub struct EligibilityEngine {
    verifier: Arc<dyn TokenVerifier>,
    identity: Arc<dyn IdentityOracle>,
    events: Arc<dyn EventOracle>,
    bookings: Arc<dyn BookingOracle>,
    reviews: Arc<dyn ReviewRepositoryTrait>,
}

impl EligibilityEngine {
    pub fn new(
        verifier: Arc<dyn TokenVerifier>,
        identity: Arc<dyn IdentityOracle>,
        events: Arc<dyn EventOracle>,
        bookings: Arc<dyn BookingOracle>,
        reviews: Arc<dyn ReviewRepositoryTrait>,
    ) -> Self {
        Self {
            verifier,
            identity,
            events,
            bookings,
            reviews,
        }
    }

    // ==================== 身份 ====================

    /// 校验 Token 签名与有效期
    pub fn authenticate(&self, token: &str) -> Result<VerifiedToken> {
        self.verifier.verify(token).map_err(deny)
    }

    /// 确认 Token 持有者就是 `user_id`
    async fn confirm_identity(&self, token: &str, user_id: i64) -> Result<IdentitySnapshot> {
        match self.identity.who_am_i(token).await {
            Ok(snapshot) if snapshot.id == user_id => Ok(snapshot),
            Ok(snapshot) => {
                warn!(
                    token_user_id = user_id,
                    identity_user_id = snapshot.id,
                    "身份服务返回的用户与 Token 不一致"
                );
                Err(ReviewError::IdentityMismatch)
            }
            Err(e) => {
                warn!(user_id, error = %e, "身份服务不可用，无法确认身份");
                Err(ReviewError::IdentityMismatch)
            }
        }
    }

    /// 解析 Token 代表的调用方（用户 ID 与角色）
    #[instrument(skip_all)]
    pub async fn resolve_caller(&self, token: &str) -> Result<Caller> {
        let verified = self.authenticate(token)?;
        let snapshot = self
            .confirm_identity(token, verified.user_id)
            .await
            .map_err(deny)?;

        Ok(Caller {
            user_id: snapshot.id,
            username: snapshot.username,
            role: snapshot.role,
            token: token.to_string(),
        })
    }

    // ==================== 创建 ====================

    /// 创建链路第一步：Token 必须存在且有效，否则在 `Unauthenticated` 阶段中断
    pub fn authenticate_create<'a>(
        &self,
        token: Option<&'a str>,
    ) -> Result<(&'a str, VerifiedToken)> {
        let stage = CreateStage::Unauthenticated;
        let token = token.ok_or_else(|| {
            halt(
                stage,
                ReviewError::Unauthenticated("缺少认证 Token".to_string()),
            )
        })?;
        let verified = self
            .verifier
            .verify(token)
            .map_err(|e| halt(stage, e))?;
        Ok((token, verified))
    }

    /// 创建评价的资格判定
    ///
    /// 按固定顺序短路：Token → 身份 → 活动 ID → 活动存在 → 已预订 → 可评价 → 未评价过。
    /// `claimed_user_id` 为请求体中的 userId，仅作核对，作者始终是 Token 主体。
    pub async fn check_create(
        &self,
        token: Option<&str>,
        claimed_user_id: Option<i64>,
        event_id: Option<i64>,
    ) -> Result<CreateClearance> {
        let (token, verified) = self.authenticate_create(token)?;
        self.check_create_verified(token, verified, claimed_user_id, event_id)
            .await
    }

    /// Token 已通过校验后的其余步骤
    #[instrument(skip(self, token, verified), fields(user_id = verified.user_id))]
    pub async fn check_create_verified(
        &self,
        token: &str,
        verified: VerifiedToken,
        claimed_user_id: Option<i64>,
        event_id: Option<i64>,
    ) -> Result<CreateClearance> {
        let mut stage = CreateStage::Unauthenticated;
        let author_id = verified.user_id;

        if claimed_user_id.is_some_and(|claimed| claimed != author_id) {
            warn!(author_id, ?claimed_user_id, "请求体 userId 与 Token 不一致");
            return Err(halt(stage, ReviewError::IdentityMismatch));
        }
        self.confirm_identity(token, author_id)
            .await
            .map_err(|e| halt(stage, e))?;
        stage.advance();

        let event_id = event_id.ok_or_else(|| halt(stage, ReviewError::MissingEventId))?;
        if !self.events.exists(event_id).await {
            return Err(halt(stage, ReviewError::EventNotFound(event_id)));
        }
        stage.advance();

        if !self.bookings.has_booking(author_id, event_id, token).await {
            return Err(halt(stage, ReviewError::NotBooked(event_id)));
        }
        stage.advance();

        if !self.events.is_eligible_for_review(event_id).await {
            return Err(halt(stage, ReviewError::NotYetReviewable(event_id)));
        }
        stage.advance();

        if self
            .reviews
            .exists_by_user_and_event(author_id, event_id)
            .await?
        {
            return Err(halt(
                stage,
                ReviewError::DuplicateReview {
                    user_id: author_id,
                    event_id,
                },
            ));
        }

        info!(author_id, event_id, %stage, "评价资格校验通过");

        Ok(CreateClearance {
            author_id,
            event_id,
            stage,
        })
    }

    // ==================== 主办方能力 ====================

    /// 调用方是否为该活动的主办方（按活动判定）
    pub async fn is_organizer_of_event(&self, caller: &Caller, event_id: i64) -> bool {
        self.events.organizer_of(event_id, &caller.token).await == Some(caller.user_id)
    }

    /// 调用方是否持有主办方级别角色（与具体活动无关）
    pub fn has_organizer_role(&self, caller: &Caller) -> bool {
        caller.role.is_organizer_class()
    }

    pub fn has_admin_role(&self, caller: &Caller) -> bool {
        caller.role.is_admin()
    }

    // ==================== 读取 / 修改 / 删除 ====================

    /// 查看某活动的评价：主办方角色、该活动主办方、已预订用户任一即可
    pub async fn check_event_read(&self, caller: &Caller, event_id: i64) -> Result<()> {
        if self.has_organizer_role(caller)
            || self.is_organizer_of_event(caller, event_id).await
            || self
                .bookings
                .has_booking(caller.user_id, event_id, &caller.token)
                .await
        {
            return Ok(());
        }

        Err(deny(ReviewError::Forbidden(format!(
            "无权查看活动 {} 的评价",
            event_id
        ))))
    }

    /// 修改评价：作者本人或主办方角色
    pub fn check_update(&self, caller: &Caller, review: &Review) -> Result<()> {
        if review.user_id == caller.user_id || self.has_organizer_role(caller) {
            return Ok(());
        }
        Err(deny(ReviewError::Forbidden(format!(
            "无权修改评价 {}",
            review.id
        ))))
    }

    /// 按 ID 删除评价：作者本人或主办方角色
    pub fn check_delete_by_id(&self, caller: &Caller, review: &Review) -> Result<()> {
        if review.user_id == caller.user_id || self.has_organizer_role(caller) {
            return Ok(());
        }
        Err(deny(ReviewError::Forbidden(format!(
            "无权删除评价 {}",
            review.id
        ))))
    }

    /// 按 (用户, 活动) 删除：用户本人或该活动的主办方
    pub async fn check_pair_sweep(&self, caller: &Caller, user_id: i64, event_id: i64) -> Result<()> {
        if caller.user_id == user_id || self.is_organizer_of_event(caller, event_id).await {
            return Ok(());
        }
        Err(deny(ReviewError::Forbidden(format!(
            "无权删除用户 {} 在活动 {} 的评价",
            user_id, event_id
        ))))
    }

    /// 删除某用户的全部评价：用户本人或管理员
    pub fn check_user_sweep(&self, caller: &Caller, user_id: i64) -> Result<()> {
        if caller.user_id == user_id || self.has_admin_role(caller) {
            return Ok(());
        }
        Err(deny(ReviewError::Forbidden(format!(
            "无权删除用户 {} 的全部评价",
            user_id
        ))))
    }
}

/// 记录拒绝并原样返回
fn deny(err: ReviewError) -> ReviewError {
    if err.status_code().is_client_error() {
        metrics::record_review_denial(err.error_code());
        info!(code = err.error_code(), reason = %err, "请求被拒绝");
    }
    err
}

/// 创建链路中断：记录拒绝并附带阶段
fn halt(stage: CreateStage, err: ReviewError) -> ReviewError {
    ReviewError::halted(stage, deny(err))
}
