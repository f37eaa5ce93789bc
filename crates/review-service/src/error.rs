//! 评价服务错误类型定义
//!
//! 创建链路上的每一种拒绝原因都有独立的错误码，客户端据此区分
//! "未登录 / 身份不符 / 活动不存在 / 未预订 / 未到评价时间 / 重复评价"。

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::eligibility::CreateStage;

/// 评价服务错误类型
#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    // 认证与身份
    #[error("未认证: {0}")]
    Unauthenticated(String),
    #[error("身份校验失败：Token 对应的用户与请求声明的用户不一致")]
    IdentityMismatch,

    // 创建资格
    #[error("缺少活动 ID")]
    MissingEventId,
    #[error("活动不存在: {0}")]
    EventNotFound(i64),
    #[error("用户未预订该活动: {0}")]
    NotBooked(i64),
    #[error("活动尚未结束，暂不可评价: {0}")]
    NotYetReviewable(i64),
    #[error("该用户已评价过此活动: user={user_id}, event={event_id}")]
    DuplicateReview { user_id: i64, event_id: i64 },

    /// 创建链路中断，携带中断时所处的阶段
    #[error("{cause}")]
    Halted {
        halted_at: CreateStage,
        cause: Box<ReviewError>,
    },

    // 权限与资源
    #[error("禁止访问: {0}")]
    Forbidden(String),
    #[error("评价不存在: {0}")]
    ReviewNotFound(String),

    // 验证错误
    #[error("参数验证失败: {0}")]
    Validation(String),

    // 系统错误
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),
    #[error("内部错误: {0}")]
    Internal(String),
}

impl ReviewError {
    /// 将创建链路上的拒绝包装为带阶段信息的错误
    pub fn halted(halted_at: CreateStage, cause: ReviewError) -> Self {
        Self::Halted {
            halted_at,
            cause: Box::new(cause),
        }
    }

    /// 剥离 Halted 包装，返回最内层的错误
    pub fn root_cause(&self) -> &ReviewError {
        match self {
            Self::Halted { cause, .. } => cause.root_cause(),
            other => other,
        }
    }

    /// 创建链路中断阶段（非创建链路错误返回 None）
    pub fn halted_at(&self) -> Option<CreateStage> {
        match self {
            Self::Halted { halted_at, .. } => Some(*halted_at),
            _ => None,
        }
    }

    /// 返回对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::IdentityMismatch
            | Self::NotBooked(_)
            | Self::NotYetReviewable(_)
            | Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::MissingEventId | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::EventNotFound(_) | Self::ReviewNotFound(_) => StatusCode::NOT_FOUND,
            Self::DuplicateReview { .. } => StatusCode::CONFLICT,
            Self::Halted { cause, .. } => cause.status_code(),
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 返回错误码（用于 API 响应）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthenticated(_) => "UNAUTHENTICATED",
            Self::IdentityMismatch => "IDENTITY_MISMATCH",
            Self::MissingEventId => "EVENT_ID_REQUIRED",
            Self::EventNotFound(_) => "EVENT_NOT_FOUND",
            Self::NotBooked(_) => "NOT_BOOKED",
            Self::NotYetReviewable(_) => "NOT_YET_REVIEWABLE",
            Self::DuplicateReview { .. } => "DUPLICATE_REVIEW",
            Self::Halted { cause, .. } => cause.error_code(),
            Self::Forbidden(_) => "FORBIDDEN",
            Self::ReviewNotFound(_) => "REVIEW_NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ReviewError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // 系统级错误只返回通用提示，详细信息仅记录日志
        let message = match self.root_cause() {
            Self::Database(e) => {
                tracing::error!(error = %e, "数据库操作失败");
                "服务内部错误，请稍后重试".to_string()
            }
            Self::Internal(e) => {
                tracing::error!(error = %e, "内部错误");
                "服务内部错误，请稍后重试".to_string()
            }
            other => other.to_string(),
        };

        let data = match self.halted_at() {
            Some(stage) => json!({ "haltedAt": stage }),
            None => serde_json::Value::Null,
        };

        let body = json!({
            "success": false,
            "code": self.error_code(),
            "message": message,
            "data": data
        });

        (status, axum::Json(body)).into_response()
    }
}

/// 从 validator 错误转换
impl From<validator::ValidationErrors> for ReviewError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

/// 服务层 Result 类型别名
pub type Result<T> = std::result::Result<T, ReviewError>;
