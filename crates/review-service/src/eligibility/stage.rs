//! 创建评价的阶段状态机
//!
//! `Unauthenticated → IdentityConfirmed → EventValidated → BookingConfirmed → Reviewable → Persisted`
//!
//! 任一步骤失败即终止，拒绝中携带失败时所处的阶段。每次请求都从头开始。

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CreateStage {
    Unauthenticated,
    IdentityConfirmed,
    EventValidated,
    BookingConfirmed,
    Reviewable,
    Persisted,
}

impl CreateStage {
    /// 下一阶段，`Persisted` 为终态
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Unauthenticated => Some(Self::IdentityConfirmed),
            Self::IdentityConfirmed => Some(Self::EventValidated),
            Self::EventValidated => Some(Self::BookingConfirmed),
            Self::BookingConfirmed => Some(Self::Reviewable),
            Self::Reviewable => Some(Self::Persisted),
            Self::Persisted => None,
        }
    }

    /// 推进到下一阶段（终态保持不变）
    pub fn advance(&mut self) -> Self {
        if let Some(next) = self.next() {
            *self = next;
        }
        *self
    }

    pub fn is_terminal(self) -> bool {
        self == Self::Persisted
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::IdentityConfirmed => "IDENTITY_CONFIRMED",
            Self::EventValidated => "EVENT_VALIDATED",
            Self::BookingConfirmed => "BOOKING_CONFIRMED",
            Self::Reviewable => "REVIEWABLE",
            Self::Persisted => "PERSISTED",
        }
    }
}

impl fmt::Display for CreateStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
