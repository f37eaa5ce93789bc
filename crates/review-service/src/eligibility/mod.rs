//! 评价资格与授权判定
//!
//! 将身份、活动、预订三个服务的事实汇总为一次判定：允许，或带原因的拒绝。

mod engine;
mod stage;

pub use engine::{Caller, CreateClearance, EligibilityEngine};
pub use stage::CreateStage;
