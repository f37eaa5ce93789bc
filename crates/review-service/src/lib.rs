//! 活动评价服务
//!
//! 用户、活动、预订分别由独立服务管理。创建、修改、删除评价之前，
//! 本服务仅凭 Bearer Token 和同步调用汇总三方事实，给出允许或带原因的拒绝。

pub mod auth;
pub mod dto;
pub mod eligibility;
pub mod error;
pub mod handlers;
pub mod models;
pub mod oracle;
pub mod repository;
pub mod routes;
pub mod service;
pub mod state;

pub use error::{Result, ReviewError};
