//! 应用状态定义

use std::sync::Arc;

use review_shared::database::Database;

use crate::service::ReviewService;

/// Axum 应用共享状态
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ReviewService>,
    /// 使用 PostgreSQL 存储时的连接池，供就绪探针检查
    pub database: Option<Database>,
}

impl AppState {
    pub fn new(service: Arc<ReviewService>, database: Option<Database>) -> Self {
        Self { service, database }
    }
}
