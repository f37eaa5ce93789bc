//! 健康检查

use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::state::AppState;

/// 存活探针：服务进程正常即返回 ok
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "review-service"
    }))
}

/// 就绪探针：PostgreSQL 存储时检查数据库连接
pub async fn readiness_check(State(state): State<AppState>) -> Json<Value> {
    let (storage, db_ok) = match &state.database {
        Some(db) => ("postgres", db.health_check().await.is_ok()),
        None => ("memory", true),
    };

    Json(json!({
        "status": if db_ok { "ok" } else { "degraded" },
        "service": "review-service",
        "checks": {
            "storage": storage,
            "database": if db_ok { "ok" } else { "fail" }
        }
    }))
}
