//! Mock 活动服务

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};

use super::{ApiError, RequiredBearer, api_error};
use crate::models::MockEvent;
use crate::state::OracleState;

pub fn event_routes() -> Router<Arc<OracleState>> {
    Router::new()
        .route("/events/public/{event_id}", get(get_public_event))
        .route("/events/{event_id}", get(get_event))
}

fn find_event(state: &OracleState, event_id: i64) -> Result<Json<MockEvent>, ApiError> {
    state.events.get(&event_id).map(Json).ok_or_else(|| {
        tracing::debug!(event_id, "活动不存在");
        api_error(StatusCode::NOT_FOUND, format!("Event {} not found", event_id))
    })
}

/// 公开查询，无需认证
async fn get_public_event(
    State(state): State<Arc<OracleState>>,
    Path(event_id): Path<i64>,
) -> Result<Json<MockEvent>, ApiError> {
    find_event(&state, event_id)
}

/// 认证查询，Token 必须属于已知用户
async fn get_event(
    State(state): State<Arc<OracleState>>,
    RequiredBearer(token): RequiredBearer,
    Path(event_id): Path<i64>,
) -> Result<Json<MockEvent>, ApiError> {
    if state.user_by_token(&token).is_none() {
        return Err(api_error(StatusCode::UNAUTHORIZED, "Unknown token"));
    }
    find_event(&state, event_id)
}
