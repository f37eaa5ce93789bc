//! 测试数据写入接口

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{post, put},
};
use serde::{Deserialize, Serialize};

use crate::models::{MockBooking, MockEvent, MockUser};
use crate::state::OracleState;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelayRequest {
    pub delay_ms: u64,
}

pub fn fixture_routes() -> Router<Arc<OracleState>> {
    Router::new()
        .route("/mock/users", post(add_user))
        .route("/mock/events", post(add_event))
        .route("/mock/bookings", post(add_booking))
        .route("/mock/delay", put(set_delay))
}

async fn add_user(
    State(state): State<Arc<OracleState>>,
    Json(user): Json<MockUser>,
) -> (StatusCode, Json<MockUser>) {
    tracing::info!(user_id = user.id, username = %user.username, "写入用户");
    state.add_user(user.clone());
    (StatusCode::CREATED, Json(user))
}

async fn add_event(
    State(state): State<Arc<OracleState>>,
    Json(event): Json<MockEvent>,
) -> (StatusCode, Json<MockEvent>) {
    tracing::info!(event_id = event.id, archived = event.archived, "写入活动");
    state.add_event(event.clone());
    (StatusCode::CREATED, Json(event))
}

async fn add_booking(
    State(state): State<Arc<OracleState>>,
    Json(booking): Json<MockBooking>,
) -> (StatusCode, Json<MockBooking>) {
    tracing::info!(user_id = booking.user_id, event_id = booking.event_id, "写入预订");
    state.add_booking(booking);
    (StatusCode::CREATED, Json(booking))
}

async fn set_delay(
    State(state): State<Arc<OracleState>>,
    Json(req): Json<DelayRequest>,
) -> Json<DelayRequest> {
    tracing::info!(delay_ms = req.delay_ms, "设置响应延迟");
    state.set_delay(Duration::from_millis(req.delay_ms));
    Json(req)
}
