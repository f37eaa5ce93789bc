//! Mock 预订服务

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;

use super::{ApiError, RequiredBearer, api_error};
use crate::state::OracleState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingCheckQuery {
    pub user_id: i64,
    pub event_id: i64,
}

pub fn booking_routes() -> Router<Arc<OracleState>> {
    Router::new().route("/api/bookings/check", get(check_booking))
}

/// 返回 JSON 布尔值
async fn check_booking(
    State(state): State<Arc<OracleState>>,
    RequiredBearer(token): RequiredBearer,
    Query(query): Query<BookingCheckQuery>,
) -> Result<Json<bool>, ApiError> {
    if state.user_by_token(&token).is_none() {
        return Err(api_error(StatusCode::UNAUTHORIZED, "Unknown token"));
    }
    Ok(Json(state.has_booking(query.user_id, query.event_id)))
}
