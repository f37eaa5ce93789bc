//! Mock 身份服务

use std::sync::Arc;

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};

use super::{ApiError, RequiredBearer, api_error};
use crate::models::MockUser;
use crate::state::OracleState;

pub fn identity_routes() -> Router<Arc<OracleState>> {
    Router::new().route("/auth/me", get(who_am_i))
}

/// 返回 Token 对应的用户
async fn who_am_i(
    State(state): State<Arc<OracleState>>,
    RequiredBearer(token): RequiredBearer,
) -> Result<Json<MockUser>, ApiError> {
    state.user_by_token(&token).map(Json).ok_or_else(|| {
        tracing::warn!("未知 Token");
        api_error(StatusCode::UNAUTHORIZED, "Unknown token")
    })
}
