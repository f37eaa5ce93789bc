//! Mock Oracles
//!
//! 评价服务依赖三个上游：身份服务、活动服务、预订服务。
//! 本 crate 在同一端口上模拟这三者，供本地开发和集成测试使用。
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use mock_oracles::{app, models::{MockBooking, MockEvent}, state::OracleState};
//!
//! let state = Arc::new(OracleState::new());
//! state.add_event(MockEvent { id: 7, title: "Jazz".into(), organizer_id: None, archived: true });
//! state.add_booking(MockBooking { user_id: 42, event_id: 7 });
//! let router = app(state);
//! ```

pub mod cli;
pub mod models;
pub mod services;
pub mod state;
pub mod store;

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::get,
};
use serde_json::{Value, json};

use services::{
    booking_service::booking_routes, event_service::event_routes,
    fixture_service::fixture_routes, identity_service::identity_routes,
};
use state::OracleState;

/// 组装全部路由
pub fn app(state: Arc<OracleState>) -> Router {
    let upstream = Router::new()
        .merge(identity_routes())
        .merge(event_routes())
        .merge(booking_routes())
        .layer(middleware::from_fn_with_state(state.clone(), simulated_delay));

    Router::new()
        .route("/health", get(health_check))
        .merge(upstream)
        .merge(fixture_routes())
        .with_state(state)
}

/// 对上游接口施加人为延迟，`/mock/*` 和 `/health` 不受影响
async fn simulated_delay(
    State(state): State<Arc<OracleState>>,
    request: Request,
    next: Next,
) -> Response {
    let delay = state.delay();
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    next.run(request).await
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "healthy", "service": "mock-oracles" }))
}
