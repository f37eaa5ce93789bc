//! 路由配置模块

use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};

use review_shared::observability::middleware as obs_middleware;

use crate::{handlers, state::AppState};

/// 评价相关路由
pub fn review_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/reviews",
            post(handlers::review::create_review).get(handlers::review::list_reviews),
        )
        .route("/api/reviews/me", get(handlers::review::list_my_reviews))
        .route(
            "/api/reviews/event/{event_id}",
            get(handlers::review::list_event_reviews),
        )
        .route(
            "/api/reviews/{id}",
            put(handlers::review::update_review).delete(handlers::review::delete_review),
        )
        .route(
            "/api/reviews/user/{user_id}",
            delete(handlers::review::delete_user_reviews),
        )
        .route(
            "/api/reviews/user/{user_id}/event/{event_id}",
            put(handlers::review::update_user_event_review)
                .delete(handlers::review::delete_user_event_reviews),
        )
}

/// 组装完整应用：业务路由 + 探针 + 可观测性中间件
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(review_routes())
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        .layer(middleware::from_fn(obs_middleware::http_tracing))
        .layer(middleware::from_fn(obs_middleware::request_id))
        .with_state(state)
}
