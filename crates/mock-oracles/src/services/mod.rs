//! 模拟的上游服务
//!
//! - `identity_service`: GET /auth/me
//! - `event_service`: GET /events/public/{id}、GET /events/{id}
//! - `booking_service`: GET /api/bookings/check
//! - `fixture_service`: POST /mock/*，运行时写入测试数据

pub mod booking_service;
pub mod event_service;
pub mod fixture_service;
pub mod identity_service;

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use serde::Serialize;

/// API 错误响应
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub(crate) fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

/// 必须携带 Bearer Token 的请求
pub struct RequiredBearer(pub String);

impl<S> FromRequestParts<S> for RequiredBearer
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| api_error(StatusCode::UNAUTHORIZED, "Missing bearer token"))?;
        Ok(Self(bearer.token().to_string()))
    }
}
