//! 评价 API 处理器

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};

use crate::{
    auth::BearerToken,
    dto::{ApiResponse, CreateReviewRequest, DeletedResponse, ReviewDto, UpdateReviewRequest},
    error::ReviewError,
    state::AppState,
};

type ReviewListResponse = Json<ApiResponse<Vec<ReviewDto>>>;

/// 请求体无法解析时，先按 Token 判定，再报告参数错误
fn body_rejected(auth: crate::Result<()>, rejection: JsonRejection) -> ReviewError {
    match auth {
        Err(e) => e,
        Ok(()) => ReviewError::Validation(rejection.body_text()),
    }
}

fn to_dtos(reviews: Vec<crate::models::Review>) -> Vec<ReviewDto> {
    reviews.into_iter().map(ReviewDto::from).collect()
}

/// 创建评价
///
/// POST /api/reviews
///
/// 缺少 Token 时同样进入资格判定，以便拒绝中携带阶段信息。
pub async fn create_review(
    State(state): State<AppState>,
    token: Option<BearerToken>,
    body: Result<Json<CreateReviewRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<ReviewDto>>), ReviewError> {
    let token = token.as_ref().map(BearerToken::as_str);
    let Json(req) =
        body.map_err(|rejection| body_rejected(state.service.authenticate_create(token), rejection))?;

    let review = state.service.create_review(token, req).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(review.into(), "评价已创建")),
    ))
}

/// 全部评价
///
/// GET /api/reviews
pub async fn list_reviews(
    State(state): State<AppState>,
) -> Result<ReviewListResponse, ReviewError> {
    let reviews = state.service.list_all().await?;
    Ok(Json(ApiResponse::success(to_dtos(reviews))))
}

/// 某活动的评价
///
/// GET /api/reviews/event/{eventId}
pub async fn list_event_reviews(
    State(state): State<AppState>,
    token: BearerToken,
    Path(event_id): Path<i64>,
) -> Result<ReviewListResponse, ReviewError> {
    let reviews = state
        .service
        .list_for_event(token.as_str(), event_id)
        .await?;
    Ok(Json(ApiResponse::success(to_dtos(reviews))))
}

/// 当前用户的评价
///
/// GET /api/reviews/me
pub async fn list_my_reviews(
    State(state): State<AppState>,
    token: BearerToken,
) -> Result<ReviewListResponse, ReviewError> {
    let reviews = state.service.list_mine(token.as_str()).await?;
    Ok(Json(ApiResponse::success(to_dtos(reviews))))
}

/// 按 ID 修改评价
///
/// PUT /api/reviews/{id}
pub async fn update_review(
    State(state): State<AppState>,
    token: BearerToken,
    Path(id): Path<i64>,
    body: Result<Json<UpdateReviewRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<ReviewDto>>, ReviewError> {
    let Json(req) = body
        .map_err(|rejection| body_rejected(state.service.authenticate(token.as_str()), rejection))?;
    let review = state
        .service
        .update_by_id(token.as_str(), id, req)
        .await?;
    Ok(Json(ApiResponse::success(review.into())))
}

/// 按 (用户, 活动) 修改评价
///
/// PUT /api/reviews/user/{userId}/event/{eventId}
pub async fn update_user_event_review(
    State(state): State<AppState>,
    token: BearerToken,
    Path((user_id, event_id)): Path<(i64, i64)>,
    body: Result<Json<UpdateReviewRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<ReviewDto>>, ReviewError> {
    let Json(req) = body
        .map_err(|rejection| body_rejected(state.service.authenticate(token.as_str()), rejection))?;
    let review = state
        .service
        .update_by_user_and_event(token.as_str(), user_id, event_id, req)
        .await?;
    Ok(Json(ApiResponse::success(review.into())))
}

/// 按 ID 删除评价
///
/// DELETE /api/reviews/{id}
pub async fn delete_review(
    State(state): State<AppState>,
    token: BearerToken,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<DeletedResponse>>, ReviewError> {
    state.service.delete_by_id(token.as_str(), id).await?;
    Ok(Json(ApiResponse::success(DeletedResponse { deleted: 1 })))
}

/// 删除某用户在某活动下的评价
///
/// DELETE /api/reviews/user/{userId}/event/{eventId}
pub async fn delete_user_event_reviews(
    State(state): State<AppState>,
    token: BearerToken,
    Path((user_id, event_id)): Path<(i64, i64)>,
) -> Result<Json<ApiResponse<DeletedResponse>>, ReviewError> {
    let deleted = state
        .service
        .delete_by_user_and_event(token.as_str(), user_id, event_id)
        .await?;
    Ok(Json(ApiResponse::success(DeletedResponse { deleted })))
}

/// 删除某用户的全部评价
///
/// DELETE /api/reviews/user/{userId}
pub async fn delete_user_reviews(
    State(state): State<AppState>,
    token: BearerToken,
    Path(user_id): Path<i64>,
) -> Result<Json<ApiResponse<DeletedResponse>>, ReviewError> {
    let deleted = state
        .service
        .delete_by_user(token.as_str(), user_id)
        .await?;
    Ok(Json(ApiResponse::success(DeletedResponse { deleted })))
}
