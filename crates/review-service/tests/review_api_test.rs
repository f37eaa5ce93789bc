//! 评价 API 端到端测试
//!
//! 上游由 mock-oracles 通过真实 HTTP 提供，存储使用内存仓储。

mod common;

use common::{TestApp, empty_request, json_request, sign_token, sign_with_secret};
use serde_json::json;

/// 用户 42 预订了已归档的活动 7
async fn booked_and_archived() -> (TestApp, String) {
    let app = TestApp::spawn().await;
    let token = app.user(42, "alice", "USER");
    app.event(7, Some(5), true);
    app.booking(42, 7);
    (app, token)
}

fn create_body(event_id: i64, rating: i32) -> serde_json::Value {
    json!({ "eventId": event_id, "userId": 42, "rating": rating, "comment": "great" })
}

// ==================== 创建 ====================

#[tokio::test]
async fn test_create_review_success() {
    let (app, token) = booked_and_archived().await;

    let (status, body) = app
        .send(json_request("POST", "/api/reviews", Some(&token), create_body(7, 5)))
        .await;

    assert_eq!(status, 201);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["userId"], 42);
    assert_eq!(body["data"]["eventId"], 7);
    assert_eq!(body["data"]["rating"], 5);
    assert_eq!(body["data"]["comment"], "great");
    assert_eq!(app.reviews.len(), 1);
}

#[tokio::test]
async fn test_author_is_taken_from_token_when_body_omits_user() {
    let (app, token) = booked_and_archived().await;

    let (status, body) = app
        .send(json_request(
            "POST",
            "/api/reviews",
            Some(&token),
            json!({ "eventId": 7, "rating": 4 }),
        ))
        .await;

    assert_eq!(status, 201);
    assert_eq!(body["data"]["userId"], 42);
}

#[tokio::test]
async fn test_create_without_token_halts_unauthenticated() {
    let (app, _) = booked_and_archived().await;

    let (status, body) = app
        .send(json_request("POST", "/api/reviews", None, create_body(7, 5)))
        .await;

    assert_eq!(status, 401);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "UNAUTHENTICATED");
    assert_eq!(body["data"]["haltedAt"], "UNAUTHENTICATED");
    assert!(app.reviews.is_empty());
}

#[tokio::test]
async fn test_create_with_expired_or_forged_token() {
    let (app, _) = booked_and_archived().await;

    let expired = sign_token(42, "alice", "USER", -3600);
    let (status, body) = app
        .send(json_request("POST", "/api/reviews", Some(&expired), create_body(7, 5)))
        .await;
    assert_eq!(status, 401);
    assert_eq!(body["code"], "UNAUTHENTICATED");

    let forged = sign_with_secret(42, "alice", "USER", 3600, "another-secret");
    let (status, _) = app
        .send(json_request("POST", "/api/reviews", Some(&forged), create_body(7, 5)))
        .await;
    assert_eq!(status, 401);
    assert!(app.reviews.is_empty());
}

#[tokio::test]
async fn test_create_for_another_user_is_identity_mismatch() {
    let (app, token) = booked_and_archived().await;

    let (status, body) = app
        .send(json_request(
            "POST",
            "/api/reviews",
            Some(&token),
            json!({ "eventId": 7, "userId": 99, "rating": 5 }),
        ))
        .await;

    assert_eq!(status, 403);
    assert_eq!(body["code"], "IDENTITY_MISMATCH");
    assert_eq!(body["data"]["haltedAt"], "UNAUTHENTICATED");
}

#[tokio::test]
async fn test_token_unknown_to_identity_service_is_rejected() {
    let (app, _) = booked_and_archived().await;
    // 签名有效，但身份服务不认识
    let token = sign_token(42, "alice", "USER", 3600);

    let (status, body) = app
        .send(json_request("POST", "/api/reviews", Some(&token), create_body(7, 5)))
        .await;

    assert_eq!(status, 403);
    assert_eq!(body["code"], "IDENTITY_MISMATCH");
}

#[tokio::test]
async fn test_create_without_event_id() {
    let (app, token) = booked_and_archived().await;

    let (status, body) = app
        .send(json_request(
            "POST",
            "/api/reviews",
            Some(&token),
            json!({ "rating": 5 }),
        ))
        .await;

    assert_eq!(status, 400);
    assert_eq!(body["code"], "EVENT_ID_REQUIRED");
    assert_eq!(body["data"]["haltedAt"], "IDENTITY_CONFIRMED");
}

#[tokio::test]
async fn test_create_for_unknown_event() {
    let (app, token) = booked_and_archived().await;

    let (status, body) = app
        .send(json_request("POST", "/api/reviews", Some(&token), create_body(8, 5)))
        .await;

    assert_eq!(status, 404);
    assert_eq!(body["code"], "EVENT_NOT_FOUND");
    assert_eq!(body["data"]["haltedAt"], "IDENTITY_CONFIRMED");
}

#[tokio::test]
async fn test_create_without_booking() {
    let (app, _) = booked_and_archived().await;
    let bob = app.user(43, "bob", "USER");

    let (status, body) = app
        .send(json_request(
            "POST",
            "/api/reviews",
            Some(&bob),
            json!({ "eventId": 7, "rating": 3 }),
        ))
        .await;

    assert_eq!(status, 403);
    assert_eq!(body["code"], "NOT_BOOKED");
    assert_eq!(body["data"]["haltedAt"], "EVENT_VALIDATED");
}

#[tokio::test]
async fn test_create_before_event_archived() {
    let app = TestApp::spawn().await;
    let token = app.user(42, "alice", "USER");
    app.event(7, Some(5), false);
    app.booking(42, 7);

    let (status, body) = app
        .send(json_request("POST", "/api/reviews", Some(&token), create_body(7, 5)))
        .await;

    assert_eq!(status, 403);
    assert_eq!(body["code"], "NOT_YET_REVIEWABLE");
    assert_eq!(body["data"]["haltedAt"], "BOOKING_CONFIRMED");
    assert!(app.reviews.is_empty());
}

#[tokio::test]
async fn test_second_review_is_duplicate() {
    let (app, token) = booked_and_archived().await;

    let (status, _) = app
        .send(json_request("POST", "/api/reviews", Some(&token), create_body(7, 5)))
        .await;
    assert_eq!(status, 201);

    let (status, body) = app
        .send(json_request("POST", "/api/reviews", Some(&token), create_body(7, 1)))
        .await;
    assert_eq!(status, 409);
    assert_eq!(body["code"], "DUPLICATE_REVIEW");
    assert_eq!(body["data"]["haltedAt"], "REVIEWABLE");
    assert_eq!(app.reviews.len(), 1);
}

#[tokio::test]
async fn test_concurrent_creates_persist_once() {
    let (app, token) = booked_and_archived().await;

    let requests = (0..8).map(|_| {
        app.send(json_request("POST", "/api/reviews", Some(&token), create_body(7, 5)))
    });
    let results = futures::future::join_all(requests).await;

    let created = results.iter().filter(|(status, _)| *status == 201).count();
    let duplicates = results.iter().filter(|(status, _)| *status == 409).count();
    assert_eq!(created, 1);
    assert_eq!(duplicates, 7);
    assert_eq!(app.reviews.len(), 1);
}

#[tokio::test]
async fn test_invalid_rating_is_rejected_before_eligibility() {
    let (app, token) = booked_and_archived().await;

    let (status, body) = app
        .send(json_request("POST", "/api/reviews", Some(&token), create_body(7, 6)))
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, _) = app
        .send(json_request(
            "POST",
            "/api/reviews",
            Some(&token),
            json!({ "eventId": 7 }),
        ))
        .await;
    assert_eq!(status, 400);
    assert!(app.reviews.is_empty());
}

#[tokio::test]
async fn test_every_mutation_rejects_bad_token_before_payload() {
    let (app, token) = booked_and_archived().await;
    let id = created_review_id(&app, &token).await;

    let expired = sign_token(42, "alice", "USER", -3600);
    let forged = sign_with_secret(42, "alice", "USER", 3600, "another-secret");
    let by_id = format!("/api/reviews/{}", id);

    // (方法, 路径, 请求体)；请求体中的评分都越界
    let cases = [
        ("POST", "/api/reviews", Some(json!({ "eventId": 7, "rating": 9 }))),
        ("PUT", by_id.as_str(), Some(json!({ "rating": 0 }))),
        ("PUT", "/api/reviews/user/42/event/7", Some(json!({ "rating": 6 }))),
        ("DELETE", by_id.as_str(), None),
        ("DELETE", "/api/reviews/user/42/event/7", None),
        ("DELETE", "/api/reviews/user/42", None),
    ];

    for bad_token in [&expired, &forged] {
        for (method, uri, body) in &cases {
            let request = match body {
                Some(body) => json_request(method, uri, Some(bad_token), body.clone()),
                None => empty_request(method, uri, Some(bad_token)),
            };
            let (status, body) = app.send(request).await;
            assert_eq!(status, 401, "{} {}", method, uri);
            assert_eq!(body["code"], "UNAUTHENTICATED", "{} {}", method, uri);
        }
    }

    assert_eq!(app.reviews.len(), 1);
}

#[tokio::test]
async fn test_malformed_body_with_bad_token_is_unauthenticated() {
    let (app, token) = booked_and_archived().await;
    let expired = sign_token(42, "alice", "USER", -3600);

    let malformed = |method: &str, uri: &str, bearer: Option<&str>| {
        let mut builder = axum::http::Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(bearer) = bearer {
            builder = builder.header("authorization", format!("Bearer {}", bearer));
        }
        builder.body(axum::body::Body::from("{not json")).unwrap()
    };

    let (status, body) = app
        .send(malformed("POST", "/api/reviews", Some(&expired)))
        .await;
    assert_eq!(status, 401);
    assert_eq!(body["data"]["haltedAt"], "UNAUTHENTICATED");

    let (status, _) = app.send(malformed("POST", "/api/reviews", None)).await;
    assert_eq!(status, 401);

    let (status, _) = app
        .send(malformed("PUT", "/api/reviews/1", Some(&expired)))
        .await;
    assert_eq!(status, 401);

    // Token 有效时才报告请求体错误
    let (status, body) = app
        .send(malformed("POST", "/api/reviews", Some(&token)))
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

// ==================== 查询 ====================

#[tokio::test]
async fn test_list_all_is_public() {
    let (app, token) = booked_and_archived().await;
    app.send(json_request("POST", "/api/reviews", Some(&token), create_body(7, 5)))
        .await;

    let (status, body) = app.send(empty_request("GET", "/api/reviews", None)).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_event_reviews_require_booking_or_organizer() {
    let (app, token) = booked_and_archived().await;
    app.send(json_request("POST", "/api/reviews", Some(&token), create_body(7, 5)))
        .await;

    // 已预订
    let (status, body) = app
        .send(empty_request("GET", "/api/reviews/event/7", Some(&token)))
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"][0]["userId"], 42);

    // 该活动的主办方（角色本身是普通用户）
    let organizer = app.user(5, "olivia", "USER");
    let (status, _) = app
        .send(empty_request("GET", "/api/reviews/event/7", Some(&organizer)))
        .await;
    assert_eq!(status, 200);

    // 主办方级别角色
    let staff = app.user(6, "sam", "ORGANIZER");
    let (status, _) = app
        .send(empty_request("GET", "/api/reviews/event/7", Some(&staff)))
        .await;
    assert_eq!(status, 200);

    // 无关用户
    let stranger = app.user(99, "eve", "USER");
    let (status, body) = app
        .send(empty_request("GET", "/api/reviews/event/7", Some(&stranger)))
        .await;
    assert_eq!(status, 403);
    assert_eq!(body["code"], "FORBIDDEN");

    let (status, _) = app
        .send(empty_request("GET", "/api/reviews/event/7", None))
        .await;
    assert_eq!(status, 401);
}

#[tokio::test]
async fn test_list_my_reviews() {
    let (app, token) = booked_and_archived().await;
    app.send(json_request("POST", "/api/reviews", Some(&token), create_body(7, 5)))
        .await;

    let (status, body) = app
        .send(empty_request("GET", "/api/reviews/me", Some(&token)))
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let bob = app.user(43, "bob", "USER");
    let (_, body) = app
        .send(empty_request("GET", "/api/reviews/me", Some(&bob)))
        .await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

// ==================== 修改 ====================

async fn created_review_id(app: &TestApp, token: &str) -> i64 {
    let (status, body) = app
        .send(json_request("POST", "/api/reviews", Some(token), create_body(7, 5)))
        .await;
    assert_eq!(status, 201);
    body["data"]["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_author_can_update_review() {
    let (app, token) = booked_and_archived().await;
    let id = created_review_id(&app, &token).await;

    let (status, body) = app
        .send(json_request(
            "PUT",
            &format!("/api/reviews/{}", id),
            Some(&token),
            json!({ "rating": 3, "comment": "还行" }),
        ))
        .await;

    assert_eq!(status, 200);
    assert_eq!(body["data"]["rating"], 3);
    assert_eq!(body["data"]["comment"], "还行");
}

#[tokio::test]
async fn test_other_user_cannot_update_review() {
    let (app, token) = booked_and_archived().await;
    let id = created_review_id(&app, &token).await;
    let bob = app.user(43, "bob", "USER");

    let (status, body) = app
        .send(json_request(
            "PUT",
            &format!("/api/reviews/{}", id),
            Some(&bob),
            json!({ "rating": 1 }),
        ))
        .await;
    assert_eq!(status, 403);
    assert_eq!(body["code"], "FORBIDDEN");

    let staff = app.user(6, "sam", "ORGANIZER");
    let (status, _) = app
        .send(json_request(
            "PUT",
            "/api/reviews/user/42/event/7",
            Some(&staff),
            json!({ "comment": "已审核" }),
        ))
        .await;
    assert_eq!(status, 200);
}

#[tokio::test]
async fn test_update_missing_review() {
    let (app, token) = booked_and_archived().await;

    let (status, body) = app
        .send(json_request(
            "PUT",
            "/api/reviews/12345",
            Some(&token),
            json!({ "rating": 2 }),
        ))
        .await;
    assert_eq!(status, 404);
    assert_eq!(body["code"], "REVIEW_NOT_FOUND");
}

// ==================== 删除 ====================

#[tokio::test]
async fn test_delete_by_id() {
    let (app, token) = booked_and_archived().await;
    let id = created_review_id(&app, &token).await;

    let bob = app.user(43, "bob", "USER");
    let (status, _) = app
        .send(empty_request("DELETE", &format!("/api/reviews/{}", id), Some(&bob)))
        .await;
    assert_eq!(status, 403);
    assert_eq!(app.reviews.len(), 1);

    let (status, body) = app
        .send(empty_request("DELETE", &format!("/api/reviews/{}", id), Some(&token)))
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["deleted"], 1);
    assert!(app.reviews.is_empty());

    let (status, _) = app
        .send(empty_request("DELETE", &format!("/api/reviews/{}", id), Some(&token)))
        .await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn test_event_organizer_can_sweep_pair() {
    let (app, token) = booked_and_archived().await;
    created_review_id(&app, &token).await;

    let stranger = app.user(99, "eve", "USER");
    let (status, _) = app
        .send(empty_request("DELETE", "/api/reviews/user/42/event/7", Some(&stranger)))
        .await;
    assert_eq!(status, 403);

    let organizer = app.user(5, "olivia", "USER");
    let (status, body) = app
        .send(empty_request("DELETE", "/api/reviews/user/42/event/7", Some(&organizer)))
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["deleted"], 1);

    // 已无可删内容
    let (status, body) = app
        .send(empty_request("DELETE", "/api/reviews/user/42/event/7", Some(&token)))
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["deleted"], 0);
}

#[tokio::test]
async fn test_user_sweep_requires_self_or_admin() {
    let (app, token) = booked_and_archived().await;
    created_review_id(&app, &token).await;

    let staff = app.user(6, "sam", "ORGANIZER");
    let (status, _) = app
        .send(empty_request("DELETE", "/api/reviews/user/42", Some(&staff)))
        .await;
    assert_eq!(status, 403);

    let admin = app.user(1, "root", "ADMIN");
    let (status, body) = app
        .send(empty_request("DELETE", "/api/reviews/user/42", Some(&admin)))
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["deleted"], 1);
    assert!(app.reviews.is_empty());
}

// ==================== 探针 ====================

#[tokio::test]
async fn test_health_and_ready() {
    let app = TestApp::spawn().await;

    let (status, body) = app.send(empty_request("GET", "/health", None)).await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "ok");

    let (status, _) = app.send(empty_request("GET", "/ready", None)).await;
    assert_eq!(status, 200);
}
