//! 集成测试公共设施
//!
//! 在随机端口启动 mock-oracles，评价服务通过真实 HTTP 客户端访问它；
//! Token 用与服务相同的密钥签发。

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Request, Response, header},
};
use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::Value;
use tokio::net::TcpListener;
use tower::ServiceExt;

use mock_oracles::models::{MockBooking, MockEvent, MockUser};
use mock_oracles::state::OracleState;
use review_service::auth::{Claims, JwtVerifier, UserIdClaim};
use review_service::eligibility::EligibilityEngine;
use review_service::oracle::{HttpBookingOracle, HttpEventOracle, HttpIdentityOracle};
use review_service::repository::{MemoryReviewRepository, ReviewRepositoryTrait};
use review_service::routes::build_router;
use review_service::service::ReviewService;
use review_service::state::AppState;
use review_shared::config::{AuthConfig, OracleConfig};

pub const TEST_SECRET: &str = "integration-test-secret";

pub struct TestApp {
    pub router: Router,
    pub oracles: Arc<OracleState>,
    pub reviews: Arc<MemoryReviewRepository>,
    pub oracle_base_url: String,
}

/// 启动 mock-oracles 并返回其地址
pub async fn spawn_oracles(state: Arc<OracleState>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, mock_oracles::app(state)).await.unwrap();
    });
    format!("http://{}", addr)
}

pub fn oracle_config(base_url: &str, timeout_ms: u64) -> OracleConfig {
    OracleConfig {
        identity_base_url: base_url.to_string(),
        event_base_url: base_url.to_string(),
        booking_base_url: base_url.to_string(),
        timeout_ms,
    }
}

pub fn auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: TEST_SECRET.to_string(),
        ..Default::default()
    }
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with_timeout(Duration::from_millis(2000)).await
    }

    pub async fn spawn_with_timeout(timeout: Duration) -> Self {
        let oracles = Arc::new(OracleState::new());
        let base_url = spawn_oracles(oracles.clone()).await;
        let config = oracle_config(&base_url, timeout.as_millis() as u64);

        let reviews = Arc::new(MemoryReviewRepository::new());
        let repo: Arc<dyn ReviewRepositoryTrait> = reviews.clone();

        let engine = EligibilityEngine::new(
            Arc::new(JwtVerifier::new(&auth_config())),
            Arc::new(HttpIdentityOracle::new(&config).unwrap()),
            Arc::new(HttpEventOracle::new(&config).unwrap()),
            Arc::new(HttpBookingOracle::new(&config).unwrap()),
            repo.clone(),
        );
        let service = Arc::new(ReviewService::new(Arc::new(engine), repo));

        Self {
            router: build_router(AppState::new(service, None)),
            oracles,
            reviews,
            oracle_base_url: base_url,
        }
    }

    /// 登记一个用户，返回其 Token
    pub fn user(&self, id: i64, username: &str, role: &str) -> String {
        let token = sign_token(id, username, role, 3600);
        self.oracles.add_user(MockUser {
            id,
            username: username.to_string(),
            role: role.to_string(),
            token: token.clone(),
        });
        token
    }

    pub fn event(&self, id: i64, organizer_id: Option<i64>, archived: bool) {
        self.oracles.add_event(MockEvent {
            id,
            title: format!("event-{}", id),
            organizer_id,
            archived,
        });
    }

    pub fn booking(&self, user_id: i64, event_id: i64) {
        self.oracles.add_booking(MockBooking { user_id, event_id });
    }

    pub async fn send(&self, request: Request<Body>) -> (u16, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        read_json(response).await
    }
}

/// 用测试密钥签发 Token，`ttl_secs` 为负数时得到已过期的 Token
pub fn sign_token(user_id: i64, username: &str, role: &str, ttl_secs: i64) -> String {
    sign_with_secret(user_id, username, role, ttl_secs, TEST_SECRET)
}

pub fn sign_with_secret(
    user_id: i64,
    username: &str,
    role: &str,
    ttl_secs: i64,
    secret: &str,
) -> String {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: Some(username.to_string()),
        user_id: Some(UserIdClaim::Number(user_id)),
        role: Some(role.to_string()),
        iat: Some(now),
        exp: now + ttl_secs,
        iss: None,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn empty_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn read_json(response: Response<Body>) -> (u16, Value) {
    let status = response.status().as_u16();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}
