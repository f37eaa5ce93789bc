//! 活动评价服务
//!
//! 提供评价的创建、查询、修改、删除 REST API。

use std::sync::Arc;
use std::time::Duration;

use anyhow::bail;
use axum::{extract::Request, http::HeaderValue, middleware, middleware::Next, response::Response};
use review_service::{
    auth::JwtVerifier,
    eligibility::EligibilityEngine,
    oracle::{HttpBookingOracle, HttpEventOracle, HttpIdentityOracle},
    repository::{MemoryReviewRepository, ReviewRepository, ReviewRepositoryTrait},
    routes,
    service::ReviewService,
    state::AppState,
};
use review_shared::{
    config::{AppConfig, StorageBackend},
    database::Database,
    observability,
};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load("review-service")?;

    let obs_config = config
        .observability
        .clone()
        .with_service_name(&config.service_name);
    let _guard = observability::init(&obs_config).await?;

    info!("Starting review-service on {}", config.server_addr());

    // 生产环境禁止使用默认 JWT 密钥
    if config.auth.uses_default_secret() {
        if config.is_production() {
            bail!("REVIEW_AUTH__JWT_SECRET must be set in production environment");
        }
        warn!("Using default JWT secret - set REVIEW_AUTH__JWT_SECRET for production");
    }

    // 存储后端
    let (repository, database) = match config.storage.backend {
        StorageBackend::Postgres => {
            let db = Database::connect(&config.database).await?;
            if config.database.run_migrations {
                db.run_migrations().await?;
            }
            let repo: Arc<dyn ReviewRepositoryTrait> =
                Arc::new(ReviewRepository::new(db.pool().clone()));
            (repo, Some(db))
        }
        StorageBackend::Memory => {
            warn!("Using in-memory review storage - data is lost on restart");
            let repo: Arc<dyn ReviewRepositoryTrait> = Arc::new(MemoryReviewRepository::new());
            (repo, None)
        }
    };

    // 上游服务客户端
    info!(
        identity = %config.oracles.identity_base_url,
        event = %config.oracles.event_base_url,
        booking = %config.oracles.booking_base_url,
        timeout_ms = config.oracles.timeout_ms,
        "Upstream oracles configured"
    );
    let engine = EligibilityEngine::new(
        Arc::new(JwtVerifier::new(&config.auth)),
        Arc::new(HttpIdentityOracle::new(&config.oracles)?),
        Arc::new(HttpEventOracle::new(&config.oracles)?),
        Arc::new(HttpBookingOracle::new(&config.oracles)?),
        repository.clone(),
    );
    let service = Arc::new(ReviewService::new(Arc::new(engine), repository));
    let state = AppState::new(service, database);

    let app = routes::build_router(state)
        .layer(middleware::from_fn(security_headers))
        .layer(cors_layer(&config))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )));

    let listener = TcpListener::bind(config.server_addr()).await?;
    info!("Listening on {}", config.server_addr());

    // 优雅关闭：收到 SIGTERM 或 Ctrl+C 时停止接收新连接并等待已有请求处理完毕
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");

    Ok(())
}

/// CORS 配置：逗号分隔的来源列表，"*" 表示全部放行
fn cors_layer(config: &AppConfig) -> CorsLayer {
    let allowed_origins = config.server.cors_origins.trim();

    if allowed_origins == "*" {
        if config.is_production() {
            warn!("server.cors_origins=\"*\" 在生产环境中不安全，请设置为具体域名");
        }
        info!("CORS allowed_origins: * (all origins)");
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    info!("CORS allowed_origins: {}", allowed_origins);
    let origins: Vec<_> = allowed_origins
        .split(',')
        .filter_map(|s| s.trim().parse::<HeaderValue>().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// 为所有响应注入 HTTP 安全头
async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert("x-content-type-options", HeaderValue::from_static("nosniff"));
    headers.insert("x-frame-options", HeaderValue::from_static("DENY"));
    headers.insert(
        "strict-transport-security",
        HeaderValue::from_static("max-age=31536000; includeSubDomains"),
    );
    headers.insert("x-xss-protection", HeaderValue::from_static("0"));
    response
}

/// 监听关闭信号
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("注册 Ctrl+C 处理器失败: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("注册 SIGTERM 处理器失败: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown..."),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown..."),
    }
}
