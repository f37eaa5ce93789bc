//! 命令执行器

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;

use crate::app;
use crate::models::Seed;
use crate::state::OracleState;

pub struct CommandRunner;

impl CommandRunner {
    /// 读取并解析预置数据
    pub fn load_seed(path: &Path) -> Result<Seed> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("读取预置数据失败: {}", path.display()))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("解析预置数据失败: {}", path.display()))
    }

    pub async fn run_server(port: u16, seed: Option<&Path>, delay_ms: u64) -> Result<()> {
        let state = Arc::new(OracleState::new());

        if let Some(path) = seed {
            let seed = Self::load_seed(path)?;
            info!(
                users = seed.users.len(),
                events = seed.events.len(),
                bookings = seed.bookings.len(),
                "加载预置数据"
            );
            state.apply_seed(seed);
        }
        state.set_delay(Duration::from_millis(delay_ms));

        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        let listener = TcpListener::bind(addr).await.context("绑定端口失败")?;

        info!("Mock 上游服务已启动: http://{}", addr);
        info!("可用端点:");
        info!("  GET  /auth/me - 身份服务");
        info!("  GET  /events/public/{{id}}, /events/{{id}} - 活动服务");
        info!("  GET  /api/bookings/check - 预订服务");
        info!("  POST /mock/users|events|bookings, PUT /mock/delay - 写入测试数据");
        if delay_ms > 0 {
            info!(delay_ms, "上游响应延迟已开启");
        }

        axum::serve(listener, app(state))
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("服务器运行失败")?;

        info!("Mock 上游服务已停止");
        Ok(())
    }

    pub fn run_check_seed(file: &Path) -> Result<()> {
        let seed = Self::load_seed(file)?;
        println!("用户: {}", seed.users.len());
        println!("活动: {}", seed.events.len());
        println!(
            "  其中已归档: {}",
            seed.events.iter().filter(|e| e.archived).count()
        );
        println!("预订: {}", seed.bookings.len());
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("监听 Ctrl+C 失败: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("监听 SIGTERM 失败: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("收到关闭信号");
}
