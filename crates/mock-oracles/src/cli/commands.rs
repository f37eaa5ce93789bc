//! CLI 命令定义

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// 评价服务的上游模拟工具
#[derive(Parser, Debug)]
#[command(name = "mock-oracles")]
#[command(version, about = "模拟身份、活动、预订服务")]
#[command(propagate_version = true)]
pub struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 启动 HTTP 服务
    ///
    /// 三个上游服务共用同一端口，评价服务的三个上游地址都指向这里即可。
    Server {
        /// 服务端口
        #[arg(short, long, default_value = "8085", env = "MOCK_ORACLES_PORT")]
        port: u16,

        /// 预置数据（YAML）
        #[arg(short, long)]
        seed: Option<PathBuf>,

        /// 每个上游请求的人为延迟（毫秒）
        #[arg(long, default_value = "0")]
        delay_ms: u64,
    },

    /// 解析预置数据文件并打印统计
    CheckSeed {
        #[arg(short, long)]
        file: PathBuf,
    },
}
