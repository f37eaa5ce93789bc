//! CLI 模块
//!
//! - `server` - 启动模拟的身份、活动、预订服务
//! - `check-seed` - 校验预置数据文件
//!
//! ```bash
//! mock-oracles server --port 8085 --seed config/mock-oracles.seed.yaml
//! mock-oracles server --delay-ms 5000
//! mock-oracles check-seed -f config/mock-oracles.seed.yaml
//! ```

pub mod commands;
pub mod runner;

pub use commands::{Cli, Commands};
pub use runner::CommandRunner;
