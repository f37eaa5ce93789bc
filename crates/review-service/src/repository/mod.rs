//! 数据访问层
//!
//! - `ReviewRepository`: PostgreSQL 实现（生产）
//! - `MemoryReviewRepository`: 进程内实现（本地开发与测试）

mod memory;
mod review_repo;
mod traits;

pub use memory::MemoryReviewRepository;
pub use review_repo::ReviewRepository;
pub use traits::ReviewRepositoryTrait;

#[cfg(test)]
pub use traits::MockReviewRepositoryTrait;
