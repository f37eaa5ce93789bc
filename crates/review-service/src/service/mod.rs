//! 业务服务层

mod review_service;

pub use review_service::ReviewService;
