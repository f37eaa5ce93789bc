//! 请求与响应 DTO

mod request;
mod response;

pub use request::{CreateReviewRequest, UpdateReviewRequest};
pub use response::{ApiResponse, DeletedResponse, ReviewDto};
