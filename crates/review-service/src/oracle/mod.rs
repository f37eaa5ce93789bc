//! 上游服务客户端
//!
//! 身份、活动、预订三个服务各自拥有自己的数据，本服务只读取它们的事实。
//! 所有调用都是同步 HTTP 请求，带显式超时；除身份服务外，失败一律折叠为
//! 最严格的结果（false / None），由资格引擎据此拒绝。

mod booking;
mod client;
mod event;
mod identity;

pub use booking::{BookingOracle, HttpBookingOracle};
pub use client::OracleCallError;
pub use event::{EventOracle, HttpEventOracle};
pub use identity::{HttpIdentityOracle, IdentityOracle};

#[cfg(test)]
pub use booking::MockBookingOracle;
#[cfg(test)]
pub use event::MockEventOracle;
#[cfg(test)]
pub use identity::MockIdentityOracle;
