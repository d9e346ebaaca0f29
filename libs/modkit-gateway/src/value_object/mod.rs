//! Validated scalar wrappers used across the gateway
//!
//! Each type validates on construction and is immutable afterwards.

mod credentials;
mod http_method;
mod status_code;
mod timeout;

pub use credentials::{Login, Password};
pub use http_method::HttpMethod;
pub use status_code::StatusCode;
pub use timeout::Timeout;
