pub mod auth;
pub mod response;

pub use auth::{require_credentials, AuthUser};
pub use response::{ApiResponse, ApiResult};
