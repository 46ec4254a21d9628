pub mod auth;
pub mod response;

pub use auth::{require_admin, require_normal_user, require_owner, session_auth_middleware, CurrentUser};
pub use response::{ApiResponse, ApiResult};
