pub mod approvals;
pub mod auth;
pub mod common;
pub mod rosters;
pub mod scores;
pub mod users;

pub use common::error_code::ErrorCode;
pub use common::response::ApiResponse;
pub use common::state::AppStartTime;
