use serde::Deserialize;
use ts_rs::TS;

use crate::models::users::entities::UserRole;

/// 创建用户请求（启动种子及后续管理接口使用）
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
    pub school_id: Option<i64>,
    pub profile_name: Option<String>,
}
