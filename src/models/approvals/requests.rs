use serde::Deserialize;
use ts_rs::TS;

use crate::models::scores::entities::SchoolTerm;

/// 审批状态查询参数
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/approval.ts")]
pub struct ApprovalQueryParams {
    pub class_id: i64,
    pub session: String,
    pub term: SchoolTerm,
}

/// 审批请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/approval.ts")]
pub struct ApproveRequest {
    pub class_id: i64,
    pub session: String,
    pub term: SchoolTerm,
}
