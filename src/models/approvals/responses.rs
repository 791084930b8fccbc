use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::approvals::entities::ResultSummary;

/// 审批状态响应
#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/approval.ts")]
pub struct ApprovalStatusResponse {
    /// 该作用域是否已审批（与请求者无关）
    pub approved: bool,
    /// 请求者是否为该班级+学年的班主任
    pub can_approve: bool,
    /// 请求者的班主任分组；非班主任为 None
    pub class_group: Option<String>,
}

/// 审批响应
#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/approval.ts")]
pub struct ApproveResponse {
    pub approved: bool,
    pub summary: ResultSummary,
}
