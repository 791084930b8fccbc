use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::scores::entities::SchoolTerm;

// 成绩审批快照
//
// 一个 (class, class_group, session, term, school) 作用域至多一行，
// 行的存在即表示该作用域已审批，此后不可变更
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/approval.ts")]
pub struct ResultSummary {
    pub id: i64,
    pub class_id: i64,
    pub class_group: Option<String>,
    pub session: String,
    pub term: SchoolTerm,
    pub school_id: i64,
    /// 在册学生数（含未录分学生）
    pub total_students: i64,
    /// 作用域内全部有效成绩记录 total 之和
    pub total_score: f64,
    /// total_score / 已录分学生数；无人录分为 None
    pub average_score: Option<f64>,
    pub approved_by: i64,
    pub approved_at: chrono::DateTime<chrono::Utc>,
}
