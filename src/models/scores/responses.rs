use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::rosters::entities::Student;
use crate::models::scores::entities::SchoolTerm;

/// 录入成绩响应
#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/score.ts")]
pub struct SaveScoreResponse {
    pub score_id: i64,
}

/// 同批视图中的一行（每个在册学生一行，未录分的学生 total/position 为 None）
///
/// 四项派生值均在该学生自己的分组内计算
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/score.ts")]
pub struct CohortViewRow {
    pub student: Student,
    pub class_group: Option<String>,
    pub total: Option<f64>,
    /// 同批在册学生数（与是否已录分无关）
    pub total_students: i64,
    /// 已录分学生总分的算术平均，保留两位小数；无人录分为 None
    pub avg_total: Option<f64>,
    /// 按总分降序的密集名次，并列同名次；未录分为 None
    pub position: Option<i64>,
}

/// 同批视图响应
#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/score.ts")]
pub struct CohortViewResponse {
    pub class_id: i64,
    pub subject_id: i64,
    pub session: Option<String>,
    pub term: Option<SchoolTerm>,
    pub items: Vec<CohortViewRow>,
}
