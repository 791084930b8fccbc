use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 学生（花名册视角，核心只读）
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/roster.ts")]
pub struct Student {
    pub id: i64,
    pub school_id: i64,
    pub first_name: String,
    pub surname: String,
}

// 班级成员关系，携带分组标签
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/roster.ts")]
pub struct ClassMembership {
    pub student_id: i64,
    pub class_id: i64,
    /// 分组标签（如 "A"/"B"），未分组为 None
    pub class_group: Option<String>,
    pub session: String,
}
