//! 成绩审批快照实体
//!
//! class_group 列存储为非空字符串，空串表示“无分组”，
//! 业务模型侧恢复为 Option。

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "result_summaries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub class_id: i64,
    pub class_group: String,
    pub session: String,
    pub term: String,
    pub school_id: i64,
    pub total_students: i64,
    pub total_score: f64,
    pub average_score: Option<f64>,
    pub status: String,
    pub approved_by: i64,
    pub approved_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::classes::Entity",
        from = "Column::ClassId",
        to = "super::classes::Column::Id"
    )]
    Class,
    #[sea_orm(
        belongs_to = "super::schools::Entity",
        from = "Column::SchoolId",
        to = "super::schools::Column::Id"
    )]
    School,
}

impl Related<super::classes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Class.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_result_summary(self) -> crate::models::approvals::entities::ResultSummary {
        use crate::models::approvals::entities::ResultSummary;
        use crate::models::scores::entities::SchoolTerm;
        use chrono::{DateTime, Utc};

        ResultSummary {
            id: self.id,
            class_id: self.class_id,
            class_group: if self.class_group.is_empty() {
                None
            } else {
                Some(self.class_group)
            },
            session: self.session,
            term: self.term.parse::<SchoolTerm>().unwrap_or(SchoolTerm::First),
            school_id: self.school_id,
            total_students: self.total_students,
            total_score: self.total_score,
            average_score: self.average_score,
            approved_by: self.approved_by,
            approved_at: DateTime::<Utc>::from_timestamp(self.approved_at, 0).unwrap_or_default(),
        }
    }
}
