//! 成绩记录实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "score_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub student_id: i64,
    pub class_id: i64,
    pub subject_id: i64,
    pub session: String,
    pub term: String,
    pub assess_1: f64,
    pub assess_2: f64,
    pub test_1: f64,
    pub test_2: f64,
    pub exam: f64,
    pub total: f64,
    pub status: String,
    pub added_by: i64,
    pub updated_by: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::students::Entity",
        from = "Column::StudentId",
        to = "super::students::Column::Id"
    )]
    Student,
    #[sea_orm(
        belongs_to = "super::classes::Entity",
        from = "Column::ClassId",
        to = "super::classes::Column::Id"
    )]
    Class,
    #[sea_orm(
        belongs_to = "super::subjects::Entity",
        from = "Column::SubjectId",
        to = "super::subjects::Column::Id"
    )]
    Subject,
}

impl Related<super::students::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl Related<super::classes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Class.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_score_record(self) -> crate::models::scores::entities::ScoreRecord {
        use crate::models::scores::entities::{
            SchoolTerm, ScoreComponents, ScoreRecord, ScoreStatus,
        };
        use chrono::{DateTime, Utc};

        ScoreRecord {
            id: self.id,
            student_id: self.student_id,
            class_id: self.class_id,
            subject_id: self.subject_id,
            session: self.session,
            term: self.term.parse::<SchoolTerm>().unwrap_or(SchoolTerm::First),
            components: ScoreComponents {
                assess_1: self.assess_1,
                assess_2: self.assess_2,
                test_1: self.test_1,
                test_2: self.test_2,
                exam: self.exam,
            },
            total: self.total,
            status: self
                .status
                .parse::<ScoreStatus>()
                .unwrap_or(ScoreStatus::Inactive),
            added_by: self.added_by,
            updated_by: self.updated_by,
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
            updated_at: DateTime::<Utc>::from_timestamp(self.updated_at, 0).unwrap_or_default(),
        }
    }
}
