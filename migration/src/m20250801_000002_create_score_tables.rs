use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建成绩记录表
        // 自然键 (student_id, class_id, subject_id, session, term) 上的唯一索引
        // 保证并发 upsert 不会产生重复行
        manager
            .create_table(
                Table::create()
                    .table(ScoreRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ScoreRecords::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ScoreRecords::StudentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ScoreRecords::ClassId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ScoreRecords::SubjectId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ScoreRecords::Session).string().not_null())
                    .col(ColumnDef::new(ScoreRecords::Term).string().not_null())
                    .col(
                        ColumnDef::new(ScoreRecords::Assess1)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(ScoreRecords::Assess2)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(ScoreRecords::Test1)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(ScoreRecords::Test2)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(ScoreRecords::Exam)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(ColumnDef::new(ScoreRecords::Total).double().not_null())
                    .col(ColumnDef::new(ScoreRecords::Status).string().not_null())
                    .col(
                        ColumnDef::new(ScoreRecords::AddedBy)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ScoreRecords::UpdatedBy)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ScoreRecords::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ScoreRecords::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ScoreRecords::Table, ScoreRecords::StudentId)
                            .to(Students::Table, Students::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ScoreRecords::Table, ScoreRecords::ClassId)
                            .to(Classes::Table, Classes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ScoreRecords::Table, ScoreRecords::SubjectId)
                            .to(Subjects::Table, Subjects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建成绩审批快照表
        // class_group 在此表存储为非空字符串（无分组时为空串），
        // 使作用域唯一索引在所有后端上都能拦截并发审批
        manager
            .create_table(
                Table::create()
                    .table(ResultSummaries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ResultSummaries::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ResultSummaries::ClassId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ResultSummaries::ClassGroup)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(ResultSummaries::Session)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ResultSummaries::Term).string().not_null())
                    .col(
                        ColumnDef::new(ResultSummaries::SchoolId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ResultSummaries::TotalStudents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ResultSummaries::TotalScore)
                            .double()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ResultSummaries::AverageScore).double().null())
                    .col(ColumnDef::new(ResultSummaries::Status).string().not_null())
                    .col(
                        ColumnDef::new(ResultSummaries::ApprovedBy)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ResultSummaries::ApprovedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ResultSummaries::Table, ResultSummaries::ClassId)
                            .to(Classes::Table, Classes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ResultSummaries::Table, ResultSummaries::SchoolId)
                            .to(Schools::Table, Schools::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 自然键唯一索引：并发 upsert 的最终防线
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_score_records_natural_key")
                    .table(ScoreRecords::Table)
                    .col(ScoreRecords::StudentId)
                    .col(ScoreRecords::ClassId)
                    .col(ScoreRecords::SubjectId)
                    .col(ScoreRecords::Session)
                    .col(ScoreRecords::Term)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 审批作用域唯一索引：并发审批只允许一份快照落库
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_result_summaries_scope")
                    .table(ResultSummaries::Table)
                    .col(ResultSummaries::ClassId)
                    .col(ResultSummaries::ClassGroup)
                    .col(ResultSummaries::Session)
                    .col(ResultSummaries::Term)
                    .col(ResultSummaries::SchoolId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 成绩记录查询索引（按批次读取 cohort）
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_score_records_cohort")
                    .table(ScoreRecords::Table)
                    .col(ScoreRecords::ClassId)
                    .col(ScoreRecords::SubjectId)
                    .col(ScoreRecords::Session)
                    .col(ScoreRecords::Term)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_score_records_student")
                    .table(ScoreRecords::Table)
                    .col(ScoreRecords::StudentId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ResultSummaries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ScoreRecords::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum ScoreRecords {
    #[sea_orm(iden = "score_records")]
    Table,
    Id,
    StudentId,
    ClassId,
    SubjectId,
    Session,
    Term,
    #[sea_orm(iden = "assess_1")]
    Assess1,
    #[sea_orm(iden = "assess_2")]
    Assess2,
    #[sea_orm(iden = "test_1")]
    Test1,
    #[sea_orm(iden = "test_2")]
    Test2,
    Exam,
    Total,
    Status,
    AddedBy,
    UpdatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ResultSummaries {
    #[sea_orm(iden = "result_summaries")]
    Table,
    Id,
    ClassId,
    ClassGroup,
    Session,
    Term,
    SchoolId,
    TotalStudents,
    TotalScore,
    AverageScore,
    Status,
    ApprovedBy,
    ApprovedAt,
}

#[derive(DeriveIden)]
enum Students {
    #[sea_orm(iden = "students")]
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Classes {
    #[sea_orm(iden = "classes")]
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Subjects {
    #[sea_orm(iden = "subjects")]
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Schools {
    #[sea_orm(iden = "schools")]
    Table,
    Id,
}
