//! 成绩审批快照存储操作
//!
//! 审批是单向状态流转：快照行的存在即为“已审批”，无更新与删除路径。
//! 聚合与插入在同一事务内完成；并发审批撞上作用域唯一索引时
//! 返回既有快照而非错误。

use std::collections::HashSet;

use super::SeaOrmStorage;
use crate::entity::class_students::{Column as ClassStudentColumn, Entity as ClassStudents};
use crate::entity::result_summaries::{ActiveModel, Column, Entity as ResultSummaries};
use crate::entity::score_records::{Column as ScoreRecordColumn, Entity as ScoreRecords};
use crate::errors::{Result, ScoreSystemError};
use crate::models::approvals::entities::ResultSummary;
use crate::models::scores::entities::{SchoolTerm, ScoreStatus};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set, SqlErr,
    TransactionTrait,
};

const STATUS_ACTIVE: &str = "active";
const STATUS_APPROVED: &str = "approved";

impl SeaOrmStorage {
    /// 按作用域查找审批快照
    ///
    /// class_group 在存储层以空串表示“无分组”
    async fn find_summary<C: ConnectionTrait>(
        conn: &C,
        class_id: i64,
        group_key: &str,
        session: &str,
        term: SchoolTerm,
    ) -> Result<Option<crate::entity::result_summaries::Model>> {
        ResultSummaries::find()
            .filter(Column::ClassId.eq(class_id))
            .filter(Column::ClassGroup.eq(group_key))
            .filter(Column::Session.eq(session))
            .filter(Column::Term.eq(term.as_str()))
            .one(conn)
            .await
            .map_err(|e| ScoreSystemError::database_operation(format!("查询审批快照失败: {e}")))
    }

    /// 查询作用域的审批快照
    pub async fn get_result_summary_impl(
        &self,
        class_id: i64,
        class_group: Option<&str>,
        session: &str,
        term: SchoolTerm,
    ) -> Result<Option<ResultSummary>> {
        let group_key = class_group.unwrap_or("");
        let result = Self::find_summary(&self.db, class_id, group_key, session, term).await?;
        Ok(result.map(|m| m.into_result_summary()))
    }

    /// 审批：聚合作用域成绩并写入快照
    ///
    /// 幂等：已审批的作用域直接返回既有快照。
    /// 统计口径：total_students 为作用域内在册学生数（与是否录分无关）；
    /// total_score 为作用域内全部科目有效成绩 total 之和；
    /// average_score 仅以已录分学生数为分母，无人录分为 None。
    pub async fn approve_results_impl(
        &self,
        class_id: i64,
        class_group: Option<&str>,
        session: &str,
        term: SchoolTerm,
        school_id: i64,
        approved_by: i64,
    ) -> Result<ResultSummary> {
        let group_key = class_group.unwrap_or("");

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| ScoreSystemError::database_operation(format!("开启事务失败: {e}")))?;

        // 已审批的作用域不再聚合
        if let Some(existing) = Self::find_summary(&txn, class_id, group_key, session, term).await?
        {
            txn.commit()
                .await
                .map_err(|e| ScoreSystemError::database_operation(format!("提交事务失败: {e}")))?;
            return Ok(existing.into_result_summary());
        }

        // 作用域内在册学生（分组 null-safe 匹配）
        let memberships = ClassStudents::find()
            .filter(ClassStudentColumn::ClassId.eq(class_id))
            .filter(ClassStudentColumn::Session.eq(session))
            .filter(ClassStudentColumn::Status.eq(STATUS_ACTIVE))
            .all(&txn)
            .await
            .map_err(|e| ScoreSystemError::database_operation(format!("查询班级成员失败: {e}")))?;

        let member_ids: HashSet<i64> = memberships
            .iter()
            .filter(|m| m.class_group.as_deref() == class_group)
            .map(|m| m.student_id)
            .collect();

        // 作用域内全部科目的有效成绩
        let records = ScoreRecords::find()
            .filter(ScoreRecordColumn::ClassId.eq(class_id))
            .filter(ScoreRecordColumn::Session.eq(session))
            .filter(ScoreRecordColumn::Term.eq(term.as_str()))
            .filter(ScoreRecordColumn::Status.eq(ScoreStatus::Active.to_string()))
            .all(&txn)
            .await
            .map_err(|e| ScoreSystemError::database_operation(format!("查询成绩记录失败: {e}")))?;

        let mut total_score = 0.0;
        let mut scored_students: HashSet<i64> = HashSet::new();
        for record in &records {
            if member_ids.contains(&record.student_id) {
                total_score += record.total;
                scored_students.insert(record.student_id);
            }
        }

        // 未录分学生计入 total_students，但不进入平均分分母
        let average_score = if scored_students.is_empty() {
            None
        } else {
            Some(total_score / scored_students.len() as f64)
        };

        let now = chrono::Utc::now().timestamp();
        let model = ActiveModel {
            class_id: Set(class_id),
            class_group: Set(group_key.to_string()),
            session: Set(session.to_string()),
            term: Set(term.as_str().to_string()),
            school_id: Set(school_id),
            total_students: Set(member_ids.len() as i64),
            total_score: Set(total_score),
            average_score: Set(average_score),
            status: Set(STATUS_APPROVED.to_string()),
            approved_by: Set(approved_by),
            approved_at: Set(now),
            ..Default::default()
        };

        match model.insert(&txn).await {
            Ok(inserted) => {
                txn.commit().await.map_err(|e| {
                    ScoreSystemError::database_operation(format!("提交事务失败: {e}"))
                })?;
                Ok(inserted.into_result_summary())
            }
            Err(e) => {
                if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                    // 并发审批撞上作用域唯一索引：放弃本次快照，返回已落库的那份
                    txn.rollback().await.ok();
                    self.get_result_summary_impl(class_id, class_group, session, term)
                        .await?
                        .ok_or_else(|| ScoreSystemError::conflict("审批快照并发写入冲突"))
                } else {
                    Err(ScoreSystemError::database_operation(format!(
                        "写入审批快照失败: {e}"
                    )))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support;
    use crate::models::scores::entities::{SchoolTerm, ScoreComponents};
    use crate::storage::Storage;

    const SESSION: &str = "2024/2025";

    fn components(a1: f64, a2: f64, t1: f64, t2: f64, exam: f64) -> ScoreComponents {
        ScoreComponents {
            assess_1: a1,
            assess_2: a2,
            test_1: t1,
            test_2: t2,
            exam,
        }
    }

    #[tokio::test]
    async fn test_approve_snapshots_cohort_totals() {
        let ctx = test_support::TestContext::new().await;

        // S1 → 90, S2 → 85
        ctx.storage
            .upsert_score_record(
                ctx.teacher_id,
                ctx.student_ids[0],
                ctx.class_id,
                ctx.subject_id,
                SESSION,
                SchoolTerm::First,
                components(10.0, 10.0, 15.0, 15.0, 40.0),
            )
            .await
            .unwrap();
        ctx.storage
            .upsert_score_record(
                ctx.teacher_id,
                ctx.student_ids[1],
                ctx.class_id,
                ctx.subject_id,
                SESSION,
                SchoolTerm::First,
                components(8.0, 9.0, 14.0, 16.0, 38.0),
            )
            .await
            .unwrap();

        let summary = ctx
            .storage
            .approve_results(
                ctx.class_id,
                Some("A"),
                SESSION,
                SchoolTerm::First,
                ctx.school_id,
                ctx.teacher_id,
            )
            .await
            .unwrap();

        assert_eq!(summary.total_students, 2);
        assert_eq!(summary.total_score, 175.0);
        assert_eq!(summary.average_score, Some(87.5));
        assert_eq!(summary.class_group.as_deref(), Some("A"));
        assert_eq!(summary.approved_by, ctx.teacher_id);
    }

    #[tokio::test]
    async fn test_approve_is_idempotent() {
        let ctx = test_support::TestContext::new().await;

        ctx.storage
            .upsert_score_record(
                ctx.teacher_id,
                ctx.student_ids[0],
                ctx.class_id,
                ctx.subject_id,
                SESSION,
                SchoolTerm::First,
                components(10.0, 10.0, 15.0, 15.0, 40.0),
            )
            .await
            .unwrap();

        let first = ctx
            .storage
            .approve_results(
                ctx.class_id,
                Some("A"),
                SESSION,
                SchoolTerm::First,
                ctx.school_id,
                ctx.teacher_id,
            )
            .await
            .unwrap();

        // 审批后补录的成绩不改变既有快照
        ctx.storage
            .upsert_score_record(
                ctx.teacher_id,
                ctx.student_ids[1],
                ctx.class_id,
                ctx.subject_id,
                SESSION,
                SchoolTerm::First,
                components(8.0, 9.0, 14.0, 16.0, 38.0),
            )
            .await
            .unwrap();

        let second = ctx
            .storage
            .approve_results(
                ctx.class_id,
                Some("A"),
                SESSION,
                SchoolTerm::First,
                ctx.school_id,
                ctx.teacher_id,
            )
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.total_score, first.total_score);
    }

    #[tokio::test]
    async fn test_approve_counts_unscored_members_but_excludes_from_average() {
        let ctx = test_support::TestContext::new().await;
        ctx.add_student(Some("A")).await;

        // 组 A 有 3 名在册学生，只有 2 人录分
        ctx.storage
            .upsert_score_record(
                ctx.teacher_id,
                ctx.student_ids[0],
                ctx.class_id,
                ctx.subject_id,
                SESSION,
                SchoolTerm::First,
                components(10.0, 10.0, 15.0, 15.0, 40.0),
            )
            .await
            .unwrap();
        ctx.storage
            .upsert_score_record(
                ctx.teacher_id,
                ctx.student_ids[1],
                ctx.class_id,
                ctx.subject_id,
                SESSION,
                SchoolTerm::First,
                components(5.0, 5.0, 10.0, 10.0, 40.0),
            )
            .await
            .unwrap();

        let summary = ctx
            .storage
            .approve_results(
                ctx.class_id,
                Some("A"),
                SESSION,
                SchoolTerm::First,
                ctx.school_id,
                ctx.teacher_id,
            )
            .await
            .unwrap();

        assert_eq!(summary.total_students, 3);
        assert_eq!(summary.total_score, 160.0);
        // 平均分分母为已录分学生数 2，而非在册学生数 3
        assert_eq!(summary.average_score, Some(80.0));
    }

    #[tokio::test]
    async fn test_approve_with_no_scores_has_null_average() {
        let ctx = test_support::TestContext::new().await;

        let summary = ctx
            .storage
            .approve_results(
                ctx.class_id,
                Some("A"),
                SESSION,
                SchoolTerm::First,
                ctx.school_id,
                ctx.teacher_id,
            )
            .await
            .unwrap();

        assert_eq!(summary.total_students, 2);
        assert_eq!(summary.total_score, 0.0);
        assert_eq!(summary.average_score, None);
    }

    #[tokio::test]
    async fn test_approve_scopes_by_class_group() {
        let ctx = test_support::TestContext::new().await;

        // 组 B 的学生录分，不应计入组 A 的快照
        ctx.storage
            .upsert_score_record(
                ctx.teacher_id,
                ctx.group_b_student_id,
                ctx.class_id,
                ctx.subject_id,
                SESSION,
                SchoolTerm::First,
                components(10.0, 10.0, 15.0, 15.0, 40.0),
            )
            .await
            .unwrap();

        let summary = ctx
            .storage
            .approve_results(
                ctx.class_id,
                Some("A"),
                SESSION,
                SchoolTerm::First,
                ctx.school_id,
                ctx.teacher_id,
            )
            .await
            .unwrap();

        assert_eq!(summary.total_students, 2);
        assert_eq!(summary.total_score, 0.0);
        assert_eq!(summary.average_score, None);

        let b_summary = ctx
            .storage
            .approve_results(
                ctx.class_id,
                Some("B"),
                SESSION,
                SchoolTerm::First,
                ctx.school_id,
                ctx.teacher_id,
            )
            .await
            .unwrap();
        assert_eq!(b_summary.total_students, 1);
        assert_eq!(b_summary.average_score, Some(90.0));
    }

    #[tokio::test]
    async fn test_get_result_summary_distinguishes_scopes() {
        let ctx = test_support::TestContext::new().await;

        assert!(
            ctx.storage
                .get_result_summary(ctx.class_id, Some("A"), SESSION, SchoolTerm::First)
                .await
                .unwrap()
                .is_none()
        );

        ctx.storage
            .approve_results(
                ctx.class_id,
                Some("A"),
                SESSION,
                SchoolTerm::First,
                ctx.school_id,
                ctx.teacher_id,
            )
            .await
            .unwrap();

        assert!(
            ctx.storage
                .get_result_summary(ctx.class_id, Some("A"), SESSION, SchoolTerm::First)
                .await
                .unwrap()
                .is_some()
        );
        // 其他学期/分组不受影响
        assert!(
            ctx.storage
                .get_result_summary(ctx.class_id, Some("A"), SESSION, SchoolTerm::Second)
                .await
                .unwrap()
                .is_none()
        );
        assert!(
            ctx.storage
                .get_result_summary(ctx.class_id, Some("B"), SESSION, SchoolTerm::First)
                .await
                .unwrap()
                .is_none()
        );
        assert!(
            ctx.storage
                .get_result_summary(ctx.class_id, None, SESSION, SchoolTerm::First)
                .await
                .unwrap()
                .is_none()
        );
    }
}
