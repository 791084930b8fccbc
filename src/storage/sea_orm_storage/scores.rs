//! 成绩记录存储操作
//!
//! 自然键 (student, class, subject, session, term) 上的 upsert 在事务内执行，
//! 并发插入撞上唯一索引时降级为更新，保证每个键至多一条记录。

use super::SeaOrmStorage;
use crate::entity::score_records::{ActiveModel, Column, Entity as ScoreRecords};
use crate::errors::{Result, ScoreSystemError};
use crate::models::scores::entities::{SchoolTerm, ScoreComponents, ScoreRecord, ScoreStatus};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    SqlErr, TransactionTrait,
};

impl SeaOrmStorage {
    /// 按自然键查找成绩记录（任意状态）
    async fn find_by_natural_key<C: ConnectionTrait>(
        conn: &C,
        student_id: i64,
        class_id: i64,
        subject_id: i64,
        session: &str,
        term: SchoolTerm,
    ) -> Result<Option<crate::entity::score_records::Model>> {
        ScoreRecords::find()
            .filter(Column::StudentId.eq(student_id))
            .filter(Column::ClassId.eq(class_id))
            .filter(Column::SubjectId.eq(subject_id))
            .filter(Column::Session.eq(session))
            .filter(Column::Term.eq(term.as_str()))
            .one(conn)
            .await
            .map_err(|e| ScoreSystemError::database_operation(format!("查询成绩记录失败: {e}")))
    }

    /// 按记录 ID 覆盖分量并重算总分
    async fn overwrite_components<C: ConnectionTrait>(
        conn: &C,
        score_id: i64,
        components: ScoreComponents,
        updated_by: i64,
    ) -> Result<()> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            id: Set(score_id),
            assess_1: Set(components.assess_1),
            assess_2: Set(components.assess_2),
            test_1: Set(components.test_1),
            test_2: Set(components.test_2),
            exam: Set(components.exam),
            total: Set(components.total()),
            status: Set(ScoreStatus::Active.to_string()),
            updated_by: Set(updated_by),
            updated_at: Set(now),
            ..Default::default()
        };

        model
            .update(conn)
            .await
            .map_err(|e| ScoreSystemError::database_operation(format!("更新成绩记录失败: {e}")))?;

        Ok(())
    }

    /// 按自然键 upsert 一条成绩记录
    ///
    /// 已有记录（含已停用的）原地覆盖并重新激活，否则插入新记录
    #[allow(clippy::too_many_arguments)]
    pub async fn upsert_score_record_impl(
        &self,
        teacher_id: i64,
        student_id: i64,
        class_id: i64,
        subject_id: i64,
        session: &str,
        term: SchoolTerm,
        components: ScoreComponents,
    ) -> Result<i64> {
        let now = chrono::Utc::now().timestamp();

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| ScoreSystemError::database_operation(format!("开启事务失败: {e}")))?;

        let existing =
            Self::find_by_natural_key(&txn, student_id, class_id, subject_id, session, term)
                .await?;

        let score_id = match existing {
            Some(record) => {
                Self::overwrite_components(&txn, record.id, components, teacher_id).await?;
                record.id
            }
            None => {
                let model = ActiveModel {
                    student_id: Set(student_id),
                    class_id: Set(class_id),
                    subject_id: Set(subject_id),
                    session: Set(session.to_string()),
                    term: Set(term.as_str().to_string()),
                    assess_1: Set(components.assess_1),
                    assess_2: Set(components.assess_2),
                    test_1: Set(components.test_1),
                    test_2: Set(components.test_2),
                    exam: Set(components.exam),
                    total: Set(components.total()),
                    status: Set(ScoreStatus::Active.to_string()),
                    added_by: Set(teacher_id),
                    updated_by: Set(teacher_id),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                };

                match model.insert(&txn).await {
                    Ok(inserted) => inserted.id,
                    Err(e) => {
                        if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                            // 并发插入撞上自然键唯一索引，降级为更新
                            let record = Self::find_by_natural_key(
                                &txn, student_id, class_id, subject_id, session, term,
                            )
                            .await?
                            .ok_or_else(|| {
                                ScoreSystemError::conflict("成绩记录并发写入冲突")
                            })?;
                            Self::overwrite_components(&txn, record.id, components, teacher_id)
                                .await?;
                            record.id
                        } else {
                            return Err(ScoreSystemError::database_operation(format!(
                                "创建成绩记录失败: {e}"
                            )));
                        }
                    }
                }
            }
        };

        txn.commit()
            .await
            .map_err(|e| ScoreSystemError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(score_id)
    }

    /// 通过 ID 获取成绩记录（任意状态）
    pub async fn get_score_record_by_id_impl(&self, score_id: i64) -> Result<Option<ScoreRecord>> {
        let result = ScoreRecords::find_by_id(score_id)
            .one(&self.db)
            .await
            .map_err(|e| ScoreSystemError::database_operation(format!("查询成绩记录失败: {e}")))?;

        Ok(result.map(|m| m.into_score_record()))
    }

    /// 按记录 ID 覆盖五个分量并重算总分
    pub async fn update_score_components_impl(
        &self,
        score_id: i64,
        components: ScoreComponents,
        updated_by: i64,
    ) -> Result<Option<ScoreRecord>> {
        // 先检查记录是否存在
        let existing = self.get_score_record_by_id_impl(score_id).await?;
        if existing.is_none() {
            return Ok(None);
        }

        Self::overwrite_components(&self.db, score_id, components, updated_by).await?;

        self.get_score_record_by_id_impl(score_id).await
    }

    /// 软删除成绩记录
    ///
    /// 只要记录存在就成功（已停用的记录重复删除视为成功），不存在返回 false
    pub async fn deactivate_score_record_impl(
        &self,
        score_id: i64,
        updated_by: i64,
    ) -> Result<bool> {
        let existing = ScoreRecords::find_by_id(score_id)
            .one(&self.db)
            .await
            .map_err(|e| ScoreSystemError::database_operation(format!("查询成绩记录失败: {e}")))?;

        if existing.is_none() {
            return Ok(false);
        }

        let now = chrono::Utc::now().timestamp();
        let model = ActiveModel {
            id: Set(score_id),
            status: Set(ScoreStatus::Inactive.to_string()),
            updated_by: Set(updated_by),
            updated_at: Set(now),
            ..Default::default()
        };

        model
            .update(&self.db)
            .await
            .map_err(|e| ScoreSystemError::database_operation(format!("停用成绩记录失败: {e}")))?;

        Ok(true)
    }

    /// 列出 (班级, 科目) 的有效成绩记录
    pub async fn list_active_score_records_impl(
        &self,
        class_id: i64,
        subject_id: i64,
        session: Option<&str>,
        term: Option<SchoolTerm>,
    ) -> Result<Vec<ScoreRecord>> {
        let mut select = ScoreRecords::find()
            .filter(Column::ClassId.eq(class_id))
            .filter(Column::SubjectId.eq(subject_id))
            .filter(Column::Status.eq(ScoreStatus::Active.to_string()));

        if let Some(session) = session {
            select = select.filter(Column::Session.eq(session));
        }

        if let Some(term) = term {
            select = select.filter(Column::Term.eq(term.as_str()));
        }

        let rows = select
            .order_by_desc(Column::Total)
            .all(&self.db)
            .await
            .map_err(|e| ScoreSystemError::database_operation(format!("查询成绩记录失败: {e}")))?;

        Ok(rows.into_iter().map(|m| m.into_score_record()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support;
    use crate::models::scores::entities::{SchoolTerm, ScoreComponents, ScoreStatus};
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
    async fn test_upsert_creates_then_updates_in_place() {
        let ctx = test_support::TestContext::new().await;

        let first = ctx
            .storage
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

        let second = ctx
            .storage
            .upsert_score_record(
                ctx.teacher_id,
                ctx.student_ids[0],
                ctx.class_id,
                ctx.subject_id,
                SESSION,
                SchoolTerm::First,
                components(8.0, 9.0, 14.0, 16.0, 38.0),
            )
            .await
            .unwrap();

        // 同一自然键两次保存得到同一条记录，保留第二次的值
        assert_eq!(first, second);

        let records = ctx
            .storage
            .list_active_score_records(
                ctx.class_id,
                ctx.subject_id,
                Some(SESSION),
                Some(SchoolTerm::First),
            )
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].components.assess_1, 8.0);
        assert_eq!(records[0].total, 85.0);
    }

    #[tokio::test]
    async fn test_upsert_reactivates_deactivated_record() {
        let ctx = test_support::TestContext::new().await;

        let score_id = ctx
            .storage
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

        assert!(
            ctx.storage
                .deactivate_score_record(score_id, ctx.teacher_id)
                .await
                .unwrap()
        );

        let same_id = ctx
            .storage
            .upsert_score_record(
                ctx.teacher_id,
                ctx.student_ids[0],
                ctx.class_id,
                ctx.subject_id,
                SESSION,
                SchoolTerm::First,
                components(5.0, 5.0, 10.0, 10.0, 30.0),
            )
            .await
            .unwrap();

        assert_eq!(score_id, same_id);
        let record = ctx
            .storage
            .get_score_record_by_id(score_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.status, ScoreStatus::Active);
        assert_eq!(record.total, 60.0);
    }

    #[tokio::test]
    async fn test_update_components_recomputes_total() {
        let ctx = test_support::TestContext::new().await;

        let score_id = ctx
            .storage
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

        let updated = ctx
            .storage
            .update_score_components(score_id, components(7.0, 8.0, 12.0, 13.0, 35.0), 999)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.total, 75.0);
        assert_eq!(updated.updated_by, 999);
        // added_by 不随更新改变
        assert_eq!(updated.added_by, ctx.teacher_id);
    }

    #[tokio::test]
    async fn test_update_missing_record_returns_none() {
        let ctx = test_support::TestContext::new().await;

        let result = ctx
            .storage
            .update_score_components(424242, components(1.0, 1.0, 1.0, 1.0, 1.0), 1)
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_deactivate_is_soft_and_repeatable() {
        let ctx = test_support::TestContext::new().await;

        let score_id = ctx
            .storage
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

        assert!(
            ctx.storage
                .deactivate_score_record(score_id, ctx.teacher_id)
                .await
                .unwrap()
        );
        // 行仍然存在，重复删除依旧成功
        assert!(
            ctx.storage
                .deactivate_score_record(score_id, ctx.teacher_id)
                .await
                .unwrap()
        );
        // 不存在的记录返回 false
        assert!(
            !ctx.storage
                .deactivate_score_record(424242, ctx.teacher_id)
                .await
                .unwrap()
        );

        // 软删除的记录不出现在有效列表中
        let records = ctx
            .storage
            .list_active_score_records(ctx.class_id, ctx.subject_id, Some(SESSION), None)
            .await
            .unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_list_filters_by_session_and_term() {
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
        ctx.storage
            .upsert_score_record(
                ctx.teacher_id,
                ctx.student_ids[0],
                ctx.class_id,
                ctx.subject_id,
                SESSION,
                SchoolTerm::Second,
                components(9.0, 9.0, 14.0, 14.0, 39.0),
            )
            .await
            .unwrap();

        let first_term = ctx
            .storage
            .list_active_score_records(
                ctx.class_id,
                ctx.subject_id,
                Some(SESSION),
                Some(SchoolTerm::First),
            )
            .await
            .unwrap();
        assert_eq!(first_term.len(), 1);
        assert_eq!(first_term[0].term, SchoolTerm::First);

        // 省略学期时跨学期返回
        let all_terms = ctx
            .storage
            .list_active_score_records(ctx.class_id, ctx.subject_id, Some(SESSION), None)
            .await
            .unwrap();
        assert_eq!(all_terms.len(), 2);
    }

    #[tokio::test]
    async fn test_cohort_view_read_path_ranks_scored_students() {
        use crate::services::scores::aggregation;
        use std::collections::{HashMap, HashSet};

        let ctx = test_support::TestContext::new().await;

        // 组 A：S1 → 90，S2 → 85；组 B 的学生不录分
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

        // 与同批视图处理程序相同的取数与合并路径
        let memberships = ctx
            .storage
            .list_class_memberships(ctx.class_id, Some(SESSION))
            .await
            .unwrap();
        let enrolled: HashSet<i64> = ctx
            .storage
            .list_subject_enrollment_student_ids(ctx.class_id, ctx.subject_id, Some(SESSION))
            .await
            .unwrap()
            .into_iter()
            .collect();
        let records = ctx
            .storage
            .list_active_score_records(
                ctx.class_id,
                ctx.subject_id,
                Some(SESSION),
                Some(SchoolTerm::First),
            )
            .await
            .unwrap();

        let members = aggregation::build_cohort_members(&memberships, &enrolled, &records);
        let member_ids: Vec<i64> = members.iter().map(|m| m.student_id).collect();
        let students: HashMap<i64, _> = ctx
            .storage
            .get_students_by_ids(&member_ids)
            .await
            .unwrap()
            .into_iter()
            .map(|s| (s.id, s))
            .collect();
        let rows = aggregation::compute_rows(&members, &students);

        assert_eq!(rows.len(), 3);
        // 行按总分降序，组 A 两人在前
        assert_eq!(rows[0].student.id, ctx.student_ids[0]);
        assert_eq!(rows[0].total, Some(90.0));
        assert_eq!(rows[0].position, Some(1));
        assert_eq!(rows[1].student.id, ctx.student_ids[1]);
        assert_eq!(rows[1].total, Some(85.0));
        assert_eq!(rows[1].position, Some(2));
        for row in &rows[..2] {
            assert_eq!(row.total_students, 2);
            assert_eq!(row.avg_total, Some(87.5));
        }
        // 组 B 的学生自成一批且未录分
        assert_eq!(rows[2].student.id, ctx.group_b_student_id);
        assert_eq!(rows[2].total, None);
        assert_eq!(rows[2].total_students, 1);
        assert_eq!(rows[2].avg_total, None);
        assert_eq!(rows[2].position, None);
    }
}
