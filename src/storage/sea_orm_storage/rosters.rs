//! 花名册查询操作
//!
//! 注册关系（班级成员、选课、任课、班主任）由外部管理流程写入，
//! 核心只做存在性与投影查询。

use super::SeaOrmStorage;
use crate::entity::class_students::{Column as ClassStudentColumn, Entity as ClassStudents};
use crate::entity::classes::Entity as Classes;
use crate::entity::form_teachers::{Column as FormTeacherColumn, Entity as FormTeachers};
use crate::entity::students::{Column as StudentColumn, Entity as Students};
use crate::entity::subject_enrollments::{
    Column as SubjectEnrollmentColumn, Entity as SubjectEnrollments,
};
use crate::entity::teaching_assignments::{
    Column as TeachingAssignmentColumn, Entity as TeachingAssignments,
};
use crate::errors::{Result, ScoreSystemError};
use crate::models::rosters::entities::{ClassMembership, Student};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect};

const STATUS_ACTIVE: &str = "active";

impl SeaOrmStorage {
    /// 教师是否持有有效任课分配
    pub async fn has_teaching_assignment_impl(
        &self,
        teacher_id: i64,
        class_id: i64,
        subject_id: i64,
        session: Option<&str>,
    ) -> Result<bool> {
        let mut select = TeachingAssignments::find()
            .filter(TeachingAssignmentColumn::TeacherId.eq(teacher_id))
            .filter(TeachingAssignmentColumn::ClassId.eq(class_id))
            .filter(TeachingAssignmentColumn::SubjectId.eq(subject_id))
            .filter(TeachingAssignmentColumn::Status.eq(STATUS_ACTIVE));

        if let Some(session) = session {
            select = select.filter(TeachingAssignmentColumn::Session.eq(session));
        }

        let count = select
            .count(&self.db)
            .await
            .map_err(|e| ScoreSystemError::database_operation(format!("查询任课分配失败: {e}")))?;

        Ok(count > 0)
    }

    /// 学生是否持有有效选课
    pub async fn has_subject_enrollment_impl(
        &self,
        student_id: i64,
        class_id: i64,
        subject_id: i64,
        session: &str,
    ) -> Result<bool> {
        let count = SubjectEnrollments::find()
            .filter(SubjectEnrollmentColumn::StudentId.eq(student_id))
            .filter(SubjectEnrollmentColumn::ClassId.eq(class_id))
            .filter(SubjectEnrollmentColumn::SubjectId.eq(subject_id))
            .filter(SubjectEnrollmentColumn::Session.eq(session))
            .filter(SubjectEnrollmentColumn::Status.eq(STATUS_ACTIVE))
            .count(&self.db)
            .await
            .map_err(|e| ScoreSystemError::database_operation(format!("查询选课失败: {e}")))?;

        Ok(count > 0)
    }

    /// 获取学生在班级+学年的成员关系
    pub async fn get_class_membership_impl(
        &self,
        class_id: i64,
        student_id: i64,
        session: &str,
    ) -> Result<Option<ClassMembership>> {
        let result = ClassStudents::find()
            .filter(ClassStudentColumn::ClassId.eq(class_id))
            .filter(ClassStudentColumn::StudentId.eq(student_id))
            .filter(ClassStudentColumn::Session.eq(session))
            .filter(ClassStudentColumn::Status.eq(STATUS_ACTIVE))
            .one(&self.db)
            .await
            .map_err(|e| ScoreSystemError::database_operation(format!("查询班级成员失败: {e}")))?;

        Ok(result.map(|m| m.into_class_membership()))
    }

    /// 列出班级的全部有效成员
    pub async fn list_class_memberships_impl(
        &self,
        class_id: i64,
        session: Option<&str>,
    ) -> Result<Vec<ClassMembership>> {
        let mut select = ClassStudents::find()
            .filter(ClassStudentColumn::ClassId.eq(class_id))
            .filter(ClassStudentColumn::Status.eq(STATUS_ACTIVE));

        if let Some(session) = session {
            select = select.filter(ClassStudentColumn::Session.eq(session));
        }

        let rows = select
            .all(&self.db)
            .await
            .map_err(|e| ScoreSystemError::database_operation(format!("查询班级成员失败: {e}")))?;

        Ok(rows.into_iter().map(|m| m.into_class_membership()).collect())
    }

    /// 列出 (班级, 科目) 的有效选课学生ID
    pub async fn list_subject_enrollment_student_ids_impl(
        &self,
        class_id: i64,
        subject_id: i64,
        session: Option<&str>,
    ) -> Result<Vec<i64>> {
        let mut select = SubjectEnrollments::find()
            .filter(SubjectEnrollmentColumn::ClassId.eq(class_id))
            .filter(SubjectEnrollmentColumn::SubjectId.eq(subject_id))
            .filter(SubjectEnrollmentColumn::Status.eq(STATUS_ACTIVE));

        if let Some(session) = session {
            select = select.filter(SubjectEnrollmentColumn::Session.eq(session));
        }

        let ids = select
            .select_only()
            .column(SubjectEnrollmentColumn::StudentId)
            .into_tuple::<i64>()
            .all(&self.db)
            .await
            .map_err(|e| ScoreSystemError::database_operation(format!("查询选课失败: {e}")))?;

        Ok(ids)
    }

    /// 批量获取有效学生
    pub async fn get_students_by_ids_impl(&self, student_ids: &[i64]) -> Result<Vec<Student>> {
        if student_ids.is_empty() {
            return Ok(vec![]);
        }

        let rows = Students::find()
            .filter(StudentColumn::Id.is_in(student_ids.iter().copied()))
            .filter(StudentColumn::Status.eq(STATUS_ACTIVE))
            .all(&self.db)
            .await
            .map_err(|e| ScoreSystemError::database_operation(format!("查询学生失败: {e}")))?;

        Ok(rows.into_iter().map(|m| m.into_student()).collect())
    }

    /// 获取教师的班主任分组
    ///
    /// 外层 None 表示无班主任分配；内层为分组标签（可为 None 表示整班无分组）
    pub async fn get_form_teacher_group_impl(
        &self,
        teacher_id: i64,
        class_id: i64,
        session: &str,
    ) -> Result<Option<Option<String>>> {
        let result = FormTeachers::find()
            .filter(FormTeacherColumn::TeacherId.eq(teacher_id))
            .filter(FormTeacherColumn::ClassId.eq(class_id))
            .filter(FormTeacherColumn::Session.eq(session))
            .filter(FormTeacherColumn::Status.eq(STATUS_ACTIVE))
            .one(&self.db)
            .await
            .map_err(|e| ScoreSystemError::database_operation(format!("查询班主任分配失败: {e}")))?;

        Ok(result.map(|m| m.class_group))
    }

    /// 获取班级所属学校
    pub async fn get_class_school_id_impl(&self, class_id: i64) -> Result<Option<i64>> {
        let result = Classes::find_by_id(class_id)
            .one(&self.db)
            .await
            .map_err(|e| ScoreSystemError::database_operation(format!("查询班级失败: {e}")))?;

        Ok(result.map(|m| m.school_id))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support;
    use crate::storage::Storage;

    const SESSION: &str = "2024/2025";

    #[tokio::test]
    async fn test_teaching_assignment_lookup() {
        let ctx = test_support::TestContext::new().await;

        assert!(
            ctx.storage
                .has_teaching_assignment(ctx.teacher_id, ctx.class_id, ctx.subject_id, Some(SESSION))
                .await
                .unwrap()
        );
        // 其他学年没有分配
        assert!(
            !ctx.storage
                .has_teaching_assignment(
                    ctx.teacher_id,
                    ctx.class_id,
                    ctx.subject_id,
                    Some("2025/2026")
                )
                .await
                .unwrap()
        );
        // 未分配的教师
        assert!(
            !ctx.storage
                .has_teaching_assignment(424242, ctx.class_id, ctx.subject_id, Some(SESSION))
                .await
                .unwrap()
        );
        // 省略学年时按任意学年匹配
        assert!(
            ctx.storage
                .has_teaching_assignment(ctx.teacher_id, ctx.class_id, ctx.subject_id, None)
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_subject_enrollment_lookup() {
        let ctx = test_support::TestContext::new().await;

        assert!(
            ctx.storage
                .has_subject_enrollment(ctx.student_ids[0], ctx.class_id, ctx.subject_id, SESSION)
                .await
                .unwrap()
        );
        assert!(
            !ctx.storage
                .has_subject_enrollment(424242, ctx.class_id, ctx.subject_id, SESSION)
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_class_membership_carries_group() {
        let ctx = test_support::TestContext::new().await;

        let membership = ctx
            .storage
            .get_class_membership(ctx.class_id, ctx.student_ids[0], SESSION)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(membership.class_group.as_deref(), Some("A"));

        let memberships = ctx
            .storage
            .list_class_memberships(ctx.class_id, Some(SESSION))
            .await
            .unwrap();
        // 组 A 两人 + 组 B 一人
        assert_eq!(memberships.len(), 3);
    }

    #[tokio::test]
    async fn test_form_teacher_group_resolution() {
        let ctx = test_support::TestContext::new().await;

        // 班主任解析出分组 A
        let group = ctx
            .storage
            .get_form_teacher_group(ctx.teacher_id, ctx.class_id, SESSION)
            .await
            .unwrap();
        assert_eq!(group, Some(Some("A".to_string())));

        // 无班主任分配的用户得到 None（而非空分组）
        let group = ctx
            .storage
            .get_form_teacher_group(424242, ctx.class_id, SESSION)
            .await
            .unwrap();
        assert_eq!(group, None);
    }

    #[tokio::test]
    async fn test_class_school_lookup() {
        let ctx = test_support::TestContext::new().await;

        assert_eq!(
            ctx.storage.get_class_school_id(ctx.class_id).await.unwrap(),
            Some(ctx.school_id)
        );
        assert_eq!(ctx.storage.get_class_school_id(424242).await.unwrap(), None);
    }
}
