use std::sync::Arc;

use crate::models::{
    approvals::entities::ResultSummary,
    rosters::entities::{ClassMembership, Student},
    scores::entities::{SchoolTerm, ScoreComponents, ScoreRecord},
    users::{entities::User, requests::CreateUserRequest},
};

use crate::errors::Result;

pub mod sea_orm_storage;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户管理方法
    // 创建用户
    async fn create_user(&self, user: CreateUserRequest) -> Result<User>;
    // 通过ID获取用户信息
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    // 通过用户名或邮箱获取用户信息
    async fn get_user_by_username_or_email(&self, identifier: &str) -> Result<Option<User>>;
    // 统计用户数量
    async fn count_users(&self) -> Result<u64>;
    // 更新用户最后登录时间
    async fn update_last_login(&self, id: i64) -> Result<bool>;

    /// 花名册查询方法（核心只读，注册关系由外部管理流程维护）
    // 教师是否持有 (班级, 科目, 学年) 的有效任课分配
    async fn has_teaching_assignment(
        &self,
        teacher_id: i64,
        class_id: i64,
        subject_id: i64,
        session: Option<&str>,
    ) -> Result<bool>;
    // 学生是否持有 (班级, 科目, 学年) 的有效选课
    async fn has_subject_enrollment(
        &self,
        student_id: i64,
        class_id: i64,
        subject_id: i64,
        session: &str,
    ) -> Result<bool>;
    // 获取学生在班级+学年中的成员关系（含分组标签）
    async fn get_class_membership(
        &self,
        class_id: i64,
        student_id: i64,
        session: &str,
    ) -> Result<Option<ClassMembership>>;
    // 列出班级+学年的全部有效成员
    async fn list_class_memberships(
        &self,
        class_id: i64,
        session: Option<&str>,
    ) -> Result<Vec<ClassMembership>>;
    // 列出 (班级, 科目, 学年) 的有效选课学生ID
    async fn list_subject_enrollment_student_ids(
        &self,
        class_id: i64,
        subject_id: i64,
        session: Option<&str>,
    ) -> Result<Vec<i64>>;
    // 批量获取学生信息
    async fn get_students_by_ids(&self, student_ids: &[i64]) -> Result<Vec<Student>>;
    // 获取教师在班级+学年的班主任分组；无班主任分配时返回 None
    async fn get_form_teacher_group(
        &self,
        teacher_id: i64,
        class_id: i64,
        session: &str,
    ) -> Result<Option<Option<String>>>;
    // 获取班级所属学校
    async fn get_class_school_id(&self, class_id: i64) -> Result<Option<i64>>;

    /// 成绩记录方法
    // 按自然键 upsert 一条成绩记录，返回记录ID
    async fn upsert_score_record(
        &self,
        teacher_id: i64,
        student_id: i64,
        class_id: i64,
        subject_id: i64,
        session: &str,
        term: SchoolTerm,
        components: ScoreComponents,
    ) -> Result<i64>;
    // 通过ID获取成绩记录（任意状态）
    async fn get_score_record_by_id(&self, score_id: i64) -> Result<Option<ScoreRecord>>;
    // 按记录ID覆盖五个分量并重算总分
    async fn update_score_components(
        &self,
        score_id: i64,
        components: ScoreComponents,
        updated_by: i64,
    ) -> Result<Option<ScoreRecord>>;
    // 软删除成绩记录
    async fn deactivate_score_record(&self, score_id: i64, updated_by: i64) -> Result<bool>;
    // 列出 (班级, 科目) 的有效成绩记录，可按学年/学期过滤
    async fn list_active_score_records(
        &self,
        class_id: i64,
        subject_id: i64,
        session: Option<&str>,
        term: Option<SchoolTerm>,
    ) -> Result<Vec<ScoreRecord>>;

    /// 成绩审批方法
    // 查询作用域的审批快照
    async fn get_result_summary(
        &self,
        class_id: i64,
        class_group: Option<&str>,
        session: &str,
        term: SchoolTerm,
    ) -> Result<Option<ResultSummary>>;
    // 审批：聚合作用域成绩并写入快照（幂等，已审批时返回既有快照）
    async fn approve_results(
        &self,
        class_id: i64,
        class_group: Option<&str>,
        session: &str,
        term: SchoolTerm,
        school_id: i64,
        approved_by: i64,
    ) -> Result<ResultSummary>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
