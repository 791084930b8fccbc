//! 测试辅助：内存 SQLite 存储与花名册种子数据

use migration::{Migrator, MigratorTrait};
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, Set};

use super::SeaOrmStorage;
use crate::entity::prelude::{
    ClassActiveModel, ClassStudentActiveModel, FormTeacherActiveModel, SchoolActiveModel,
    StudentActiveModel, SubjectActiveModel, SubjectEnrollmentActiveModel,
    TeachingAssignmentActiveModel, UserActiveModel,
};

const SESSION: &str = "2024/2025";
const STATUS_ACTIVE: &str = "active";

/// 预置一所学校、一位教师（任课 + 组 A 班主任）、一个班级/科目、
/// 组 A 两名学生与组 B 一名学生的内存存储
pub(crate) struct TestContext {
    pub storage: SeaOrmStorage,
    pub school_id: i64,
    pub teacher_id: i64,
    pub class_id: i64,
    pub subject_id: i64,
    pub student_ids: Vec<i64>,
    pub group_b_student_id: i64,
}

impl TestContext {
    pub async fn new() -> Self {
        // 内存库必须限制为单连接，否则池中每个连接各有一个空库
        let mut options = ConnectOptions::new("sqlite::memory:");
        options.max_connections(1);

        let db = Database::connect(options)
            .await
            .expect("Failed to connect to in-memory SQLite");
        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        let now = chrono::Utc::now().timestamp();

        let school = SchoolActiveModel {
            school_name: Set("St. Mary Demonstration School".to_string()),
            status: Set(STATUS_ACTIVE.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&db)
        .await
        .expect("Failed to seed school");

        let teacher = UserActiveModel {
            username: Set("teacher_one".to_string()),
            email: Set("teacher.one@school.test".to_string()),
            password_hash: Set("unused-hash".to_string()),
            role: Set("teacher".to_string()),
            status: Set(STATUS_ACTIVE.to_string()),
            school_id: Set(Some(school.id)),
            profile_name: Set(Some("Teacher One".to_string())),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&db)
        .await
        .expect("Failed to seed teacher");

        let class = ClassActiveModel {
            school_id: Set(school.id),
            class_name: Set("JSS1".to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&db)
        .await
        .expect("Failed to seed class");

        let subject = SubjectActiveModel {
            school_id: Set(school.id),
            subject_name: Set("Mathematics".to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&db)
        .await
        .expect("Failed to seed subject");

        TeachingAssignmentActiveModel {
            teacher_id: Set(teacher.id),
            class_id: Set(class.id),
            subject_id: Set(subject.id),
            session: Set(SESSION.to_string()),
            status: Set(STATUS_ACTIVE.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&db)
        .await
        .expect("Failed to seed teaching assignment");

        FormTeacherActiveModel {
            teacher_id: Set(teacher.id),
            class_id: Set(class.id),
            class_group: Set(Some("A".to_string())),
            session: Set(SESSION.to_string()),
            status: Set(STATUS_ACTIVE.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&db)
        .await
        .expect("Failed to seed form teacher");

        let ctx = Self {
            storage: SeaOrmStorage { db },
            school_id: school.id,
            teacher_id: teacher.id,
            class_id: class.id,
            subject_id: subject.id,
            student_ids: Vec::new(),
            group_b_student_id: 0,
        };

        let mut ctx = ctx;
        let s1 = ctx.add_student(Some("A")).await;
        let s2 = ctx.add_student(Some("A")).await;
        ctx.student_ids = vec![s1, s2];
        ctx.group_b_student_id = ctx.add_student(Some("B")).await;

        ctx
    }

    /// 新增一名在册学生并为其选上本科目
    pub async fn add_student(&self, class_group: Option<&str>) -> i64 {
        let db = &self.storage.db;
        let now = chrono::Utc::now().timestamp();

        let student = StudentActiveModel {
            school_id: Set(self.school_id),
            first_name: Set("Student".to_string()),
            surname: Set(format!("No{}", now % 100_000)),
            status: Set(STATUS_ACTIVE.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await
        .expect("Failed to seed student");

        ClassStudentActiveModel {
            class_id: Set(self.class_id),
            student_id: Set(student.id),
            class_group: Set(class_group.map(|g| g.to_string())),
            session: Set(SESSION.to_string()),
            status: Set(STATUS_ACTIVE.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await
        .expect("Failed to seed class membership");

        SubjectEnrollmentActiveModel {
            student_id: Set(student.id),
            class_id: Set(self.class_id),
            subject_id: Set(self.subject_id),
            session: Set(SESSION.to_string()),
            status: Set(STATUS_ACTIVE.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await
        .expect("Failed to seed subject enrollment");

        student.id
    }
}
