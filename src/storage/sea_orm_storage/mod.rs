//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod results;
mod rosters;
mod scores;
#[cfg(test)]
mod test_support;
mod users;

use crate::config::AppConfig;
use crate::errors::{Result, ScoreSystemError};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 创建新的 SeaORM 存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        let db_url = Self::build_database_url(&config.database.url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite://") {
            Self::connect_sqlite(&db_url, config).await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        // 运行迁移
        Migrator::up(&db, None)
            .await
            .map_err(|e| ScoreSystemError::database_operation(format!("数据库迁移失败: {e}")))?;

        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(Self { db })
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| ScoreSystemError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory")
            .pragma("mmap_size", "536870912")
            .pragma("wal_autocheckpoint", "1000");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.database.pool_size)
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(300))
            .connect_with(opt)
            .await
            .map_err(|e| ScoreSystemError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.database.pool_size)
            .min_connections(5)
            .connect_timeout(Duration::from_secs(config.database.timeout))
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| ScoreSystemError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite://") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") || url == ":memory:" {
            Ok(format!("sqlite://{}?mode=rwc", url))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(ScoreSystemError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }
}

// Storage trait 实现
use crate::models::{
    approvals::entities::ResultSummary,
    rosters::entities::{ClassMembership, Student},
    scores::entities::{SchoolTerm, ScoreComponents, ScoreRecord},
    users::{entities::User, requests::CreateUserRequest},
};
use crate::storage::Storage;
use async_trait::async_trait;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 用户模块
    async fn create_user(&self, user: CreateUserRequest) -> Result<User> {
        self.create_user_impl(user).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    async fn get_user_by_username_or_email(&self, identifier: &str) -> Result<Option<User>> {
        self.get_user_by_username_or_email_impl(identifier).await
    }

    async fn count_users(&self) -> Result<u64> {
        self.count_users_impl().await
    }

    async fn update_last_login(&self, id: i64) -> Result<bool> {
        self.update_last_login_impl(id).await
    }

    // 花名册模块
    async fn has_teaching_assignment(
        &self,
        teacher_id: i64,
        class_id: i64,
        subject_id: i64,
        session: Option<&str>,
    ) -> Result<bool> {
        self.has_teaching_assignment_impl(teacher_id, class_id, subject_id, session)
            .await
    }

    async fn has_subject_enrollment(
        &self,
        student_id: i64,
        class_id: i64,
        subject_id: i64,
        session: &str,
    ) -> Result<bool> {
        self.has_subject_enrollment_impl(student_id, class_id, subject_id, session)
            .await
    }

    async fn get_class_membership(
        &self,
        class_id: i64,
        student_id: i64,
        session: &str,
    ) -> Result<Option<ClassMembership>> {
        self.get_class_membership_impl(class_id, student_id, session)
            .await
    }

    async fn list_class_memberships(
        &self,
        class_id: i64,
        session: Option<&str>,
    ) -> Result<Vec<ClassMembership>> {
        self.list_class_memberships_impl(class_id, session).await
    }

    async fn list_subject_enrollment_student_ids(
        &self,
        class_id: i64,
        subject_id: i64,
        session: Option<&str>,
    ) -> Result<Vec<i64>> {
        self.list_subject_enrollment_student_ids_impl(class_id, subject_id, session)
            .await
    }

    async fn get_students_by_ids(&self, student_ids: &[i64]) -> Result<Vec<Student>> {
        self.get_students_by_ids_impl(student_ids).await
    }

    async fn get_form_teacher_group(
        &self,
        teacher_id: i64,
        class_id: i64,
        session: &str,
    ) -> Result<Option<Option<String>>> {
        self.get_form_teacher_group_impl(teacher_id, class_id, session)
            .await
    }

    async fn get_class_school_id(&self, class_id: i64) -> Result<Option<i64>> {
        self.get_class_school_id_impl(class_id).await
    }

    // 成绩记录模块
    async fn upsert_score_record(
        &self,
        teacher_id: i64,
        student_id: i64,
        class_id: i64,
        subject_id: i64,
        session: &str,
        term: SchoolTerm,
        components: ScoreComponents,
    ) -> Result<i64> {
        self.upsert_score_record_impl(
            teacher_id, student_id, class_id, subject_id, session, term, components,
        )
        .await
    }

    async fn get_score_record_by_id(&self, score_id: i64) -> Result<Option<ScoreRecord>> {
        self.get_score_record_by_id_impl(score_id).await
    }

    async fn update_score_components(
        &self,
        score_id: i64,
        components: ScoreComponents,
        updated_by: i64,
    ) -> Result<Option<ScoreRecord>> {
        self.update_score_components_impl(score_id, components, updated_by)
            .await
    }

    async fn deactivate_score_record(&self, score_id: i64, updated_by: i64) -> Result<bool> {
        self.deactivate_score_record_impl(score_id, updated_by).await
    }

    async fn list_active_score_records(
        &self,
        class_id: i64,
        subject_id: i64,
        session: Option<&str>,
        term: Option<SchoolTerm>,
    ) -> Result<Vec<ScoreRecord>> {
        self.list_active_score_records_impl(class_id, subject_id, session, term)
            .await
    }

    // 成绩审批模块
    async fn get_result_summary(
        &self,
        class_id: i64,
        class_group: Option<&str>,
        session: &str,
        term: SchoolTerm,
    ) -> Result<Option<ResultSummary>> {
        self.get_result_summary_impl(class_id, class_group, session, term)
            .await
    }

    async fn approve_results(
        &self,
        class_id: i64,
        class_group: Option<&str>,
        session: &str,
        term: SchoolTerm,
        school_id: i64,
        approved_by: i64,
    ) -> Result<ResultSummary> {
        self.approve_results_impl(class_id, class_group, session, term, school_id, approved_by)
            .await
    }
}
