use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::collections::{HashMap, HashSet};

use super::ScoreService;
use super::aggregation;
use crate::middlewares::RequireJWT;
use crate::models::rosters::entities::Student;
use crate::models::scores::requests::CohortQueryParams;
use crate::models::scores::responses::CohortViewResponse;
use crate::models::users::entities::UserRole;
use crate::models::{ApiResponse, ErrorCode};
use crate::utils::validate::validate_session;

/// 同批视图：每个在册学生的总分、同批人数、平均分与密集名次
/// GET /scores/cohort
///
/// session/term 均可省略；省略时跨全部学年/学期聚合，
/// 调用方必须显式传参以避免误读口径。
pub async fn get_cohort_view(
    service: &ScoreService,
    request: &HttpRequest,
    params: CohortQueryParams,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let current_user = match RequireJWT::extract_user_claims(request) {
        Some(user) => user,
        None => {
            return Ok(HttpResponse::Unauthorized()
                .json(ApiResponse::error_empty(ErrorCode::Unauthorized, "未登录")));
        }
    };

    if let Some(session) = &params.session {
        if let Err(e) = validate_session(session) {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::InvalidSession, e)));
        }
    }

    // 任课授权：教师必须任教该班级科目，管理员放行
    if current_user.role == UserRole::Teacher {
        match storage
            .has_teaching_assignment(
                current_user.id,
                params.class_id,
                params.subject_id,
                params.session.as_deref(),
            )
            .await
        {
            Ok(true) => {}
            Ok(false) => {
                return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
                    ErrorCode::NotSubjectTeacher,
                    "您不是该班级科目的任课教师",
                )));
            }
            Err(e) => {
                return Ok(
                    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                        ErrorCode::InternalServerError,
                        format!("查询任课分配失败: {e}"),
                    )),
                );
            }
        }
    }

    // 取数：班级成员、选课学生、有效成绩，内存中合并计算
    let memberships = match storage
        .list_class_memberships(params.class_id, params.session.as_deref())
        .await
    {
        Ok(rows) => rows,
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("查询班级成员失败: {e}"),
                )),
            );
        }
    };

    let enrolled: HashSet<i64> = match storage
        .list_subject_enrollment_student_ids(
            params.class_id,
            params.subject_id,
            params.session.as_deref(),
        )
        .await
    {
        Ok(ids) => ids.into_iter().collect(),
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("查询选课失败: {e}"),
                )),
            );
        }
    };

    let records = match storage
        .list_active_score_records(
            params.class_id,
            params.subject_id,
            params.session.as_deref(),
            params.term,
        )
        .await
    {
        Ok(rows) => rows,
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("查询成绩记录失败: {e}"),
                )),
            );
        }
    };

    let members = aggregation::build_cohort_members(&memberships, &enrolled, &records);

    let member_ids: Vec<i64> = members.iter().map(|m| m.student_id).collect();
    let students: HashMap<i64, Student> = match storage.get_students_by_ids(&member_ids).await {
        Ok(rows) => rows.into_iter().map(|s| (s.id, s)).collect(),
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("查询学生失败: {e}"),
                )),
            );
        }
    };

    let items = aggregation::compute_rows(&members, &students);

    let response = CohortViewResponse {
        class_id: params.class_id,
        subject_id: params.subject_id,
        session: params.session,
        term: params.term,
        items,
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(response, "查询成功")))
}
