use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ScoreService;
use crate::middlewares::RequireJWT;
use crate::models::scores::entities::ScoreComponents;
use crate::models::scores::requests::SaveScoreRequest;
use crate::models::scores::responses::SaveScoreResponse;
use crate::models::users::entities::UserRole;
use crate::models::{ApiResponse, ErrorCode};
use crate::utils::validate::{validate_components, validate_session};

/// 录入单个学生的五个成绩分量
/// POST /scores
pub async fn save_score(
    service: &ScoreService,
    request: &HttpRequest,
    req: SaveScoreRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    // 获取当前用户信息
    let current_user = match RequireJWT::extract_user_claims(request) {
        Some(user) => user,
        None => {
            return Ok(HttpResponse::Unauthorized()
                .json(ApiResponse::error_empty(ErrorCode::Unauthorized, "未登录")));
        }
    };

    // 学年格式校验
    if let Err(e) = validate_session(&req.session) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::InvalidSession, e)));
    }

    // 任课授权：教师必须持有 (班级, 科目, 学年) 的有效任课分配，管理员放行
    if current_user.role == UserRole::Teacher {
        match storage
            .has_teaching_assignment(
                current_user.id,
                req.class_id,
                req.subject_id,
                Some(&req.session),
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

    // 选课资格：学生必须持有 (班级, 科目, 学年) 的有效选课
    match storage
        .has_subject_enrollment(req.student_id, req.class_id, req.subject_id, &req.session)
        .await
    {
        Ok(true) => {}
        Ok(false) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::StudentNotEnrolled,
                "该学生未选修此科目",
            )));
        }
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("查询选课失败: {e}"),
                )),
            );
        }
    }

    // 分量校验：任一分量非法则整体拒绝，不做部分写入
    let validation = validate_components(&[
        ("assess_1", req.assess_1),
        ("assess_2", req.assess_2),
        ("test_1", req.test_1),
        ("test_2", req.test_2),
        ("exam", req.exam),
    ]);
    if !validation.is_valid {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::InvalidScoreComponent,
            validation.error_message(),
        )));
    }

    // 班级成员关系：取学生分组，用于审批锁检查
    let membership = match storage
        .get_class_membership(req.class_id, req.student_id, &req.session)
        .await
    {
        Ok(Some(m)) => m,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::StudentNotEnrolled,
                "该学生不在班级花名册中",
            )));
        }
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("查询班级成员失败: {e}"),
                )),
            );
        }
    };

    // 审批锁：已审批作用域内禁止任何成绩写入
    match storage
        .get_result_summary(
            req.class_id,
            membership.class_group.as_deref(),
            &req.session,
            req.term,
        )
        .await
    {
        Ok(Some(_)) => {
            return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::ResultsLocked,
                "该班级分组的本学期成绩已审批，禁止修改",
            )));
        }
        Ok(None) => {}
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("查询审批状态失败: {e}"),
                )),
            );
        }
    }

    // 缺省分量视为 0
    let components = ScoreComponents {
        assess_1: req.assess_1.unwrap_or(0.0),
        assess_2: req.assess_2.unwrap_or(0.0),
        test_1: req.test_1.unwrap_or(0.0),
        test_2: req.test_2.unwrap_or(0.0),
        exam: req.exam.unwrap_or(0.0),
    };

    match storage
        .upsert_score_record(
            current_user.id,
            req.student_id,
            req.class_id,
            req.subject_id,
            &req.session,
            req.term,
            components,
        )
        .await
    {
        Ok(score_id) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            SaveScoreResponse { score_id },
            "保存成功",
        ))),
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("保存成绩失败: {e}"),
            )),
        ),
    }
}
