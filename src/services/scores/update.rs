use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ScoreService;
use crate::middlewares::RequireJWT;
use crate::models::scores::entities::ScoreComponents;
use crate::models::scores::requests::UpdateScoreRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::utils::validate::validate_components;

/// 按记录 ID 覆盖五个分量并重算总分
/// PUT /scores/{score_id}
///
/// 与录入不同，此处不再复核任课分配（调用方视为已授权），
/// 但审批锁仍然生效。
pub async fn update_score(
    service: &ScoreService,
    request: &HttpRequest,
    score_id: i64,
    req: UpdateScoreRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let current_user = match RequireJWT::extract_user_claims(request) {
        Some(user) => user,
        None => {
            return Ok(HttpResponse::Unauthorized()
                .json(ApiResponse::error_empty(ErrorCode::Unauthorized, "未登录")));
        }
    };

    // 分量校验：任一分量非法则整体拒绝
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

    // 获取既有记录，从中恢复作用域
    let record = match storage.get_score_record_by_id(score_id).await {
        Ok(Some(record)) => record,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::ScoreNotFound,
                "成绩记录不存在",
            )));
        }
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("查询成绩记录失败: {e}"),
                )),
            );
        }
    };

    // 审批锁：解析学生分组后检查作用域
    let class_group = match storage
        .get_class_membership(record.class_id, record.student_id, &record.session)
        .await
    {
        Ok(membership) => membership.and_then(|m| m.class_group),
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("查询班级成员失败: {e}"),
                )),
            );
        }
    };

    match storage
        .get_result_summary(
            record.class_id,
            class_group.as_deref(),
            &record.session,
            record.term,
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

    let components = ScoreComponents {
        assess_1: req.assess_1.unwrap_or(0.0),
        assess_2: req.assess_2.unwrap_or(0.0),
        test_1: req.test_1.unwrap_or(0.0),
        test_2: req.test_2.unwrap_or(0.0),
        exam: req.exam.unwrap_or(0.0),
    };

    match storage
        .update_score_components(score_id, components, current_user.id)
        .await
    {
        Ok(Some(_)) => Ok(HttpResponse::Ok().json(ApiResponse::success_empty("更新成功"))),
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::ScoreNotFound,
            "成绩记录不存在",
        ))),
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("更新成绩失败: {e}"),
            )),
        ),
    }
}
