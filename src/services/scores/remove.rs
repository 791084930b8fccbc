use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ScoreService;
use crate::middlewares::RequireJWT;
use crate::models::{ApiResponse, ErrorCode};

/// 软删除成绩记录
/// DELETE /scores/{score_id}
///
/// 只要记录存在就置为 inactive（重复删除视为成功），永不物理删除
pub async fn remove_score(
    service: &ScoreService,
    request: &HttpRequest,
    score_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let current_user = match RequireJWT::extract_user_claims(request) {
        Some(user) => user,
        None => {
            return Ok(HttpResponse::Unauthorized()
                .json(ApiResponse::error_empty(ErrorCode::Unauthorized, "未登录")));
        }
    };

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

    // 审批锁：已审批作用域内的记录不可删除
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

    match storage
        .deactivate_score_record(score_id, current_user.id)
        .await
    {
        Ok(true) => Ok(HttpResponse::Ok().json(ApiResponse::success_empty("删除成功"))),
        Ok(false) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::ScoreNotFound,
            "成绩记录不存在",
        ))),
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("删除成绩失败: {e}"),
            )),
        ),
    }
}
