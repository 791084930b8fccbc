use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::ResultService;
use crate::middlewares::RequireJWT;
use crate::models::approvals::requests::ApproveRequest;
use crate::models::approvals::responses::ApproveResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::utils::validate::validate_session;

/// 审批班级分组的学期成绩
/// POST /results/approve
///
/// 仅限该班级+学年的班主任；已审批的作用域幂等返回既有快照。
/// 审批后作用域被锁定，成绩服务拒绝后续写入。
pub async fn approve(
    service: &ResultService,
    request: &HttpRequest,
    req: ApproveRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let current_user = match RequireJWT::extract_user_claims(request) {
        Some(user) => user,
        None => {
            return Ok(HttpResponse::Unauthorized()
                .json(ApiResponse::error_empty(ErrorCode::Unauthorized, "未登录")));
        }
    };

    if let Err(e) = validate_session(&req.session) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::InvalidSession, e)));
    }

    // 仅班主任可审批自己的分组
    let class_group = match storage
        .get_form_teacher_group(current_user.id, req.class_id, &req.session)
        .await
    {
        Ok(Some(group)) => group,
        Ok(None) => {
            return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
                ErrorCode::NotFormTeacher,
                "您不是该班级的班主任",
            )));
        }
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("查询班主任分配失败: {e}"),
                )),
            );
        }
    };

    let school_id = match storage.get_class_school_id(req.class_id).await {
        Ok(Some(school_id)) => school_id,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::ClassNotFound,
                "班级不存在",
            )));
        }
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("查询班级失败: {e}"),
                )),
            );
        }
    };

    match storage
        .approve_results(
            req.class_id,
            class_group.as_deref(),
            &req.session,
            req.term,
            school_id,
            current_user.id,
        )
        .await
    {
        Ok(summary) => {
            info!(
                "Results approved for class {} group {:?} session {} term {} by user {}",
                req.class_id, summary.class_group, req.session, req.term, current_user.id
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                ApproveResponse {
                    approved: true,
                    summary,
                },
                "审批成功",
            )))
        }
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("审批失败: {e}"),
            )),
        ),
    }
}
