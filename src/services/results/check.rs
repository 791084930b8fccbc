use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ResultService;
use crate::middlewares::RequireJWT;
use crate::models::approvals::requests::ApprovalQueryParams;
use crate::models::approvals::responses::ApprovalStatusResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::utils::validate::validate_session;

/// 查询审批状态
/// GET /results/approval
///
/// approved 只看作用域是否已有快照，与请求者无关；
/// can_approve 只看请求者是否为该班级+学年的班主任，与审批状态无关。
pub async fn check_approval(
    service: &ResultService,
    request: &HttpRequest,
    params: ApprovalQueryParams,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let current_user = match RequireJWT::extract_user_claims(request) {
        Some(user) => user,
        None => {
            return Ok(HttpResponse::Unauthorized()
                .json(ApiResponse::error_empty(ErrorCode::Unauthorized, "未登录")));
        }
    };

    if let Err(e) = validate_session(&params.session) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::InvalidSession, e)));
    }

    // 作用域分组取自请求者的班主任分配
    let form_group = match storage
        .get_form_teacher_group(current_user.id, params.class_id, &params.session)
        .await
    {
        Ok(group) => group,
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("查询班主任分配失败: {e}"),
                )),
            );
        }
    };

    let can_approve = form_group.is_some();
    let class_group = form_group.flatten();

    let approved = match storage
        .get_result_summary(
            params.class_id,
            class_group.as_deref(),
            &params.session,
            params.term,
        )
        .await
    {
        Ok(summary) => summary.is_some(),
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("查询审批状态失败: {e}"),
                )),
            );
        }
    };

    let response = ApprovalStatusResponse {
        approved,
        can_approve,
        class_group,
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(response, "查询成功")))
}
