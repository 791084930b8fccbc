use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::approvals::requests::{ApprovalQueryParams, ApproveRequest};
use crate::models::users::entities::UserRole;
use crate::services::ResultService;

// 懒加载的全局 RESULT_SERVICE 实例
static RESULT_SERVICE: Lazy<ResultService> = Lazy::new(ResultService::new_lazy);

// HTTP处理程序
pub async fn check_approval(
    req: HttpRequest,
    query: web::Query<ApprovalQueryParams>,
) -> ActixResult<HttpResponse> {
    RESULT_SERVICE
        .check_approval(&req, query.into_inner())
        .await
}

pub async fn approve(req: HttpRequest, body: web::Json<ApproveRequest>) -> ActixResult<HttpResponse> {
    RESULT_SERVICE.approve(&req, body.into_inner()).await
}

// 配置路由
pub fn configure_results_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/results")
            .wrap(middlewares::RequireJWT)
            .service(
                // 审批状态：approved 看作用域，can_approve 看请求者
                web::resource("/approval").route(
                    web::get()
                        .to(check_approval)
                        .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles())),
                ),
            )
            .service(
                // 仅班主任可审批，服务层校验班主任分配
                web::resource("/approve").route(
                    web::post()
                        .to(approve)
                        .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles())),
                ),
            ),
    );
}
