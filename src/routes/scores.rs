use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::scores::requests::{CohortQueryParams, SaveScoreRequest, UpdateScoreRequest};
use crate::models::users::entities::UserRole;
use crate::services::ScoreService;
use crate::utils::SafeScoreIdI64;

// 懒加载的全局 SCORE_SERVICE 实例
static SCORE_SERVICE: Lazy<ScoreService> = Lazy::new(ScoreService::new_lazy);

// HTTP处理程序
pub async fn save_score(
    req: HttpRequest,
    body: web::Json<SaveScoreRequest>,
) -> ActixResult<HttpResponse> {
    SCORE_SERVICE.save_score(&req, body.into_inner()).await
}

pub async fn update_score(
    req: HttpRequest,
    score_id: SafeScoreIdI64,
    body: web::Json<UpdateScoreRequest>,
) -> ActixResult<HttpResponse> {
    SCORE_SERVICE
        .update_score(&req, score_id.0, body.into_inner())
        .await
}

pub async fn remove_score(req: HttpRequest, score_id: SafeScoreIdI64) -> ActixResult<HttpResponse> {
    SCORE_SERVICE.remove_score(&req, score_id.0).await
}

pub async fn get_cohort_view(
    req: HttpRequest,
    query: web::Query<CohortQueryParams>,
) -> ActixResult<HttpResponse> {
    SCORE_SERVICE
        .get_cohort_view(&req, query.into_inner())
        .await
}

// 配置路由
pub fn configure_scores_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/scores")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("").route(
                    web::post()
                        .to(save_score)
                        // 任课教师录入成绩，管理员可代录
                        .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles())),
                ),
            )
            .service(
                // 任课教师/管理员查看同批视图（总分、平均分、名次）
                web::resource("/cohort").route(
                    web::get()
                        .to(get_cohort_view)
                        .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles())),
                ),
            )
            .service(
                web::resource("/{score_id}")
                    .route(
                        web::put()
                            .to(update_score)
                            // 调用方已授权，服务层只校验分量与审批锁
                            .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles())),
                    )
                    .route(
                        web::delete()
                            .to(remove_score)
                            // 软删除，审批后的作用域拒绝删除
                            .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles())),
                    ),
            ),
    );
}
