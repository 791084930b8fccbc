pub mod aggregation;
pub mod cohort;
pub mod remove;
pub mod save;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::scores::requests::{CohortQueryParams, SaveScoreRequest, UpdateScoreRequest};
use crate::storage::Storage;

pub struct ScoreService {
    storage: Option<Arc<dyn Storage>>,
}

impl ScoreService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        if let Some(storage) = &self.storage {
            storage.clone()
        } else {
            request
                .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
                .expect("Storage not found in app data")
                .get_ref()
                .clone()
        }
    }

    /// 录入成绩（按自然键 upsert）
    pub async fn save_score(
        &self,
        request: &HttpRequest,
        req: SaveScoreRequest,
    ) -> ActixResult<HttpResponse> {
        save::save_score(self, request, req).await
    }

    /// 按记录 ID 更新成绩分量
    pub async fn update_score(
        &self,
        request: &HttpRequest,
        score_id: i64,
        req: UpdateScoreRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_score(self, request, score_id, req).await
    }

    /// 软删除成绩记录
    pub async fn remove_score(
        &self,
        request: &HttpRequest,
        score_id: i64,
    ) -> ActixResult<HttpResponse> {
        remove::remove_score(self, request, score_id).await
    }

    /// 同批视图：总分、同批人数、平均分与名次
    pub async fn get_cohort_view(
        &self,
        request: &HttpRequest,
        params: CohortQueryParams,
    ) -> ActixResult<HttpResponse> {
        cohort::get_cohort_view(self, request, params).await
    }
}
