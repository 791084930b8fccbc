pub mod approve;
pub mod check;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::approvals::requests::{ApprovalQueryParams, ApproveRequest};
use crate::storage::Storage;

pub struct ResultService {
    storage: Option<Arc<dyn Storage>>,
}

impl ResultService {
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

    /// 查询审批状态
    pub async fn check_approval(
        &self,
        request: &HttpRequest,
        params: ApprovalQueryParams,
    ) -> ActixResult<HttpResponse> {
        check::check_approval(self, request, params).await
    }

    /// 审批班级分组的学期成绩（幂等）
    pub async fn approve(
        &self,
        request: &HttpRequest,
        req: ApproveRequest,
    ) -> ActixResult<HttpResponse> {
        approve::approve(self, request, req).await
    }
}
