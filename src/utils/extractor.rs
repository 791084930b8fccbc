//! 安全路径参数提取器
//!
//! 在进入处理程序之前解析并校验路径中的数字 ID，
//! 非法值直接返回统一的 400 响应。

use actix_web::{FromRequest, HttpRequest, HttpResponse, dev::Payload, error};
use futures_util::future::{Ready, ready};

use crate::models::{ApiResponse, ErrorCode};

macro_rules! define_safe_id_extractors {
    ($(
        $name:ident($param:literal)
    ),* $(,)?) => {
        $(
            #[derive(Debug, Clone, Copy)]
            pub struct $name(pub i64);

            impl FromRequest for $name {
                type Error = actix_web::Error;
                type Future = Ready<Result<Self, Self::Error>>;

                fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
                    let parsed = req
                        .match_info()
                        .get($param)
                        .and_then(|raw| raw.parse::<i64>().ok())
                        .filter(|id| *id > 0);

                    ready(match parsed {
                        Some(id) => Ok($name(id)),
                        None => {
                            let response = HttpResponse::BadRequest().json(
                                ApiResponse::<()>::error_empty(
                                    ErrorCode::BadRequest,
                                    format!("路径参数 {} 非法", $param),
                                ),
                            );
                            Err(error::InternalError::from_response(
                                format!("invalid path parameter: {}", $param),
                                response,
                            )
                            .into())
                        }
                    })
                }
            }
        )*
    };
}

define_safe_id_extractors! {
    SafeScoreIdI64("score_id"),
}
