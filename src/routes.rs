// API路由配置
// 定义所有HTTP接口的路由规则

use actix_web::{web, Scope};
use crate::handlers::*;

/// API v1路由配置
pub fn api_v1_routes() -> Scope {
    web::scope("/api/v1")
        .route("/checkout/{order_id}/fields", web::get().to(get_checkout_fields))
}

/// 公共路由 (浏览器跳转与网关回调)
pub fn public_routes() -> Scope {
    web::scope("")
        .route("/health", web::get().to(health_check))
        .route("/checkout/{order_id}", web::post().to(start_checkout))
        .route("/callback", web::post().to(gateway_callback))
        .route("/callback", web::get().to(gateway_callback_query))
}
